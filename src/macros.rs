//! Lazily-compiled static selectors and patterns.
//!
//! Both macros compile their argument once on first use and hand out a
//! `&'static` reference afterwards, so hot extraction loops never re-parse
//! CSS or regex source. The literals are fixed at compile time, which is why
//! a failed parse is a programming error rather than a page error.

#[macro_export]
macro_rules! selector {
    ($e: expr) => {{
        use ::once_cell::sync::Lazy;
        use ::scraper::Selector;
        static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($e).unwrap());
        &*SELECTOR
    }};
}

#[macro_export]
macro_rules! regex {
    ($e: expr) => {{
        use ::once_cell::sync::Lazy;
        use ::regex::Regex;
        static PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new($e).unwrap());
        &*PATTERN
    }};
}
