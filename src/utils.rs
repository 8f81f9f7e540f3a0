//! Text helpers shared by the scrapers and the normalizer.
//!
//! - Title casing with the same word-boundary rules the source data was
//!   originally normalized with
//! - Slugification for stable identifiers
//! - Whitespace cleanup for text lifted out of markup
//! - String truncation for log fields

/// Title-case a string word by word.
///
/// A letter is uppercased when it follows a non-letter (start of string,
/// space, digit, apostrophe, ...) and lowercased otherwise. This matches the
/// casing rule the published meeting titles were normalized with, so
/// `"o'brien"` becomes `"O'Brien"` and `"1st panel"` becomes `"1St Panel"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(title_case("ILRB STATE PANEL"), "Ilrb State Panel");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Convert a title to an identifier-safe slug.
///
/// Lowercases, and collapses every run of non-alphanumeric characters into
/// a single underscore, trimming underscores at both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("State Panel Meeting"), "state_panel_meeting");
/// assert_eq!(slugify("  Joint -- Meeting! "), "joint_meeting");
/// ```
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Strip non-breaking spaces and surrounding whitespace from markup text.
pub fn clean_text(s: &str) -> String {
    s.replace('\u{a0}', "").trim().to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or below `max`
/// bytes, with an ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
