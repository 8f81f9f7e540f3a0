//! Output generation for scraped meetings.
//!
//! # Submodules
//!
//! - [`json`]: the item sink that deduplicates meetings by id and writes
//!   them as JSON Lines to a file or stdout

pub mod json;
