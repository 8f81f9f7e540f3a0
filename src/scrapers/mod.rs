//! Page parsers for the labor relations board site.
//!
//! The site has two layouts, each with its own submodule:
//!
//! | Page | Module | Yields |
//! |------|--------|--------|
//! | Upcoming meetings | [`upcoming`] | next meeting per board + three archive requests |
//! | State/local/joint minutes | [`archive`] | one past meeting per minutes link |
//!
//! # Common Patterns
//!
//! Each parser takes a fetched [`Page`], the [`ParseContext`] for the run,
//! and returns a [`ScrapeOutput`]. Parsing is all-or-nothing per page: a
//! layout the parser does not recognise is a [`ScrapeError`] and the page
//! contributes nothing, so upstream layout drift fails loudly instead of
//! silently dropping data.

pub mod archive;
pub mod upcoming;

use crate::config::CrawlConfig;
use crate::models::Meeting;
use chrono::NaiveDateTime;
use scraper::Html;
use thiserror::Error;
use url::Url;

/// A fetched, parsed HTML page.
#[derive(Debug)]
pub struct Page {
    pub url: Url,
    pub document: Html,
}

impl Page {
    pub fn parse(url: Url, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }
}

/// Read-only inputs shared by every parser during one crawl run.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub config: &'a CrawlConfig,
    /// Wall-clock time the crawl started; drives status and default years.
    pub now: NaiveDateTime,
}

/// Which parser handles a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Upcoming,
    Archive,
}

/// A follow-up fetch emitted by a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub callback: Callback,
}

/// Everything one page produced.
#[derive(Debug, Default)]
pub struct ScrapeOutput {
    pub meetings: Vec<Meeting>,
    pub requests: Vec<Request>,
}

/// Page shapes the parsers refuse to guess about.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Entry has neither a link nor a <strong> to take the title from")]
    MissingTitle,
    #[error("No Chicago address found near entry {title:?}")]
    MissingAddress { title: String },
    #[error("Archive date {0:?} matches neither m-d-Y nor m-d-y")]
    BadArchiveDate(String),
    #[error("No board name between date and \"Meeting\" in {0:?}")]
    MissingCategory(String),
    #[error("Minutes link {0:?} has no href")]
    MissingHref(String),
    #[error("Minutes link has no text")]
    MissingLinkText,
    #[error("Could not resolve {href:?} against the page URL: {source}")]
    InvalidUrl {
        href: String,
        source: url::ParseError,
    },
}

/// Dispatch a page to the parser its request was bound to.
pub fn parse_page(
    callback: Callback,
    page: &Page,
    ctx: ParseContext<'_>,
) -> Result<ScrapeOutput, ScrapeError> {
    match callback {
        Callback::Upcoming => upcoming::parse(page, ctx),
        Callback::Archive => archive::parse(page, ctx),
    }
}
