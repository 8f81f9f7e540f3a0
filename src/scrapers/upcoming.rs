//! Upcoming-meetings page parser.
//!
//! The page lists the next meeting of each board as a loosely formatted
//! paragraph, roughly:
//!
//! ```text
//! <p><a href="agenda.pdf">ILRB State Panel</a> <strong>Meeting</strong>
//!    <strong>Tuesday, March 10, 2020 at 11:00 a.m.</strong></p>
//! <div><p>160 N. LaSalle Street, Suite N-401, Chicago, IL 60601</p></div>
//! ```
//!
//! The markup is not consistent from board to board, so each field is
//! recovered by an ordered list of strategies and the first hit wins. A
//! paragraph whose date does not parse is a "no meeting this month" notice
//! and is skipped. Missing title or address markup is a layout change and
//! fails the page.

use super::{Callback, Page, ParseContext, Request, ScrapeError, ScrapeOutput};
use crate::dates::parse_datetime;
use crate::models::{Link, Location};
use crate::normalize::MeetingDraft;
use crate::utils::{clean_text, title_case, truncate_for_log};
use chrono::{NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument};
use url::Url;

/// Parse every meeting paragraph and queue the three minutes archives.
#[instrument(level = "info", skip_all, fields(url = %page.url))]
pub fn parse(page: &Page, ctx: ParseContext<'_>) -> Result<ScrapeOutput, ScrapeError> {
    let description = parse_description(&page.document);
    let mut meetings = Vec::new();

    for item in page
        .document
        .select(selector!(".soi-article-content .container > .row > p"))
    {
        let Some(start) = parse_start(item, ctx.now.date()) else {
            debug!(
                text = %truncate_for_log(&item.text().collect::<String>(), 120),
                "No parseable date; treating as a no-meeting notice"
            );
            continue;
        };
        let title = parse_title(item)?;
        let location =
            parse_location(item).ok_or_else(|| ScrapeError::MissingAddress { title: title.clone() })?;
        let links = parse_links(item, &page.url)?;

        let meeting = MeetingDraft {
            title,
            description: description.clone(),
            start,
            location,
            links,
            source: page.url.to_string(),
        }
        .finish(ctx.config, ctx.now);
        debug!(id = %meeting.id, "Parsed upcoming meeting");
        meetings.push(meeting);
    }

    let requests: Vec<Request> = ctx
        .config
        .archive_urls
        .iter()
        .map(|url| Request {
            url: url.clone(),
            callback: Callback::Archive,
        })
        .collect();

    info!(
        meetings = meetings.len(),
        follow_ups = requests.len(),
        "Parsed upcoming meetings page"
    );
    Ok(ScrapeOutput { meetings, requests })
}

/// Concatenated, trimmed text of an element.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse the start date and time of an entry.
///
/// The date sits in the second `<strong>` among its siblings
/// (`strong:nth-of-type(2)`), so a bold title nested inside the agenda link
/// does not shift it. When that element is missing or has no text at all,
/// the third is used instead. Whitespace-only text counts as present and
/// simply fails to parse.
///
/// # Arguments
///
/// * `item` - The entry paragraph
/// * `default_date` - Supplies the year when the text omits it
///
/// # Returns
///
/// The parsed start, or `None` when the entry is a "no meeting this month"
/// notice (or otherwise carries no parseable date).
///
/// # Examples
///
/// ```ignore
/// // <p><strong>State Panel</strong> <strong>March 10, 2020 11 am</strong></p>
/// assert_eq!(parse_start(item, today), NaiveDate::from_ymd_opt(2020, 3, 10)?.and_hms_opt(11, 0, 0));
/// ```
pub fn parse_start(item: ElementRef<'_>, default_date: NaiveDate) -> Option<NaiveDateTime> {
    fn raw_text(el: ElementRef<'_>) -> String {
        el.text().collect()
    }

    let second = item
        .select(selector!("strong:nth-of-type(2)"))
        .next()
        .map(raw_text);
    let third = || {
        item.select(selector!("strong:nth-of-type(3)"))
            .next()
            .map(raw_text)
    };
    let date_text = second
        .filter(|t| !t.is_empty())
        .or_else(third)
        .filter(|t| !t.is_empty())?;
    parse_datetime(&date_text, default_date)
}

/// Parse the meeting title of an entry.
///
/// Tries the text of the first link, then the first `<strong>`; the first
/// non-empty one is title-cased.
///
/// # Arguments
///
/// * `item` - The entry paragraph
///
/// # Returns
///
/// The title, or [`ScrapeError::MissingTitle`] when the entry has neither
/// element, which means the page layout changed.
///
/// # Examples
///
/// ```ignore
/// // <p><a href="agenda.pdf">ILRB STATE PANEL</a> ...</p>
/// assert_eq!(parse_title(item)?, "Ilrb State Panel");
/// ```
pub fn parse_title(item: ElementRef<'_>) -> Result<String, ScrapeError> {
    fn first_link(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
        item.select(selector!("a")).next()
    }
    fn first_strong(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
        item.select(selector!("strong")).next()
    }

    let strategies: [fn(ElementRef<'_>) -> Option<ElementRef<'_>>; 2] = [first_link, first_strong];
    strategies
        .iter()
        .filter_map(|strategy| strategy(item))
        .map(element_text)
        .find(|t| !t.is_empty())
        .map(|t| title_case(&t))
        .ok_or(ScrapeError::MissingTitle)
}

/// Address lines near an entry.
///
/// Prefers paragraphs nested in the entry's following siblings; when there
/// are none, uses the paragraphs of the next `<div>` after the entry's row.
/// Each text node is one candidate line.
pub fn address_candidates(item: ElementRef<'_>) -> Vec<String> {
    fn paragraph_lines<'a>(containers: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
        containers
            .flat_map(|c| c.select(selector!("p")))
            .flat_map(|p| p.text())
            .map(str::to_string)
            .collect()
    }

    let in_row = paragraph_lines(item.next_siblings().filter_map(ElementRef::wrap));
    if !in_row.is_empty() {
        return in_row;
    }
    let next_row = item
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|row| {
            row.next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "div")
        });
    paragraph_lines(next_row.into_iter())
}

/// First Chicago address among `candidates`.
///
/// Only Chicago venues are published in this feed, so lines without
/// "chicago" (any case) are discarded regardless of position. Non-breaking
/// spaces and surrounding whitespace are stripped from the survivor.
///
/// # Arguments
///
/// * `candidates` - Text lines found near an entry, in document order
///
/// # Returns
///
/// A [`Location`] with an empty name, or `None` when no line mentions
/// Chicago.
///
/// # Examples
///
/// ```ignore
/// let lines = ["123 Main St, Springfield, IL", "100 State St, Chicago, IL 60601"];
/// assert_eq!(pick_address(&lines).unwrap().address, "100 State St, Chicago, IL 60601");
/// ```
pub fn pick_address<S: AsRef<str>>(candidates: &[S]) -> Option<Location> {
    candidates
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| line.to_lowercase().contains("chicago"))
        .map(clean_text)
        .next()
        .map(|address| Location {
            name: String::new(),
            address,
        })
}

pub fn parse_location(item: ElementRef<'_>) -> Option<Location> {
    pick_address(&address_candidates(item))
}

/// The entry's first link, resolved against the page, as its agenda.
pub fn parse_links(item: ElementRef<'_>, base: &Url) -> Result<Vec<Link>, ScrapeError> {
    let Some(href) = item
        .select(selector!("a[href]"))
        .next()
        .and_then(|a| a.value().attr("href"))
    else {
        return Ok(Vec::new());
    };
    let resolved = base.join(href).map_err(|source| ScrapeError::InvalidUrl {
        href: href.to_string(),
        source,
    })?;
    Ok(vec![Link {
        href: resolved.to_string(),
        title: "Agenda".to_string(),
    }])
}

/// Generic board description from the page's rich-text block.
///
/// The page has no per-meeting description, so every record shares this
/// one. An empty string when the block is missing.
pub fn parse_description(document: &Html) -> String {
    document
        .select(selector!(
            "#ctl00_PlaceHolderMain_ctl01__ControlWrapper_RichHtmlField p"
        ))
        .next()
        .map(element_text)
        .unwrap_or_default()
}
