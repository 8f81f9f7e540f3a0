//! Record normalization shared by both page parsers.
//!
//! Parsers assemble a [`MeetingDraft`] with everything the page provides;
//! [`MeetingDraft::finish`] stamps the derived fields (`id`, `status` and
//! the constant ones) and returns the final [`Meeting`].

use crate::config::CrawlConfig;
use crate::models::{Classification, Link, Location, Meeting, MeetingStatus};
use crate::utils::slugify;
use chrono::NaiveDateTime;
use url::Url;

/// The page-derived fields of a meeting, before normalization.
#[derive(Debug, Clone)]
pub struct MeetingDraft {
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub location: Location,
    pub links: Vec<Link>,
    pub source: String,
}

impl MeetingDraft {
    /// Produce the final record, classifying status against `now`.
    pub fn finish(self, config: &CrawlConfig, now: NaiveDateTime) -> Meeting {
        let id = meeting_id(&config.name, &self.title, &self.start, &self.source);
        let status = meeting_status(&self.title, &self.description, &self.start, now);
        Meeting {
            id,
            title: self.title,
            description: self.description,
            classification: Classification::Board,
            start: self.start,
            end: None,
            time_notes: String::new(),
            all_day: false,
            location: self.location,
            links: self.links,
            source: self.source,
            status,
        }
    }
}

/// Stable identifier: `{spider}/{YYYYMMDDHHMM}/{source_key}/{title_slug}`.
///
/// A pure function of its inputs, so re-crawling unchanged pages reproduces
/// the same ids and the sink can upsert on them.
///
/// # Arguments
///
/// * `spider` - Spider name from config
/// * `title` - Final meeting title, slugified into the last segment
/// * `start` - Start, formatted to the minute
/// * `source` - Page URL; the path segment before `Pages` becomes the source key, `x` if absent
///
/// # Examples
///
/// ```ignore
/// let id = meeting_id("il_labor", "State Panel", &start, "https://www2.illinois.gov/ilrb/meetings/Pages/default.aspx");
/// assert_eq!(id, "il_labor/202003101100/meetings/state_panel");
/// ```
pub fn meeting_id(spider: &str, title: &str, start: &NaiveDateTime, source: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        spider,
        start.format("%Y%m%d%H%M"),
        source_key(source),
        slugify(title)
    )
}

/// Short tag for the page a record came from: the path segment preceding
/// SharePoint's `Pages` folder (`meetings`, `stateminutes`, ...), or `x`.
fn source_key(source: &str) -> String {
    let Ok(url) = Url::parse(source) else {
        return "x".to_string();
    };
    let Some(segments) = url.path_segments() else {
        return "x".to_string();
    };
    let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
    segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("pages"))
        .and_then(|i| i.checked_sub(1))
        .map(|i| slugify(segments[i]))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "x".to_string())
}

/// Classify a meeting relative to `now`.
///
/// Text mentioning a cancellation wins; otherwise past starts are
/// [`MeetingStatus::Passed`] and future ones [`MeetingStatus::Tentative`].
pub fn meeting_status(
    title: &str,
    description: &str,
    start: &NaiveDateTime,
    now: NaiveDateTime,
) -> MeetingStatus {
    let text = format!("{title} {description}").to_lowercase();
    if ["cancel", "rescheduled", "postpone"]
        .iter()
        .any(|w| text.contains(w))
    {
        MeetingStatus::Cancelled
    } else if *start < now {
        MeetingStatus::Passed
    } else {
        MeetingStatus::Tentative
    }
}
