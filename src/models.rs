//! Data models for scraped meetings.
//!
//! This module defines the normalized record handed to the item sink:
//! - [`Meeting`]: one public meeting of a board, fully populated
//! - [`Location`]: venue name and street address
//! - [`Link`]: an agenda or minutes document attached to a meeting
//! - [`Classification`] and [`MeetingStatus`]: the fixed vocabularies shared
//!   with downstream consumers
//!
//! Field names serialize in snake_case to match the city-scrapers meeting
//! schema, so the JSON Lines output can be loaded by the same tooling.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The kind of body holding the meeting.
///
/// Every record from the labor relations board is a governing-board meeting,
/// but the tag is kept as an enum so the serialized vocabulary stays explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Board,
}

/// Lifecycle status of a meeting relative to the time it was scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// The page text says the meeting was cancelled, postponed or rescheduled.
    Cancelled,
    /// Scheduled in the future and not (yet) confirmed by an agenda.
    Tentative,
    /// Already took place.
    Passed,
}

/// Where a meeting is held.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Location {
    /// Venue name; usually empty for this source.
    pub name: String,
    /// Street address as printed on the page.
    pub address: String,
}

/// A document attached to a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    pub href: String,
    pub title: String,
}

/// A normalized public meeting record.
///
/// Records are built once per page pass by the scrapers, stamped with an
/// [`id`](Meeting::id) and [`status`](Meeting::status) by
/// [`crate::normalize`], and never mutated afterwards.
///
/// `start` is a naive wall-clock time in the agency's timezone (see
/// [`crate::config::CrawlConfig::timezone`]); no conversion happens here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Meeting {
    /// Stable identifier derived from title, start and source.
    pub id: String,
    /// Title-cased meeting name.
    pub title: String,
    /// Free text; empty for archive records.
    pub description: String,
    pub classification: Classification,
    pub start: NaiveDateTime,
    /// The source never publishes an end time.
    pub end: Option<NaiveDateTime>,
    /// Always empty for this source.
    pub time_notes: String,
    pub all_day: bool,
    pub location: Location,
    pub links: Vec<Link>,
    /// URL of the page the record was extracted from.
    pub source: String,
    pub status: MeetingStatus,
}
