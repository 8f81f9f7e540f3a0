//! Minutes archive page parser.
//!
//! The state, local and joint minutes pages are flat lists of links whose
//! text carries everything we know about the meeting:
//!
//! ```text
//! <div class="link-item"><a href="/ilrb/minutes/030520.pdf">03-05-2020 State Meeting (PDF)</a></div>
//! ```
//!
//! All archived meetings took place at headquarters; the board meets at a
//! fixed time of day per panel, which is filled in from the board name.

use super::{Page, ParseContext, ScrapeError, ScrapeOutput};
use crate::dates::expand_two_digit_year;
use crate::models::{Link, Location};
use crate::normalize::MeetingDraft;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, instrument};

/// Parse every minutes link on an archive page.
#[instrument(level = "info", skip_all, fields(url = %page.url))]
pub fn parse(page: &Page, ctx: ParseContext<'_>) -> Result<ScrapeOutput, ScrapeError> {
    let mut meetings = Vec::new();

    for link in page.document.select(selector!(".link-item a")) {
        let text = link.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            return Err(ScrapeError::MissingLinkText);
        }

        let date_token = text.split(' ').next().unwrap_or_default();
        let date = parse_archive_date(date_token)?;
        let category =
            extract_category(text).ok_or_else(|| ScrapeError::MissingCategory(text.to_string()))?;
        let start = match default_time_for(category) {
            Some(time) => date.and_time(time),
            None => date.and_time(NaiveTime::MIN),
        };
        let href = link
            .value()
            .attr("href")
            .ok_or_else(|| ScrapeError::MissingHref(text.to_string()))?;

        let meeting = MeetingDraft {
            title: format!("{category} Meeting"),
            description: String::new(),
            start,
            location: Location {
                name: String::new(),
                address: ctx.config.headquarters_address.clone(),
            },
            // Kept exactly as published; the site serves these relative to its root.
            links: vec![Link {
                href: href.to_string(),
                title: "Minutes".to_string(),
            }],
            source: page.url.to_string(),
        }
        .finish(ctx.config, ctx.now);
        debug!(id = %meeting.id, "Parsed archived meeting");
        meetings.push(meeting);
    }

    info!(meetings = meetings.len(), "Parsed minutes archive page");
    Ok(ScrapeOutput {
        meetings,
        requests: Vec::new(),
    })
}

fn four_digit_year(token: &str) -> Option<NaiveDate> {
    let c = regex!(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").captures(token)?;
    NaiveDate::from_ymd_opt(c[3].parse().ok()?, c[1].parse().ok()?, c[2].parse().ok()?)
}

fn two_digit_year(token: &str) -> Option<NaiveDate> {
    let c = regex!(r"^(\d{1,2})-(\d{1,2})-(\d{2})$").captures(token)?;
    let year = expand_two_digit_year(c[3].parse().ok()?);
    NaiveDate::from_ymd_opt(year, c[1].parse().ok()?, c[2].parse().ok()?)
}

/// Parse the leading `m-d-yyyy` (or `m-d-yy`) token of a minutes link.
///
/// The four-digit form is tried first, so `3-5-2020` never reads as year 20.
///
/// # Arguments
///
/// * `token` - First whitespace-separated word of the link text
///
/// # Returns
///
/// The date, or [`ScrapeError::BadArchiveDate`] when neither form matches.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_archive_date("3-5-20")?, NaiveDate::from_ymd_opt(2020, 3, 5).unwrap());
/// ```
pub fn parse_archive_date(token: &str) -> Result<NaiveDate, ScrapeError> {
    let formats: [fn(&str) -> Option<NaiveDate>; 2] = [four_digit_year, two_digit_year];
    formats
        .iter()
        .find_map(|format| format(token))
        .ok_or_else(|| ScrapeError::BadArchiveDate(token.to_string()))
}

/// Board name sitting between the date and the word "Meeting".
///
/// Matches the longest run of letters and spaces that directly follows a
/// digit and a space and is itself followed by a space and an `M` (any
/// case). This is positional and tied to the phrasing
/// `"<date> <board name> Meeting ..."`; if the site changes that wording,
/// this returns `None` and the page fails.
///
/// | Link text | Category |
/// |-----------|----------|
/// | `03-05-2020 State Meeting` | `State` |
/// | `03-05-2020 State Panel Meeting (PDF)` | `State Panel` |
/// | `3-5-20 Local Meeting` | `Local` |
/// | `03-05-2020 Joint Meeting Minutes` | `Joint Meeting` |
/// | `03-05-2020 Minutes` | none |
pub fn extract_category(text: &str) -> Option<&str> {
    regex!(r"(?i)\d\s([a-z ]+)\sM")
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Meeting time of day for a board, by case-insensitive substring.
///
/// Checked in order, first match wins: state 11:00, joint 09:30,
/// local 10:00. `None` keeps midnight.
pub fn default_time_for(category: &str) -> Option<NaiveTime> {
    let category = category.to_lowercase();
    [("state", (11, 0)), ("joint", (9, 30)), ("local", (10, 0))]
        .into_iter()
        .find(|(needle, _)| category.contains(needle))
        .and_then(|(_, (h, m))| NaiveTime::from_hms_opt(h, m, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::models::MeetingStatus;
    use crate::scrapers::Page;
    use chrono::NaiveDateTime;
    use url::Url;

    const STATE_URL: &str =
        "https://www2.illinois.gov/ilrb/meetings/stateminutes/Pages/default.aspx";

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn parse_fixture(html: &str) -> Result<ScrapeOutput, ScrapeError> {
        let page = Page::parse(Url::parse(STATE_URL).unwrap(), html);
        let config = CrawlConfig::default();
        parse(
            &page,
            ParseContext {
                config: &config,
                now: at(2021, 1, 1, 0, 0),
            },
        )
    }

    fn link_list(texts: &[(&str, &str)]) -> String {
        let items: String = texts
            .iter()
            .map(|(href, text)| format!(r#"<div class="link-item"><a href="{href}">{text}</a></div>"#))
            .collect();
        format!("<html><body><div class=\"links\">{items}</div></body></html>")
    }

    #[test]
    fn test_state_meeting() {
        let html = link_list(&[("/ilrb/minutes/030520.pdf", "03-05-2020 State Meeting (PDF)")]);
        let output = parse_fixture(&html).unwrap();
        assert_eq!(output.meetings.len(), 1);
        let m = &output.meetings[0];
        assert_eq!(m.title, "State Meeting");
        assert_eq!(m.start, at(2020, 3, 5, 11, 0));
        assert_eq!(m.description, "");
        assert_eq!(m.location.address, "160 N LaSalle St Chicago, IL 60601");
        assert_eq!(m.location.name, "");
        assert_eq!(m.source, STATE_URL);
        assert_eq!(m.status, MeetingStatus::Passed);
        assert!(output.requests.is_empty());
    }

    #[test]
    fn test_minutes_href_is_not_resolved() {
        let html = link_list(&[("../minutes/030520.pdf", "03-05-2020 State Meeting")]);
        let output = parse_fixture(&html).unwrap();
        assert_eq!(
            output.meetings[0].links,
            vec![Link {
                href: "../minutes/030520.pdf".to_string(),
                title: "Minutes".to_string(),
            }]
        );
    }

    #[test]
    fn test_joint_and_two_digit_local() {
        let html = link_list(&[
            ("/j.pdf", "03-05-2020 Joint Meeting (PDF)"),
            ("/l.pdf", "03-05-20 Local Meeting (PDF)"),
        ]);
        let output = parse_fixture(&html).unwrap();
        assert_eq!(output.meetings[0].title, "Joint Meeting");
        assert_eq!(output.meetings[0].start, at(2020, 3, 5, 9, 30));
        assert_eq!(output.meetings[1].title, "Local Meeting");
        assert_eq!(output.meetings[1].start, at(2020, 3, 5, 10, 0));
    }

    #[test]
    fn test_unknown_board_keeps_midnight() {
        let html = link_list(&[("/s.pdf", "11-12-2019 Special Meeting")]);
        let output = parse_fixture(&html).unwrap();
        assert_eq!(output.meetings[0].title, "Special Meeting");
        assert_eq!(output.meetings[0].start, at(2019, 11, 12, 0, 0));
    }

    #[test]
    fn test_bad_date_fails_page() {
        let html = link_list(&[
            ("/ok.pdf", "03-05-2020 State Meeting"),
            ("/bad.pdf", "March 5 State Meeting"),
        ]);
        assert_eq!(
            parse_fixture(&html).unwrap_err(),
            ScrapeError::BadArchiveDate("March".to_string())
        );
    }

    #[test]
    fn test_missing_href_fails_page() {
        let html = "<div class=\"link-item\"><a>03-05-2020 State Meeting</a></div>";
        assert!(matches!(
            parse_fixture(html).unwrap_err(),
            ScrapeError::MissingHref(_)
        ));
    }

    #[test]
    fn test_parse_archive_date() {
        assert_eq!(
            parse_archive_date("03-05-2020").unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 5).unwrap()
        );
        assert_eq!(
            parse_archive_date("3-5-20").unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 5).unwrap()
        );
        assert_eq!(
            parse_archive_date("12-31-99").unwrap(),
            NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()
        );
        assert!(parse_archive_date("13-05-2020").is_err());
        assert!(parse_archive_date("03-05-020").is_err());
        assert!(parse_archive_date("").is_err());
    }

    #[test]
    fn test_extract_category_table() {
        let cases = [
            ("03-05-2020 State Meeting", Some("State")),
            ("03-05-2020 State Panel Meeting (PDF)", Some("State Panel")),
            ("3-5-20 Local Meeting", Some("Local")),
            ("03-05-2020 Joint Meeting Minutes", Some("Joint Meeting")),
            ("03-05-2020 local meeting", Some("local")),
            ("03-05-2020 Minutes", None),
            ("State Meeting", None),
        ];
        for (text, expected) in cases {
            assert_eq!(extract_category(text), expected, "{text}");
        }
    }

    #[test]
    fn test_default_time_order() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0);
        assert_eq!(default_time_for("State"), t(11, 0));
        assert_eq!(default_time_for("JOINT"), t(9, 30));
        assert_eq!(default_time_for("Local Panel"), t(10, 0));
        assert_eq!(default_time_for("State and Local"), t(11, 0));
        assert_eq!(default_time_for("Local Joint"), t(9, 30));
        assert_eq!(default_time_for("Special"), None);
    }
}
