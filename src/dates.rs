//! Free-form date/time parsing for meeting announcements.
//!
//! The upcoming-meetings page prints dates the way a person would type
//! them: `"Tuesday, March 10, 2020 at 10:00 a.m."`, `"April 14th 1:30pm"`,
//! `"3/10/2020 11 am"`. [`parse_datetime`] accepts these by classifying
//! every whitespace-separated token. It is strict in one important way: a
//! token it cannot classify rejects the whole string. Notices such as
//! `"No State Panel meeting in April"` therefore come back as `None`, which
//! callers treat as "no meeting this month".

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a human-written date and optional time.
///
/// Missing year falls back to `default_date`'s year; missing time is
/// midnight. Month and day are required.
pub fn parse_datetime(text: &str, default_date: NaiveDate) -> Option<NaiveDateTime> {
    let normalized = normalize(text);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let mut parts = Parts::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let next = tokens.get(i + 1).copied();
        parts.accept(token, next)?;
        i += 1;
    }
    parts.finish(default_date)
}

/// Map a two-digit year onto a century: `00..=68` is 20xx, `69..=99` is 19xx.
pub fn expand_two_digit_year(yy: u32) -> i32 {
    if yy < 69 {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

fn normalize(text: &str) -> String {
    let lowered = text.replace('\u{a0}', " ").to_lowercase();
    let dotted = regex!(r"(^|[\d\s])([ap])\.\s?m\.?").replace_all(&lowered, "${1} ${2}m");
    let split = regex!(r"(\d)(am|pm)\b").replace_all(&dotted, "${1} ${2}");
    split
        .replace([',', ';'], " ")
        .split_whitespace()
        .map(|t| t.trim_end_matches('.'))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default)]
struct Parts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    time: Option<(u32, u32, u32)>,
    pm: Option<bool>,
}

/// Store `value` in an empty slot; a second assignment means the string is
/// ambiguous and is rejected.
fn set<T>(slot: &mut Option<T>, value: T) -> Option<()> {
    if slot.is_some() {
        return None;
    }
    *slot = Some(value);
    Some(())
}

impl Parts {
    fn accept(&mut self, token: &str, next: Option<&str>) -> Option<()> {
        if SKIP_WORDS.contains(&token) || weekday(token) {
            return Some(());
        }
        if let Some(m) = month(token) {
            return set(&mut self.month, m);
        }
        match token {
            "am" => return set(&mut self.pm, false),
            "pm" => return set(&mut self.pm, true),
            "noon" if self.time == Some((12, 0, 0)) => return Some(()),
            "noon" => return set(&mut self.time, (12, 0, 0)),
            "midnight" => return set(&mut self.time, (0, 0, 0)),
            _ => {}
        }
        if let Some(c) = regex!(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").captures(token) {
            let h = c[1].parse().ok()?;
            let m = c[2].parse().ok()?;
            let s = c.get(3).map_or(Some(0), |s| s.as_str().parse().ok())?;
            return set(&mut self.time, (h, m, s));
        }
        if let Some(c) = regex!(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").captures(token) {
            set(&mut self.month, c[1].parse().ok()?)?;
            set(&mut self.day, c[2].parse().ok()?)?;
            let year = if c[3].len() == 2 {
                expand_two_digit_year(c[3].parse().ok()?)
            } else {
                c[3].parse().ok()?
            };
            return set(&mut self.year, year);
        }
        if let Some(c) = regex!(r"^(\d{1,2})(?:st|nd|rd|th)$").captures(token) {
            return set(&mut self.day, c[1].parse().ok()?);
        }
        if regex!(r"^\d{4}$").is_match(token) {
            return set(&mut self.year, token.parse().ok()?);
        }
        if regex!(r"^\d{1,2}$").is_match(token) {
            let n: u32 = token.parse().ok()?;
            if matches!(next, Some("am") | Some("pm") | Some("noon")) {
                return set(&mut self.time, (n, 0, 0));
            }
            return set(&mut self.day, n);
        }
        None
    }

    fn finish(self, default_date: NaiveDate) -> Option<NaiveDateTime> {
        let month = self.month?;
        let day = self.day?;
        let year = self.year.unwrap_or_else(|| default_date.year());
        let (mut hour, minute, second) = match (self.time, self.pm) {
            (Some(t), _) => t,
            (None, None) => (0, 0, 0),
            (None, Some(_)) => return None,
        };
        match self.pm {
            Some(_) if hour > 12 => return None,
            Some(true) if hour < 12 => hour += 12,
            Some(false) if hour == 12 => hour = 0,
            _ => {}
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Some(date.and_time(time))
    }
}

const SKIP_WORDS: &[&str] = &["at", "on", "of", "the", "and", "-", "–", "@"];

fn weekday(token: &str) -> bool {
    matches!(
        token,
        "monday" | "mon"
            | "tuesday" | "tue" | "tues"
            | "wednesday" | "wed"
            | "thursday" | "thu" | "thur" | "thurs"
            | "friday" | "fri"
            | "saturday" | "sat"
            | "sunday" | "sun"
    )
}

fn month(token: &str) -> Option<u32> {
    let m = match token {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(m)
}
