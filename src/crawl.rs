//! Page fetching and crawl sequencing.
//!
//! The crawl starts at the upcoming-meetings page, whose parser emits the
//! three minutes archives as follow-up requests. Pages are processed one at
//! a time from a FIFO queue; each page is an independent unit of work.
//!
//! # Architecture
//!
//! - [`Fetcher`]: turns a URL into an HTML body
//! - [`HttpFetcher`]: the `reqwest` implementation
//! - [`RetryFetch`]: decorator adding exponential backoff to any fetcher
//! - [`crawl`]: drives the queue, dispatches pages to their parser and hands
//!   each meeting to a [`MeetingSink`]
//!
//! # Retry Strategy
//!
//! - `max_retries` attempts after the first (from the config)
//! - Exponential backoff starting at `retry_base_delay_ms`
//! - Maximum delay capped at 30 seconds
//! - Random jitter (default 0-250ms) added to each delay

use crate::config::CrawlConfig;
use crate::outputs::json::MeetingSink;
use crate::scrapers::{Callback, Page, ParseContext, Request, parse_page};
use chrono::NaiveDateTime;
use rand::{Rng, rng};
use std::collections::{HashSet, VecDeque};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Something that can fetch a page body.
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<String, Box<dyn Error>>;
}

/// Plain HTTP fetcher; non-2xx responses are errors.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Fetcher`].
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..max_jitter)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
    max_jitter: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: Fetcher,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=self.max_jitter.as_millis() as u64);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Fetcher for RetryFetch<T>
where
    T: Fetcher,
{
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis(),
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Outcome of one crawl run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched and parsed successfully.
    pub pages_ok: usize,
    /// Pages whose fetch or parse failed.
    pub pages_failed: usize,
    /// Requests dropped because their host is not allowed.
    pub pages_skipped: usize,
    /// Meetings handed to the sink.
    pub meetings: usize,
}

/// Run a full crawl from `config.start_url`.
///
/// A page that fails to fetch or parse is logged and contributes nothing;
/// the remaining queue still runs. Sink errors abort the crawl.
#[instrument(level = "info", skip_all, fields(agency = %config.agency))]
pub async fn crawl<F, S>(
    fetcher: &F,
    config: &CrawlConfig,
    now: NaiveDateTime,
    sink: &mut S,
) -> Result<CrawlReport, Box<dyn Error>>
where
    F: Fetcher,
    S: MeetingSink,
{
    let ctx = ParseContext { config, now };
    let mut report = CrawlReport::default();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([Request {
        url: config.start_url.clone(),
        callback: Callback::Upcoming,
    }]);

    while let Some(request) = queue.pop_front() {
        if !seen.insert(request.url.clone()) {
            continue;
        }
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                error!(url = %request.url, error = %e, "Invalid request URL");
                report.pages_failed += 1;
                continue;
            }
        };
        if !url.host_str().is_some_and(|host| config.allows_host(host)) {
            warn!(%url, "Host not in allowed domains; skipping");
            report.pages_skipped += 1;
            continue;
        }

        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                error!(%url, error = %e, "Fetch failed");
                report.pages_failed += 1;
                continue;
            }
        };

        let page = Page::parse(url, &body);
        match parse_page(request.callback, &page, ctx) {
            Ok(output) => {
                report.pages_ok += 1;
                for meeting in output.meetings {
                    sink.accept(meeting)?;
                    report.meetings += 1;
                }
                queue.extend(output.requests);
            }
            Err(e) => {
                error!(url = %page.url, callback = ?request.callback, error = %e, "Page layout not recognised");
                report.pages_failed += 1;
            }
        }
    }

    info!(
        pages_ok = report.pages_ok,
        pages_failed = report.pages_failed,
        pages_skipped = report.pages_skipped,
        meetings = report.meetings,
        "Crawl complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::json::JsonLinesSink;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    const UPCOMING: &str = r#"<html><body>
<div class="soi-article-content"><div class="container"><div class="row">
  <p><a href="agendas/state.pdf">State Panel</a> <strong>Meeting</strong> <strong>March 10, 2020 at 11:00 a.m.</strong></p>
  <div><p>160 N. LaSalle Street, Chicago, IL 60601</p></div>
</div></div></div>
</body></html>"#;

    const STATE_ARCHIVE: &str = r#"<html><body>
<div class="link-item"><a href="/minutes/a.pdf">02-11-2020 State Meeting (PDF)</a></div>
<div class="link-item"><a href="/minutes/b.pdf">01-14-20 State Meeting (PDF)</a></div>
</body></html>"#;

    const BROKEN_ARCHIVE: &str = r#"<html><body>
<div class="link-item"><a href="/minutes/c.pdf">Local minutes, February</a></div>
</body></html>"#;

    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, Box<dyn Error>> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| format!("404 for {url}").into())
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_crawl_follows_archives_and_isolates_failures() {
        let config = CrawlConfig::default();
        let fetcher = FakeFetcher::default()
            .with(&config.start_url, UPCOMING)
            .with(&config.archive_urls[0], STATE_ARCHIVE)
            .with(&config.archive_urls[1], BROKEN_ARCHIVE);
        let mut sink = JsonLinesSink::default();

        let report = crawl(&fetcher, &config, now(), &mut sink).await.unwrap();

        assert_eq!(
            report,
            CrawlReport {
                pages_ok: 2,
                pages_failed: 2,
                pages_skipped: 0,
                meetings: 3,
            }
        );
        let requested = fetcher.requested.borrow();
        assert_eq!(requested[0], config.start_url);
        assert_eq!(requested.len(), 4);

        let titles: Vec<&str> = sink.meetings().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["State Panel", "State Meeting", "State Meeting"]);
        assert_eq!(
            sink.meetings()[0].links[0].href,
            "https://www2.illinois.gov/ilrb/meetings/Pages/agendas/state.pdf"
        );
    }

    #[tokio::test]
    async fn test_crawl_skips_disallowed_hosts_and_duplicates() {
        let config = CrawlConfig {
            archive_urls: vec![
                "https://evil.example.com/minutes".to_string(),
                "https://www2.illinois.gov/ilrb/meetings/stateminutes/Pages/default.aspx"
                    .to_string(),
                "https://www2.illinois.gov/ilrb/meetings/stateminutes/Pages/default.aspx"
                    .to_string(),
            ],
            ..CrawlConfig::default()
        };
        let fetcher = FakeFetcher::default()
            .with(&config.start_url, UPCOMING)
            .with(&config.archive_urls[1], STATE_ARCHIVE);
        let mut sink = JsonLinesSink::default();

        let report = crawl(&fetcher, &config, now(), &mut sink).await.unwrap();

        assert_eq!(report.pages_skipped, 1);
        assert_eq!(report.pages_ok, 2);
        assert_eq!(report.pages_failed, 0);
        assert_eq!(fetcher.requested.borrow().len(), 2);
    }

    struct Flaky {
        failures_left: Cell<usize>,
        calls: Cell<usize>,
    }

    impl Fetcher for Flaky {
        async fn fetch(&self, _url: &Url) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err("connection reset".into());
            }
            Ok("<html></html>".to_string())
        }
    }

    #[tokio::test]
    async fn test_retry_fetch_recovers() {
        let flaky = Flaky {
            failures_left: Cell::new(2),
            calls: Cell::new(0),
        };
        let retry = RetryFetch::new(flaky, 3, StdDuration::from_millis(1))
            .with_max_jitter(StdDuration::ZERO);
        let url = Url::parse("https://www2.illinois.gov/").unwrap();
        assert_eq!(retry.fetch(&url).await.unwrap(), "<html></html>");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_fetch_gives_up() {
        let flaky = Flaky {
            failures_left: Cell::new(10),
            calls: Cell::new(0),
        };
        let retry = RetryFetch::new(flaky, 2, StdDuration::from_millis(1))
            .with_max_jitter(StdDuration::ZERO);
        let url = Url::parse("https://www2.illinois.gov/").unwrap();
        assert!(retry.fetch(&url).await.is_err());
        assert_eq!(retry.inner.calls.get(), 3);
    }
}
