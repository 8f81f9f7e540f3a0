//! Crawl configuration.
//!
//! A [`CrawlConfig`] is built once at startup (defaults, optionally
//! overridden by a YAML file and CLI flags) and then passed by reference to
//! every parser and to the crawler. Nothing reads configuration from ambient
//! state.

use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Immutable settings for one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Short spider name; the first segment of every meeting id.
    pub name: String,
    /// Human-readable agency name, used in logs.
    pub agency: String,
    /// The upcoming-meetings page the crawl starts from.
    pub start_url: String,
    /// Hosts the crawler is allowed to fetch from.
    pub allowed_domains: Vec<String>,
    /// IANA timezone the naive meeting times are expressed in.
    pub timezone: String,
    /// State, local and joint minutes archives, fetched after the start page.
    pub archive_urls: Vec<String>,
    /// Address every archived meeting is attributed to.
    pub headquarters_address: String,
    /// User-Agent header for outgoing requests.
    pub user_agent: String,
    /// Maximum number of retries per fetch.
    pub max_retries: usize,
    /// Initial backoff between retries, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Upper bound of the random jitter added to each backoff, in milliseconds.
    pub retry_max_jitter_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            name: "il_labor".to_string(),
            agency: "Illinois Labor Relations Board".to_string(),
            start_url: "https://www2.illinois.gov/ilrb/meetings/Pages/default.aspx".to_string(),
            allowed_domains: vec!["www2.illinois.gov".to_string()],
            timezone: "America/Chicago".to_string(),
            archive_urls: vec![
                "https://www2.illinois.gov/ilrb/meetings/stateminutes/Pages/default.aspx"
                    .to_string(),
                "https://www2.illinois.gov/ilrb/meetings/localminutes/Pages/default.aspx"
                    .to_string(),
                "https://www2.illinois.gov/ilrb/meetings/jointminutes/Pages/default.aspx"
                    .to_string(),
            ],
            headquarters_address: "160 N LaSalle St Chicago, IL 60601".to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
            max_retries: 3,
            retry_base_delay_ms: 1000,
            retry_max_jitter_ms: 250,
        }
    }
}

impl CrawlConfig {
    /// Parse a YAML document; missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_jitter(&self) -> Duration {
        Duration::from_millis(self.retry_max_jitter_ms)
    }

    /// Whether `host` is one of the allowed crawl domains.
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|d| host.eq_ignore_ascii_case(d))
    }
}

/// Load a config file from disk.
#[instrument(level = "info")]
pub async fn load_config(path: &str) -> Result<CrawlConfig, Box<dyn Error>> {
    let yaml = tokio::fs::read_to_string(path).await?;
    let config = CrawlConfig::from_yaml(&yaml)?;
    info!(name = %config.name, start_url = %config.start_url, "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_source() {
        let config = CrawlConfig::default();
        assert_eq!(config.name, "il_labor");
        assert_eq!(config.timezone, "America/Chicago");
        assert_eq!(config.archive_urls.len(), 3);
        assert!(config.archive_urls[0].contains("stateminutes"));
        assert!(config.archive_urls[1].contains("localminutes"));
        assert!(config.archive_urls[2].contains("jointminutes"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CrawlConfig::from_yaml(
            "start_url: http://localhost:8080/meetings/Pages/default.aspx\nmax_retries: 0\n",
        )
        .unwrap();
        assert_eq!(
            config.start_url,
            "http://localhost:8080/meetings/Pages/default.aspx"
        );
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.name, "il_labor");
        assert_eq!(config.headquarters_address, "160 N LaSalle St Chicago, IL 60601");
    }

    #[test]
    fn test_allows_host() {
        let config = CrawlConfig::default();
        assert!(config.allows_host("www2.illinois.gov"));
        assert!(config.allows_host("WWW2.Illinois.gov"));
        assert!(!config.allows_host("example.com"));
    }
}
