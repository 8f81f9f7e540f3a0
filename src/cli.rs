//! Command-line interface definitions.
//!
//! All arguments can be provided via command-line flags or environment
//! variables.

use clap::Parser;

/// Scrape Illinois Labor Relations Board meetings into JSON Lines.
///
/// # Examples
///
/// ```sh
/// # Print meetings to stdout
/// il_labor_meetings
///
/// # Write to a file with a custom config
/// il_labor_meetings -o ./out/il_labor.jsonl -c ./il_labor.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output file for JSON Lines; stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "IL_LABOR_CONFIG")]
    pub config: Option<String>,

    /// Override the upcoming-meetings start URL
    #[arg(long, env = "IL_LABOR_START_URL")]
    pub start_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["il_labor_meetings"]);
        assert_eq!(cli.output, None);
        assert_eq!(cli.start_url, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "il_labor_meetings",
            "-o",
            "/tmp/il_labor.jsonl",
            "-c",
            "/tmp/il_labor.yaml",
        ]);

        assert_eq!(cli.output.as_deref(), Some("/tmp/il_labor.jsonl"));
        assert_eq!(cli.config.as_deref(), Some("/tmp/il_labor.yaml"));
    }

    #[test]
    fn test_cli_start_url() {
        let cli = Cli::parse_from([
            "il_labor_meetings",
            "--start-url",
            "http://localhost:8000/meetings/Pages/default.aspx",
        ]);
        assert_eq!(
            cli.start_url.as_deref(),
            Some("http://localhost:8000/meetings/Pages/default.aspx")
        );
    }
}
