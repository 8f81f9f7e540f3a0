//! JSON Lines output for scraped meetings.
//!
//! The sink keeps the first meeting seen for each `id` and serializes one
//! JSON object per line, in crawl order:
//!
//! ```text
//! {"id":"il_labor/202003101100/meetings/state_panel","title":"State Panel",...}
//! {"id":"il_labor/202002111100/stateminutes/state_meeting","title":"State Meeting",...}
//! ```

use crate::models::Meeting;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument};

/// Receives meetings one at a time as the crawl produces them.
pub trait MeetingSink {
    /// Returns `false` when a meeting with the same id was already accepted.
    fn accept(&mut self, meeting: Meeting) -> Result<bool, Box<dyn Error>>;
}

/// Collects meetings, deduplicating by id.
#[derive(Debug, Default)]
pub struct JsonLinesSink {
    seen: HashSet<String>,
    meetings: Vec<Meeting>,
}

impl JsonLinesSink {
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    /// Serialize accepted meetings, one JSON object per line.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for meeting in &self.meetings {
            out.push_str(&serde_json::to_string(meeting)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl MeetingSink for JsonLinesSink {
    fn accept(&mut self, meeting: Meeting) -> Result<bool, Box<dyn Error>> {
        if !self.seen.insert(meeting.id.clone()) {
            debug!(id = %meeting.id, "Duplicate meeting id; keeping first");
            return Ok(false);
        }
        self.meetings.push(meeting);
        Ok(true)
    }
}

/// Write the sink's contents to `output`, or to stdout when `None`.
///
/// Parent directories of `output` are created as needed.
#[instrument(level = "info", skip_all, fields(output = ?output))]
pub async fn write_meetings(sink: &JsonLinesSink, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let lines = sink.to_json_lines()?;

    let Some(path) = output else {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(lines.as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    };

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(parent = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }
    fs::write(path, lines).await?;
    info!(path, count = sink.meetings().len(), "Wrote meetings");
    Ok(())
}
