use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use lingo_lib::flashcards::{MemoryState, Scheduler, SchedulerParameters};

/// Shared state for CLI commands
pub struct App {
    pub scheduler: Scheduler,
}

impl App {
    /// Build the scheduler from a parameters file, or the defaults
    pub fn new(config: Option<&Path>) -> Result<Self> {
        let params = match config {
            Some(path) => SchedulerParameters::load(path)
                .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
            None => SchedulerParameters::default(),
        };
        let scheduler = Scheduler::new(params).context("Invalid scheduler parameters")?;
        Ok(Self { scheduler })
    }
}

/// Read a card from a JSON file, or stdin for "-"
pub fn read_card(source: &str) -> Result<MemoryState> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read card from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read card file {}", source))?
    };

    serde_json::from_str(&content).context("Card is not a valid memory state")
}

/// Parse an RFC 3339 timestamp, defaulting to the current time
pub fn parse_time(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .with_context(|| format!("Invalid timestamp '{}' (expected RFC 3339)", text)),
        None => Ok(Utc::now()),
    }
}
