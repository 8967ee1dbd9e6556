use anyhow::Result;
use chrono::{DateTime, Utc};

use lingo_lib::flashcards::MemoryState;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    state: &MemoryState,
    now: DateTime<Utc>,
    format: &OutputFormat,
) -> Result<()> {
    let r = app.scheduler.retrievability(state, now);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "retrievability": r,
                "state": state.state,
                "isDue": state.is_due(now),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let due = if state.is_due(now) { " [due]" } else { "" };
            println!("{:.1}% ({}){}", r * 100.0, state.state, due);
        }
    }

    Ok(())
}
