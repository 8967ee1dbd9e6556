use anyhow::Result;
use chrono::{DateTime, Utc};

use lingo_lib::flashcards::algorithm::format_interval;
use lingo_lib::flashcards::MemoryState;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    state: &MemoryState,
    now: DateTime<Utc>,
    format: &OutputFormat,
) -> Result<()> {
    let preview = app.scheduler.preview(state, now);

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = preview
                .iter()
                .map(|(rating, item)| {
                    serde_json::json!({
                        "rating": rating.value(),
                        "state": item.card.state,
                        "due": item.card.due.to_rfc3339(),
                        "interval": format_interval(item.card.due - now),
                        "stability": item.card.stability,
                        "difficulty": item.card.difficulty,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{:<6} {:<11} {:<8} {:>10} {:>10}",
                "Rating", "State", "Interval", "Stability", "Difficulty"
            );
            for (rating, item) in preview.iter() {
                println!(
                    "{:<6} {:<11} {:<8} {:>10.2} {:>10.2}",
                    rating.to_string(),
                    item.card.state.to_string(),
                    format_interval(item.card.due - now),
                    item.card.stability,
                    item.card.difficulty
                );
            }
        }
    }

    Ok(())
}
