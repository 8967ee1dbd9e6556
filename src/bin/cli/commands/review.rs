use anyhow::Result;
use chrono::{DateTime, Utc};

use lingo_lib::flashcards::algorithm::format_interval;
use lingo_lib::flashcards::{MemoryState, Rating};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    state: &MemoryState,
    rating: Rating,
    now: DateTime<Utc>,
    with_log: bool,
    format: &OutputFormat,
) -> Result<()> {
    let item = app.scheduler.review_with_log(state, rating, now);

    match format {
        OutputFormat::Json => {
            if with_log {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&item.card)?);
            }
        }
        OutputFormat::Plain => {
            let card = &item.card;
            println!("{} -> {} ({})", state.state, card.state, rating);
            println!(
                "  Due:        {} (in {})",
                card.due.to_rfc3339(),
                format_interval(card.due - now)
            );
            println!("  Stability:  {:.2}", card.stability);
            println!("  Difficulty: {:.2}", card.difficulty);
            println!("  Reps:       {}  Lapses: {}", card.reps, card.lapses);
            if with_log {
                println!("  Log:        {}", serde_json::to_string(&item.log)?);
            }
        }
    }

    Ok(())
}
