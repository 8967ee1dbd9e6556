use anyhow::Result;
use chrono::{DateTime, Utc};

use lingo_lib::flashcards::algorithm::format_interval;
use lingo_lib::flashcards::Rating;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    rating: Rating,
    reviews: usize,
    start: DateTime<Utc>,
    format: &OutputFormat,
) -> Result<()> {
    let scheduler = &app.scheduler;
    let mut card = scheduler.create_initial_state(start);
    let mut history = Vec::with_capacity(reviews);

    for _ in 0..reviews {
        let now = card.due;
        card = scheduler.review(&card, rating, now);
        history.push((now, card.clone()));
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<&_> = history.iter().map(|(_, card)| card).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{:>3} {:<11} {:<8} {:>12} {:>10}",
                "#", "State", "Next", "Stability", "Difficulty"
            );
            for (i, (reviewed_at, card)) in history.iter().enumerate() {
                println!(
                    "{:>3} {:<11} {:<8} {:>12.2} {:>10.2}",
                    i + 1,
                    card.state.to_string(),
                    format_interval(card.due - *reviewed_at),
                    card.stability,
                    card.difficulty
                );
            }
        }
    }

    Ok(())
}
