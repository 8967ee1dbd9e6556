mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lingo_lib::flashcards::Rating;

#[derive(Parser)]
#[command(name = "lingo-cli", about = "Lingo flashcard scheduler CLI", version)]
struct Cli {
    /// Scheduler parameters file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh New card
    New {
        /// Creation time (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Review a card and print the updated state
    Review {
        /// Card JSON file (use "-" to read from stdin)
        card: String,
        /// Rating: again/hard/good/easy or 1-4
        rating: Rating,
        /// Review time (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
        /// Also print the review log
        #[arg(long)]
        log: bool,
    },

    /// Show the outcome of every rating
    Preview {
        /// Card JSON file (use "-" to read from stdin)
        card: String,
        /// Review time (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Show the card's current probability of recall
    Retrievability {
        /// Card JSON file (use "-" to read from stdin)
        card: String,
        /// Time to evaluate at (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Review a fresh card with the same rating each time it falls due
    Simulate {
        /// Rating given at every review
        rating: Rating,
        /// Number of reviews
        #[arg(long, default_value = "10")]
        reviews: usize,
        /// Time of the first review (RFC 3339, default: now)
        #[arg(long)]
        start: Option<String>,
    },

    /// Print the effective scheduler parameters as TOML
    Params,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.config.as_deref())?;

    match cli.command {
        Command::New { now } => {
            let now = app::parse_time(now.as_deref())?;
            commands::new::run(&app, now)?;
        }
        Command::Review { card, rating, now, log } => {
            let state = app::read_card(&card)?;
            let now = app::parse_time(now.as_deref())?;
            commands::review::run(&app, &state, rating, now, log, &cli.format)?;
        }
        Command::Preview { card, now } => {
            let state = app::read_card(&card)?;
            let now = app::parse_time(now.as_deref())?;
            commands::preview::run(&app, &state, now, &cli.format)?;
        }
        Command::Retrievability { card, now } => {
            let state = app::read_card(&card)?;
            let now = app::parse_time(now.as_deref())?;
            commands::retrievability::run(&app, &state, now, &cli.format)?;
        }
        Command::Simulate { rating, reviews, start } => {
            let start = app::parse_time(start.as_deref())?;
            commands::simulate::run(&app, rating, reviews, start, &cli.format)?;
        }
        Command::Params => {
            print!("{}", app.scheduler.parameters().to_toml_string()?);
        }
    }

    Ok(())
}
