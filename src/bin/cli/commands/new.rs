use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::app::App;

pub fn run(app: &App, now: DateTime<Utc>) -> Result<()> {
    let card = app.scheduler.create_initial_state(now);
    println!("{}", serde_json::to_string_pretty(&card)?);
    Ok(())
}
