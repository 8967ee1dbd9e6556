//! Lingo: spaced repetition scheduling for language-learning flashcards.
//!
//! ```
//! use chrono::Utc;
//! use lingo_lib::flashcards::{CardStatus, Rating, Scheduler};
//!
//! let scheduler = Scheduler::default();
//! let now = Utc::now();
//! let card = scheduler.create_initial_state(now);
//! let card = scheduler.review(&card, Rating::Good, now);
//! assert_eq!(card.state, CardStatus::Learning);
//! assert!(card.due > now);
//! ```

pub mod flashcards;
