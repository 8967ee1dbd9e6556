//! Flashcard spaced repetition for Lingo
//!
//! This module provides:
//! - Card memory state and review log models
//! - The FSRS memory model (stability, difficulty, retrievability)
//! - Learning and relearning step tables
//! - A parameterised scheduler implementing the review state machine

pub mod algorithm;
pub mod config;
pub mod errors;
pub mod models;
pub mod scheduler;
pub mod steps;

pub use config::SchedulerParameters;
pub use errors::{Result, SchedulerError};
pub use models::*;
pub use scheduler::Scheduler;
pub use steps::LearningStep;
