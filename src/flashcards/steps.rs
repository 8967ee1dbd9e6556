//! Short-interval learning steps
//!
//! Step tables are written as duration strings such as `"30s"`, `"10m"`,
//! `"1h"` or `"2d"`. Cards in Learning or Relearning walk through their
//! table before graduating to long-interval review.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::errors::SchedulerError;
use super::models::Rating;

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3_600;
const SECONDS_PER_DAY: u32 = 86_400;

/// A single learning-step delay, stored in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LearningStep {
    seconds: u32,
}

impl LearningStep {
    pub fn from_seconds(seconds: u32) -> Result<Self, SchedulerError> {
        if seconds == 0 {
            return Err(SchedulerError::InvalidStep(format!("{}s", seconds)));
        }
        Ok(Self { seconds })
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, SchedulerError> {
        let seconds = minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .ok_or_else(|| SchedulerError::InvalidStep(format!("{}m", minutes)))?;
        Self::from_seconds(seconds)
    }

    /// Build a step from a non-zero constant
    pub(crate) const fn minutes_const(minutes: u32) -> Self {
        Self {
            seconds: minutes * SECONDS_PER_MINUTE,
        }
    }

    pub fn seconds(self) -> u32 {
        self.seconds
    }

    pub fn duration(self) -> Duration {
        Duration::seconds(i64::from(self.seconds))
    }

    /// Whole days covered by this step (0 for sub-day steps)
    pub fn whole_days(self) -> u32 {
        self.seconds / SECONDS_PER_DAY
    }
}

impl FromStr for LearningStep {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || SchedulerError::InvalidStep(s.to_string());

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (number, unit) = trimmed.split_at(split);
        let value: u32 = number.parse().map_err(|_| invalid())?;

        let multiplier = match unit {
            "s" => 1,
            "m" => SECONDS_PER_MINUTE,
            "h" => SECONDS_PER_HOUR,
            "d" => SECONDS_PER_DAY,
            _ => return Err(invalid()),
        };

        let seconds = value.checked_mul(multiplier).ok_or_else(invalid)?;
        Self::from_seconds(seconds).map_err(|_| invalid())
    }
}

impl TryFrom<String> for LearningStep {
    type Error = SchedulerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LearningStep> for String {
    fn from(step: LearningStep) -> String {
        step.to_string()
    }
}

impl fmt::Display for LearningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.seconds;
        if seconds % SECONDS_PER_DAY == 0 {
            write!(f, "{}d", seconds / SECONDS_PER_DAY)
        } else if seconds % SECONDS_PER_HOUR == 0 {
            write!(f, "{}h", seconds / SECONDS_PER_HOUR)
        } else if seconds % SECONDS_PER_MINUTE == 0 {
            write!(f, "{}m", seconds / SECONDS_PER_MINUTE)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

/// Where a card lands after a rating inside a step table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Stay in the table at `index`, due after `delay`
    Stay { index: u32, delay: LearningStep },
    /// Leave the table and graduate to Review
    Graduate,
}

/// Resolve the next step for a card currently at `current`.
///
/// `hard_repeats` selects whether Hard repeats the current step (initial
/// learning) or advances like Good (relearning). Easy always graduates,
/// as does an empty table.
pub fn next_step(
    steps: &[LearningStep],
    current: u32,
    rating: Rating,
    hard_repeats: bool,
) -> StepOutcome {
    if steps.is_empty() || rating == Rating::Easy {
        return StepOutcome::Graduate;
    }

    let last = steps.len() - 1;
    let current = (current as usize).min(last);

    let advance = |from: usize| {
        if from < last {
            StepOutcome::Stay {
                index: (from + 1) as u32,
                delay: steps[from + 1],
            }
        } else {
            StepOutcome::Graduate
        }
    };

    match rating {
        Rating::Again => StepOutcome::Stay {
            index: 0,
            delay: steps[0],
        },
        Rating::Hard if hard_repeats => StepOutcome::Stay {
            index: current as u32,
            delay: hard_delay(steps, current),
        },
        Rating::Hard | Rating::Good => advance(current),
        Rating::Easy => StepOutcome::Graduate,
    }
}

/// Delay for repeating the current step after Hard.
///
/// On the first step this sits between the first two steps (or 1.5x a lone
/// step, capped one day above it); later steps repeat as-is.
fn hard_delay(steps: &[LearningStep], current: usize) -> LearningStep {
    if current > 0 {
        return steps[current];
    }
    let first = u64::from(steps[0].seconds);
    let seconds = match steps.get(1) {
        Some(second) => (first + u64::from(second.seconds)) / 2,
        None => (first * 3 / 2).min(first + u64::from(SECONDS_PER_DAY)),
    };
    LearningStep {
        seconds: u32::try_from(seconds).unwrap_or(u32::MAX).max(1),
    }
}
