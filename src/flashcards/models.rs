//! Data models for the flashcard scheduler

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::SchedulerError;

/// Recall-quality feedback given after attempting a card.
///
/// Serialized as its conventional integer value (Again=1 .. Easy=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    /// Forgot the answer
    Again,
    /// Recalled with serious difficulty
    Hard,
    /// Recalled after some hesitation
    Good,
    /// Recalled instantly
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Conventional integer value (1-4)
    pub fn value(self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }

    /// Numeric grade used by the memory model formulas
    pub(crate) fn grade(self) -> f64 {
        f64::from(self.value())
    }
}

impl TryFrom<i64> for Rating {
    type Error = SchedulerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(SchedulerError::InvalidRating(other)),
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::try_from(i64::from(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.value()
    }
}

impl FromStr for Rating {
    type Err = SchedulerError;

    /// Accepts either the integer value or the rating name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Rating::try_from(n);
        }
        match trimmed.to_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(SchedulerError::InvalidRatingName(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        };
        f.write_str(name)
    }
}

/// Status of a card in the spaced repetition system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Never reviewed
    #[default]
    New,
    /// In initial learning phase
    Learning,
    /// Regular spaced review
    Review,
    /// Failed and re-learning
    Relearning,
}

impl CardStatus {
    /// Whether the card is working through a short-interval step table
    pub fn is_learning(self) -> bool {
        matches!(self, CardStatus::Learning | CardStatus::Relearning)
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardStatus::New => "New",
            CardStatus::Learning => "Learning",
            CardStatus::Review => "Review",
            CardStatus::Relearning => "Relearning",
        };
        f.write_str(name)
    }
}

/// Everything the scheduler knows about one flashcard's learning history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    /// When the card should next be shown
    pub due: DateTime<Utc>,
    /// Days for retrievability to fall from 100% to 90%
    #[serde(default)]
    pub stability: f64,
    /// Intrinsic hardness in [1, 10] (0 while New)
    #[serde(default)]
    pub difficulty: f64,
    /// Whole days between the last two reviews
    #[serde(default)]
    pub elapsed_days: u32,
    /// Interval scheduled at the last review
    #[serde(default)]
    pub scheduled_days: u32,
    /// Index into the active learning or relearning step table
    #[serde(default)]
    pub learning_steps: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    #[serde(default)]
    pub state: CardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// A never-reviewed card that is due at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            due: now,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            learning_steps: 0,
            reps: 0,
            lapses: 0,
            state: CardStatus::New,
            last_review: None,
        }
    }

    /// Check if the card is due for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due
    }
}

/// A record of a single review, holding enough of the pre-review card to
/// undo it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub rating: Rating,
    /// Card status before the review
    pub state: CardStatus,
    /// Due date before the review
    pub due: DateTime<Utc>,
    /// Stability before the review
    pub stability: f64,
    /// Difficulty before the review
    pub difficulty: f64,
    /// Last review before this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
    /// `elapsedDays` the card carried before the review
    pub last_elapsed_days: u32,
    /// Days elapsed at this review
    pub elapsed_days: u32,
    /// `scheduledDays` the card carried before the review
    pub scheduled_days: u32,
    /// Step index the card carried before the review
    pub learning_steps: u32,
    /// When the review occurred
    pub reviewed_at: DateTime<Utc>,
}

/// Updated card together with the log of the review that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLogItem {
    pub card: MemoryState,
    pub log: ReviewLog,
}

/// Outcome of every possible rating for one card at one moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingPreview {
    pub again: RecordLogItem,
    pub hard: RecordLogItem,
    pub good: RecordLogItem,
    pub easy: RecordLogItem,
}

impl SchedulingPreview {
    pub fn get(&self, rating: Rating) -> &RecordLogItem {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }

    pub fn into_item(self, rating: Rating) -> RecordLogItem {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    /// Iterate outcomes in rating order
    pub fn iter(&self) -> impl Iterator<Item = (Rating, &RecordLogItem)> {
        Rating::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}
