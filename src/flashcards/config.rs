//! Scheduler parameters
//!
//! Parameters are plain data: build them with [`SchedulerParameters::default`]
//! or load them from a TOML file, then bind them into a
//! [`Scheduler`](super::scheduler::Scheduler). Example file:
//!
//! ```toml
//! requestRetention = 0.9
//! maximumInterval = 36500
//! learningSteps = ["1m", "10m"]
//! relearningSteps = ["10m"]
//! enableFuzz = false
//! enableShortTerm = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{Result, SchedulerError};
use super::steps::LearningStep;

/// Number of model weights
pub const WEIGHT_COUNT: usize = 19;

/// Default FSRS-5 weights.
///
/// - `w[0..4]`: initial stability for Again, Hard, Good, Easy
/// - `w[4..6]`: initial difficulty base and rating slope
/// - `w[6]`: difficulty change per rating step
/// - `w[7]`: mean reversion toward the Easy seed difficulty
/// - `w[8..11]`: recall stability growth (scale, stability decay, retrievability gain)
/// - `w[11..15]`: lapse stability (scale, difficulty, stability, retrievability)
/// - `w[15]`, `w[16]`: Hard penalty and Easy bonus
/// - `w[17]`, `w[18]`: short-term stability scale and offset
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

pub const DEFAULT_REQUEST_RETENTION: f64 = 0.9;
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

/// Immutable scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerParameters {
    /// Model weights
    #[serde(default = "default_weights")]
    pub weights: [f64; WEIGHT_COUNT],
    /// Target probability of recall at the due date
    #[serde(default = "default_request_retention")]
    pub request_retention: f64,
    /// Longest interval ever scheduled, in days
    #[serde(default = "default_maximum_interval")]
    pub maximum_interval: u32,
    /// Steps for New and Learning cards
    #[serde(default = "default_learning_steps")]
    pub learning_steps: Vec<LearningStep>,
    /// Steps for Relearning cards
    #[serde(default = "default_relearning_steps")]
    pub relearning_steps: Vec<LearningStep>,
    /// Spread long intervals by a deterministic pseudo-random amount
    #[serde(default)]
    pub enable_fuzz: bool,
    /// Use step tables and same-day stability updates
    #[serde(default = "default_enable_short_term")]
    pub enable_short_term: bool,
}

fn default_weights() -> [f64; WEIGHT_COUNT] {
    DEFAULT_WEIGHTS
}

fn default_request_retention() -> f64 {
    DEFAULT_REQUEST_RETENTION
}

fn default_maximum_interval() -> u32 {
    DEFAULT_MAXIMUM_INTERVAL
}

fn default_learning_steps() -> Vec<LearningStep> {
    vec![LearningStep::minutes_const(1), LearningStep::minutes_const(10)]
}

fn default_relearning_steps() -> Vec<LearningStep> {
    vec![LearningStep::minutes_const(10)]
}

fn default_enable_short_term() -> bool {
    true
}

impl Default for SchedulerParameters {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            request_retention: default_request_retention(),
            maximum_interval: default_maximum_interval(),
            learning_steps: default_learning_steps(),
            relearning_steps: default_relearning_steps(),
            enable_fuzz: false,
            enable_short_term: default_enable_short_term(),
        }
    }
}

impl SchedulerParameters {
    /// Parse and validate parameters from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: Self = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate parameters from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let params = Self::from_toml_str(&content)?;
        log::debug!("Loaded scheduler parameters from {:?}", path);
        Ok(params)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every numeric field is inside its domain
    pub fn validate(&self) -> Result<()> {
        let r = self.request_retention;
        if !(r > 0.0 && r <= 1.0) {
            return Err(SchedulerError::InvalidRetention(r));
        }
        if self.maximum_interval < 1 {
            return Err(SchedulerError::InvalidMaximumInterval(self.maximum_interval));
        }
        for (index, &value) in self.weights.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(SchedulerError::InvalidWeight { index, value });
            }
        }
        Ok(())
    }

    /// Step table for initial learning, empty when short-term scheduling is off
    pub fn active_learning_steps(&self) -> &[LearningStep] {
        if self.enable_short_term {
            &self.learning_steps
        } else {
            &[]
        }
    }

    /// Step table for relearning, empty when short-term scheduling is off
    pub fn active_relearning_steps(&self) -> &[LearningStep] {
        if self.enable_short_term {
            &self.relearning_steps
        } else {
            &[]
        }
    }
}
