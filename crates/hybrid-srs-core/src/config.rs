// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scheduler configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it overrides:
//!
//! ```toml
//! [steps]
//! learning_steps = [60, 600, 3600]
//!
//! [stability]
//! target_retention = 0.85
//! ```

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// Number of entries in the weight vector.
pub const WEIGHT_COUNT: usize = 17;

/// Default weights, 1-based: slot `n` holds the FSRS-4.5 coefficient `w_n`.
/// Slot 17 has no FSRS-4.5 counterpart and is not read.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26, 0.29, 2.61,
    0.0,
];

pub const DEFAULT_TARGET_RETENTION: f64 = 0.9;
pub const MIN_TARGET_RETENTION: f64 = 0.7;
pub const MAX_TARGET_RETENTION: f64 = 0.99;

/// Delay used when a step ladder has no entry to offer.
pub const FALLBACK_STEP_SECONDS: u32 = 60;

/// The memory model's parameter vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights(Vec<f64>);

impl Weights {
    pub fn new(weights: Vec<f64>) -> Self {
        Self(weights)
    }

    /// The 1-based weight `w_n`. Positions outside the vector read as 1.0.
    pub fn w(&self, n: usize) -> f64 {
        n.checked_sub(1)
            .and_then(|i| self.0.get(i))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self(DEFAULT_WEIGHTS.to_vec())
    }
}

/// Configuration of the step scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Learning ladder, in seconds.
    pub learning_steps: Vec<u32>,
    /// Relearning ladder, in seconds.
    pub relearning_steps: Vec<u32>,
    /// Interval given when a card climbs off the end of the learning ladder.
    pub graduating_interval_days: u32,
    /// Interval given when a learning card is graded Easy.
    pub easy_interval_days: u32,
    /// Ease factor of a new card.
    pub starting_ease: f64,
    /// Floor for the ease factor.
    pub minimum_ease: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            learning_steps: vec![60, 600],
            relearning_steps: vec![600],
            graduating_interval_days: 1,
            easy_interval_days: 4,
            starting_ease: 2.5,
            minimum_ease: 1.3,
        }
    }
}

impl StepConfig {
    /// Delay of learning step `index`, in seconds.
    pub fn learning_delay(&self, index: usize) -> i64 {
        let seconds = self
            .learning_steps
            .get(index)
            .copied()
            .unwrap_or(FALLBACK_STEP_SECONDS);
        i64::from(seconds)
    }

    /// Delay of relearning step `index`, in seconds. Borrows the first
    /// learning step when the relearning ladder has nothing at `index`.
    pub fn relearning_delay(&self, index: usize) -> i64 {
        let seconds = self
            .relearning_steps
            .get(index)
            .or_else(|| self.learning_steps.first())
            .copied()
            .unwrap_or(FALLBACK_STEP_SECONDS);
        i64::from(seconds)
    }

    pub fn clamp_ease(&self, ease: f64) -> f64 {
        ease.max(self.minimum_ease)
    }

    fn validate(&self) -> Fallible<()> {
        if self.learning_steps.is_empty() {
            return fail("steps.learning_steps must not be empty.");
        }
        if self.learning_steps.contains(&0) || self.relearning_steps.contains(&0) {
            return fail("step delays must be at least one second.");
        }
        if self.graduating_interval_days == 0 || self.easy_interval_days == 0 {
            return fail("graduating and easy intervals must be at least one day.");
        }
        if !self.minimum_ease.is_finite() || self.minimum_ease < 1.0 {
            return fail(format!(
                "steps.minimum_ease must be at least 1.0, got {}.",
                self.minimum_ease
            ));
        }
        if !self.starting_ease.is_finite() || self.starting_ease < self.minimum_ease {
            return fail(format!(
                "steps.starting_ease ({}) is below steps.minimum_ease ({}).",
                self.starting_ease, self.minimum_ease
            ));
        }
        Ok(())
    }
}

/// Configuration of the stability scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub weights: Weights,
    /// Desired probability of recall at the moment a card comes due.
    pub target_retention: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            target_retention: DEFAULT_TARGET_RETENTION,
        }
    }
}

impl StabilityConfig {
    /// The target retention, clamped to the supported range.
    pub fn target_retention(&self) -> f64 {
        if self.target_retention.is_nan() {
            return DEFAULT_TARGET_RETENTION;
        }
        self.target_retention
            .clamp(MIN_TARGET_RETENTION, MAX_TARGET_RETENTION)
    }

    fn validate(&self) -> Fallible<()> {
        if self.weights.len() != WEIGHT_COUNT {
            return fail(format!(
                "stability.weights must have {WEIGHT_COUNT} entries, got {}.",
                self.weights.len()
            ));
        }
        if let Some(bad) = self.weights.as_slice().iter().find(|w| !w.is_finite()) {
            return fail(format!("stability.weights contains a non-finite value: {bad}."));
        }
        if !(self.target_retention > 0.0 && self.target_retention < 1.0) {
            return fail(format!(
                "stability.target_retention must be between 0 and 1, got {}.",
                self.target_retention
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub steps: StepConfig,
    pub stability: StabilityConfig,
}

impl SchedulerConfig {
    /// Parses and validates a TOML configuration document.
    pub fn from_toml(text: &str) -> Fallible<Self> {
        let config: SchedulerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Fallible<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ErrorReport::new(format!("failed to serialize configuration: {e}")))
    }

    /// Rejects configurations the schedulers would only paper over. The
    /// schedulers themselves never fail: they fall back to neutral values.
    pub fn validate(&self) -> Fallible<()> {
        self.steps.validate()?;
        self.stability.validate()
    }
}
