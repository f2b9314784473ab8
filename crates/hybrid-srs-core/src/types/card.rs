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

use serde::Deserialize;
use serde::Serialize;

use crate::calendar::Calendar;
use crate::config::StepConfig;
use crate::stability::Difficulty;
use crate::stability::Recall;
use crate::stability::Stability;
use crate::stability::retrievability;
use crate::types::card_hash::CardHash;
use crate::types::lifecycle::CardState;
use crate::types::timestamp::Timestamp;

/// Position of a card in the step scheduler. Each variant carries exactly the
/// data that is meaningful in that state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum Phase {
    New,
    Learning {
        /// Index into the learning ladder.
        step: usize,
    },
    Review {
        interval_days: u32,
    },
    Relearning {
        /// Index into the relearning ladder.
        step: usize,
        /// The review interval the card had when it lapsed. It comes back
        /// into play when the card re-graduates.
        interval_days: u32,
    },
}

impl Phase {
    pub fn state(&self) -> CardState {
        match self {
            Phase::New => CardState::New,
            Phase::Learning { .. } => CardState::Learning,
            Phase::Review { .. } => CardState::Review,
            Phase::Relearning { .. } => CardState::Relearning,
        }
    }
}

/// The step scheduler's view of a card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub phase: Phase,
    pub ease_factor: f64,
    pub due: Timestamp,
}

impl StepState {
    pub fn state(&self) -> CardState {
        self.phase.state()
    }

    /// The visible review interval: the Review interval, zero otherwise.
    pub fn interval_days(&self) -> u32 {
        match self.phase {
            Phase::Review { interval_days } => interval_days,
            _ => 0,
        }
    }
}

/// The memory model's view of a card. Exists from the moment the card first
/// graduates to Review.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StabilityState {
    pub stability: Stability,
    pub difficulty: Difficulty,
    pub reps: u32,
    pub scheduled_days: u32,
    pub last_review: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardHash,
    pub schedule: StepState,
    pub memory: Option<StabilityState>,
    /// Review timestamps, oldest first. Appended by whoever stores the card,
    /// before the card is scheduled.
    #[serde(default)]
    pub review_history: Vec<Timestamp>,
}

impl Card {
    /// A card that has never been reviewed, due immediately.
    pub fn new(id: CardHash, now: Timestamp, config: &StepConfig) -> Self {
        Self {
            id,
            schedule: StepState {
                phase: Phase::New,
                ease_factor: config.starting_ease.max(config.minimum_ease),
                due: now,
            },
            memory: None,
            review_history: Vec::new(),
        }
    }

    pub fn state(&self) -> CardState {
        self.schedule.state()
    }

    pub fn due(&self) -> Timestamp {
        self.schedule.due
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.schedule.due <= now
    }

    /// Predicted probability of recall at `now`. `None` until the card has a
    /// memory model.
    pub fn retrievability(&self, now: Timestamp, calendar: &impl Calendar) -> Option<Recall> {
        self.memory.map(|memory| {
            let elapsed = calendar.days_between(memory.last_review, now).max(0);
            retrievability(elapsed as f64, memory.stability)
        })
    }
}
