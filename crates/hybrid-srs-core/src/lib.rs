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

//! hybrid-srs-core: the scheduling engine of a spaced repetition system.
//!
//! Two schedulers share the work:
//! - a step scheduler that walks new and lapsed cards through short, fixed
//!   delays and grows review intervals with an SM-2 ease factor;
//! - a stability scheduler that models forgetting and picks day intervals
//!   for a target probability of recall.
//!
//! [`HybridScheduler`] decides which one handles each review. Everything here
//! is a pure function of its inputs: the current time is always an argument.

pub mod calendar;
pub mod config;
pub mod error;
pub mod hybrid;
pub mod stability;
pub mod step;
pub mod types;

// Re-exports for convenience
pub use calendar::{Calendar, LocalCalendar};
pub use config::{SchedulerConfig, StabilityConfig, StepConfig, Weights};
pub use error::{ErrorReport, Fallible, fail};
pub use hybrid::{HybridScheduler, Preview};
pub use stability::MemoryCard;
pub use types::card::{Card, Phase, StabilityState, StepState};
pub use types::card_hash::CardHash;
pub use types::date::Date;
pub use types::grade::Grade;
pub use types::lifecycle::CardState;
pub use types::timestamp::Timestamp;
