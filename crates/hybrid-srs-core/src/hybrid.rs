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

//! Routes each review to the step scheduler or the stability scheduler.
//!
//! New, Learning and Relearning cards move along the step ladders. Review
//! cards are spaced by the memory model. A lapse (Again in Review) is shown
//! through the relearning ladder while the memory model records it too, so
//! the model picks up where it left off once the card re-graduates.

use crate::calendar::Calendar;
use crate::calendar::LocalCalendar;
use crate::config::SchedulerConfig;
use crate::stability;
use crate::stability::MemoryCard;
use crate::stability::Stability;
use crate::step;
use crate::types::card::Card;
use crate::types::card::Phase;
use crate::types::card::StabilityState;
use crate::types::card::StepState;
use crate::types::grade::Grade;
use crate::types::lifecycle::CardState;
use crate::types::timestamp::Timestamp;

/// Lowest stability a seeded memory state starts with.
const SEED_MIN_STABILITY: Stability = 0.4;

/// Difficulty a seeded memory state starts with.
const SEED_DIFFICULTY: f64 = 5.0;

/// Builds the memory state of a card that has just reached Review through
/// the step scheduler. This is a starting point for the stability scheduler,
/// not one of its outputs.
pub fn seed(schedule: &StepState, review_count: usize, now: Timestamp) -> StabilityState {
    let interval_days = schedule.interval_days();
    StabilityState {
        stability: f64::from(interval_days).max(SEED_MIN_STABILITY),
        difficulty: SEED_DIFFICULTY,
        reps: u32::try_from(review_count).unwrap_or(u32::MAX).max(1),
        scheduled_days: interval_days,
        last_review: now,
    }
}

/// What each grade would do to a card.
#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    pub again: Card,
    pub hard: Card,
    pub good: Card,
    pub easy: Card,
}

impl Preview {
    pub fn get(&self, grade: Grade) -> &Card {
        match grade {
            Grade::Again => &self.again,
            Grade::Hard => &self.hard,
            Grade::Good => &self.good,
            Grade::Easy => &self.easy,
        }
    }
}

/// The scheduling entry point. Holds immutable configuration and the
/// calendar; it keeps no state between calls, so one instance can be shared
/// freely across threads.
#[derive(Clone, Debug)]
pub struct HybridScheduler<C: Calendar = LocalCalendar> {
    config: SchedulerConfig,
    calendar: C,
}

impl HybridScheduler<LocalCalendar> {
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_calendar(config, LocalCalendar)
    }
}

impl Default for HybridScheduler<LocalCalendar> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl<C: Calendar> HybridScheduler<C> {
    pub fn with_calendar(config: SchedulerConfig, calendar: C) -> Self {
        Self { config, calendar }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Schedules `card` after a review graded `grade` at `now`. The review
    /// itself must already be in `card.review_history`.
    pub fn review(&self, card: &Card, grade: Grade, now: Timestamp) -> Card {
        match card.state() {
            CardState::New | CardState::Learning | CardState::Relearning => {
                self.review_with_steps(card, grade, now)
            }
            CardState::Review => self.review_with_stability(card, grade, now),
        }
    }

    pub fn preview(&self, card: &Card, now: Timestamp) -> Preview {
        Preview {
            again: self.review(card, Grade::Again, now),
            hard: self.review(card, Grade::Hard, now),
            good: self.review(card, Grade::Good, now),
            easy: self.review(card, Grade::Easy, now),
        }
    }

    /// Runs the step ladder. A card reaching Review for the first time gets a
    /// seeded memory record; a card re-graduating from Relearning resumes its
    /// existing record.
    fn review_with_steps(&self, card: &Card, grade: Grade, now: Timestamp) -> Card {
        let schedule = step::schedule(
            &card.schedule,
            grade,
            now,
            &self.config.steps,
            &self.calendar,
        );
        let memory = match (schedule.phase, card.memory) {
            (Phase::Review { interval_days }, Some(memory)) => {
                log::debug!("{}: re-graduated, resuming memory model", card.id);
                Some(StabilityState {
                    scheduled_days: interval_days,
                    last_review: now,
                    ..memory
                })
            }
            (Phase::Review { .. }, None) => {
                let seeded = seed(&schedule, card.review_history.len(), now);
                log::debug!(
                    "{}: graduated, seeding memory model with stability {:.2}",
                    card.id,
                    seeded.stability
                );
                Some(seeded)
            }
            (_, memory) => memory,
        };
        Card {
            schedule,
            memory,
            ..card.clone()
        }
    }

    fn review_with_stability(&self, card: &Card, grade: Grade, now: Timestamp) -> Card {
        let memory = card
            .memory
            .unwrap_or_else(|| seed(&card.schedule, card.review_history.len(), now));
        let elapsed = self.calendar.days_between(memory.last_review, now).max(0);
        let input = MemoryCard::in_review(&memory, u32::try_from(elapsed).unwrap_or(u32::MAX));
        let output = stability::schedule(&input, grade, now, &self.config.stability);
        let memory = StabilityState {
            stability: output.stability,
            difficulty: output.difficulty,
            reps: output.reps,
            scheduled_days: output.scheduled_days,
            last_review: now,
        };
        let schedule = if grade == Grade::Again {
            log::debug!(
                "{}: lapsed, relearning (stability {:.2} -> {:.2})",
                card.id,
                input.stability,
                output.stability
            );
            step::schedule(
                &card.schedule,
                grade,
                now,
                &self.config.steps,
                &self.calendar,
            )
        } else {
            let interval_days = output.scheduled_days.max(1);
            StepState {
                phase: Phase::Review { interval_days },
                ease_factor: card.schedule.ease_factor,
                due: self.calendar.add_days(now, interval_days),
            }
        };
        Card {
            schedule,
            memory: Some(memory),
            ..card.clone()
        }
    }
}
