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

//! The step scheduler.
//!
//! New and lapsed cards climb a ladder of short, fixed delays. Once off the
//! ladder they are reviewed at day intervals grown by an SM-2 ease factor.
//! Ladder delays are elapsed seconds; review intervals are calendar days.

use crate::calendar::Calendar;
use crate::config::StepConfig;
use crate::types::card::Phase;
use crate::types::card::StepState;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

/// Ease bonus for skipping the learning ladder with Easy.
const EASY_GRADUATION_BONUS: f64 = 0.15;

/// Ease penalty for a lapse.
const LAPSE_PENALTY: f64 = 0.2;

const HARD_INTERVAL_FACTOR: f64 = 1.2;
const EASY_INTERVAL_BONUS: f64 = 1.3;
const HARD_STEP_FACTOR: f64 = 1.5;

/// Review intervals used instead of the ease factor while the previous
/// interval is a day or less.
const GOOD_SECOND_INTERVAL: f64 = 6.0;
const EASY_SECOND_INTERVAL: f64 = 8.0;

/// SM-2 ease adjustment: EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)).
pub fn ease_delta(grade: Grade) -> f64 {
    let miss = f64::from(5 - grade.sm2_quality());
    0.1 - miss * (0.08 + miss * 0.02)
}

pub fn schedule(
    state: &StepState,
    grade: Grade,
    now: Timestamp,
    config: &StepConfig,
    calendar: &impl Calendar,
) -> StepState {
    let ease = state.ease_factor;
    let next = match state.phase {
        Phase::New => learn(None, ease, grade, now, config, calendar),
        Phase::Learning { step } => learn(Some(step), ease, grade, now, config, calendar),
        Phase::Review { interval_days } => {
            review(interval_days, ease, grade, now, config, calendar)
        }
        Phase::Relearning {
            step,
            interval_days,
        } => relearn(step, interval_days, ease, grade, now, config, calendar),
    };
    log::debug!(
        "step scheduler: {} + {grade} -> {:?}, ease {:.2}, due {}",
        state.state(),
        next.phase,
        next.ease_factor,
        next.due
    );
    next
}

fn learn(
    step: Option<usize>,
    ease: f64,
    grade: Grade,
    now: Timestamp,
    config: &StepConfig,
    calendar: &impl Calendar,
) -> StepState {
    match grade {
        Grade::Again | Grade::Hard => StepState {
            phase: Phase::Learning { step: 0 },
            ease_factor: ease,
            due: now.plus_seconds(config.learning_delay(0)),
        },
        Grade::Good => {
            let next = step.unwrap_or(0).saturating_add(1);
            if next >= config.learning_steps.len() {
                let interval_days = config.graduating_interval_days.max(1);
                StepState {
                    phase: Phase::Review { interval_days },
                    ease_factor: ease,
                    due: calendar.add_days(now, interval_days),
                }
            } else {
                StepState {
                    phase: Phase::Learning { step: next },
                    ease_factor: ease,
                    due: now.plus_seconds(config.learning_delay(next)),
                }
            }
        }
        Grade::Easy => {
            let interval_days = config.easy_interval_days.max(1);
            StepState {
                phase: Phase::Review { interval_days },
                ease_factor: config.clamp_ease(ease + EASY_GRADUATION_BONUS),
                due: calendar.add_days(now, interval_days),
            }
        }
    }
}

fn review(
    interval_days: u32,
    ease: f64,
    grade: Grade,
    now: Timestamp,
    config: &StepConfig,
    calendar: &impl Calendar,
) -> StepState {
    let previous = f64::from(interval_days);
    let updated = config.clamp_ease(ease + ease_delta(grade));
    let next = match grade {
        Grade::Again => {
            return StepState {
                phase: Phase::Relearning {
                    step: 0,
                    interval_days,
                },
                ease_factor: config.clamp_ease(ease - LAPSE_PENALTY),
                due: now.plus_seconds(config.learning_delay(0)),
            };
        }
        Grade::Hard => f64::max(1.0, previous * HARD_INTERVAL_FACTOR),
        Grade::Good if interval_days <= 1 => GOOD_SECOND_INTERVAL,
        Grade::Good => previous * updated,
        Grade::Easy if interval_days <= 1 => EASY_SECOND_INTERVAL,
        Grade::Easy => previous * updated * EASY_INTERVAL_BONUS,
    };
    let interval_days = (next.round() as u32).max(1);
    StepState {
        phase: Phase::Review { interval_days },
        ease_factor: updated,
        due: calendar.add_days(now, interval_days),
    }
}

fn relearn(
    step: usize,
    interval_days: u32,
    ease: f64,
    grade: Grade,
    now: Timestamp,
    config: &StepConfig,
    calendar: &impl Calendar,
) -> StepState {
    let relearning = |step: usize, delay: i64| StepState {
        phase: Phase::Relearning {
            step,
            interval_days,
        },
        ease_factor: ease,
        due: now.plus_seconds(delay),
    };
    match grade {
        Grade::Again => relearning(0, config.relearning_delay(0)),
        Grade::Hard => {
            let delay = config.relearning_delay(step) as f64 * HARD_STEP_FACTOR;
            relearning(step, delay.round() as i64)
        }
        Grade::Good | Grade::Easy => {
            let next = step.saturating_add(1);
            if next < config.relearning_steps.len() {
                return relearning(next, config.relearning_delay(next));
            }
            let min = if grade == Grade::Easy { 2 } else { 1 };
            let interval_days = interval_days.max(min);
            StepState {
                phase: Phase::Review { interval_days },
                ease_factor: ease,
                due: calendar.add_days(now, interval_days),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::LocalCalendar;
    use crate::types::lifecycle::CardState;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn now() -> Timestamp {
        ts("2024-03-10T10:00:00.000")
    }

    fn state(phase: Phase) -> StepState {
        StepState {
            phase,
            ease_factor: 2.5,
            due: now(),
        }
    }

    fn run(phase: Phase, grade: Grade) -> StepState {
        schedule(
            &state(phase),
            grade,
            now(),
            &StepConfig::default(),
            &LocalCalendar,
        )
    }

    #[test]
    fn test_ease_delta() {
        assert!((ease_delta(Grade::Hard) - -0.14).abs() < 1e-9);
        assert!(ease_delta(Grade::Good).abs() < 1e-9);
        assert!((ease_delta(Grade::Easy) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_new_card_easy_graduates() {
        let next = run(Phase::New, Grade::Easy);
        assert_eq!(next.phase, Phase::Review { interval_days: 4 });
        assert!((next.ease_factor - 2.65).abs() < 1e-9);
        assert_eq!(next.due, ts("2024-03-14T10:00:00.000"));
    }

    #[test]
    fn test_new_card_again_and_hard_restart_ladder() {
        for grade in [Grade::Again, Grade::Hard] {
            let next = run(Phase::New, grade);
            assert_eq!(next.phase, Phase::Learning { step: 0 });
            assert_eq!(next.due, ts("2024-03-10T10:01:00.000"));
            assert_eq!(next.ease_factor, 2.5);
        }
        let next = run(Phase::Learning { step: 1 }, Grade::Again);
        assert_eq!(next.phase, Phase::Learning { step: 0 });
    }

    #[test]
    fn test_learning_good_advances() {
        let next = run(Phase::Learning { step: 0 }, Grade::Good);
        assert_eq!(next.phase, Phase::Learning { step: 1 });
        assert_eq!(next.due, ts("2024-03-10T10:10:00.000"));
        assert_eq!(next.state(), CardState::Learning);
    }

    #[test]
    fn test_new_good_treats_missing_step_as_zero() {
        let next = run(Phase::New, Grade::Good);
        assert_eq!(next.phase, Phase::Learning { step: 1 });
    }

    #[test]
    fn test_last_learning_step_good_graduates() {
        let next = run(Phase::Learning { step: 1 }, Grade::Good);
        assert_eq!(next.phase, Phase::Review { interval_days: 1 });
        assert_eq!(next.due, ts("2024-03-11T10:00:00.000"));
        assert_eq!(next.ease_factor, 2.5);
    }

    #[test]
    fn test_review_lapse() {
        let next = run(Phase::Review { interval_days: 20 }, Grade::Again);
        assert_eq!(
            next.phase,
            Phase::Relearning {
                step: 0,
                interval_days: 20
            }
        );
        assert_eq!(next.interval_days(), 0);
        assert!((next.ease_factor - 2.3).abs() < 1e-9);
        assert_eq!(next.due, ts("2024-03-10T10:01:00.000"));
    }

    #[test]
    fn test_lapse_waits_first_learning_step() {
        let config = StepConfig {
            learning_steps: vec![45, 300],
            relearning_steps: vec![900],
            ..StepConfig::default()
        };
        let review = state(Phase::Review { interval_days: 12 });
        let lapsed = schedule(&review, Grade::Again, now(), &config, &LocalCalendar);
        assert_eq!(lapsed.due, now().plus_seconds(45));
        let again = schedule(&lapsed, Grade::Again, now(), &config, &LocalCalendar);
        assert_eq!(again.due, now().plus_seconds(900));
    }

    #[test]
    fn test_review_intervals() {
        let interval =
            |days, grade| run(Phase::Review { interval_days: days }, grade).interval_days();
        assert_eq!(interval(10, Grade::Hard), 12);
        assert_eq!(interval(10, Grade::Good), 25);
        // 10 * 2.6 * 1.3
        assert_eq!(interval(10, Grade::Easy), 34);
        assert_eq!(interval(1, Grade::Hard), 1);
        assert_eq!(interval(1, Grade::Good), 6);
        assert_eq!(interval(1, Grade::Easy), 8);
    }

    #[test]
    fn test_review_updates_ease() {
        let hard = run(Phase::Review { interval_days: 10 }, Grade::Hard);
        assert!((hard.ease_factor - 2.36).abs() < 1e-9);
        let easy = run(Phase::Review { interval_days: 10 }, Grade::Easy);
        assert!((easy.ease_factor - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_ease_never_drops_below_minimum() {
        let config = StepConfig::default();
        let mut s = StepState {
            phase: Phase::Review { interval_days: 30 },
            ease_factor: 1.35,
            due: now(),
        };
        for _ in 0..5 {
            s = schedule(&s, Grade::Again, now(), &config, &LocalCalendar);
            assert!(s.ease_factor >= config.minimum_ease);
            s = schedule(&s, Grade::Good, now(), &config, &LocalCalendar);
            s = schedule(&s, Grade::Hard, now(), &config, &LocalCalendar);
            assert!(s.ease_factor >= config.minimum_ease);
        }
    }

    #[test]
    fn test_relearning() {
        let lapsed = Phase::Relearning {
            step: 0,
            interval_days: 15,
        };

        let again = run(lapsed, Grade::Again);
        assert_eq!(again.phase, lapsed);
        assert_eq!(again.due, ts("2024-03-10T10:10:00.000"));

        let hard = run(lapsed, Grade::Hard);
        assert_eq!(hard.phase, lapsed);
        assert_eq!(hard.due, ts("2024-03-10T10:15:00.000"));

        let good = run(lapsed, Grade::Good);
        assert_eq!(good.phase, Phase::Review { interval_days: 15 });
        assert_eq!(good.due, ts("2024-03-25T10:00:00.000"));
    }

    #[test]
    fn test_relearning_graduation_minimums() {
        let lapsed = Phase::Relearning {
            step: 0,
            interval_days: 1,
        };
        assert_eq!(run(lapsed, Grade::Easy).interval_days(), 2);
        assert_eq!(run(lapsed, Grade::Good).interval_days(), 1);
        let zero = Phase::Relearning {
            step: 0,
            interval_days: 0,
        };
        assert_eq!(run(zero, Grade::Good).interval_days(), 1);
    }

    #[test]
    fn test_relearning_ladder_with_several_steps() {
        let config = StepConfig {
            relearning_steps: vec![300, 1800],
            ..StepConfig::default()
        };
        let lapsed = state(Phase::Relearning {
            step: 0,
            interval_days: 9,
        });
        let next = schedule(&lapsed, Grade::Easy, now(), &config, &LocalCalendar);
        assert_eq!(
            next.phase,
            Phase::Relearning {
                step: 1,
                interval_days: 9
            }
        );
        assert_eq!(next.due, ts("2024-03-10T10:30:00.000"));
        let next = schedule(&next, Grade::Hard, now(), &config, &LocalCalendar);
        assert_eq!(next.due, ts("2024-03-10T10:45:00.000"));
        let next = schedule(&next, Grade::Good, now(), &config, &LocalCalendar);
        assert_eq!(next.phase, Phase::Review { interval_days: 9 });
    }

    #[test]
    fn test_step_index_at_limit_graduates() {
        let learning = run(Phase::Learning { step: usize::MAX }, Grade::Good);
        assert_eq!(learning.phase, Phase::Review { interval_days: 1 });
        let lapsed = Phase::Relearning {
            step: usize::MAX,
            interval_days: 7,
        };
        assert_eq!(run(lapsed, Grade::Good).phase, Phase::Review { interval_days: 7 });
    }

    #[test]
    fn test_grade_monotonicity_in_review() {
        for days in [1, 2, 5, 30, 400] {
            let interval =
                |grade| run(Phase::Review { interval_days: days }, grade).interval_days();
            assert!(interval(Grade::Easy) >= interval(Grade::Good));
            assert!(interval(Grade::Good) >= interval(Grade::Hard));
        }
    }

    #[test]
    fn test_lapse_due_before_any_success() {
        for days in [1, 3, 60] {
            let lapse = run(Phase::Review { interval_days: days }, Grade::Again);
            for grade in [Grade::Hard, Grade::Good, Grade::Easy] {
                let success = run(Phase::Review { interval_days: days }, grade);
                assert!(lapse.due < success.due);
            }
        }
    }

    #[test]
    fn test_empty_ladders_still_produce_a_due_date() {
        let config = StepConfig {
            learning_steps: vec![],
            relearning_steps: vec![],
            ..StepConfig::default()
        };
        let next = schedule(&state(Phase::New), Grade::Hard, now(), &config, &LocalCalendar);
        assert_eq!(next.due, ts("2024-03-10T10:01:00.000"));
        let next = schedule(&state(Phase::New), Grade::Good, now(), &config, &LocalCalendar);
        assert_eq!(next.phase, Phase::Review { interval_days: 1 });
    }
}
