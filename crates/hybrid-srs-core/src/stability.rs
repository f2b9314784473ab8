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

//! The memory-stability scheduler.
//!
//! Forgetting follows `R(t) = (1 + F * t / S)^C`, so recall probability is
//! 90% after `S` days. A card's stability `S` grows on success and shrinks on
//! a lapse; its difficulty `D` controls how fast.

use serde::Deserialize;
use serde::Serialize;

use crate::config::StabilityConfig;
use crate::config::Weights;
use crate::types::card::StabilityState;
use crate::types::grade::Grade;
use crate::types::lifecycle::CardState;
use crate::types::timestamp::Timestamp;

pub type Recall = f64;
pub type Stability = f64;
pub type Difficulty = f64;
pub type Interval = f64;

const F: f64 = 19.0 / 81.0;
const C: f64 = -0.5;

pub const MIN_STABILITY: Stability = 0.1;
pub const MIN_DIFFICULTY: Difficulty = 1.0;
pub const MAX_DIFFICULTY: Difficulty = 10.0;

/// Difficulty that repeated reviews drift back towards.
pub const DEFAULT_DIFFICULTY: Difficulty = 5.0;

/// The stability scheduler's input and output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryCard {
    pub state: CardState,
    pub stability: Stability,
    pub difficulty: Difficulty,
    /// Whole days since the last review.
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    pub reps: u32,
    pub last_review: Option<Timestamp>,
    /// The interval before rounding and flooring.
    pub interval_raw: Interval,
}

impl MemoryCard {
    /// A card the memory model has never seen.
    pub fn new() -> Self {
        Self {
            state: CardState::New,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            last_review: None,
            interval_raw: 0.0,
        }
    }

    /// A Review-state card built from a persisted memory state.
    pub fn in_review(memory: &StabilityState, elapsed_days: u32) -> Self {
        Self {
            state: CardState::Review,
            stability: memory.stability,
            difficulty: memory.difficulty,
            elapsed_days,
            scheduled_days: memory.scheduled_days,
            reps: memory.reps,
            last_review: Some(memory.last_review),
            interval_raw: f64::from(memory.scheduled_days),
        }
    }
}

impl Default for MemoryCard {
    fn default() -> Self {
        Self::new()
    }
}

pub fn retrievability(t: Interval, s: Stability) -> Recall {
    let s = s.max(MIN_STABILITY);
    (1.0 + F * (t.max(0.0) / s)).powf(C)
}

/// Solves `retrievability(t, s) = r_d` for `t`.
pub fn interval(r_d: Recall, s: Stability) -> Interval {
    (s / F) * (r_d.powf(1.0 / C) - 1.0)
}

pub fn initial_stability(g: Grade) -> Stability {
    match g {
        Grade::Again => 0.4,
        Grade::Hard => 1.2,
        Grade::Good => 2.4,
        Grade::Easy => 3.6,
    }
}

pub fn initial_difficulty(g: Grade) -> Difficulty {
    match g {
        Grade::Again => 7.5,
        Grade::Hard => 6.5,
        Grade::Good => 5.0,
        Grade::Easy => 3.8,
    }
}

fn floor_s(s: Stability) -> Stability {
    if s.is_nan() {
        MIN_STABILITY
    } else {
        s.max(MIN_STABILITY)
    }
}

fn clamp_d(d: Difficulty) -> Difficulty {
    if d.is_nan() {
        DEFAULT_DIFFICULTY
    } else {
        d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }
}

fn s_success(w: &Weights, d: Difficulty, s: Stability, r: Recall) -> Stability {
    let t_d = 11.0 - d;
    let t_s = s.powf(-w.w(9));
    let t_r = f64::exp(w.w(10) * (1.0 - r)) - 1.0;
    let c = f64::exp(w.w(8));
    floor_s(s * (1.0 + c * t_d * t_s * t_r))
}

fn s_fail(w: &Weights, d: Difficulty, s: Stability, r: Recall) -> Stability {
    let d_f = d.powf(-w.w(12));
    let s_f = (s + 1.0).powf(w.w(13)) - 1.0;
    let r_f = f64::exp(w.w(14) * (1.0 - r));
    floor_s(w.w(11) * d_f * s_f * r_f)
}

pub fn new_stability(w: &Weights, d: Difficulty, s: Stability, r: Recall, g: Grade) -> Stability {
    if g == Grade::Again {
        s_fail(w, d, s, r)
    } else {
        s_success(w, d, s, r)
    }
}

/// Moves difficulty by the grade, then blends the result towards
/// [`DEFAULT_DIFFICULTY`] with weight `w_5`.
pub fn new_difficulty(w: &Weights, d: Difficulty, g: Grade) -> Difficulty {
    let g: f64 = g.into();
    let moved = d - w.w(6) * (g - 3.0);
    clamp_d(w.w(5) * DEFAULT_DIFFICULTY + (1.0 - w.w(5)) * moved)
}

fn round_days(raw: Interval, min: u32) -> u32 {
    // `as` saturates, and maps NaN to zero.
    (raw.round() as u32).max(min)
}

/// Computes the next memory state. The result is always stamped as reviewed
/// at `now`.
pub fn schedule(
    card: &MemoryCard,
    grade: Grade,
    now: Timestamp,
    config: &StabilityConfig,
) -> MemoryCard {
    let w = &config.weights;
    let mut next = match card.state {
        CardState::New => first_review(grade),
        CardState::Learning | CardState::Relearning => short_term_review(card, grade),
        CardState::Review => long_term_review(card, grade, w, config.target_retention()),
    };
    log::debug!(
        "stability scheduler: {} + {grade} -> {} (S {:.3} -> {:.3}, D {:.3} -> {:.3}, {} days)",
        card.state,
        next.state,
        card.stability,
        next.stability,
        card.difficulty,
        next.difficulty,
        next.scheduled_days
    );
    next.reps = card.reps.saturating_add(1);
    next.elapsed_days = 0;
    next.last_review = Some(now);
    next
}

fn first_review(grade: Grade) -> MemoryCard {
    let stability = initial_stability(grade);
    let difficulty = initial_difficulty(grade);
    let (state, interval_raw, min) = match grade {
        Grade::Again => (CardState::Learning, 0.0, 0),
        Grade::Hard => (CardState::Learning, 1.0, 1),
        Grade::Good => (CardState::Review, stability, 1),
        Grade::Easy => (CardState::Review, stability * 1.5, 2),
    };
    MemoryCard {
        state,
        stability,
        difficulty,
        scheduled_days: round_days(interval_raw, min),
        interval_raw,
        ..MemoryCard::new()
    }
}

/// Learning and Relearning. Hard keeps the card in whichever of the two it
/// is in; Good and Easy graduate it.
fn short_term_review(card: &MemoryCard, grade: Grade) -> MemoryCard {
    let (state, factor) = match grade {
        Grade::Again => (CardState::Relearning, 0.7),
        Grade::Hard => (card.state, 1.05),
        Grade::Good => (CardState::Review, 1.2),
        Grade::Easy => (CardState::Review, 1.6),
    };
    let stability = floor_s(card.stability * factor);
    let (interval_raw, min) = match grade {
        Grade::Again => (0.0, 0),
        Grade::Hard => (1.0, 1),
        Grade::Good => (stability * 1.2, 1),
        Grade::Easy => (stability * 1.6, 2),
    };
    MemoryCard {
        state,
        stability,
        difficulty: clamp_d(card.difficulty),
        scheduled_days: round_days(interval_raw, min),
        interval_raw,
        ..*card
    }
}

fn long_term_review(card: &MemoryCard, grade: Grade, w: &Weights, target: Recall) -> MemoryCard {
    // Reviewing early is treated as reviewing on schedule.
    let elapsed = card.elapsed_days.max(card.scheduled_days);
    let r = retrievability(f64::from(elapsed), card.stability);
    let difficulty = new_difficulty(w, clamp_d(card.difficulty), grade);
    let stability = new_stability(w, difficulty, floor_s(card.stability), r, grade);
    if grade == Grade::Again {
        MemoryCard {
            state: CardState::Relearning,
            stability,
            difficulty,
            scheduled_days: 0,
            interval_raw: 0.0,
            ..*card
        }
    } else {
        let interval_raw = interval(target, stability);
        MemoryCard {
            state: CardState::Review,
            stability,
            difficulty,
            scheduled_days: round_days(interval_raw, 1),
            interval_raw,
            ..*card
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Approximate equality.
    fn feq(a: f64, b: f64) -> bool {
        f64::abs(a - b) < 0.01
    }

    fn now() -> Timestamp {
        Timestamp::try_from("2024-05-01T08:00:00.000".to_string()).unwrap()
    }

    fn review_card(stability: Stability, difficulty: Difficulty, days: u32) -> MemoryCard {
        MemoryCard {
            state: CardState::Review,
            stability,
            difficulty,
            elapsed_days: days,
            scheduled_days: days,
            reps: 4,
            last_review: None,
            interval_raw: f64::from(days),
        }
    }

    fn with_state(state: CardState, stability: Stability) -> MemoryCard {
        MemoryCard {
            state,
            stability,
            difficulty: 6.0,
            reps: 1,
            ..MemoryCard::new()
        }
    }

    /// R_d = 0.9, I(S) = S.
    #[test]
    fn test_interval_equals_stability() {
        let samples = 100;
        let start = 0.1;
        let end = 5.0;
        let step = (end - start) / (samples as f64 - 1.0);
        for i in 0..samples {
            let s = start + (i as f64) * step;
            assert!(feq(interval(0.9, s), s))
        }
    }

    #[test]
    fn test_retrievability_at_zero() {
        assert_eq!(retrievability(0.0, 3.0), 1.0);
        assert_eq!(retrievability(-2.0, 3.0), 1.0);
    }

    #[test]
    fn test_new_card_seeds() {
        let cases = [
            (Grade::Again, CardState::Learning, 0.4, 7.5, 0),
            (Grade::Hard, CardState::Learning, 1.2, 6.5, 1),
            (Grade::Good, CardState::Review, 2.4, 5.0, 2),
            (Grade::Easy, CardState::Review, 3.6, 3.8, 5),
        ];
        for (grade, state, s, d, days) in cases {
            let next = schedule(&MemoryCard::new(), grade, now(), &StabilityConfig::default());
            assert_eq!(next.state, state, "{grade}");
            assert_eq!(next.stability, s);
            assert_eq!(next.difficulty, d);
            assert_eq!(next.scheduled_days, days, "{grade}");
            assert_eq!(next.reps, 1);
            assert_eq!(next.last_review, Some(now()));
        }
    }

    #[test]
    fn test_learning_branches() {
        let config = StabilityConfig::default();
        let card = with_state(CardState::Learning, 2.0);

        let again = schedule(&card, Grade::Again, now(), &config);
        assert_eq!(again.state, CardState::Relearning);
        assert!(feq(again.stability, 1.4));
        assert_eq!(again.scheduled_days, 0);

        let hard = schedule(&card, Grade::Hard, now(), &config);
        assert_eq!(hard.state, CardState::Learning);
        assert!(feq(hard.stability, 2.1));
        assert_eq!(hard.scheduled_days, 1);

        let good = schedule(&card, Grade::Good, now(), &config);
        assert_eq!(good.state, CardState::Review);
        assert!(feq(good.stability, 2.4));
        assert_eq!(good.scheduled_days, 3);

        let easy = schedule(&card, Grade::Easy, now(), &config);
        assert_eq!(easy.state, CardState::Review);
        assert!(feq(easy.stability, 3.2));
        assert_eq!(easy.scheduled_days, 5);

        assert_eq!(good.difficulty, card.difficulty);
        assert_eq!(easy.reps, 2);
    }

    #[test]
    fn test_relearning_hard_stays_relearning() {
        let card = with_state(CardState::Relearning, 1.0);
        let next = schedule(&card, Grade::Hard, now(), &StabilityConfig::default());
        assert_eq!(next.state, CardState::Relearning);
    }

    #[test]
    fn test_short_term_floors() {
        let config = StabilityConfig::default();
        let card = with_state(CardState::Relearning, 0.1);
        let again = schedule(&card, Grade::Again, now(), &config);
        assert_eq!(again.stability, MIN_STABILITY);
        let easy = schedule(&card, Grade::Easy, now(), &config);
        assert_eq!(easy.scheduled_days, 2);
    }

    #[test]
    fn test_review_lapse() {
        let card = review_card(10.0, 5.0, 10);
        let next = schedule(&card, Grade::Again, now(), &StabilityConfig::default());
        assert_eq!(next.state, CardState::Relearning);
        assert_eq!(next.scheduled_days, 0);
        assert!(next.stability < 10.0);
        assert!(next.stability >= MIN_STABILITY);
        assert!(next.difficulty > 5.0);
        assert_eq!(next.reps, 5);
    }

    #[test]
    fn test_review_success_grows_stability() {
        let card = review_card(10.0, 5.0, 10);
        for grade in [Grade::Hard, Grade::Good, Grade::Easy] {
            let next = schedule(&card, grade, now(), &StabilityConfig::default());
            assert_eq!(next.state, CardState::Review);
            assert!(next.stability > 10.0, "{grade}");
            assert!(next.scheduled_days >= 10, "{grade}");
        }
    }

    #[test]
    fn test_target_retention_roundtrip() {
        for target in [0.7, 0.8, 0.9, 0.95, 0.99] {
            let config = StabilityConfig {
                target_retention: target,
                ..StabilityConfig::default()
            };
            for grade in [Grade::Good, Grade::Easy] {
                let next = schedule(&review_card(7.5, 6.2, 8), grade, now(), &config);
                let r = retrievability(next.interval_raw, next.stability);
                assert!((r - target).abs() < 1e-6, "{target} {grade}: {r}");
            }
        }
    }

    #[test]
    fn test_early_review_counts_as_on_schedule() {
        let config = StabilityConfig::default();
        let on_time = review_card(10.0, 5.0, 10);
        let early = MemoryCard {
            elapsed_days: 2,
            ..on_time
        };
        assert_eq!(
            schedule(&early, Grade::Good, now(), &config),
            schedule(&on_time, Grade::Good, now(), &config)
        );
        let late = MemoryCard {
            elapsed_days: 30,
            ..on_time
        };
        let late = schedule(&late, Grade::Good, now(), &config);
        let on_time = schedule(&on_time, Grade::Good, now(), &config);
        assert!(late.stability > on_time.stability);
    }

    #[test]
    fn test_grade_monotonicity() {
        let config = StabilityConfig::default();
        for (s, d, days) in [(0.5, 1.0, 1), (3.0, 5.0, 3), (40.0, 9.5, 50), (200.0, 10.0, 180)] {
            let card = review_card(s, d, days);
            let days_for = |g| schedule(&card, g, now(), &config).scheduled_days;
            assert!(days_for(Grade::Easy) >= days_for(Grade::Good));
            assert!(days_for(Grade::Good) >= days_for(Grade::Hard));
        }
    }

    #[test]
    fn test_bounds_hold_for_all_states_and_grades() {
        let config = StabilityConfig::default();
        let states = [
            CardState::New,
            CardState::Learning,
            CardState::Review,
            CardState::Relearning,
        ];
        for state in states {
            for (s, d) in [(0.1, 1.0), (0.1, 10.0), (500.0, 1.0), (500.0, 10.0), (2.0, 5.0)] {
                let card = MemoryCard {
                    state,
                    stability: s,
                    difficulty: d,
                    elapsed_days: 3,
                    scheduled_days: 3,
                    ..MemoryCard::new()
                };
                for grade in Grade::ALL {
                    let next = schedule(&card, grade, now(), &config);
                    assert!(next.stability >= MIN_STABILITY);
                    assert!(next.stability.is_finite());
                    assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&next.difficulty));
                    assert_eq!(next.elapsed_days, 0);
                }
            }
        }
    }

    #[test]
    fn test_difficulty_drifts_to_default() {
        let w = Weights::default();
        assert!(feq(new_difficulty(&w, 5.0, Grade::Good), 5.0));
        assert!(new_difficulty(&w, 5.0, Grade::Easy) < 5.0);
        assert!(new_difficulty(&w, 5.0, Grade::Hard) > 5.0);
        assert!(new_difficulty(&w, 9.0, Grade::Good) < 9.0);
        assert!(new_difficulty(&w, 1.0, Grade::Good) > 1.0);
    }

    #[test]
    fn test_short_weight_vector_uses_neutral_values() {
        let config = StabilityConfig {
            weights: Weights::new(vec![]),
            ..StabilityConfig::default()
        };
        let card = review_card(5.0, 5.0, 5);
        for grade in Grade::ALL {
            let next = schedule(&card, grade, now(), &config);
            assert!(next.stability.is_finite());
            assert!(next.stability >= MIN_STABILITY);
        }
    }
}
