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

//! Day-granularity time arithmetic.
//!
//! Review intervals are counted in calendar days, not in multiples of 24
//! hours. How a day boundary is drawn (time zones, DST) is the caller's
//! business, so the schedulers go through this trait for every day-level
//! computation.

use crate::types::timestamp::Timestamp;

pub trait Calendar {
    /// The timestamp `days` calendar days after `from`.
    fn add_days(&self, from: Timestamp, days: u32) -> Timestamp;

    /// Whole calendar days between two timestamps. Negative when `to` is
    /// before `from`.
    fn days_between(&self, from: Timestamp, to: Timestamp) -> i64;
}

/// Treats timestamps as wall-clock local time: adding days keeps the time of
/// day, and day differences compare dates only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn add_days(&self, from: Timestamp, days: u32) -> Timestamp {
        from.with_date(from.date().add_days(days))
    }

    fn days_between(&self, from: Timestamp, to: Timestamp) -> i64 {
        from.date().days_until(to.date())
    }
}
