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

use hybrid_srs_core::Timestamp;
use hybrid_srs_core::error::Fallible;

/// Parses `--now`, falling back to the local clock.
pub fn now_or(now: Option<String>) -> Fallible<Timestamp> {
    match now {
        Some(s) => Timestamp::try_from(s),
        None => Ok(Timestamp::now()),
    }
}

/// Short human-readable form of the time between two timestamps.
pub fn format_wait(from: Timestamp, to: Timestamp) -> String {
    let seconds = (to.into_inner() - from.into_inner()).num_seconds();
    if seconds <= 0 {
        return "now".to_string();
    }
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if minutes < 1 {
        format!("{seconds}s")
    } else if hours < 1 {
        format!("{minutes}m")
    } else if days < 1 {
        format!("{hours}h")
    } else if days < 30 {
        format!("{days}d")
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_format_wait() {
        let from = ts("2024-01-01T00:00:00.000");
        let cases = [
            ("2023-12-31T00:00:00.000", "now"),
            ("2024-01-01T00:00:00.000", "now"),
            ("2024-01-01T00:00:45.000", "45s"),
            ("2024-01-01T00:10:00.000", "10m"),
            ("2024-01-01T05:00:00.000", "5h"),
            ("2024-01-05T00:00:00.000", "4d"),
            ("2024-03-01T00:00:00.000", "2mo"),
            ("2026-01-01T00:00:00.000", "2y"),
        ];
        for (to, expected) in cases {
            assert_eq!(format_wait(from, ts(to)), expected);
        }
    }

    #[test]
    fn test_now_or() {
        let parsed = now_or(Some("2024-01-01T00:00:00.000".to_string())).unwrap();
        assert_eq!(parsed, ts("2024-01-01T00:00:00.000"));
        assert!(now_or(Some("soon".to_string())).is_err());
    }
}
