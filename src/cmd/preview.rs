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

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use clap::ValueEnum;
use hybrid_srs_core::Card;
use hybrid_srs_core::CardState;
use hybrid_srs_core::Grade;
use hybrid_srs_core::HybridScheduler;
use hybrid_srs_core::Timestamp;
use hybrid_srs_core::error::Fallible;
use serde::Serialize;

use crate::store::load_card;
use crate::utils::format_wait;

#[derive(ValueEnum, Clone)]
pub enum PreviewFormat {
    /// One line per grade.
    Text,
    /// JSON output.
    Json,
}

impl Display for PreviewFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewFormat::Text => write!(f, "text"),
            PreviewFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOutcome {
    grade: Grade,
    state: CardState,
    interval_days: u32,
    due: Timestamp,
    wait: String,
}

/// What each grade would do to `card`.
pub fn preview_card(
    card: &Card,
    now: Timestamp,
    scheduler: &HybridScheduler,
) -> Vec<GradeOutcome> {
    let preview = scheduler.preview(card, now);
    Grade::ALL
        .into_iter()
        .map(|grade| {
            let next = preview.get(grade);
            GradeOutcome {
                grade,
                state: next.state(),
                interval_days: next.schedule.interval_days(),
                due: next.due(),
                wait: format_wait(now, next.due()),
            }
        })
        .collect()
}

pub fn print_preview(
    path: &Path,
    now: Timestamp,
    scheduler: &HybridScheduler,
    format: PreviewFormat,
) -> Fallible<()> {
    let card = load_card(path)?;
    let outcomes = preview_card(&card, now, scheduler);
    match format {
        PreviewFormat::Text => {
            print!("{}: {}", card.id, card.state());
            if let Some(r) = card.retrievability(now, scheduler.calendar()) {
                print!(", recall {:.0}%", r * 100.0);
            }
            println!();
            for outcome in outcomes {
                println!(
                    "{:>5}  {:<10}  {:>4}  {}",
                    outcome.grade.as_str(),
                    outcome.state.as_str(),
                    outcome.wait,
                    outcome.due
                );
            }
        }
        PreviewFormat::Json => {
            let json = serde_json::to_string_pretty(&outcomes)?;
            println!("{}", json);
        }
    }
    Ok(())
}
