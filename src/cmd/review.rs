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

use std::path::Path;

use hybrid_srs_core::Card;
use hybrid_srs_core::Grade;
use hybrid_srs_core::HybridScheduler;
use hybrid_srs_core::Timestamp;
use hybrid_srs_core::error::Fallible;
use hybrid_srs_core::error::fail;

use crate::store::load_card;
use crate::store::save_card;

/// Records a review of the card at `path` and writes back the rescheduled
/// card.
pub fn review_card(
    path: &Path,
    grade: Grade,
    now: Timestamp,
    scheduler: &HybridScheduler,
) -> Fallible<Card> {
    let mut card = load_card(path)?;
    if let Some(last) = card.review_history.last() {
        if *last > now {
            return fail(format!(
                "review time {now} is before the last review at {last}."
            ));
        }
    }
    card.review_history.push(now);
    let card = scheduler.review(&card, grade, now);
    save_card(path, &card)?;
    log::debug!(
        "Reviewed {} as {grade}: now {}, due {}",
        card.id,
        card.state(),
        card.due()
    );
    Ok(card)
}
