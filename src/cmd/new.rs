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
use hybrid_srs_core::CardHash;
use hybrid_srs_core::SchedulerConfig;
use hybrid_srs_core::Timestamp;
use hybrid_srs_core::error::Fallible;
use hybrid_srs_core::error::fail;

use crate::store::save_card;

/// Creates a new card file. Refuses to overwrite an existing one.
pub fn create_card(
    path: &Path,
    question: &str,
    answer: &str,
    now: Timestamp,
    config: &SchedulerConfig,
) -> Fallible<Card> {
    if path.exists() {
        return fail(format!("card file already exists: {}", path.display()));
    }
    let card = Card::new(CardHash::of_content(question, answer), now, &config.steps);
    save_card(path, &card)?;
    log::debug!("Created card {}", card.id);
    Ok(card)
}
