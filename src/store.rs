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

//! Card files and configuration files on disk.

use std::fs::read_to_string;
use std::fs::rename;
use std::fs::write;
use std::path::Path;

use hybrid_srs_core::Card;
use hybrid_srs_core::SchedulerConfig;
use hybrid_srs_core::error::ErrorReport;
use hybrid_srs_core::error::Fallible;
use hybrid_srs_core::error::fail;

pub fn load_card(path: &Path) -> Fallible<Card> {
    if !path.exists() {
        return fail(format!("card file does not exist: {}", path.display()));
    }
    log::debug!("Loading card from {}", path.display());
    let text = read_to_string(path)?;
    let card: Card = serde_json::from_str(&text)
        .map_err(|e| ErrorReport::new(format!("invalid card file {}: {e}", path.display())))?;
    Ok(card)
}

/// Writes the card next to its destination and renames it into place, so a
/// crash never leaves a half-written card behind.
pub fn save_card(path: &Path, card: &Card) -> Fallible<()> {
    log::debug!("Writing card to {}", path.display());
    let json = serde_json::to_string_pretty(card)?;
    let tmp = path.with_extension("json.tmp");
    write(&tmp, json)?;
    rename(&tmp, path)?;
    Ok(())
}

/// Loads the scheduler configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Fallible<SchedulerConfig> {
    match path {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            let text = read_to_string(path)?;
            SchedulerConfig::from_toml(&text)
        }
        None => {
            log::debug!("Using default configuration.");
            Ok(SchedulerConfig::default())
        }
    }
}
