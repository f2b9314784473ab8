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

use std::path::PathBuf;

use clap::Parser;
use hybrid_srs_core::Grade;
use hybrid_srs_core::HybridScheduler;
use hybrid_srs_core::error::Fallible;

use crate::cmd::config::print_config;
use crate::cmd::new::create_card;
use crate::cmd::preview::PreviewFormat;
use crate::cmd::preview::print_preview;
use crate::cmd::review::review_card;
use crate::store::load_config;
use crate::utils::format_wait;
use crate::utils::now_or;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Create a new card file.
    New {
        /// Path of the card file to create.
        path: PathBuf,
        /// Question text. Together with the answer it determines the card's identity.
        #[arg(long)]
        question: String,
        /// Answer text.
        #[arg(long)]
        answer: String,
        /// Creation time, as YYYY-MM-DDTHH:MM:SS.sss. By default, the current local time.
        #[arg(long)]
        now: Option<String>,
        /// Path to a TOML scheduler configuration. By default, built-in defaults are used.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Record a review and reschedule the card.
    Review {
        /// Path of the card file.
        path: PathBuf,
        /// How well the card was recalled: again, hard, good or easy (or 1-4).
        #[arg(long, value_parser = parse_grade)]
        grade: Grade,
        /// Review time, as YYYY-MM-DDTHH:MM:SS.sss. By default, the current local time.
        #[arg(long)]
        now: Option<String>,
        /// Path to a TOML scheduler configuration. By default, built-in defaults are used.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show what each grade would do to a card, without changing it.
    Preview {
        /// Path of the card file.
        path: PathBuf,
        /// Preview time, as YYYY-MM-DDTHH:MM:SS.sss. By default, the current local time.
        #[arg(long)]
        now: Option<String>,
        /// Path to a TOML scheduler configuration. By default, built-in defaults are used.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Which output format to use.
        #[arg(long, default_value_t = PreviewFormat::Text)]
        format: PreviewFormat,
    },
    /// Print the scheduler configuration as TOML.
    Config {
        /// Path to a TOML scheduler configuration to validate and print. By default, the
        /// built-in defaults are printed.
        path: Option<PathBuf>,
    },
}

fn parse_grade(s: &str) -> Result<Grade, String> {
    Grade::try_from(s.to_lowercase()).map_err(|e| e.to_string())
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::New {
            path,
            question,
            answer,
            now,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let card = create_card(&path, &question, &answer, now_or(now)?, &config)?;
            println!("{}: {}", card.id, card.state());
            Ok(())
        }
        Command::Review {
            path,
            grade,
            now,
            config,
        } => {
            let now = now_or(now)?;
            let scheduler = HybridScheduler::new(load_config(config.as_deref())?);
            let card = review_card(&path, grade, now, &scheduler)?;
            println!(
                "{}: {}, due {} (in {})",
                card.id,
                card.state(),
                card.due(),
                format_wait(now, card.due())
            );
            Ok(())
        }
        Command::Preview {
            path,
            now,
            config,
            format,
        } => {
            let scheduler = HybridScheduler::new(load_config(config.as_deref())?);
            print_preview(&path, now_or(now)?, &scheduler, format)
        }
        Command::Config { path } => print_config(path.as_deref()),
    }
}
