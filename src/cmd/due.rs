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

use clap::ValueEnum;
use serde::Serialize;

use crate::course::Course;
use crate::error::Fallible;
use crate::types::item_hash::ItemHash;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum DueFormat {
    /// Plain text listing.
    Text,
    /// JSON output.
    Json,
}

impl Display for DueFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DueFormat::Text => write!(f, "text"),
            DueFormat::Json => write!(f, "json"),
        }
    }
}

/// Print the due queue, most overdue first.
pub fn print_due_queue(directory: Option<String>, format: DueFormat) -> Fallible<()> {
    let now = Timestamp::now();
    let course = Course::new(directory, now)?;
    let due = course.due_items(now)?;
    match format {
        DueFormat::Text => {
            if due.is_empty() {
                println!("No items due.");
            }
            for (item, state) in &due {
                println!(
                    "{}  {}  {:<10}  [{}] {}",
                    item.hash().short_hex(),
                    state.next_review_at,
                    item.kind().as_str(),
                    item.lesson(),
                    item.prompt()
                );
            }
        }
        DueFormat::Json => {
            let entries: Vec<DueEntry> = due
                .iter()
                .map(|(item, state)| DueEntry {
                    hash: item.hash(),
                    lesson: item.lesson().to_string(),
                    kind: item.kind().as_str().to_string(),
                    prompt: item.prompt().to_string(),
                    state: *state,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DueEntry {
    hash: ItemHash,
    lesson: String,
    kind: String,
    prompt: String,
    state: ReviewState,
}
