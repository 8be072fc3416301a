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

use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::item::Item;
use crate::types::item_hash::ItemHash;
use crate::types::item_kind::ItemKind;

/// The course configuration file. Not a lesson, so the walker skips it.
pub const COURSE_FILE: &str = "course.toml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LessonFile {
    #[serde(default)]
    grammar: Vec<RawItem>,
    #[serde(default)]
    vocabulary: Vec<RawItem>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawItem {
    prompt: String,
    answer: String,
    notes: Option<String>,
}

/// Load every lesson file under the course directory. A lesson is a TOML
/// file, named by its file stem. Fails on unparseable files, blank prompts
/// or answers, and items that appear more than once.
pub fn load_curriculum(directory: &Path) -> Fallible<Vec<Item>> {
    let mut items = Vec::new();
    for entry in WalkDir::new(directory) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            if path.file_name().is_some_and(|name| name == COURSE_FILE) {
                continue;
            }
            let lesson = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default();
            let contents = read_to_string(path)?;
            items.extend(parse_lesson(&lesson, &contents)?);
        }
    }
    let mut seen: HashSet<ItemHash> = HashSet::new();
    for item in &items {
        if !seen.insert(item.hash()) {
            return fail(format!(
                "duplicate item: '{}' appears more than once",
                item.prompt()
            ));
        }
    }
    Ok(items)
}

/// Parse the items of a single lesson file.
pub fn parse_lesson(lesson: &str, contents: &str) -> Fallible<Vec<Item>> {
    let file: LessonFile = toml::from_str(contents)
        .map_err(|e| ErrorReport::new(format!("lesson '{lesson}': {e}")))?;
    let mut items = Vec::new();
    for raw in file.grammar {
        items.push(build_item(lesson, ItemKind::Grammar, raw)?);
    }
    for raw in file.vocabulary {
        items.push(build_item(lesson, ItemKind::Vocabulary, raw)?);
    }
    Ok(items)
}

fn build_item(lesson: &str, kind: ItemKind, raw: RawItem) -> Fallible<Item> {
    if raw.prompt.trim().is_empty() {
        return fail(format!("lesson '{lesson}': item with a blank prompt"));
    }
    if raw.answer.trim().is_empty() {
        return fail(format!(
            "lesson '{lesson}': '{}' has a blank answer",
            raw.prompt.trim()
        ));
    }
    Ok(Item::new(
        lesson.to_string(),
        kind,
        raw.prompt,
        raw.answer,
        raw.notes,
    ))
}
