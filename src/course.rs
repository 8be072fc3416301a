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

use std::collections::HashMap;
use std::collections::HashSet;
use std::env::current_dir;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use serde::Deserialize;

use crate::curriculum::COURSE_FILE;
use crate::curriculum::load_curriculum;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::queue::due_queue;
use crate::types::item::Item;
use crate::types::item_hash::ItemHash;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// The database file, created next to the lesson files.
const DATABASE_FILE: &str = "langcards.db";

pub struct Course {
    pub name: String,
    pub db: Database,
    pub items: Vec<Item>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CourseFile {
    course: CourseSection,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CourseSection {
    name: String,
}

impl Course {
    /// Open the course in the given directory (default: the current one),
    /// loading the curriculum and bringing the database in line with it.
    pub fn new(directory: Option<String>, now: Timestamp) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let name = course_name(&directory)?;

        let db_path: PathBuf = directory.join(DATABASE_FILE);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let items = {
            log::debug!("Loading curriculum...");
            let start = Instant::now();
            let items = load_curriculum(&directory)?;
            let end = Instant::now();
            let duration = end.duration_since(start).as_millis();
            log::debug!("Loaded {} items in {duration}ms.", items.len());
            items
        };

        reconcile(&db, &items, now)?;

        Ok(Self { name, db, items })
    }

    /// The items due for review, most overdue first.
    pub fn due_items(&self, now: Timestamp) -> Fallible<Vec<(Item, ReviewState)>> {
        let states = self.db.all_states()?;
        let mut by_hash: HashMap<ItemHash, &Item> = HashMap::new();
        for item in &self.items {
            by_hash.insert(item.hash(), item);
        }
        let mut due = Vec::new();
        for (hash, state) in due_queue(&states, now) {
            let item = by_hash.get(&hash).ok_or_else(|| {
                ErrorReport::new(format!("no item for state {}", hash.short_hex()))
            })?;
            due.push(((*item).clone(), state));
        }
        Ok(due)
    }

    /// Find the single item whose hash starts with the given prefix.
    pub fn find_item(&self, prefix: &str) -> Fallible<&Item> {
        let prefix = prefix.to_lowercase();
        let matches: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| item.hash().to_hex().starts_with(&prefix))
            .collect();
        if matches.is_empty() {
            return fail(format!("no item matches '{prefix}'"));
        }
        if matches.len() > 1 {
            return fail(format!(
                "'{prefix}' is ambiguous: {} items match",
                matches.len()
            ));
        }
        Ok(matches[0])
    }
}

/// Bring the database in line with the curriculum.
fn reconcile(db: &Database, items: &[Item], now: Timestamp) -> Fallible<()> {
    let tracked: HashSet<ItemHash> = db.tracked_items()?;
    let current: HashSet<ItemHash> = items.iter().map(|item| item.hash()).collect();
    // In the database but not in the curriculum: the item was deleted, so
    // drop its state.
    let mut deleted = 0;
    for hash in tracked.difference(&current) {
        db.remove_state(*hash)?;
        deleted += 1;
    }
    // In the curriculum but not in the database: the item is new, so it
    // starts immediately due.
    let mut added = 0;
    for hash in current.difference(&tracked) {
        db.insert_state(*hash, &ReviewState::new(now))?;
        added += 1;
    }
    log::debug!("Reconciled: {added} new items, {deleted} deleted.");
    Ok(())
}

/// The course name: from course.toml if present, else the directory name.
fn course_name(directory: &Path) -> Fallible<String> {
    let path = directory.join(COURSE_FILE);
    if path.exists() {
        let contents = read_to_string(path)?;
        let file: CourseFile = toml::from_str(&contents)?;
        Ok(file.course.name)
    } else {
        Ok(directory
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "course".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs::remove_file;
    use std::fs::write;

    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::TempDir;
    use tempfile::tempdir;

    use crate::scheduler::Quality;
    use crate::types::item_kind::ItemKind;

    use super::*;

    fn ts(y: i32, mo: u32, d: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(y, mo, d, 9, 0, 0).unwrap())
    }

    fn dir_string(dir: &TempDir) -> Option<String> {
        Some(dir.path().display().to_string())
    }

    fn write_lessons(dir: &TempDir) -> Fallible<()> {
        write(
            dir.path().join("food.toml"),
            "[[vocabulary]]\nprompt = \"der Apfel\"\nanswer = \"the apple\"\n",
        )?;
        write(
            dir.path().join("travel.toml"),
            "[[vocabulary]]\nprompt = \"der Zug\"\nanswer = \"the train\"\n",
        )?;
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let result = Course::new(Some("./derpherp".to_string()), ts(2026, 1, 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_course() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        let course = Course::new(dir_string(&dir), ts(2026, 1, 1))?;
        assert_eq!(course.items.len(), 2);
        let tracked = course.db.tracked_items()?;
        assert!(course.items.iter().all(|item| tracked.contains(&item.hash())));
        Ok(())
    }

    #[test]
    fn test_course_name_from_directory() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        let course = Course::new(dir_string(&dir), ts(2026, 1, 1))?;
        let want = dir
            .path()
            .canonicalize()?
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        assert_eq!(Some(course.name), want);
        Ok(())
    }

    #[test]
    fn test_course_name_from_course_file() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        write(
            dir.path().join("course.toml"),
            "[course]\nname = \"German A2\"\n",
        )?;
        let course = Course::new(dir_string(&dir), ts(2026, 1, 1))?;
        assert_eq!(course.name, "German A2");
        Ok(())
    }

    #[test]
    fn test_deleted_lesson_is_pruned() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        {
            let course = Course::new(dir_string(&dir), ts(2026, 1, 1))?;
            assert_eq!(course.db.tracked_items()?.len(), 2);
        }
        remove_file(dir.path().join("travel.toml"))?;
        let course = Course::new(dir_string(&dir), ts(2026, 1, 2))?;
        let tracked = course.db.tracked_items()?;
        assert_eq!(tracked.len(), 1);
        assert!(tracked.contains(&course.items[0].hash()));
        Ok(())
    }

    #[test]
    fn test_state_survives_reopen() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        // Identity is content-addressed, so an identical item has the same
        // hash as the one loaded from the lesson file.
        let apple = Item::new(
            "food".to_string(),
            ItemKind::Vocabulary,
            "der Apfel",
            "the apple",
            None,
        )
        .hash();
        let reviewed = {
            let mut course = Course::new(dir_string(&dir), ts(2026, 1, 1))?;
            course
                .db
                .submit_review(apple, Quality::new(5)?, ts(2026, 1, 1))?
        };
        let course = Course::new(dir_string(&dir), ts(2026, 1, 2))?;
        assert_eq!(course.db.get_state(apple)?, reviewed);
        Ok(())
    }

    #[test]
    fn test_due_items_excludes_reviewed() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        let now = ts(2026, 1, 1);
        let mut course = Course::new(dir_string(&dir), now)?;
        assert_eq!(course.due_items(now)?.len(), 2);

        let hash = course.items[0].hash();
        course.db.submit_review(hash, Quality::new(4)?, now)?;
        let due = course.due_items(now)?;
        assert_eq!(due.len(), 1);
        assert_ne!(due[0].0.hash(), hash);
        Ok(())
    }

    #[test]
    fn test_find_item_by_prefix() -> Fallible<()> {
        let dir = tempdir()?;
        write_lessons(&dir)?;
        let course = Course::new(dir_string(&dir), ts(2026, 1, 1))?;
        let hash = course.items[0].hash();

        let found = course.find_item(&hash.to_hex())?;
        assert_eq!(found.hash(), hash);
        let found = course.find_item(&hash.short_hex().to_uppercase())?;
        assert_eq!(found.hash(), hash);

        assert!(course.find_item("").is_err()); // matches both
        assert!(course.find_item("zz").is_err()); // not hex
        Ok(())
    }
}
