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

use crate::types::item_hash::Hasher;
use crate::types::item_hash::ItemHash;
use crate::types::item_kind::ItemKind;

/// A learning item: one reviewable fact from the curriculum.
#[derive(Clone, Debug)]
pub struct Item {
    /// The name of the lesson this item belongs to.
    lesson: String,
    kind: ItemKind,
    /// The side shown to the learner.
    prompt: String,
    /// The side the learner has to recall.
    answer: String,
    /// Optional explanation, shown after the answer.
    notes: Option<String>,
    /// The cached hash of the item's reviewable content.
    hash: ItemHash,
}

impl Item {
    pub fn new(
        lesson: String,
        kind: ItemKind,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        let prompt = prompt.into().trim().to_string();
        let answer = answer.into().trim().to_string();
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let hash = content_hash(kind, &prompt, &answer);
        Self {
            lesson,
            kind,
            prompt,
            answer,
            notes,
            hash,
        }
    }

    pub fn lesson(&self) -> &str {
        &self.lesson
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn hash(&self) -> ItemHash {
        self.hash
    }
}

/// The hash covers kind, prompt, and answer. Lesson membership and notes are
/// presentation details: editing them must not reset an item's schedule.
fn content_hash(kind: ItemKind, prompt: &str, answer: &str) -> ItemHash {
    let mut hasher = Hasher::new();
    match kind {
        ItemKind::Grammar => hasher.update(b"Grammar"),
        ItemKind::Vocabulary => hasher.update(b"Vocabulary"),
    }
    hasher.update(prompt.as_bytes());
    hasher.update(answer.as_bytes());
    hasher.finalize()
}
