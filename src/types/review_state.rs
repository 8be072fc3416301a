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

use serde::Serialize;

use crate::scheduler::EaseFactor;
use crate::types::timestamp::Timestamp;

/// The scheduling state of one learning item.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// How quickly the item's intervals grow.
    pub ease_factor: EaseFactor,
    /// Days between the last review and the next one.
    pub interval: u32,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    /// When the item next becomes due.
    pub next_review_at: Timestamp,
    /// When the item was last reviewed, if ever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<Timestamp>,
}

impl ReviewState {
    /// The state of an item that has never been reviewed: due immediately.
    pub fn new(now: Timestamp) -> Self {
        Self {
            ease_factor: EaseFactor::INITIAL,
            interval: 0,
            repetitions: 0,
            next_review_at: now,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_review_at <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn ts(y: i32, mo: u32, d: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(y, mo, d, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_new_item_is_due_immediately() {
        let now = ts(2026, 1, 1);
        let state = ReviewState::new(now);
        assert!(state.is_due(now));
        assert_eq!(state.interval, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.last_reviewed_at, None);
    }

    #[test]
    fn test_is_due_boundaries() {
        let state = ReviewState::new(ts(2026, 1, 15));
        assert!(state.is_due(ts(2026, 1, 15)));
        assert!(state.is_due(ts(2026, 1, 16)));
        assert!(!state.is_due(ts(2026, 1, 14)));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_string(&ReviewState::new(ts(2026, 1, 1))).unwrap();
        assert!(json.contains("\"easeFactor\":2.5"));
        assert!(json.contains("\"interval\":0"));
        assert!(json.contains("\"repetitions\":0"));
        assert!(json.contains("\"nextReviewAt\":\"2026-01-01T09:00:00+00:00\""));
        assert!(!json.contains("lastReviewedAt"));
    }
}
