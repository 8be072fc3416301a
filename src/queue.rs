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

use crate::types::item_hash::ItemHash;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// Filter review states down to the due queue: every entry whose next review
/// time has arrived, most overdue first. The sort is stable, so entries due
/// at the same instant keep their input order.
pub fn due_queue(
    entries: &[(ItemHash, ReviewState)],
    now: Timestamp,
) -> Vec<(ItemHash, ReviewState)> {
    let mut due: Vec<(ItemHash, ReviewState)> = entries
        .iter()
        .filter(|(_, state)| state.is_due(now))
        .copied()
        .collect();
    due.sort_by_key(|(_, state)| state.next_review_at);
    due
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use crate::error::Fallible;

    use super::*;

    fn ts(y: i32, mo: u32, d: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(y, mo, d, 9, 0, 0).unwrap())
    }

    fn hash(n: u8) -> Fallible<ItemHash> {
        let mut hex = "0".repeat(62);
        hex.push_str(&format!("{n:02}"));
        ItemHash::from_hex(&hex)
    }

    fn due_at(when: Timestamp) -> ReviewState {
        ReviewState::new(when)
    }

    #[test]
    fn test_overdue_and_due_now_are_returned_oldest_first() -> Fallible<()> {
        let now = ts(2026, 1, 15);
        let entries = vec![
            (hash(1)?, due_at(ts(2026, 1, 16))), // tomorrow
            (hash(2)?, due_at(ts(2026, 1, 14))), // yesterday
            (hash(3)?, due_at(ts(2026, 1, 15))), // today
        ];
        let due = due_queue(&entries, now);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].0, hash(2)?);
        assert_eq!(due[1].0, hash(3)?);
        Ok(())
    }

    #[test]
    fn test_boundary_is_inclusive() -> Fallible<()> {
        let now = ts(2026, 1, 15);
        let entries = vec![(hash(1)?, due_at(now))];
        assert_eq!(due_queue(&entries, now).len(), 1);
        Ok(())
    }

    #[test]
    fn test_ties_keep_input_order() -> Fallible<()> {
        let now = ts(2026, 1, 15);
        let when = ts(2026, 1, 10);
        let entries = vec![
            (hash(9)?, due_at(when)),
            (hash(1)?, due_at(when)),
            (hash(5)?, due_at(when)),
        ];
        let due = due_queue(&entries, now);
        let order: Vec<ItemHash> = due.into_iter().map(|(hash, _)| hash).collect();
        assert_eq!(order, vec![hash(9)?, hash(1)?, hash(5)?]);
        Ok(())
    }

    #[test]
    fn test_empty_input() {
        assert!(due_queue(&[], ts(2026, 1, 15)).is_empty());
    }

    #[test]
    fn test_nothing_due() -> Fallible<()> {
        let entries = vec![(hash(1)?, due_at(ts(2026, 2, 1)))];
        assert!(due_queue(&entries, ts(2026, 1, 15)).is_empty());
        Ok(())
    }
}
