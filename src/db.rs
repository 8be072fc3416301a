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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler;
use crate::scheduler::EaseFactor;
use crate::scheduler::Quality;
use crate::types::item_hash::ItemHash;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        log::debug!("Opening database at {database_path}.");
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// The set of items the database is tracking.
    pub fn tracked_items(&self) -> Fallible<HashSet<ItemHash>> {
        let mut hashes = HashSet::new();
        let mut stmt = self.conn.prepare("select item_hash from review_states;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let hash: ItemHash = row.get(0)?;
            hashes.insert(hash);
        }
        Ok(hashes)
    }

    /// Start tracking an item. Fails if the item is already tracked.
    pub fn insert_state(&self, item: ItemHash, state: &ReviewState) -> Fallible<()> {
        let sql = "insert into review_states (item_hash, ease_factor, interval, repetitions, next_review_at, last_reviewed_at) values (?, ?, ?, ?, ?, ?);";
        self.conn.execute(
            sql,
            (
                item,
                state.ease_factor,
                state.interval,
                state.repetitions,
                state.next_review_at,
                state.last_reviewed_at,
            ),
        )?;
        Ok(())
    }

    /// Stop tracking an item, dropping its state and review log.
    pub fn remove_state(&self, item: ItemHash) -> Fallible<()> {
        self.conn
            .execute("delete from review_states where item_hash = ?;", [item])?;
        Ok(())
    }

    /// Load one item's review state. Fails if the item is not tracked.
    pub fn get_state(&self, item: ItemHash) -> Fallible<ReviewState> {
        select_state(&self.conn, item)
    }

    /// Load every review state, ordered by item hash.
    pub fn all_states(&self) -> Fallible<Vec<(ItemHash, ReviewState)>> {
        let sql = "select item_hash, ease_factor, interval, repetitions, next_review_at, last_reviewed_at from review_states order by item_hash;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut states = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let hash: ItemHash = row.get(0)?;
            let state = ReviewState {
                ease_factor: row.get(1)?,
                interval: row.get(2)?,
                repetitions: row.get(3)?,
                next_review_at: row.get(4)?,
                last_reviewed_at: row.get(5)?,
            };
            states.push((hash, state));
        }
        Ok(states)
    }

    /// Apply one review: read the item's state, schedule the next review,
    /// and write the new state and a log entry in a single transaction.
    pub fn submit_review(
        &mut self,
        item: ItemHash,
        quality: Quality,
        now: Timestamp,
    ) -> Fallible<ReviewState> {
        let tx = self.conn.transaction()?;
        let state = select_state(&tx, item)?;
        let next = scheduler::schedule(&state, quality, now);
        update_state(&tx, item, &next)?;
        let row = ReviewRow {
            item_hash: item,
            reviewed_at: now,
            quality,
            interval: next.interval,
            ease_factor: next.ease_factor,
            next_review_at: next.next_review_at,
        };
        insert_review(&tx, &row)?;
        tx.commit()?;
        log::debug!(
            "Reviewed {}: q={} ease={:.2} interval={}d due={}",
            item.short_hex(),
            quality,
            next.ease_factor.into_inner(),
            next.interval,
            next.next_review_at
        );
        Ok(next)
    }

    /// Restart an item's schedule from scratch, keeping its review log.
    pub fn reset_state(&mut self, item: ItemHash, now: Timestamp) -> Fallible<ReviewState> {
        let tx = self.conn.transaction()?;
        let state = select_state(&tx, item)?;
        let fresh = scheduler::reset(&state, now);
        update_state(&tx, item, &fresh)?;
        tx.commit()?;
        log::debug!("Reset {}.", item.short_hex());
        Ok(fresh)
    }

    /// Count the reviews submitted at or after the given instant.
    pub fn review_count_since(&self, since: Timestamp) -> Fallible<usize> {
        // Timestamps are stored as RFC 3339 text with a fixed UTC offset, so
        // comparing them as text is chronological.
        let sql = "select count(*) from reviews where reviewed_at >= ?;";
        let count: i64 = self.conn.query_row(sql, [since], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count every logged review.
    pub fn review_count(&self) -> Fallible<usize> {
        let count: i64 = self
            .conn
            .query_row("select count(*) from reviews;", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

struct ReviewRow {
    item_hash: ItemHash,
    reviewed_at: Timestamp,
    quality: Quality,
    interval: u32,
    ease_factor: EaseFactor,
    next_review_at: Timestamp,
}

fn insert_review(conn: &Connection, review: &ReviewRow) -> Fallible<()> {
    let sql = "insert into reviews (item_hash, reviewed_at, quality, interval, ease_factor, next_review_at) values (?, ?, ?, ?, ?, ?);";
    conn.execute(
        sql,
        (
            review.item_hash,
            review.reviewed_at,
            review.quality,
            review.interval,
            review.ease_factor,
            review.next_review_at,
        ),
    )?;
    Ok(())
}

fn select_state(conn: &Connection, item: ItemHash) -> Fallible<ReviewState> {
    let sql = "select ease_factor, interval, repetitions, next_review_at, last_reviewed_at from review_states where item_hash = ?;";
    let state = conn
        .query_row(sql, [item], |row| {
            Ok(ReviewState {
                ease_factor: row.get(0)?,
                interval: row.get(1)?,
                repetitions: row.get(2)?,
                next_review_at: row.get(3)?,
                last_reviewed_at: row.get(4)?,
            })
        })
        .optional()?
        .ok_or_else(|| ErrorReport::new(format!("item not tracked: {}", item.short_hex())))?;
    Ok(state)
}

fn update_state(conn: &Connection, item: ItemHash, state: &ReviewState) -> Fallible<()> {
    let sql = "update review_states set ease_factor = ?, interval = ?, repetitions = ?, next_review_at = ?, last_reviewed_at = ? where item_hash = ?;";
    let updated = conn.execute(
        sql,
        (
            state.ease_factor,
            state.interval,
            state.repetitions,
            state.next_review_at,
            state.last_reviewed_at,
            item,
        ),
    )?;
    if updated == 0 {
        return fail(format!("item not tracked: {}", item.short_hex()));
    }
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["review_states"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    fn ts(y: i32, mo: u32, d: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(y, mo, d, 9, 0, 0).unwrap())
    }

    fn q(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    fn hash(n: u8) -> ItemHash {
        let mut hex = "0".repeat(62);
        hex.push_str(&format!("{n:02}"));
        ItemHash::from_hex(&hex).unwrap()
    }

    fn open(dir: &TempDir) -> Fallible<Database> {
        let path = dir.path().join("test.db");
        let path = path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        Database::new(path)
    }

    #[test]
    fn test_reopen_keeps_data() -> Fallible<()> {
        let dir = tempdir()?;
        let now = ts(2026, 1, 1);
        {
            let db = open(&dir)?;
            db.insert_state(hash(1), &ReviewState::new(now))?;
        }
        let db = open(&dir)?;
        assert!(db.tracked_items()?.contains(&hash(1)));
        Ok(())
    }

    #[test]
    fn test_insert_get_roundtrip() -> Fallible<()> {
        let dir = tempdir()?;
        let db = open(&dir)?;
        let state = ReviewState::new(ts(2026, 1, 1));
        db.insert_state(hash(1), &state)?;
        assert_eq!(db.get_state(hash(1))?, state);
        Ok(())
    }

    #[test]
    fn test_duplicate_insert_fails() -> Fallible<()> {
        let dir = tempdir()?;
        let db = open(&dir)?;
        let state = ReviewState::new(ts(2026, 1, 1));
        db.insert_state(hash(1), &state)?;
        assert!(db.insert_state(hash(1), &state).is_err());
        Ok(())
    }

    #[test]
    fn test_untracked_item_fails() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        let err = db.get_state(hash(9)).unwrap_err();
        assert!(err.to_string().contains("not tracked"));
        assert!(db.submit_review(hash(9), q(4), ts(2026, 1, 1)).is_err());
        assert!(db.reset_state(hash(9), ts(2026, 1, 1)).is_err());
        Ok(())
    }

    #[test]
    fn test_tracked_items() -> Fallible<()> {
        let dir = tempdir()?;
        let db = open(&dir)?;
        let state = ReviewState::new(ts(2026, 1, 1));
        db.insert_state(hash(1), &state)?;
        db.insert_state(hash(2), &state)?;
        let tracked = db.tracked_items()?;
        assert_eq!(tracked.len(), 2);
        assert!(tracked.contains(&hash(1)));
        assert!(tracked.contains(&hash(2)));
        Ok(())
    }

    #[test]
    fn test_submit_review() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        let now = ts(2026, 1, 1);
        db.insert_state(hash(1), &ReviewState::new(now))?;
        let next = db.submit_review(hash(1), q(4), now)?;
        assert_eq!(next.interval, 1);
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.last_reviewed_at, Some(now));
        // The stored state round-trips exactly.
        assert_eq!(db.get_state(hash(1))?, next);
        assert_eq!(db.review_count()?, 1);
        Ok(())
    }

    #[test]
    fn test_review_count_since() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        db.insert_state(hash(1), &ReviewState::new(ts(2026, 1, 1)))?;
        db.submit_review(hash(1), q(2), ts(2026, 1, 1))?;
        db.submit_review(hash(1), q(4), ts(2026, 1, 3))?;
        assert_eq!(db.review_count_since(ts(2026, 1, 1))?, 2);
        assert_eq!(db.review_count_since(ts(2026, 1, 2))?, 1);
        assert_eq!(db.review_count_since(ts(2026, 1, 4))?, 0);
        Ok(())
    }

    #[test]
    fn test_remove_cascades_to_reviews() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        let now = ts(2026, 1, 1);
        db.insert_state(hash(1), &ReviewState::new(now))?;
        db.submit_review(hash(1), q(4), now)?;
        db.remove_state(hash(1))?;
        assert!(db.tracked_items()?.is_empty());
        assert_eq!(db.review_count()?, 0);
        Ok(())
    }

    #[test]
    fn test_reset_state() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = open(&dir)?;
        db.insert_state(hash(1), &ReviewState::new(ts(2026, 1, 1)))?;
        db.submit_review(hash(1), q(5), ts(2026, 1, 1))?;
        let reviewed = db.submit_review(hash(1), q(5), ts(2026, 1, 2))?;
        assert_eq!(reviewed.repetitions, 2);

        let fresh = db.reset_state(hash(1), ts(2026, 1, 3))?;
        assert_eq!(fresh.interval, 0);
        assert_eq!(fresh.repetitions, 0);
        assert_eq!(fresh.ease_factor, EaseFactor::INITIAL);
        assert_eq!(fresh.next_review_at, ts(2026, 1, 3));
        assert_eq!(fresh.last_reviewed_at, Some(ts(2026, 1, 2)));
        assert_eq!(db.get_state(hash(1))?, fresh);
        // The review log survives a reset.
        assert_eq!(db.review_count()?, 2);
        Ok(())
    }

    #[test]
    fn test_corrupt_state_is_rejected_on_load() -> Fallible<()> {
        let dir = tempdir()?;
        let db = open(&dir)?;
        db.insert_state(hash(1), &ReviewState::new(ts(2026, 1, 1)))?;

        let raw = Connection::open(dir.path().join("test.db"))?;
        raw.execute("update review_states set ease_factor = 0.5;", [])?;
        let err = db.get_state(hash(1)).unwrap_err();
        assert!(err.to_string().contains("invalid ease factor"));

        raw.execute(
            "update review_states set ease_factor = 2.5, interval = -3;",
            [],
        )?;
        assert!(db.get_state(hash(1)).is_err());
        Ok(())
    }
}
