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

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// The lowest quality that counts as a successful recall.
const PASSING_QUALITY: u8 = 3;

/// The ease factor of an item that has never been reviewed.
const INITIAL_EASE_FACTOR: f64 = 2.5;

/// The floor below which no amount of lapsing can push an ease factor.
const EASE_FACTOR_FLOOR: f64 = 1.3;

/// The interval after the first successful review, in days.
const FIRST_INTERVAL: u32 = 1;

/// The interval after the second consecutive successful review, in days.
const SECOND_INTERVAL: u32 = 6;

/// A review outcome on the 0..=5 scale: 0 is a total blackout, 5 a perfect
/// recall. Qualities below 3 are lapses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Quality(u8);

impl Quality {
    /// No recall at all.
    pub const BLACKOUT: Quality = Quality(0);
    /// Recalled, with serious difficulty.
    pub const HARD: Quality = Quality(3);
    /// Recalled after a hesitation.
    pub const GOOD: Quality = Quality(4);
    /// Perfect recall.
    pub const EASY: Quality = Quality(5);

    pub fn new(value: u8) -> Fallible<Self> {
        if value > 5 {
            return fail(format!("quality out of range: {value}"));
        }
        Ok(Self(value))
    }

    pub fn into_inner(self) -> u8 {
        self.0
    }

    /// Whether this outcome resets the repetition streak.
    pub fn is_lapse(self) -> bool {
        self.0 < PASSING_QUALITY
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Quality {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

/// An item's ease factor: the multiplier its interval grows by after each
/// successful review past the second. Never below 1.3.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct EaseFactor(f64);

impl EaseFactor {
    /// The ease factor assigned to items entering the schedule.
    pub const INITIAL: EaseFactor = EaseFactor(INITIAL_EASE_FACTOR);

    pub fn new(value: f64) -> Fallible<Self> {
        if !value.is_finite() || value < EASE_FACTOR_FLOOR {
            return fail(format!("invalid ease factor: {value}"));
        }
        Ok(Self(value))
    }

    pub fn into_inner(self) -> f64 {
        self.0
    }

    fn clamped(value: f64) -> Self {
        Self(value.max(EASE_FACTOR_FLOOR))
    }
}

impl ToSql for EaseFactor {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for EaseFactor {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value: f64 = FromSql::column_result(value)?;
        EaseFactor::new(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Compute the state an item moves to after a review.
///
/// A lapse (quality below 3) resets the repetition streak and makes the item
/// due again immediately. A success advances the streak: the first earns a
/// one-day interval, the second six days, and every one after that widens
/// the previous interval by the ease factor the item carried into this
/// review. The ease factor itself moves on every review, lapse or not: up
/// for high qualities, down for low ones.
pub fn schedule(state: &ReviewState, quality: Quality, now: Timestamp) -> ReviewState {
    let (interval, repetitions) = if quality.is_lapse() {
        (0, 0)
    } else {
        let interval = match state.repetitions {
            0 => FIRST_INTERVAL,
            1 => SECOND_INTERVAL,
            _ => grown_interval(state.interval, state.ease_factor),
        };
        (interval, state.repetitions + 1)
    };
    ReviewState {
        ease_factor: next_ease_factor(state.ease_factor, quality),
        interval,
        repetitions,
        next_review_at: now.plus_days(interval),
        last_reviewed_at: Some(now),
    }
}

/// Wipe an item's schedule back to the just-added state, keeping only the
/// record of when it was last reviewed. Idempotent for a fixed clock.
pub fn reset(state: &ReviewState, now: Timestamp) -> ReviewState {
    ReviewState {
        ease_factor: EaseFactor::INITIAL,
        interval: 0,
        repetitions: 0,
        next_review_at: now,
        last_reviewed_at: state.last_reviewed_at,
    }
}

/// The widened interval of an item past its second repetition. Ties round
/// away from zero, so 12.5 days becomes 13.
fn grown_interval(interval: u32, ease_factor: EaseFactor) -> u32 {
    // The cast saturates, keeping absurdly distant schedules finite.
    (f64::from(interval) * ease_factor.into_inner()).round() as u32
}

/// The adjusted ease factor after a review, per the SM-2 curve: quality 4
/// leaves it unchanged, 5 raises it by 0.1, lower qualities pull it down by
/// as much as 0.8.
fn next_ease_factor(ease_factor: EaseFactor, quality: Quality) -> EaseFactor {
    let q = f64::from(quality.into_inner());
    let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    EaseFactor::clamped(ease_factor.into_inner() + delta)
}
