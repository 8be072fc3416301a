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

use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveTime;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;
use serde::Serializer;

/// A UTC instant. All scheduling arithmetic happens in UTC.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    #[cfg(test)]
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// The same instant, moved forward a whole number of days. Saturates at
    /// the end of the representable range.
    pub fn plus_days(self, days: u32) -> Self {
        let shifted = self
            .0
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(shifted)
    }

    /// Midnight at the start of this instant's UTC day.
    pub fn start_of_day(self) -> Self {
        Self(self.0.date_naive().and_time(NaiveTime::MIN).and_utc())
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let str = self.0.to_rfc3339();
        Ok(ToSqlOutput::from(str))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        let ts =
            DateTime::parse_from_rfc3339(&string).map_err(|e| FromSqlError::Other(Box::new(e)))?;
        let ts = ts.with_timezone(&Utc);
        Ok(Timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    #[test]
    fn test_plus_days() {
        assert_eq!(ts(2026, 1, 30, 9, 0).plus_days(1), ts(2026, 1, 31, 9, 0));
        assert_eq!(ts(2026, 1, 30, 9, 0).plus_days(6), ts(2026, 2, 5, 9, 0));
        assert_eq!(ts(2026, 1, 30, 9, 0).plus_days(0), ts(2026, 1, 30, 9, 0));
    }

    #[test]
    fn test_plus_days_saturates() {
        let far = ts(2026, 1, 30, 9, 0).plus_days(u32::MAX);
        assert_eq!(far, Timestamp::new(DateTime::<Utc>::MAX_UTC));
        assert_eq!(far.plus_days(1), far);
    }

    #[test]
    fn test_ordering() {
        assert!(ts(2026, 1, 1, 0, 0) < ts(2026, 1, 1, 0, 1));
        assert!(ts(2025, 12, 31, 23, 59) < ts(2026, 1, 1, 0, 0));
    }

    #[test]
    fn test_start_of_day() {
        assert_eq!(ts(2026, 3, 14, 15, 9).start_of_day(), ts(2026, 3, 14, 0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(ts(2026, 3, 14, 15, 9).to_string(), "2026-03-14 15:09");
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ts(2026, 3, 14, 15, 9)).unwrap();
        assert_eq!(json, "\"2026-03-14T15:09:00+00:00\"");
    }
}
