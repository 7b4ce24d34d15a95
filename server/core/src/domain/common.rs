// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Identifiers and calendar helpers shared by every record type.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

record_id!(
    /// Identifier of a user account (admin, teacher or student).
    UserId
);
record_id!(FeeId);
record_id!(ExamResultId);
record_id!(ReportId);
record_id!(AttendanceId);
record_id!(HomeworkId);
record_id!(SubmissionId);
record_id!(AnnouncementId);

/// Calendar month, serialized by its English name ("January" .. "December").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.get(number.checked_sub(1)? as usize).copied()
    }

    pub fn of(date: DateTime<Utc>) -> Self {
        Self::ALL[date.month0() as usize]
    }

    pub fn current() -> Self {
        Self::of(Utc::now())
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Inclusive start and exclusive end of this month in `year`, in UTC.
    ///
    /// Returns `None` for years chrono cannot represent.
    pub fn bounds(self, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = NaiveDate::from_ymd_opt(year, self.number(), 1)?;
        let end = match self {
            Month::December => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            _ => NaiveDate::from_ymd_opt(year, self.number() + 1, 1)?,
        };
        Some((
            Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
            Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?),
        ))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Academic year label used by fees and results ("2026").
pub fn current_academic_year() -> String {
    Utc::now().year().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_serializes_by_name() {
        let json = serde_json::to_string(&Month::March).unwrap();
        assert_eq!(json, "\"March\"");
        let parsed: Month = serde_json::from_str("\"December\"").unwrap();
        assert_eq!(parsed, Month::December);
    }

    #[test]
    fn test_month_bounds_cover_whole_month() {
        let (start, end) = Month::February.bounds(2024).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-02-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let (start, end) = Month::December.bounds(2025).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_month_numbering() {
        assert_eq!(Month::January.number(), 1);
        assert_eq!(Month::from_number(12), Some(Month::December));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_record_id_roundtrips_through_string() {
        let id = UserId::new();
        let parsed = UserId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(UserId::from_string("not-a-uuid").is_err());
    }
}
