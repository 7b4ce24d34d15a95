// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{AttendanceId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// A student's attendance for a single day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student: UserId,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(
        student: UserId,
        date: DateTime<Utc>,
        status: AttendanceStatus,
        marked_by: UserId,
        remarks: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AttendanceId::new(),
            student,
            date,
            status,
            marked_by,
            remarks,
            created_at: now,
            updated_at: now,
        }
    }

    /// Calendar day the record belongs to; at most one record per student per day.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}
