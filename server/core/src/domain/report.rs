// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Monthly student report and the summaries it is assembled from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::attendance::{AttendanceRecord, AttendanceStatus};
use crate::domain::common::{Month, ReportId, UserId};
use crate::domain::exam_result::ExamResult;
use crate::domain::fee::{Fee, FeeStatus};
use crate::domain::homework::Homework;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub late_days: u32,
    pub attendance_percentage: f64,
}

impl AttendanceSummary {
    /// Counts records by status. The percentage is left for derivation.
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let count = |status: AttendanceStatus| {
            records.iter().filter(|r| r.status == status).count() as u32
        };
        Self {
            total_days: records.len() as u32,
            present_days: count(AttendanceStatus::Present),
            absent_days: count(AttendanceStatus::Absent),
            late_days: count(AttendanceStatus::Late),
            attendance_percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkSummary {
    pub assigned: u32,
    pub submitted: u32,
    pub pending: u32,
    pub completion_rate: f64,
}

impl HomeworkSummary {
    /// Tallies which of `homeworks` the student has handed in.
    pub fn tally(homeworks: &[Homework], student: UserId) -> Self {
        let submitted = homeworks
            .iter()
            .filter(|hw| hw.submission_by(student).is_some())
            .count() as u32;
        let assigned = homeworks.len() as u32;
        Self {
            assigned,
            submitted,
            pending: assigned - submitted,
            completion_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcademicPerformance {
    pub average_marks: f64,
    pub total_exams: u32,
    pub highest_marks: f64,
    pub lowest_marks: f64,
}

impl AcademicPerformance {
    /// Average, best and worst percentage. Results without a percentage count as 0.
    pub fn from_results(results: &[ExamResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let percentages: Vec<f64> = results
            .iter()
            .map(|r| r.percentage.unwrap_or(0.0))
            .collect();
        let sum: f64 = percentages.iter().sum();
        Self {
            average_marks: sum / percentages.len() as f64,
            total_exams: percentages.len() as u32,
            highest_marks: percentages.iter().copied().fold(f64::MIN, f64::max),
            lowest_marks: percentages.iter().copied().fold(f64::MAX, f64::min),
        }
    }
}

/// Copy of a fee account's figures at report time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeSnapshot {
    pub total_fees: f64,
    pub paid_fees: f64,
    pub pending_fees: f64,
    pub status: FeeStatus,
}

impl From<Option<&Fee>> for FeeSnapshot {
    fn from(fee: Option<&Fee>) -> Self {
        match fee {
            Some(fee) => Self {
                total_fees: fee.total_fees,
                paid_fees: fee.paid_fees,
                pending_fees: fee.pending_fees,
                status: fee.status,
            },
            None => Self::default(),
        }
    }
}

/// One report per (student, month, year).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub student: UserId,
    pub month: Month,
    pub year: i32,
    pub academic_year: String,
    #[serde(default)]
    pub attendance: AttendanceSummary,
    #[serde(default)]
    pub academic_performance: AcademicPerformance,
    #[serde(default)]
    pub homework: HomeworkSummary,
    #[serde(default)]
    pub fees: FeeSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_remarks: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(student: UserId, month: Month, year: i32, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ReportId::new(),
            student,
            month,
            year,
            academic_year: year.to_string(),
            attendance: AttendanceSummary::default(),
            academic_performance: AcademicPerformance::default(),
            homework: HomeworkSummary::default(),
            fees: FeeSnapshot::default(),
            remarks: None,
            teacher_remarks: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Uniqueness key in the reports collection.
    pub fn key(&self) -> (UserId, Month, i32) {
        (self.student, self.month, self.year)
    }
}
