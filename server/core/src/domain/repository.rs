// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Repository contracts
//!
//! One repository per record family, defined here and implemented in
//! `crate::infrastructure::repositories`.
//!
//! | Trait | Record | Implementations |
//! |-------|--------|----------------|
//! | `UserRepository` | `User` | `InMemoryUserRepository`, `PostgresUserRepository` |
//! | `FeeRepository` | `Fee` | `InMemoryFeeRepository`, `PostgresFeeRepository` |
//! | `ExamResultRepository` | `ExamResult` | `InMemoryExamResultRepository`, `PostgresExamResultRepository` |
//! | `ReportRepository` | `Report` | `InMemoryReportRepository`, `PostgresReportRepository` |
//! | `AttendanceRepository` | `AttendanceRecord` | `InMemoryAttendanceRepository`, `PostgresAttendanceRepository` |
//! | `HomeworkRepository` | `Homework` | `InMemoryHomeworkRepository`, `PostgresHomeworkRepository` |
//! | `AnnouncementRepository` | `Announcement` | `InMemoryAnnouncementRepository`, `PostgresAnnouncementRepository` |
//!
//! Repositories store whatever they are handed. Derived fields are the
//! caller's job (see `crate::domain::derivation`).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::announcement::{Announcement, AnnouncementType, Audience};
use crate::domain::attendance::AttendanceRecord;
use crate::domain::common::{
    AnnouncementId, ExamResultId, FeeId, HomeworkId, Month, ReportId, UserId,
};
use crate::domain::exam_result::{ExamResult, ExamType, Semester, Subject};
use crate::domain::fee::Fee;
use crate::domain::homework::{Homework, HomeworkStatus};
use crate::domain::report::Report;
use crate::domain::user::{Role, User};

/// Storage backend selected at startup.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Save user (create or update). Fails with `Duplicate` on a taken username.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait FeeRepository: Send + Sync {
    async fn save(&self, fee: &Fee) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: FeeId) -> Result<Option<Fee>, RepositoryError>;

    /// All fees, newest first.
    async fn list_all(&self) -> Result<Vec<Fee>, RepositoryError>;

    /// Fees of one student, newest first.
    async fn find_by_student(&self, student: UserId) -> Result<Vec<Fee>, RepositoryError>;

    async fn find_by_student_and_month(
        &self,
        student: UserId,
        month: Month,
    ) -> Result<Option<Fee>, RepositoryError>;

    /// Sum of `paid_fees` over every fee account.
    async fn total_paid(&self) -> Result<f64, RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct ExamResultFilter {
    pub student: Option<UserId>,
    pub subject: Option<Subject>,
    pub exam_type: Option<ExamType>,
    pub academic_year: Option<String>,
    pub semester: Option<Semester>,
    /// Half-open `[start, end)` window on the exam date.
    pub exam_date_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl ExamResultFilter {
    pub fn matches(&self, result: &ExamResult) -> bool {
        self.student.is_none_or(|s| result.student == s)
            && self.subject.is_none_or(|s| result.subject == s)
            && self.exam_type.is_none_or(|t| result.exam_type == t)
            && self
                .academic_year
                .as_deref()
                .is_none_or(|y| result.academic_year == y)
            && self.semester.is_none_or(|s| result.semester == s)
            && self
                .exam_date_between
                .is_none_or(|(start, end)| result.exam_date >= start && result.exam_date < end)
    }
}

#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    async fn save(&self, result: &ExamResult) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ExamResultId) -> Result<Option<ExamResult>, RepositoryError>;

    /// Matching results, most recent exam first.
    async fn find(&self, filter: &ExamResultFilter) -> Result<Vec<ExamResult>, RepositoryError>;

    async fn delete(&self, id: ExamResultId) -> Result<(), RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub student: Option<UserId>,
    pub month: Option<Month>,
    pub year: Option<i32>,
    pub academic_year: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        self.student.is_none_or(|s| report.student == s)
            && self.month.is_none_or(|m| report.month == m)
            && self.year.is_none_or(|y| report.year == y)
            && self
                .academic_year
                .as_deref()
                .is_none_or(|y| report.academic_year == y)
    }
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Save report. A second report for the same (student, month, year)
    /// under a different id fails with `Duplicate`.
    async fn save(&self, report: &Report) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError>;

    async fn find_by_key(
        &self,
        student: UserId,
        month: Month,
        year: i32,
    ) -> Result<Option<Report>, RepositoryError>;

    /// Matching reports, latest period first.
    async fn find(&self, filter: &ReportFilter) -> Result<Vec<Report>, RepositoryError>;

    async fn delete(&self, id: ReportId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn save(&self, record: &AttendanceRecord) -> Result<(), RepositoryError>;

    async fn find_for_day(
        &self,
        student: UserId,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, RepositoryError>;

    /// Records of one student, optionally limited to `[start, end)`, newest first.
    async fn find_by_student(
        &self,
        student: UserId,
        between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct HomeworkFilter {
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub status: Option<HomeworkStatus>,
    /// Half-open `[start, end)` window on the due date.
    pub due_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Soft-deleted homework is returned only when set.
    pub include_inactive: bool,
}

impl HomeworkFilter {
    pub fn matches(&self, homework: &Homework) -> bool {
        (self.include_inactive || homework.is_active)
            && self
                .class_name
                .as_deref()
                .is_none_or(|c| homework.class_name == c)
            && self.subject.as_deref().is_none_or(|s| homework.subject == s)
            && self.status.is_none_or(|s| homework.status == s)
            && self
                .due_between
                .is_none_or(|(start, end)| homework.due_date >= start && homework.due_date < end)
    }
}

#[async_trait]
pub trait HomeworkRepository: Send + Sync {
    async fn save(&self, homework: &Homework) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: HomeworkId) -> Result<Option<Homework>, RepositoryError>;

    /// Matching homework, earliest due date first.
    async fn find(&self, filter: &HomeworkFilter) -> Result<Vec<Homework>, RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    pub kind: Option<AnnouncementType>,
    pub target_audience: Option<Audience>,
    /// Restricts to what a student of this class may see.
    pub student_class: Option<Option<String>>,
}

impl AnnouncementFilter {
    pub fn matches(&self, announcement: &Announcement) -> bool {
        announcement.is_active
            && self.kind.is_none_or(|k| announcement.kind == k)
            && self
                .target_audience
                .is_none_or(|a| announcement.target_audience == a)
            && self
                .student_class
                .as_ref()
                .is_none_or(|class| announcement.visible_to_student(class.as_deref()))
    }
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn save(&self, announcement: &Announcement) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: AnnouncementId)
        -> Result<Option<Announcement>, RepositoryError>;

    /// Active matching announcements, newest first, at most `limit`.
    async fn find_active(
        &self,
        filter: &AnnouncementFilter,
        limit: usize,
    ) -> Result<Vec<Announcement>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A unique key is already taken; carries the offending field name.
    #[error("Duplicate value for {0}")]
    Duplicate(String),

    /// No live store connection.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store timeout: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// True for failures caused by the store being unreachable rather than by the request.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_) | RepositoryError::Timeout(_))
    }
}

/// Maps a unique index name to the document field it guards.
fn unique_field(constraint: &str) -> &str {
    match constraint {
        "users_username_unique" => "username",
        "users_student_id_unique" => "studentId",
        "reports_student_month_year_unique" => "student",
        other => other,
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => RepositoryError::Timeout(err.to_string()),
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(unique_field(db.constraint().unwrap_or("id")).to_string())
            }
            _ => {
                let message = err.to_string();
                if message.contains("timed out") || message.contains("timeout") {
                    RepositoryError::Timeout(message)
                } else {
                    RepositoryError::Database(message)
                }
            }
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        let err: RepositoryError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RepositoryError::Timeout(_)));
        assert!(err.is_connectivity());

        let err: RepositoryError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[test]
    fn test_unique_field_names() {
        assert_eq!(unique_field("users_username_unique"), "username");
        assert_eq!(unique_field("reports_student_month_year_unique"), "student");
        assert_eq!(unique_field("something_else"), "something_else");
    }

    #[test]
    fn test_homework_filter_hides_inactive() {
        let mut hw = Homework::new(
            "Essay".into(),
            "Two pages".into(),
            "English".into(),
            "9C".into(),
            Utc::now() + Duration::days(2),
            UserId::new(),
            None,
        );
        let filter = HomeworkFilter {
            class_name: Some("9C".into()),
            ..Default::default()
        };
        assert!(filter.matches(&hw));
        hw.is_active = false;
        assert!(!filter.matches(&hw));
        assert!(HomeworkFilter {
            include_inactive: true,
            ..Default::default()
        }
        .matches(&hw));
    }
}
