// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve domain records
//!
//! ## PostgreSQL
//!
//! [`postgres`] stores every record family as JSONB documents, one table per
//! collection, through the pool owned by [`crate::infrastructure::db::PostgresDriver`].
//!
//! ## In-Memory
//!
//! HashMap-backed implementations for development and tests. They enforce
//! the same unique keys as the PostgreSQL indexes.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::announcement::Announcement;
use crate::domain::attendance::AttendanceRecord;
use crate::domain::common::{
    AnnouncementId, AttendanceId, ExamResultId, FeeId, HomeworkId, Month, ReportId, UserId,
};
use crate::domain::exam_result::ExamResult;
use crate::domain::fee::Fee;
use crate::domain::homework::Homework;
use crate::domain::report::Report;
use crate::domain::repository::{
    AnnouncementFilter, AnnouncementRepository, AttendanceRepository, ExamResultFilter,
    ExamResultRepository, FeeRepository, HomeworkFilter, HomeworkRepository, ReportFilter,
    ReportRepository, RepositoryError, UserRepository,
};
use crate::domain::user::{Role, User};

/// Newest report period first.
pub(crate) fn sort_reports(reports: &mut [Report]) {
    reports.sort_by(|a, b| {
        (b.year, b.month)
            .cmp(&(a.year, a.month))
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write();
        for other in users.values().filter(|u| u.id != user.id) {
            if other.username == user.username {
                return Err(RepositoryError::Duplicate("username".to_string()));
            }
            if user.student_id.is_some() && other.student_id == user.student_id {
                return Err(RepositoryError::Duplicate("studentId".to_string()));
            }
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        Ok(self.users.read().values().filter(|u| u.role == role).count() as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryFeeRepository {
    fees: Arc<RwLock<HashMap<FeeId, Fee>>>,
}

impl InMemoryFeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut fees: Vec<Fee>) -> Vec<Fee> {
        fees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        fees
    }
}

#[async_trait]
impl FeeRepository for InMemoryFeeRepository {
    async fn save(&self, fee: &Fee) -> Result<(), RepositoryError> {
        self.fees.write().insert(fee.id, fee.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: FeeId) -> Result<Option<Fee>, RepositoryError> {
        Ok(self.fees.read().get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Fee>, RepositoryError> {
        let fees = self.fees.read().values().cloned().collect();
        Ok(Self::newest_first(fees))
    }

    async fn find_by_student(&self, student: UserId) -> Result<Vec<Fee>, RepositoryError> {
        let fees = self
            .fees
            .read()
            .values()
            .filter(|f| f.student == student)
            .cloned()
            .collect();
        Ok(Self::newest_first(fees))
    }

    async fn find_by_student_and_month(
        &self,
        student: UserId,
        month: Month,
    ) -> Result<Option<Fee>, RepositoryError> {
        Ok(self
            .fees
            .read()
            .values()
            .find(|f| f.student == student && f.month == Some(month))
            .cloned())
    }

    async fn total_paid(&self) -> Result<f64, RepositoryError> {
        Ok(self.fees.read().values().map(|f| f.paid_fees).sum())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryExamResultRepository {
    results: Arc<RwLock<HashMap<ExamResultId, ExamResult>>>,
}

impl InMemoryExamResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExamResultRepository for InMemoryExamResultRepository {
    async fn save(&self, result: &ExamResult) -> Result<(), RepositoryError> {
        self.results.write().insert(result.id, result.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ExamResultId) -> Result<Option<ExamResult>, RepositoryError> {
        Ok(self.results.read().get(&id).cloned())
    }

    async fn find(&self, filter: &ExamResultFilter) -> Result<Vec<ExamResult>, RepositoryError> {
        let mut results: Vec<ExamResult> = self
            .results
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.exam_date.cmp(&a.exam_date));
        Ok(results)
    }

    async fn delete(&self, id: ExamResultId) -> Result<(), RepositoryError> {
        self.results.write().remove(&id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReportRepository {
    reports: Arc<RwLock<HashMap<ReportId, Report>>>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn save(&self, report: &Report) -> Result<(), RepositoryError> {
        let mut reports = self.reports.write();
        if reports
            .values()
            .any(|r| r.id != report.id && r.key() == report.key())
        {
            return Err(RepositoryError::Duplicate("student".to_string()));
        }
        reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        Ok(self.reports.read().get(&id).cloned())
    }

    async fn find_by_key(
        &self,
        student: UserId,
        month: Month,
        year: i32,
    ) -> Result<Option<Report>, RepositoryError> {
        Ok(self
            .reports
            .read()
            .values()
            .find(|r| r.key() == (student, month, year))
            .cloned())
    }

    async fn find(&self, filter: &ReportFilter) -> Result<Vec<Report>, RepositoryError> {
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_reports(&mut reports);
        Ok(reports)
    }

    async fn delete(&self, id: ReportId) -> Result<(), RepositoryError> {
        self.reports.write().remove(&id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAttendanceRepository {
    records: Arc<RwLock<HashMap<AttendanceId, AttendanceRecord>>>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn save(&self, record: &AttendanceRecord) -> Result<(), RepositoryError> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    async fn find_for_day(
        &self,
        student: UserId,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        Ok(self
            .records
            .read()
            .values()
            .find(|r| r.student == student && r.day() == day)
            .cloned())
    }

    async fn find_by_student(
        &self,
        student: UserId,
        between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let mut records: Vec<AttendanceRecord> = self
            .records
            .read()
            .values()
            .filter(|r| r.student == student)
            .filter(|r| between.is_none_or(|(start, end)| r.date >= start && r.date < end))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryHomeworkRepository {
    homework: Arc<RwLock<HashMap<HomeworkId, Homework>>>,
}

impl InMemoryHomeworkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HomeworkRepository for InMemoryHomeworkRepository {
    async fn save(&self, homework: &Homework) -> Result<(), RepositoryError> {
        self.homework.write().insert(homework.id, homework.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: HomeworkId) -> Result<Option<Homework>, RepositoryError> {
        Ok(self.homework.read().get(&id).cloned())
    }

    async fn find(&self, filter: &HomeworkFilter) -> Result<Vec<Homework>, RepositoryError> {
        let mut homework: Vec<Homework> = self
            .homework
            .read()
            .values()
            .filter(|hw| filter.matches(hw))
            .cloned()
            .collect();
        homework.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(homework)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAnnouncementRepository {
    announcements: Arc<RwLock<HashMap<AnnouncementId, Announcement>>>,
}

impl InMemoryAnnouncementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnouncementRepository for InMemoryAnnouncementRepository {
    async fn save(&self, announcement: &Announcement) -> Result<(), RepositoryError> {
        self.announcements
            .write()
            .insert(announcement.id, announcement.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: AnnouncementId,
    ) -> Result<Option<Announcement>, RepositoryError> {
        Ok(self.announcements.read().get(&id).cloned())
    }

    async fn find_active(
        &self,
        filter: &AnnouncementFilter,
        limit: usize,
    ) -> Result<Vec<Announcement>, RepositoryError> {
        let mut items: Vec<Announcement> = self
            .announcements
            .read()
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_username_is_unique() {
        let repo = InMemoryUserRepository::new();
        let first = User::new("ravi".into(), "h".into(), "r@x.io".into(), Role::Teacher);
        repo.save(&first).await.unwrap();

        let clash = User::new("ravi".into(), "h".into(), "r2@x.io".into(), Role::Student);
        let err = repo.save(&clash).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(ref f) if f == "username"));

        let mut renamed = first.clone();
        renamed.email = "ravi@x.io".into();
        repo.save(&renamed).await.unwrap();
        assert_eq!(repo.count_by_role(Role::Teacher).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_one_report_per_student_month_year() {
        let repo = InMemoryReportRepository::new();
        let student = UserId::new();
        let author = UserId::new();
        repo.save(&Report::new(student, Month::April, 2026, author))
            .await
            .unwrap();
        let err = repo
            .save(&Report::new(student, Month::April, 2026, author))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
        repo.save(&Report::new(student, Month::May, 2026, author))
            .await
            .unwrap();

        let listed = repo.find(&ReportFilter::default()).await.unwrap();
        assert_eq!(listed[0].month, Month::May);
    }

    #[tokio::test]
    async fn test_total_paid_sums_every_fee() {
        let repo = InMemoryFeeRepository::new();
        let student = UserId::new();
        repo.save(&Fee::new(student, 1000.0, 250.0, None, Some(Month::June), None))
            .await
            .unwrap();
        repo.save(&Fee::new(student, 1000.0, 500.0, None, Some(Month::July), None))
            .await
            .unwrap();
        assert_eq!(repo.total_paid().await.unwrap(), 750.0);
        assert!(repo
            .find_by_student_and_month(student, Month::July)
            .await
            .unwrap()
            .is_some());
    }
}
