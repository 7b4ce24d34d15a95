// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL document repositories
//!
//! Every record family lives in its own table as a JSONB document
//! (`id`, `doc`, `created_at`, `updated_at`). Lookups narrow with JSONB
//! containment (`doc @> $1`) and the remaining filter runs on the decoded
//! records, so the in-memory and PostgreSQL backends share one matching rule.
//!
//! Unique keys (username, student id, report period) are expression indexes;
//! violations surface as `RepositoryError::Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::announcement::Announcement;
use crate::domain::attendance::AttendanceRecord;
use crate::domain::common::{
    AnnouncementId, ExamResultId, FeeId, HomeworkId, Month, ReportId, UserId,
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
use crate::infrastructure::db::PostgresDriver;
use crate::infrastructure::repositories::sort_reports;

/// One JSONB table.
#[derive(Clone)]
struct DocumentCollection {
    driver: Arc<PostgresDriver>,
    table: &'static str,
}

impl DocumentCollection {
    fn new(driver: Arc<PostgresDriver>, table: &'static str) -> Self {
        Self { driver, table }
    }

    async fn upsert<T: Serialize>(
        &self,
        id: Uuid,
        doc: &T,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let pool = self.driver.pool()?;
        let doc = serde_json::to_value(doc)?;
        let sql = format!(
            r#"
            INSERT INTO {} (id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                doc = EXCLUDED.doc,
                updated_at = EXCLUDED.updated_at
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(doc)
            .bind(created_at)
            .bind(updated_at)
            .execute(&pool)
            .await?;
        Ok(())
    }

    async fn find_by_id<T: DeserializeOwned>(&self, id: Uuid) -> Result<Option<T>, RepositoryError> {
        let pool = self.driver.pool()?;
        let sql = format!("SELECT doc FROM {} WHERE id = $1", self.table);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&pool).await?;
        row.map(|row| decode(row.try_get::<Value, _>("doc")?)).transpose()
    }

    /// Documents containing `pattern`, newest row first.
    async fn find_containing<T: DeserializeOwned>(
        &self,
        pattern: Value,
    ) -> Result<Vec<T>, RepositoryError> {
        let pool = self.driver.pool()?;
        let sql = format!(
            "SELECT doc FROM {} WHERE doc @> $1 ORDER BY created_at DESC",
            self.table
        );
        let rows = sqlx::query(&sql).bind(pattern).fetch_all(&pool).await?;
        rows.into_iter()
            .map(|row| decode(row.try_get::<Value, _>("doc")?))
            .collect()
    }

    async fn find_one_containing<T: DeserializeOwned>(
        &self,
        pattern: Value,
    ) -> Result<Option<T>, RepositoryError> {
        let pool = self.driver.pool()?;
        let sql = format!(
            "SELECT doc FROM {} WHERE doc @> $1 ORDER BY created_at LIMIT 1",
            self.table
        );
        let row = sqlx::query(&sql).bind(pattern).fetch_optional(&pool).await?;
        row.map(|row| decode(row.try_get::<Value, _>("doc")?)).transpose()
    }

    async fn count_containing(&self, pattern: Value) -> Result<u64, RepositoryError> {
        let pool = self.driver.pool()?;
        let sql = format!("SELECT COUNT(*) AS n FROM {} WHERE doc @> $1", self.table);
        let row = sqlx::query(&sql).bind(pattern).fetch_one(&pool).await?;
        let n: i64 = row.try_get("n")?;
        Ok(n.max(0) as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let pool = self.driver.pool()?;
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        sqlx::query(&sql).bind(id).execute(&pool).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(doc: Value) -> Result<T, RepositoryError> {
    Ok(serde_json::from_value(doc)?)
}

pub struct PostgresUserRepository {
    users: DocumentCollection,
}

impl PostgresUserRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            users: DocumentCollection::new(driver, "users"),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.users
            .upsert(user.id.0, user, user.created_at, user.updated_at)
            .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.users.find_by_id(id.0).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.users
            .find_one_containing(json!({ "username": username }))
            .await
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        self.users
            .count_containing(json!({ "role": role.as_str() }))
            .await
    }
}

pub struct PostgresFeeRepository {
    fees: DocumentCollection,
}

impl PostgresFeeRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            fees: DocumentCollection::new(driver, "fees"),
        }
    }
}

#[async_trait]
impl FeeRepository for PostgresFeeRepository {
    async fn save(&self, fee: &Fee) -> Result<(), RepositoryError> {
        self.fees
            .upsert(fee.id.0, fee, fee.created_at, fee.updated_at)
            .await
    }

    async fn find_by_id(&self, id: FeeId) -> Result<Option<Fee>, RepositoryError> {
        self.fees.find_by_id(id.0).await
    }

    async fn list_all(&self) -> Result<Vec<Fee>, RepositoryError> {
        self.fees.find_containing(json!({})).await
    }

    async fn find_by_student(&self, student: UserId) -> Result<Vec<Fee>, RepositoryError> {
        self.fees
            .find_containing(json!({ "student": student }))
            .await
    }

    async fn find_by_student_and_month(
        &self,
        student: UserId,
        month: Month,
    ) -> Result<Option<Fee>, RepositoryError> {
        self.fees
            .find_one_containing(json!({ "student": student, "month": month }))
            .await
    }

    async fn total_paid(&self) -> Result<f64, RepositoryError> {
        let pool = self.fees.driver.pool()?;
        let row = sqlx::query(
            "SELECT COALESCE(SUM((doc->>'paidFees')::float8), 0)::float8 AS total FROM fees",
        )
        .fetch_one(&pool)
        .await?;
        Ok(row.try_get("total")?)
    }
}

pub struct PostgresExamResultRepository {
    results: DocumentCollection,
}

impl PostgresExamResultRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            results: DocumentCollection::new(driver, "exam_results"),
        }
    }
}

#[async_trait]
impl ExamResultRepository for PostgresExamResultRepository {
    async fn save(&self, result: &ExamResult) -> Result<(), RepositoryError> {
        self.results
            .upsert(result.id.0, result, result.created_at, result.updated_at)
            .await
    }

    async fn find_by_id(&self, id: ExamResultId) -> Result<Option<ExamResult>, RepositoryError> {
        self.results.find_by_id(id.0).await
    }

    async fn find(&self, filter: &ExamResultFilter) -> Result<Vec<ExamResult>, RepositoryError> {
        let pattern = match filter.student {
            Some(student) => json!({ "student": student }),
            None => json!({}),
        };
        let mut results: Vec<ExamResult> = self
            .results
            .find_containing::<ExamResult>(pattern)
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        results.sort_by(|a, b| b.exam_date.cmp(&a.exam_date));
        Ok(results)
    }

    async fn delete(&self, id: ExamResultId) -> Result<(), RepositoryError> {
        self.results.delete(id.0).await
    }
}

pub struct PostgresReportRepository {
    reports: DocumentCollection,
}

impl PostgresReportRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            reports: DocumentCollection::new(driver, "reports"),
        }
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn save(&self, report: &Report) -> Result<(), RepositoryError> {
        self.reports
            .upsert(report.id.0, report, report.created_at, report.updated_at)
            .await
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        self.reports.find_by_id(id.0).await
    }

    async fn find_by_key(
        &self,
        student: UserId,
        month: Month,
        year: i32,
    ) -> Result<Option<Report>, RepositoryError> {
        self.reports
            .find_one_containing(json!({ "student": student, "month": month, "year": year }))
            .await
    }

    async fn find(&self, filter: &ReportFilter) -> Result<Vec<Report>, RepositoryError> {
        let pattern = match filter.student {
            Some(student) => json!({ "student": student }),
            None => json!({}),
        };
        let mut reports: Vec<Report> = self
            .reports
            .find_containing::<Report>(pattern)
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        sort_reports(&mut reports);
        Ok(reports)
    }

    async fn delete(&self, id: ReportId) -> Result<(), RepositoryError> {
        self.reports.delete(id.0).await
    }
}

pub struct PostgresAttendanceRepository {
    records: DocumentCollection,
}

impl PostgresAttendanceRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            records: DocumentCollection::new(driver, "attendance"),
        }
    }
}

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepository {
    async fn save(&self, record: &AttendanceRecord) -> Result<(), RepositoryError> {
        self.records
            .upsert(record.id.0, record, record.created_at, record.updated_at)
            .await
    }

    async fn find_for_day(
        &self,
        student: UserId,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, RepositoryError> {
        let records = self.find_by_student(student, None).await?;
        Ok(records.into_iter().find(|r| r.day() == day))
    }

    async fn find_by_student(
        &self,
        student: UserId,
        between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let mut records: Vec<AttendanceRecord> = self
            .records
            .find_containing::<AttendanceRecord>(json!({ "student": student }))
            .await?
            .into_iter()
            .filter(|r| between.is_none_or(|(start, end)| r.date >= start && r.date < end))
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

pub struct PostgresHomeworkRepository {
    homework: DocumentCollection,
}

impl PostgresHomeworkRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            homework: DocumentCollection::new(driver, "homework"),
        }
    }
}

#[async_trait]
impl HomeworkRepository for PostgresHomeworkRepository {
    async fn save(&self, homework: &Homework) -> Result<(), RepositoryError> {
        self.homework
            .upsert(homework.id.0, homework, homework.created_at, homework.updated_at)
            .await
    }

    async fn find_by_id(&self, id: HomeworkId) -> Result<Option<Homework>, RepositoryError> {
        self.homework.find_by_id(id.0).await
    }

    async fn find(&self, filter: &HomeworkFilter) -> Result<Vec<Homework>, RepositoryError> {
        let pattern = match &filter.class_name {
            Some(class_name) => json!({ "class": class_name }),
            None => json!({}),
        };
        let mut homework: Vec<Homework> = self
            .homework
            .find_containing::<Homework>(pattern)
            .await?
            .into_iter()
            .filter(|hw| filter.matches(hw))
            .collect();
        homework.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(homework)
    }
}

pub struct PostgresAnnouncementRepository {
    announcements: DocumentCollection,
}

impl PostgresAnnouncementRepository {
    pub fn new(driver: Arc<PostgresDriver>) -> Self {
        Self {
            announcements: DocumentCollection::new(driver, "announcements"),
        }
    }
}

#[async_trait]
impl AnnouncementRepository for PostgresAnnouncementRepository {
    async fn save(&self, announcement: &Announcement) -> Result<(), RepositoryError> {
        self.announcements
            .upsert(
                announcement.id.0,
                announcement,
                announcement.created_at,
                announcement.updated_at,
            )
            .await
    }

    async fn find_by_id(
        &self,
        id: AnnouncementId,
    ) -> Result<Option<Announcement>, RepositoryError> {
        self.announcements.find_by_id(id.0).await
    }

    async fn find_active(
        &self,
        filter: &AnnouncementFilter,
        limit: usize,
    ) -> Result<Vec<Announcement>, RepositoryError> {
        let items = self
            .announcements
            .find_containing::<Announcement>(json!({ "isActive": true }))
            .await?;
        Ok(items
            .into_iter()
            .filter(|a| filter.matches(a))
            .take(limit)
            .collect())
    }
}
