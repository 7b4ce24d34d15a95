// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Monthly report generation.
//!
//! A report is assembled from four collections read one after another:
//! attendance, homework, fees and exam results. The reads are not isolated
//! from concurrent writes; a report reflects whatever each collection held at
//! the moment it was read.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::application::auth::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::common::{Month, ReportId, UserId};
use crate::domain::derivation::derive_report;
use crate::domain::repository::{
    AttendanceRepository, ExamResultFilter, ExamResultRepository, FeeRepository, HomeworkFilter,
    HomeworkRepository, ReportFilter, ReportRepository, UserRepository,
};
use crate::domain::report::{
    AcademicPerformance, AttendanceSummary, FeeSnapshot, HomeworkSummary, Report,
};
use crate::domain::user::{Role, UserSummary};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportRequest {
    pub student: Option<UserId>,
    pub month: Option<Month>,
    pub year: Option<i32>,
    pub remarks: Option<String>,
    pub teacher_remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub student: Option<UserId>,
    pub month: Option<Month>,
    pub year: Option<i32>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub student_info: Option<UserSummary>,
}

pub struct ReportSources {
    pub users: Arc<dyn UserRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub homework: Arc<dyn HomeworkRepository>,
    pub fees: Arc<dyn FeeRepository>,
    pub results: Arc<dyn ExamResultRepository>,
}

pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    sources: ReportSources,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>, sources: ReportSources) -> Self {
        Self { reports, sources }
    }

    async fn populate(&self, report: Report) -> ServiceResult<ReportView> {
        let student_info = self
            .sources
            .users
            .find_by_id(report.student)
            .await?
            .map(|u| u.summary());
        Ok(ReportView {
            report,
            student_info,
        })
    }

    /// Builds (or rebuilds) the report for one student and month.
    pub async fn generate(
        &self,
        caller: &AuthUser,
        request: GenerateReportRequest,
    ) -> ServiceResult<ReportView> {
        let (Some(student_id), Some(month), Some(year)) =
            (request.student, request.month, request.year)
        else {
            return Err(ServiceError::validation("Student, month, and year are required"));
        };
        let (start, end) = month
            .bounds(year)
            .ok_or_else(|| ServiceError::validation("Year is out of range"))?;

        let student = match self.sources.users.find_by_id(student_id).await? {
            Some(user) if user.role == Role::Student => user,
            _ => return Err(ServiceError::NotFound("Student")),
        };

        let attendance = self
            .sources
            .attendance
            .find_by_student(student_id, Some((start, end)))
            .await?;

        let homework = match student.class_name.clone() {
            Some(class_name) => {
                self.sources
                    .homework
                    .find(&HomeworkFilter {
                        class_name: Some(class_name),
                        due_between: Some((start, end)),
                        ..Default::default()
                    })
                    .await?
            }
            None => Vec::new(),
        };

        // Oldest account first; the listing is newest first.
        let fees = self.sources.fees.find_by_student(student_id).await?;
        let fee = fees.last();

        let results = self
            .sources
            .results
            .find(&ExamResultFilter {
                student: Some(student_id),
                exam_date_between: Some((start, end)),
                ..Default::default()
            })
            .await?;

        let mut report = match self.reports.find_by_key(student_id, month, year).await? {
            Some(existing) => existing,
            None => Report::new(student_id, month, year, caller.id),
        };
        report.attendance = AttendanceSummary::from_records(&attendance);
        report.homework = HomeworkSummary::tally(&homework, student_id);
        report.fees = FeeSnapshot::from(fee);
        report.academic_performance = AcademicPerformance::from_results(&results);
        if request.remarks.is_some() {
            report.remarks = request.remarks;
        }
        if request.teacher_remarks.is_some() {
            report.teacher_remarks = request.teacher_remarks;
        }
        report.updated_at = Utc::now();

        derive_report(&mut report);
        self.reports.save(&report).await?;
        info!(
            report_id = %report.id,
            student = %student_id,
            month = %month,
            year,
            "Report generated"
        );
        self.populate(report).await
    }

    pub async fn list(&self, caller: &AuthUser, query: ReportQuery) -> ServiceResult<Vec<ReportView>> {
        let filter = ReportFilter {
            student: if caller.is_student() {
                Some(caller.id)
            } else {
                query.student
            },
            month: query.month,
            year: query.year,
            academic_year: query.academic_year,
        };
        let reports = self.reports.find(&filter).await?;
        let mut views = Vec::with_capacity(reports.len());
        for report in reports {
            views.push(self.populate(report).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, caller: &AuthUser, id: ReportId) -> ServiceResult<ReportView> {
        let report = self
            .reports
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Report"))?;
        if caller.is_student() && report.student != caller.id {
            return Err(ServiceError::forbidden("You can only view your own reports"));
        }
        self.populate(report).await
    }

    pub async fn delete(&self, id: ReportId) -> ServiceResult<()> {
        if self.reports.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound("Report"));
        }
        self.reports.delete(id).await?;
        Ok(())
    }
}
