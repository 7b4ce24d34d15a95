// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::application::auth::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::attendance::{AttendanceRecord, AttendanceStatus};
use crate::domain::common::{Month, UserId};
use crate::domain::repository::{AttendanceRepository, UserRepository};
use crate::domain::user::Role;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub student_id: Option<UserId>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<AttendanceStatus>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    /// 1-based month number.
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub struct AttendanceService {
    attendance: Arc<dyn AttendanceRepository>,
    users: Arc<dyn UserRepository>,
}

impl AttendanceService {
    pub fn new(attendance: Arc<dyn AttendanceRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { attendance, users }
    }

    /// Records the student's status for a day, replacing any earlier mark for it.
    pub async fn mark(
        &self,
        caller: &AuthUser,
        request: MarkAttendanceRequest,
    ) -> ServiceResult<AttendanceRecord> {
        let (Some(student), Some(status)) = (request.student_id, request.status) else {
            return Err(ServiceError::validation("Student ID and status are required"));
        };
        match self.users.find_by_id(student).await? {
            Some(user) if user.role == Role::Student => {}
            _ => return Err(ServiceError::NotFound("Student")),
        }

        let date = request.date.unwrap_or_else(Utc::now);
        let record = match self.attendance.find_for_day(student, date.date_naive()).await? {
            Some(mut existing) => {
                existing.status = status;
                existing.date = date;
                existing.marked_by = caller.id;
                existing.remarks = request.remarks;
                existing.updated_at = Utc::now();
                existing
            }
            None => AttendanceRecord::new(student, date, status, caller.id, request.remarks),
        };
        self.attendance.save(&record).await?;
        debug!(student = %student, day = %record.day(), "Attendance marked");
        Ok(record)
    }

    pub async fn for_student(
        &self,
        caller: &AuthUser,
        student: UserId,
        query: AttendanceQuery,
    ) -> ServiceResult<Vec<AttendanceRecord>> {
        if caller.is_student() && caller.id != student {
            return Err(ServiceError::forbidden("Students can only view their own attendance"));
        }
        let between = match query.month {
            Some(number) => {
                let month = Month::from_number(number)
                    .ok_or_else(|| ServiceError::validation("Month must be between 1 and 12"))?;
                let year = query.year.unwrap_or_else(|| Utc::now().year());
                Some(
                    month
                        .bounds(year)
                        .ok_or_else(|| ServiceError::validation("Year is out of range"))?,
                )
            }
            None => None,
        };
        Ok(self.attendance.find_by_student(student, between).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::user::User;
    use crate::infrastructure::repositories::{
        InMemoryAttendanceRepository, InMemoryUserRepository,
    };

    async fn setup() -> (AttendanceService, User, AuthUser) {
        let users = Arc::new(InMemoryUserRepository::new());
        let student = User::new("noor".into(), String::new(), "noor@school.test".into(), Role::Student);
        users.save(&student).await.unwrap();
        let teacher = AuthUser {
            id: UserId::new(),
            username: "t".into(),
            role: Role::Teacher,
            class_name: None,
        };
        (
            AttendanceService::new(Arc::new(InMemoryAttendanceRepository::new()), users),
            student,
            teacher,
        )
    }

    fn mark(student: UserId, date: DateTime<Utc>, status: AttendanceStatus) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            student_id: Some(student),
            date: Some(date),
            status: Some(status),
            remarks: None,
        }
    }

    #[tokio::test]
    async fn test_second_mark_same_day_replaces_first() {
        let (svc, student, teacher) = setup().await;
        let morning = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();

        let first = svc.mark(&teacher, mark(student.id, morning, AttendanceStatus::Absent)).await.unwrap();
        let second = svc.mark(&teacher, mark(student.id, noon, AttendanceStatus::Late)).await.unwrap();
        assert_eq!(first.id, second.id);

        let records = svc
            .for_student(&teacher, student.id, AttendanceQuery::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Late);
    }

    #[tokio::test]
    async fn test_month_filter() {
        let (svc, student, teacher) = setup().await;
        for (m, d) in [(9, 1), (9, 30), (10, 1)] {
            let date = Utc.with_ymd_and_hms(2025, m, d, 9, 0, 0).unwrap();
            svc.mark(&teacher, mark(student.id, date, AttendanceStatus::Present)).await.unwrap();
        }
        let september = svc
            .for_student(
                &teacher,
                student.id,
                AttendanceQuery {
                    month: Some(9),
                    year: Some(2025),
                },
            )
            .await
            .unwrap();
        assert_eq!(september.len(), 2);

        let bad = AttendanceQuery {
            month: Some(13),
            year: None,
        };
        assert!(matches!(
            svc.for_student(&teacher, student.id, bad).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_student_rejected() {
        let (svc, _, teacher) = setup().await;
        assert!(matches!(
            svc.mark(&teacher, mark(UserId::new(), Utc::now(), AttendanceStatus::Present)).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
