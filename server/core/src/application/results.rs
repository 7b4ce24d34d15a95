// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Exam results: entry, filtered listing and edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::application::auth::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::common::{ExamResultId, UserId};
use crate::domain::derivation::derive_exam_result;
use crate::domain::exam_result::{ExamResult, ExamType, NewExamResult, Semester, Subject};
use crate::domain::repository::{ExamResultFilter, ExamResultRepository, UserRepository};
use crate::domain::user::UserSummary;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub student: Option<UserId>,
    pub subject: Option<Subject>,
    pub exam_type: Option<ExamType>,
    pub exam_name: Option<String>,
    pub marks_obtained: Option<f64>,
    pub total_marks: Option<f64>,
    pub remarks: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub semester: Option<Semester>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuery {
    pub student: Option<UserId>,
    pub subject: Option<Subject>,
    pub exam_type: Option<ExamType>,
    pub academic_year: Option<String>,
    pub semester: Option<Semester>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(flatten)]
    pub result: ExamResult,
    pub student_info: Option<UserSummary>,
    pub added_by_info: Option<UserSummary>,
}

fn check_marks(obtained: f64, total: f64) -> ServiceResult<()> {
    if !total.is_finite() || total < 1.0 {
        return Err(ServiceError::validation("Total marks must be at least 1"));
    }
    if !obtained.is_finite() || obtained < 0.0 {
        return Err(ServiceError::validation("Marks obtained cannot be negative"));
    }
    Ok(())
}

pub struct ResultService {
    results: Arc<dyn ExamResultRepository>,
    users: Arc<dyn UserRepository>,
}

impl ResultService {
    pub fn new(results: Arc<dyn ExamResultRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { results, users }
    }

    async fn populate(&self, result: ExamResult) -> ServiceResult<ResultView> {
        let student_info = self.users.find_by_id(result.student).await?.map(|u| u.summary());
        let added_by_info = self.users.find_by_id(result.added_by).await?.map(|u| u.summary());
        Ok(ResultView {
            result,
            student_info,
            added_by_info,
        })
    }

    pub async fn create(&self, caller: &AuthUser, request: ResultRequest) -> ServiceResult<ResultView> {
        let missing = || {
            ServiceError::validation(
                "Student, subject, examType, examName, marksObtained and totalMarks are required",
            )
        };
        let student = request.student.ok_or_else(missing)?;
        let subject = request.subject.ok_or_else(missing)?;
        let exam_type = request.exam_type.ok_or_else(missing)?;
        let exam_name = request
            .exam_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(missing)?;
        let marks_obtained = request.marks_obtained.ok_or_else(missing)?;
        let total_marks = request.total_marks.ok_or_else(missing)?;
        check_marks(marks_obtained, total_marks)?;

        if self.users.find_by_id(student).await?.is_none() {
            return Err(ServiceError::NotFound("Student"));
        }

        let result = ExamResult::new(NewExamResult {
            student,
            subject,
            exam_type,
            exam_name,
            marks_obtained,
            total_marks,
            remarks: request.remarks,
            exam_date: request.exam_date,
            semester: request.semester,
            added_by: caller.id,
        });
        self.results.save(&result).await?;
        info!(result_id = %result.id, student = %student, "Exam result recorded");
        self.populate(result).await
    }

    pub async fn list(&self, caller: &AuthUser, query: ResultQuery) -> ServiceResult<Vec<ResultView>> {
        let student = if caller.is_student() {
            Some(caller.id)
        } else {
            query.student
        };
        let filter = ExamResultFilter {
            student,
            subject: query.subject,
            exam_type: query.exam_type,
            academic_year: query.academic_year,
            semester: query.semester,
            exam_date_between: None,
        };
        let results = self.results.find(&filter).await?;
        let mut views = Vec::with_capacity(results.len());
        for result in results {
            views.push(self.populate(result).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, caller: &AuthUser, id: ExamResultId) -> ServiceResult<ResultView> {
        let result = self
            .results
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Result"))?;
        if caller.is_student() && result.student != caller.id {
            return Err(ServiceError::forbidden("You can only view your own results"));
        }
        self.populate(result).await
    }

    /// Merges the editable fields. Student and author are fixed at creation.
    pub async fn update(&self, id: ExamResultId, request: ResultRequest) -> ServiceResult<ResultView> {
        let mut result = self
            .results
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Result"))?;

        if let Some(subject) = request.subject {
            result.subject = subject;
        }
        if let Some(exam_type) = request.exam_type {
            result.exam_type = exam_type;
        }
        if let Some(name) = request.exam_name.filter(|n| !n.trim().is_empty()) {
            result.exam_name = name.trim().to_string();
        }
        if let Some(marks) = request.marks_obtained {
            result.marks_obtained = marks;
        }
        if let Some(total) = request.total_marks {
            result.total_marks = total;
        }
        if let Some(remarks) = request.remarks {
            result.remarks = Some(remarks.trim().to_string());
        }
        if let Some(date) = request.exam_date {
            result.exam_date = date;
        }
        if let Some(semester) = request.semester {
            result.semester = semester;
        }
        check_marks(result.marks_obtained, result.total_marks)?;

        derive_exam_result(&mut result);
        result.updated_at = Utc::now();
        self.results.save(&result).await?;
        self.populate(result).await
    }

    pub async fn delete(&self, id: ExamResultId) -> ServiceResult<()> {
        if self.results.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound("Result"));
        }
        self.results.delete(id).await?;
        info!(result_id = %id, "Exam result deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exam_result::Grade;
    use crate::domain::user::{Role, User};
    use crate::infrastructure::repositories::{
        InMemoryExamResultRepository, InMemoryUserRepository,
    };

    fn caller(user: &User) -> AuthUser {
        AuthUser {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            class_name: user.class_name.clone(),
        }
    }

    async fn setup() -> (ResultService, User, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let teacher = User::new("tara".into(), String::new(), "tara@school.test".into(), Role::Teacher);
        let student = User::new("sam".into(), String::new(), "sam@school.test".into(), Role::Student);
        users.save(&teacher).await.unwrap();
        users.save(&student).await.unwrap();
        (
            ResultService::new(Arc::new(InMemoryExamResultRepository::new()), users),
            teacher,
            student,
        )
    }

    fn request(student: UserId, obtained: f64, total: f64) -> ResultRequest {
        ResultRequest {
            student: Some(student),
            subject: Some(Subject::Mathematics),
            exam_type: Some(ExamType::Midterm),
            exam_name: Some("Midterm 1".into()),
            marks_obtained: Some(obtained),
            total_marks: Some(total),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_derives_grade() {
        let (svc, teacher, student) = setup().await;
        let view = svc
            .create(&caller(&teacher), request(student.id, 45.0, 50.0))
            .await
            .unwrap();
        assert_eq!(view.result.percentage, Some(90.0));
        assert_eq!(view.result.grade, Some(Grade::APlus));
        assert_eq!(view.added_by_info.unwrap().username, "tara");
    }

    #[tokio::test]
    async fn test_update_rederives() {
        let (svc, teacher, student) = setup().await;
        let view = svc
            .create(&caller(&teacher), request(student.id, 45.0, 50.0))
            .await
            .unwrap();
        let updated = svc
            .update(
                view.result.id,
                ResultRequest {
                    marks_obtained: Some(30.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.result.percentage, Some(60.0));
        assert_eq!(updated.result.grade, Some(Grade::B));
        assert_eq!(updated.result.student, student.id);
    }

    #[tokio::test]
    async fn test_rejects_invalid_marks() {
        let (svc, teacher, student) = setup().await;
        assert!(matches!(
            svc.create(&caller(&teacher), request(student.id, 10.0, 0.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create(&caller(&teacher), request(student.id, -1.0, 50.0)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_students_limited_to_own_results() {
        let (svc, teacher, student) = setup().await;
        let view = svc
            .create(&caller(&teacher), request(student.id, 20.0, 50.0))
            .await
            .unwrap();

        let mine = svc.list(&caller(&student), ResultQuery::default()).await.unwrap();
        assert_eq!(mine.len(), 1);

        let stranger = AuthUser {
            id: UserId::new(),
            username: "other".into(),
            role: Role::Student,
            class_name: None,
        };
        assert!(svc.list(&stranger, ResultQuery::default()).await.unwrap().is_empty());
        assert!(matches!(
            svc.get(&stranger, view.result.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }
}
