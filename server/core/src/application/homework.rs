// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Homework assignments and student submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::application::auth::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::common::HomeworkId;
use crate::domain::homework::{Homework, HomeworkStatus, Submission};
use crate::domain::repository::{HomeworkFilter, HomeworkRepository};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub status: Option<HomeworkStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkQuery {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub status: Option<HomeworkStatus>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkView {
    #[serde(flatten)]
    pub homework: Homework,
    pub is_overdue: bool,
}

impl HomeworkView {
    fn at(homework: Homework, now: DateTime<Utc>) -> Self {
        let is_overdue = homework.is_overdue(now);
        Self {
            homework,
            is_overdue,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeworkPage {
    pub homeworks: Vec<HomeworkView>,
    pub pagination: Pagination,
}

pub struct HomeworkService {
    homework: Arc<dyn HomeworkRepository>,
}

fn text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl HomeworkService {
    pub fn new(homework: Arc<dyn HomeworkRepository>) -> Self {
        Self { homework }
    }

    async fn load_active(&self, id: HomeworkId) -> ServiceResult<Homework> {
        self.homework
            .find_by_id(id)
            .await?
            .filter(|hw| hw.is_active)
            .ok_or(ServiceError::NotFound("Homework"))
    }

    pub async fn create(&self, caller: &AuthUser, request: HomeworkRequest) -> ServiceResult<HomeworkView> {
        let (Some(title), Some(description), Some(subject), Some(class_name), Some(due_date)) = (
            text(request.title.as_deref()),
            text(request.description.as_deref()),
            text(request.subject.as_deref()),
            text(request.class_name.as_deref()),
            request.due_date,
        ) else {
            return Err(ServiceError::validation(
                "Title, description, subject, class, and due date are required",
            ));
        };
        let now = Utc::now();
        if due_date <= now {
            return Err(ServiceError::validation("Due date must be in the future"));
        }

        let homework = Homework::new(
            title,
            description,
            subject,
            class_name,
            due_date,
            caller.id,
            text(request.assigned_to.as_deref()),
        );
        self.homework.save(&homework).await?;
        info!(homework_id = %homework.id, class = %homework.class_name, "Homework assigned");
        Ok(HomeworkView::at(homework, now))
    }

    /// One page of active homework, earliest due first. Students are pinned
    /// to their own class.
    pub async fn list(&self, caller: &AuthUser, query: HomeworkQuery) -> ServiceResult<HomeworkPage> {
        let class_name = if caller.is_student() {
            match caller.class_name.clone() {
                Some(class_name) => Some(class_name),
                None => return Err(ServiceError::validation("Student class not found")),
            }
        } else {
            text(query.class_name.as_deref())
        };
        let filter = HomeworkFilter {
            class_name,
            subject: text(query.subject.as_deref()),
            status: query.status,
            ..Default::default()
        };

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let all = self.homework.find(&filter).await?;
        let total_items = all.len();
        let now = Utc::now();
        let homeworks = all
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(|hw| HomeworkView::at(hw, now))
            .collect();

        Ok(HomeworkPage {
            homeworks,
            pagination: Pagination {
                current_page: page,
                total_pages: total_items.div_ceil(limit),
                total_items,
                items_per_page: limit,
            },
        })
    }

    pub async fn get(&self, caller: &AuthUser, id: HomeworkId) -> ServiceResult<HomeworkView> {
        let homework = self.load_active(id).await?;
        if caller.is_student() && caller.class_name.as_deref() != Some(homework.class_name.as_str()) {
            return Err(ServiceError::forbidden("This homework is not assigned to your class"));
        }
        Ok(HomeworkView::at(homework, Utc::now()))
    }

    /// Edits assignment fields. Submissions are only changed through `submit`.
    pub async fn update(&self, id: HomeworkId, request: HomeworkRequest) -> ServiceResult<HomeworkView> {
        let mut homework = self.load_active(id).await?;
        if let Some(title) = text(request.title.as_deref()) {
            homework.title = title;
        }
        if let Some(description) = text(request.description.as_deref()) {
            homework.description = description;
        }
        if let Some(subject) = text(request.subject.as_deref()) {
            homework.subject = subject;
        }
        if let Some(class_name) = text(request.class_name.as_deref()) {
            homework.class_name = class_name;
        }
        if let Some(due_date) = request.due_date {
            homework.due_date = due_date;
        }
        if let Some(assigned_to) = text(request.assigned_to.as_deref()) {
            homework.assigned_to = assigned_to;
        }
        if let Some(status) = request.status {
            homework.status = status;
        }
        let now = Utc::now();
        homework.updated_at = now;
        self.homework.save(&homework).await?;
        Ok(HomeworkView::at(homework, now))
    }

    pub async fn deactivate(&self, id: HomeworkId) -> ServiceResult<()> {
        let mut homework = self.load_active(id).await?;
        homework.is_active = false;
        homework.updated_at = Utc::now();
        self.homework.save(&homework).await?;
        info!(homework_id = %id, "Homework deactivated");
        Ok(())
    }

    pub async fn submit(
        &self,
        caller: &AuthUser,
        id: HomeworkId,
        submission_text: Option<String>,
    ) -> ServiceResult<Submission> {
        let mut homework = self.load_active(id).await?;
        if caller.class_name.as_deref() != Some(homework.class_name.as_str()) {
            return Err(ServiceError::forbidden("This homework is not assigned to your class"));
        }
        let submission = homework
            .submit(caller.id, submission_text.unwrap_or_default())
            .cloned()
            .ok_or_else(|| ServiceError::validation("Homework already submitted"))?;
        homework.updated_at = Utc::now();
        self.homework.save(&homework).await?;
        info!(homework_id = %id, student = %caller.id, "Homework submitted");
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::common::UserId;
    use crate::domain::user::Role;
    use crate::infrastructure::repositories::InMemoryHomeworkRepository;

    fn user(role: Role, class_name: Option<&str>) -> AuthUser {
        AuthUser {
            id: UserId::new(),
            username: "u".into(),
            role,
            class_name: class_name.map(str::to_string),
        }
    }

    fn request(title: &str, class: &str, due_in: Duration) -> HomeworkRequest {
        HomeworkRequest {
            title: Some(title.into()),
            description: Some("read chapter".into()),
            subject: Some("History".into()),
            class_name: Some(class.into()),
            due_date: Some(Utc::now() + due_in),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_due_date_must_be_future() {
        let svc = HomeworkService::new(Arc::new(InMemoryHomeworkRepository::new()));
        let teacher = user(Role::Teacher, None);
        assert!(matches!(
            svc.create(&teacher, request("late", "4A", Duration::hours(-1))).await,
            Err(ServiceError::Validation(_))
        ));
        let created = svc.create(&teacher, request("ok", "4A", Duration::days(1))).await.unwrap();
        assert!(!created.is_overdue);
        assert_eq!(created.homework.assigned_to, "all");
    }

    #[tokio::test]
    async fn test_pagination_and_class_scoping() {
        let svc = HomeworkService::new(Arc::new(InMemoryHomeworkRepository::new()));
        let teacher = user(Role::Teacher, None);
        for day in 1..=5 {
            svc.create(&teacher, request(&format!("hw{}", day), "4A", Duration::days(day)))
                .await
                .unwrap();
        }
        svc.create(&teacher, request("other", "4B", Duration::days(1))).await.unwrap();

        let student = user(Role::Student, Some("4A"));
        let page = svc
            .list(
                &student,
                HomeworkQuery {
                    class_name: Some("4B".into()),
                    page: Some(2),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 2,
                total_pages: 3,
                total_items: 5,
                items_per_page: 2,
            }
        );
        let titles: Vec<&str> = page.homeworks.iter().map(|v| v.homework.title.as_str()).collect();
        assert_eq!(titles, vec!["hw3", "hw4"]);
    }

    #[tokio::test]
    async fn test_submit_once() {
        let svc = HomeworkService::new(Arc::new(InMemoryHomeworkRepository::new()));
        let teacher = user(Role::Teacher, None);
        let hw = svc.create(&teacher, request("essay", "4A", Duration::days(2))).await.unwrap();
        let id = hw.homework.id;

        let student = user(Role::Student, Some("4A"));
        svc.submit(&student, id, Some("done".into())).await.unwrap();
        assert!(matches!(
            svc.submit(&student, id, Some("again".into())).await,
            Err(ServiceError::Validation(_))
        ));

        let outsider = user(Role::Student, Some("4B"));
        assert!(matches!(
            svc.submit(&outsider, id, None).await,
            Err(ServiceError::Forbidden(_))
        ));

        let updated = svc
            .update(
                id,
                HomeworkRequest {
                    status: Some(HomeworkStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.homework.submissions.len(), 1);
        assert_eq!(updated.homework.status, HomeworkStatus::Done);
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let svc = HomeworkService::new(Arc::new(InMemoryHomeworkRepository::new()));
        let teacher = user(Role::Admin, None);
        let hw = svc.create(&teacher, request("gone", "4A", Duration::days(2))).await.unwrap();
        svc.deactivate(hw.homework.id).await.unwrap();
        assert!(matches!(
            svc.get(&teacher, hw.homework.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
