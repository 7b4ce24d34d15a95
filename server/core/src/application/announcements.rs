// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::application::auth::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::announcement::{Announcement, AnnouncementType, Audience, Priority, LIST_LIMIT};
use crate::domain::common::AnnouncementId;
use crate::domain::repository::{AnnouncementFilter, AnnouncementRepository, UserRepository};
use crate::domain::user::UserSummary;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementType>,
    pub target_audience: Option<Audience>,
    pub target_class: Option<String>,
    pub priority: Option<Priority>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementQuery {
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementType>,
    pub target_audience: Option<Audience>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub created_by_info: Option<UserSummary>,
}

pub struct AnnouncementService {
    announcements: Arc<dyn AnnouncementRepository>,
    users: Arc<dyn UserRepository>,
}

impl AnnouncementService {
    pub fn new(announcements: Arc<dyn AnnouncementRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            announcements,
            users,
        }
    }

    async fn populate(&self, announcement: Announcement) -> ServiceResult<AnnouncementView> {
        let created_by_info = self
            .users
            .find_by_id(announcement.created_by)
            .await?
            .map(|u| u.summary());
        Ok(AnnouncementView {
            announcement,
            created_by_info,
        })
    }

    async fn load_active(&self, id: AnnouncementId) -> ServiceResult<Announcement> {
        self.announcements
            .find_by_id(id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ServiceError::NotFound("Announcement"))
    }

    pub async fn create(
        &self,
        caller: &AuthUser,
        request: AnnouncementRequest,
    ) -> ServiceResult<AnnouncementView> {
        let title = request.title.as_deref().map(str::trim).unwrap_or_default();
        let message = request.message.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || message.is_empty() {
            return Err(ServiceError::validation("Title and message are required"));
        }

        let mut announcement = Announcement::new(title.to_string(), message.to_string(), caller.id);
        apply_options(&mut announcement, &request);
        self.announcements.save(&announcement).await?;
        info!(announcement_id = %announcement.id, "Announcement created");
        self.populate(announcement).await
    }

    /// Newest first, capped at the listing limit. Students only see what is
    /// addressed to everyone, to their class, or to students.
    pub async fn list(
        &self,
        caller: &AuthUser,
        query: AnnouncementQuery,
    ) -> ServiceResult<Vec<AnnouncementView>> {
        let filter = AnnouncementFilter {
            kind: query.kind,
            target_audience: query.target_audience,
            student_class: caller.is_student().then(|| caller.class_name.clone()),
        };
        let items = self.announcements.find_active(&filter, LIST_LIMIT).await?;
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.populate(item).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, id: AnnouncementId) -> ServiceResult<AnnouncementView> {
        let announcement = self.load_active(id).await?;
        self.populate(announcement).await
    }

    pub async fn update(
        &self,
        id: AnnouncementId,
        request: AnnouncementRequest,
    ) -> ServiceResult<AnnouncementView> {
        let mut announcement = self.load_active(id).await?;
        if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            announcement.title = title.to_string();
        }
        if let Some(message) = request.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            announcement.message = message.to_string();
        }
        apply_options(&mut announcement, &request);
        announcement.updated_at = Utc::now();
        self.announcements.save(&announcement).await?;
        self.populate(announcement).await
    }

    /// Soft delete: the record stays but is hidden from every read.
    pub async fn deactivate(&self, id: AnnouncementId) -> ServiceResult<()> {
        let mut announcement = self.load_active(id).await?;
        announcement.is_active = false;
        announcement.updated_at = Utc::now();
        self.announcements.save(&announcement).await?;
        info!(announcement_id = %id, "Announcement deactivated");
        Ok(())
    }
}

fn apply_options(announcement: &mut Announcement, request: &AnnouncementRequest) {
    if let Some(kind) = request.kind {
        announcement.kind = kind;
    }
    if let Some(audience) = request.target_audience {
        announcement.target_audience = audience;
    }
    if let Some(class) = request.target_class.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        announcement.target_class = class.to_string();
    }
    if let Some(priority) = request.priority {
        announcement.priority = priority;
    }
    if request.date.is_some() {
        announcement.date = request.date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::UserId;
    use crate::domain::user::Role;
    use crate::infrastructure::repositories::{
        InMemoryAnnouncementRepository, InMemoryUserRepository,
    };

    fn service() -> AnnouncementService {
        AnnouncementService::new(
            Arc::new(InMemoryAnnouncementRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    fn user(role: Role, class_name: Option<&str>) -> AuthUser {
        AuthUser {
            id: UserId::new(),
            username: "u".into(),
            role,
            class_name: class_name.map(str::to_string),
        }
    }

    fn request(title: &str, audience: Audience, class: &str) -> AnnouncementRequest {
        AnnouncementRequest {
            title: Some(title.into()),
            message: Some("details".into()),
            target_audience: Some(audience),
            target_class: Some(class.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_student_visibility() {
        let svc = service();
        let teacher = user(Role::Teacher, None);
        svc.create(&teacher, request("everyone", Audience::All, "all")).await.unwrap();
        svc.create(&teacher, request("my class", Audience::Teacher, "9A")).await.unwrap();
        svc.create(&teacher, request("other class", Audience::Teacher, "9B")).await.unwrap();

        let student = user(Role::Student, Some("9A"));
        let titles: Vec<String> = svc
            .list(&student, AnnouncementQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.announcement.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(!titles.contains(&"other class".to_string()));

        assert_eq!(svc.list(&teacher, AnnouncementQuery::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_announcement() {
        let svc = service();
        let teacher = user(Role::Teacher, None);
        let created = svc.create(&teacher, request("trip", Audience::All, "all")).await.unwrap();
        let id = created.announcement.id;

        svc.deactivate(id).await.unwrap();
        assert!(matches!(svc.get(id).await, Err(ServiceError::NotFound(_))));
        assert!(svc.list(&teacher, AnnouncementQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_title_and_message_required() {
        let svc = service();
        let teacher = user(Role::Admin, None);
        let blank = AnnouncementRequest {
            title: Some("   ".into()),
            message: Some("x".into()),
            ..Default::default()
        };
        assert!(matches!(svc.create(&teacher, blank).await, Err(ServiceError::Validation(_))));
    }
}
