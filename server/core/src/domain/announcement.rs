// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{AnnouncementId, UserId};

/// Most announcements returned by a single listing.
pub const LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnnouncementType {
    Announcement,
    Test,
    ClassOff,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Student,
    Teacher,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: AnnouncementType,
    #[serde(default)]
    pub target_audience: Audience,
    pub target_class: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(title: String, message: String, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: AnnouncementId::new(),
            title,
            message,
            kind: AnnouncementType::General,
            target_audience: Audience::All,
            target_class: "all".to_string(),
            priority: Priority::Medium,
            date: None,
            created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a student in `class_name` should see this announcement.
    pub fn visible_to_student(&self, class_name: Option<&str>) -> bool {
        self.target_class == "all"
            || class_name.is_some_and(|c| c == self.target_class)
            || matches!(self.target_audience, Audience::All | Audience::Student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_uses_kebab_case() {
        let json = serde_json::to_string(&AnnouncementType::ClassOff).unwrap();
        assert_eq!(json, "\"class-off\"");
    }

    #[test]
    fn test_student_visibility() {
        let mut a = Announcement::new("Trip".into(), "Zoo on Friday".into(), UserId::new());
        a.target_class = "8B".to_string();
        a.target_audience = Audience::Teacher;
        assert!(a.visible_to_student(Some("8B")));
        assert!(!a.visible_to_student(Some("7A")));
        assert!(!a.visible_to_student(None));

        a.target_audience = Audience::Student;
        assert!(a.visible_to_student(Some("7A")));
    }
}
