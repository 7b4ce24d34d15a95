// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{HomeworkId, SubmissionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    #[default]
    Active,
    Pending,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
    Graded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub student: UserId,
    #[serde(default)]
    pub submission_text: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub id: HomeworkId,
    pub title: String,
    pub description: String,
    pub subject: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub due_date: DateTime<Utc>,
    pub assigned_by: UserId,
    pub assigned_to: String,
    #[serde(default)]
    pub status: HomeworkStatus,
    pub is_active: bool,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Homework {
    pub fn new(
        title: String,
        description: String,
        subject: String,
        class_name: String,
        due_date: DateTime<Utc>,
        assigned_by: UserId,
        assigned_to: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: HomeworkId::new(),
            title,
            description,
            subject,
            class_name,
            due_date,
            assigned_by,
            assigned_to: assigned_to.unwrap_or_else(|| "all".to_string()),
            status: HomeworkStatus::Active,
            is_active: true,
            submissions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn submission_by(&self, student: UserId) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.student == student)
    }

    /// Past due and not marked done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && self.status != HomeworkStatus::Done
    }

    /// Appends a submission. Returns `None` if the student already submitted.
    pub fn submit(&mut self, student: UserId, submission_text: String) -> Option<&Submission> {
        if self.submission_by(student).is_some() {
            return None;
        }
        self.submissions.push(Submission {
            id: SubmissionId::new(),
            student,
            submission_text,
            submitted_at: Utc::now(),
            status: SubmissionStatus::Submitted,
        });
        self.submissions.last()
    }
}
