// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::common::{current_academic_year, ExamResultId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Mathematics,
    English,
    Science,
    Physics,
    Chemistry,
    Biology,
    History,
    Geography,
    #[serde(rename = "Computer Science")]
    ComputerScience,
    Art,
    Music,
    #[serde(rename = "Physical Education")]
    PhysicalEducation,
    #[serde(rename = "Social Studies")]
    SocialStudies,
    Economics,
    #[serde(rename = "Business Studies")]
    BusinessStudies,
    Psychology,
    Sociology,
    #[serde(rename = "Political Science")]
    PoliticalScience,
    #[serde(rename = "Environmental Science")]
    EnvironmentalScience,
    Literature,
    Philosophy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Quiz,
    Midterm,
    Final,
    Assignment,
    Project,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Semester {
    #[default]
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "3rd")]
    Third,
    #[serde(rename = "4th")]
    Fourth,
    Annual,
}

/// Letter grade, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(label)
    }
}

/// One exam entry for one student.
///
/// `percentage` and `grade` are derived by
/// [`crate::domain::derivation::derive_exam_result`] on every save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: ExamResultId,
    pub student: UserId,
    pub subject: Subject,
    pub exam_type: ExamType,
    pub exam_name: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub exam_date: DateTime<Utc>,
    pub academic_year: String,
    #[serde(default)]
    pub semester: Semester,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new exam entry; optional fields take their defaults.
#[derive(Debug, Clone)]
pub struct NewExamResult {
    pub student: UserId,
    pub subject: Subject,
    pub exam_type: ExamType,
    pub exam_name: String,
    pub marks_obtained: f64,
    pub total_marks: f64,
    pub remarks: Option<String>,
    pub exam_date: Option<DateTime<Utc>>,
    pub semester: Option<Semester>,
    pub added_by: UserId,
}

impl ExamResult {
    pub fn new(input: NewExamResult) -> Self {
        let now = Utc::now();
        let mut result = Self {
            id: ExamResultId::new(),
            student: input.student,
            subject: input.subject,
            exam_type: input.exam_type,
            exam_name: input.exam_name.trim().to_string(),
            marks_obtained: input.marks_obtained,
            total_marks: input.total_marks,
            percentage: None,
            grade: None,
            remarks: input.remarks.map(|r| r.trim().to_string()),
            exam_date: input.exam_date.unwrap_or(now),
            academic_year: current_academic_year(),
            semester: input.semester.unwrap_or_default(),
            added_by: input.added_by,
            created_at: now,
            updated_at: now,
        };
        crate::domain::derivation::derive_exam_result(&mut result);
        result
    }
}
