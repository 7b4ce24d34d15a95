// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Derived fields recomputed on every save.
//!
//! These functions are total and side-effect free apart from the record they
//! are handed. Services call them right before a repository write; nothing
//! else assigns the fields they own.

use crate::domain::exam_result::{ExamResult, Grade};
use crate::domain::fee::{Fee, FeeStatus};
use crate::domain::report::Report;

/// Grade breakpoints, checked top down with `>=`.
const GRADE_BREAKPOINTS: [(f64, Grade); 7] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::CPlus),
    (40.0, Grade::C),
    (33.0, Grade::D),
];

/// `(pending, status)` for a fee account.
///
/// Pending is not floored at zero; an overpaid account carries a credit.
pub fn fee_figures(total: f64, paid: f64) -> (f64, FeeStatus) {
    let status = if paid == 0.0 {
        FeeStatus::Pending
    } else if paid >= total {
        FeeStatus::Paid
    } else {
        FeeStatus::Partial
    };
    (total - paid, status)
}

pub fn derive_fee(fee: &mut Fee) {
    let (pending, status) = fee_figures(fee.total_fees, fee.paid_fees);
    fee.pending_fees = pending;
    fee.status = status;
}

/// `obtained / total * 100`, or `None` when the total is not positive.
pub fn percentage(obtained: f64, total: f64) -> Option<f64> {
    if total > 0.0 && obtained.is_finite() {
        Some(obtained / total * 100.0)
    } else {
        None
    }
}

pub fn grade_for(percentage: f64) -> Grade {
    GRADE_BREAKPOINTS
        .iter()
        .find(|(floor, _)| percentage >= *floor)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

/// Fills percentage and grade. Leaves both untouched when the percentage
/// cannot be computed.
pub fn derive_exam_result(result: &mut ExamResult) {
    if let Some(pct) = percentage(result.marks_obtained, result.total_marks) {
        result.percentage = Some(pct);
        result.grade = Some(grade_for(pct));
    }
}

/// `part / whole * 100`, 0 for an empty denominator.
pub fn ratio_percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

pub fn derive_report(report: &mut Report) {
    report.attendance.attendance_percentage =
        ratio_percent(report.attendance.present_days, report.attendance.total_days);
    report.homework.completion_rate =
        ratio_percent(report.homework.submitted, report.homework.assigned);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::{Month, UserId};
    use crate::domain::exam_result::{ExamType, NewExamResult, Subject};

    #[test]
    fn test_fee_status_boundaries() {
        assert_eq!(fee_figures(1000.0, 0.0), (1000.0, FeeStatus::Pending));
        assert_eq!(fee_figures(1000.0, 400.0), (600.0, FeeStatus::Partial));
        assert_eq!(fee_figures(1000.0, 1000.0), (0.0, FeeStatus::Paid));
    }

    #[test]
    fn test_overpaid_fee_keeps_negative_pending() {
        let (pending, status) = fee_figures(1000.0, 1200.0);
        assert_eq!(status, FeeStatus::Paid);
        assert_eq!(pending, -200.0);
    }

    #[test]
    fn test_derive_fee_on_record() {
        let mut fee = Fee::new(UserId::new(), 500.0, 0.0, None, Some(Month::May), None);
        assert_eq!(fee.status, FeeStatus::Pending);
        fee.paid_fees = 250.0;
        derive_fee(&mut fee);
        assert_eq!(fee.status, FeeStatus::Partial);
        assert_eq!(fee.pending_fees, 250.0);
    }

    #[test]
    fn test_grade_boundaries() {
        let cases = [
            (100.0, Grade::APlus),
            (90.0, Grade::APlus),
            (89.999, Grade::A),
            (80.0, Grade::A),
            (79.99, Grade::BPlus),
            (70.0, Grade::BPlus),
            (60.0, Grade::B),
            (59.9, Grade::CPlus),
            (50.0, Grade::CPlus),
            (40.0, Grade::C),
            (39.9, Grade::D),
            (33.0, Grade::D),
            (32.99, Grade::F),
            (0.0, Grade::F),
        ];
        for (pct, expected) in cases {
            assert_eq!(grade_for(pct), expected, "percentage {}", pct);
        }
    }

    #[test]
    fn test_percentage_requires_positive_total() {
        assert_eq!(percentage(45.0, 50.0), Some(90.0));
        assert_eq!(percentage(10.0, 0.0), None);
        assert_eq!(percentage(10.0, -5.0), None);
    }

    #[test]
    fn test_exam_result_derivation() {
        let mut result = ExamResult::new(NewExamResult {
            student: UserId::new(),
            subject: Subject::Mathematics,
            exam_type: ExamType::Midterm,
            exam_name: "Midterm".to_string(),
            marks_obtained: 45.0,
            total_marks: 50.0,
            remarks: None,
            exam_date: None,
            semester: None,
            added_by: UserId::new(),
        });
        assert_eq!(result.percentage, Some(90.0));
        assert_eq!(result.grade, Some(Grade::APlus));

        result.marks_obtained = 20.0;
        derive_exam_result(&mut result);
        assert_eq!(result.percentage, Some(40.0));
        assert_eq!(result.grade, Some(Grade::C));

        result.total_marks = 0.0;
        derive_exam_result(&mut result);
        assert_eq!(result.percentage, Some(40.0));
    }

    #[test]
    fn test_report_zero_denominators() {
        let mut report = Report::new(UserId::new(), Month::March, 2026, UserId::new());
        derive_report(&mut report);
        assert_eq!(report.attendance.attendance_percentage, 0.0);
        assert_eq!(report.homework.completion_rate, 0.0);

        report.attendance.total_days = 20;
        report.attendance.present_days = 15;
        report.homework.assigned = 4;
        report.homework.submitted = 1;
        derive_report(&mut report);
        assert_eq!(report.attendance.attendance_percentage, 75.0);
        assert_eq!(report.homework.completion_rate, 25.0);
    }
}
