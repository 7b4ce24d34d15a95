// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::common::{current_academic_year, FeeId, Month, UserId};

/// Days a new fee stays open when no due date is given.
pub const DEFAULT_DUE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FeeStatus {
    #[default]
    Pending,
    Partial,
    Paid,
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeStatus::Pending => f.write_str("Pending"),
            FeeStatus::Partial => f.write_str("Partial"),
            FeeStatus::Paid => f.write_str("Paid"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: f64,
    pub payment_date: DateTime<Utc>,
    pub payment_method: String,
    pub receipt_number: String,
    #[serde(default)]
    pub notes: String,
}

impl Payment {
    /// Builds a payment entry, defaulting the method to "Cash" and the receipt
    /// number to `RCP-<epoch millis>`.
    pub fn new(
        amount: f64,
        payment_method: Option<String>,
        receipt_number: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            amount,
            payment_date: now,
            payment_method: payment_method.unwrap_or_else(|| "Cash".to_string()),
            receipt_number: receipt_number
                .unwrap_or_else(|| format!("RCP-{}", now.timestamp_millis())),
            notes: notes.unwrap_or_default(),
        }
    }
}

/// A fee account for one student and month.
///
/// `pending_fees` and `status` are derived from `total_fees`/`paid_fees` by
/// [`crate::domain::derivation::derive_fee`] before every save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub id: FeeId,
    pub student: UserId,
    pub total_fees: f64,
    pub paid_fees: f64,
    pub pending_fees: f64,
    pub status: FeeStatus,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub payment_history: Vec<Payment>,
    pub academic_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fee {
    pub fn new(
        student: UserId,
        total_fees: f64,
        paid_fees: f64,
        due_date: Option<DateTime<Utc>>,
        month: Option<Month>,
        academic_year: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let mut fee = Self {
            id: FeeId::new(),
            student,
            total_fees,
            paid_fees,
            pending_fees: 0.0,
            status: FeeStatus::Pending,
            due_date: due_date.unwrap_or_else(|| now + Duration::days(DEFAULT_DUE_DAYS)),
            payment_history: Vec::new(),
            academic_year: academic_year.unwrap_or_else(current_academic_year),
            month: Some(month.unwrap_or_else(Month::current)),
            created_at: now,
            updated_at: now,
        };
        crate::domain::derivation::derive_fee(&mut fee);
        fee
    }

    /// Appends a payment and raises `paid_fees` by its amount.
    pub fn record_payment(&mut self, payment: Payment) {
        self.paid_fees += payment.amount;
        self.payment_history.push(payment);
    }
}
