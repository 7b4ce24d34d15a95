// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Fee accounts and payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::application::auth::AuthUser;
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::common::{FeeId, Month, UserId};
use crate::domain::derivation::derive_fee;
use crate::domain::fee::{Fee, Payment};
use crate::domain::repository::{FeeRepository, UserRepository};
use crate::domain::user::UserSummary;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    pub student_id: Option<UserId>,
    pub total_fees: Option<f64>,
    pub paid_fees: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub month: Option<Month>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

/// A fee with its student reference expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeView {
    #[serde(flatten)]
    pub fee: Fee,
    pub student_info: Option<UserSummary>,
}

pub struct FeeService {
    fees: Arc<dyn FeeRepository>,
    users: Arc<dyn UserRepository>,
}

impl FeeService {
    pub fn new(fees: Arc<dyn FeeRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { fees, users }
    }

    async fn populate(&self, fee: Fee) -> ServiceResult<FeeView> {
        let student_info = self.users.find_by_id(fee.student).await?.map(|u| u.summary());
        Ok(FeeView { fee, student_info })
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<FeeView>> {
        let fees = self.fees.list_all().await?;
        let mut views = Vec::with_capacity(fees.len());
        for fee in fees {
            views.push(self.populate(fee).await?);
        }
        Ok(views)
    }

    pub async fn total_paid(&self) -> ServiceResult<f64> {
        Ok(self.fees.total_paid().await?)
    }

    pub async fn by_student(&self, caller: &AuthUser, student: UserId) -> ServiceResult<Vec<Fee>> {
        if caller.is_student() && caller.id != student {
            return Err(ServiceError::forbidden("Students can only view their own fees"));
        }
        Ok(self.fees.find_by_student(student).await?)
    }

    /// Creates the fee for (student, month) or overwrites the existing one.
    pub async fn create_or_update(&self, request: FeeRequest) -> ServiceResult<FeeView> {
        let student = request
            .student_id
            .ok_or_else(|| ServiceError::validation("Student ID and total fees are required"))?;
        let total = request
            .total_fees
            .filter(|t| t.is_finite() && *t > 0.0)
            .ok_or_else(|| {
                ServiceError::validation("Student ID and a positive total fees amount are required")
            })?;
        if request.paid_fees.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(ServiceError::validation("Paid fees cannot be negative"));
        }

        if self.users.find_by_id(student).await?.is_none() {
            return Err(ServiceError::NotFound("Student"));
        }

        let month = request.month.unwrap_or_else(Month::current);
        let fee = match self.fees.find_by_student_and_month(student, month).await? {
            Some(mut existing) => {
                existing.total_fees = total;
                if let Some(paid) = request.paid_fees {
                    existing.paid_fees = paid;
                }
                if let Some(due) = request.due_date {
                    existing.due_date = due;
                }
                if let Some(year) = request.academic_year {
                    existing.academic_year = year;
                }
                existing.updated_at = Utc::now();
                existing
            }
            None => Fee::new(
                student,
                total,
                request.paid_fees.unwrap_or(0.0),
                request.due_date,
                Some(month),
                request.academic_year,
            ),
        };
        self.persist(fee).await
    }

    pub async fn record_payment(&self, id: FeeId, request: PaymentRequest) -> ServiceResult<FeeView> {
        let amount = request
            .amount
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or_else(|| ServiceError::validation("Valid payment amount is required"))?;

        let mut fee = self
            .fees
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Fee record"))?;
        fee.record_payment(Payment::new(
            amount,
            request.payment_method,
            request.receipt_number,
            request.notes,
        ));
        fee.updated_at = Utc::now();
        info!(fee_id = %fee.id, amount, "Payment recorded");
        self.persist(fee).await
    }

    async fn persist(&self, mut fee: Fee) -> ServiceResult<FeeView> {
        derive_fee(&mut fee);
        self.fees.save(&fee).await?;
        self.populate(fee).await
    }
}
