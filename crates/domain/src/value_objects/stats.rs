//! Validation statistics shown alongside the pending list
//!
//! The backend owns the real numbers. Locally the pending figures are
//! recomputed from each snapshot, while the "today" counters and the capital
//! impact are optimistic increments applied after successful batches. They
//! are never reconciled against the server and may drift.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::PendingExpense;
use crate::value_objects::ValidationAction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    /// Calendar day the "today" counters refer to
    pub day: NaiveDate,
    pub pending_count: usize,
    pub pending_amount: Decimal,
    pub approved_today: u32,
    pub rejected_today: u32,
    /// Cumulative deduction from available funds caused by approvals
    pub capital_impact: Decimal,
}

impl ValidationStats {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            pending_count: 0,
            pending_amount: Decimal::ZERO,
            approved_today: 0,
            rejected_today: 0,
            capital_impact: Decimal::ZERO,
        }
    }

    /// Recompute the pending figures from a fresh snapshot
    pub fn refresh_pending(&mut self, expenses: &[PendingExpense]) {
        self.pending_count = expenses.len();
        self.pending_amount = crate::grouping::total_amount(expenses);
    }

    /// Reset the per-day counters when `today` differs from the tracked day.
    ///
    /// Returns true when a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.day == today {
            return false;
        }
        self.day = today;
        self.approved_today = 0;
        self.rejected_today = 0;
        true
    }

    /// Apply the optimistic increments for a batch the server accepted
    pub fn record_batch(
        &mut self,
        action: ValidationAction,
        processed_count: u32,
        approved_amount: Decimal,
    ) {
        match action {
            ValidationAction::Approve => {
                self.approved_today = self.approved_today.saturating_add(processed_count);
                self.capital_impact += approved_amount;
            }
            ValidationAction::Reject => {
                self.rejected_today = self.rejected_today.saturating_add(processed_count);
            }
        }
    }

    pub fn validated_today(&self) -> u32 {
        self.approved_today.saturating_add(self.rejected_today)
    }
}
