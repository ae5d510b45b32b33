//! Derived views over a pending-expense snapshot
//!
//! Pure functions; callers recompute them whenever the snapshot changes.
//! Groups appear in the order their key is first seen, and expenses keep
//! their snapshot order inside each group.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::PendingExpense;

/// Bucket key for expenses without a category
pub const UNCATEGORIZED_KEY: &str = "uncategorized";

/// Bucket key for expenses without a responsible party
pub const UNASSIGNED_KEY: &str = "unassigned";

/// One partition of the pending list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseGroup {
    pub key: String,
    /// Display label, the reference name when the server provided one
    pub label: String,
    pub expenses: Vec<PendingExpense>,
}

impl ExpenseGroup {
    pub fn total(&self) -> Decimal {
        total_amount(&self.expenses)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

/// Sum of the amounts in the snapshot
pub fn total_amount(expenses: &[PendingExpense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

pub fn group_by_category(expenses: &[PendingExpense]) -> Vec<ExpenseGroup> {
    partition(expenses, |expense| match &expense.category {
        Some(category) => (
            category.id.to_string(),
            category.name.clone().unwrap_or_else(|| category.id.to_string()),
        ),
        None => (UNCATEGORIZED_KEY.to_string(), "Uncategorized".to_string()),
    })
}

pub fn group_by_responsible(expenses: &[PendingExpense]) -> Vec<ExpenseGroup> {
    partition(expenses, |expense| match &expense.responsible {
        Some(responsible) => (
            responsible.id.to_string(),
            responsible
                .name
                .clone()
                .unwrap_or_else(|| responsible.id.to_string()),
        ),
        None => (UNASSIGNED_KEY.to_string(), "Unassigned".to_string()),
    })
}

fn partition<F>(expenses: &[PendingExpense], key_of: F) -> Vec<ExpenseGroup>
where
    F: Fn(&PendingExpense) -> (String, String),
{
    let mut groups: Vec<ExpenseGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        let (key, label) = key_of(expense);
        match index.get(&key) {
            Some(&slot) => groups[slot].expenses.push(expense.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ExpenseGroup {
                    key,
                    label,
                    expenses: vec![expense.clone()],
                });
            }
        }
    }

    groups
}
