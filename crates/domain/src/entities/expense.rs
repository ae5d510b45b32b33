//! Pending expense entity - an expense awaiting an approve/reject decision
//!
//! Pending expenses are created by the submission flow on the backend and are
//! only ever observed here as part of a fetched snapshot. The formatted
//! strings are rendered by the server and carried through untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, ExpenseId, ResponsibleId};

/// Reference to the expense category as embedded by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub name: Option<String>,
}

impl CategoryRef {
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Reference to the staff member responsible for the expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsibleRef {
    pub id: ResponsibleId,
    #[serde(default)]
    pub name: Option<String>,
}

impl ResponsibleRef {
    pub fn new(id: impl Into<ResponsibleId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An expense awaiting validation
///
/// Plain data: any combination of values is accepted because the backend owns
/// every invariant. `amount` accepts JSON numbers and numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingExpense {
    pub id: ExpenseId,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub responsible: Option<ResponsibleRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Server-formatted amount, e.g. "350,00 €"
    #[serde(default)]
    pub formatted_amount: Option<String>,
    /// Server-formatted creation date
    #[serde(default)]
    pub formatted_date: Option<String>,
}

impl PendingExpense {
    pub fn new(id: impl Into<ExpenseId>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            description: None,
            amount,
            category: None,
            responsible: None,
            created_at: None,
            formatted_amount: None,
            formatted_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: CategoryRef) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_responsible(mut self, responsible: ResponsibleRef) -> Self {
        self.responsible = Some(responsible);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_numeric_amount() {
        let expense: PendingExpense = serde_json::from_value(json!({
            "id": "e1",
            "amount": 100,
        }))
        .unwrap();

        assert_eq!(expense.id.as_str(), "e1");
        assert_eq!(expense.amount, Decimal::from(100));
        assert!(expense.category.is_none());
        assert!(expense.formatted_amount.is_none());
    }

    #[test]
    fn deserializes_string_amount_and_references() {
        let expense: PendingExpense = serde_json::from_value(json!({
            "id": "e2",
            "description": "Chalk",
            "amount": "12.50",
            "category": { "id": "supplies", "name": "Supplies" },
            "responsible": { "id": "staff-7" },
            "created_at": "2026-10-01T08:30:00Z",
            "formatted_amount": "12,50 €",
            "formatted_date": "01/10/2026",
        }))
        .unwrap();

        assert_eq!(expense.amount, Decimal::new(1250, 2));
        let category = expense.category.unwrap();
        assert_eq!(category.id.as_str(), "supplies");
        assert_eq!(category.name.as_deref(), Some("Supplies"));
        assert_eq!(expense.responsible.unwrap().name, None);
        assert!(expense.created_at.is_some());
        assert_eq!(expense.formatted_date.as_deref(), Some("01/10/2026"));
    }
}
