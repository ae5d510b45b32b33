//! Validation decision value objects

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ExpenseId;

/// Decision applied uniformly to every expense in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationAction {
    Approve,
    Reject,
}

impl ValidationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Past-tense label used in notices ("3 expenses approved")
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}

impl fmt::Display for ValidationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Self::Approve),
            "reject" | "rejected" => Ok(Self::Reject),
            other => Err(DomainError::parse(format!(
                "unknown validation action: {other}"
            ))),
        }
    }
}

/// A batch of expense ids with one action and optional notes
///
/// Submitted as a single request; the backend accepts or refuses the batch as
/// a whole. Construction guarantees a non-empty, duplicate-free id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDecision {
    expense_ids: Vec<ExpenseId>,
    action: ValidationAction,
    notes: Option<String>,
}

impl ValidationDecision {
    pub fn new(
        expense_ids: impl IntoIterator<Item = ExpenseId>,
        action: ValidationAction,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        let unique: Vec<ExpenseId> = expense_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if unique.is_empty() {
            return Err(DomainError::validation(
                "Select at least one expense to validate",
            ));
        }

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            expense_ids: unique,
            action,
            notes,
        })
    }

    pub fn expense_ids(&self) -> &[ExpenseId] {
        &self.expense_ids
    }

    pub fn action(&self) -> ValidationAction {
        self.action
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn len(&self) -> usize {
        self.expense_ids.len()
    }

    /// Always false for a constructed decision; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.expense_ids.is_empty()
    }

    pub fn contains(&self, id: &ExpenseId) -> bool {
        self.expense_ids.contains(id)
    }
}
