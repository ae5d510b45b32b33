//! Wire types for the expense workflow endpoints

use serde::{Deserialize, Serialize};

use bursar_domain::{PendingExpense, UserPermissions, ValidationAction, ValidationDecision};

use crate::application::error::Envelope;

/// Body of `GET /api/expenses/workflow/pending`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingExpensesResponse {
    pub success: bool,
    #[serde(default)]
    pub pending_expenses: Vec<PendingExpense>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub user_permissions: Option<UserPermissions>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/expenses/workflow/bulk-validate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkValidateRequest {
    pub expense_ids: Vec<String>,
    pub action: ValidationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&ValidationDecision> for BulkValidateRequest {
    fn from(decision: &ValidationDecision) -> Self {
        Self {
            expense_ids: decision
                .expense_ids()
                .iter()
                .map(|id| id.to_string())
                .collect(),
            action: decision.action(),
            notes: decision.notes().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkValidateResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub processed_count: u32,
}

/// Body of the connection check: `{ success, data: { user: {...} } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<ConnectionTestData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestData {
    pub user: UserPermissions,
}

impl Envelope for PendingExpensesResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Envelope for BulkValidateResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Envelope for ConnectionTestResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_domain::ExpenseId;
    use serde_json::json;

    #[test]
    fn bulk_request_omits_absent_notes() {
        let decision = ValidationDecision::new(
            vec![ExpenseId::from("e1"), ExpenseId::from("e2")],
            ValidationAction::Approve,
            None,
        )
        .unwrap();

        let body = serde_json::to_value(BulkValidateRequest::from(&decision)).unwrap();
        assert_eq!(
            body,
            json!({ "expense_ids": ["e1", "e2"], "action": "approve" })
        );
    }

    #[test]
    fn bulk_request_carries_notes() {
        let decision = ValidationDecision::new(
            vec![ExpenseId::from("e1")],
            ValidationAction::Reject,
            Some("duplicate".to_string()),
        )
        .unwrap();

        let body = serde_json::to_value(BulkValidateRequest::from(&decision)).unwrap();
        assert_eq!(body["notes"], json!("duplicate"));
        assert_eq!(body["action"], json!("reject"));
    }

    #[test]
    fn connection_test_reads_nested_user() {
        let response: ConnectionTestResponse = serde_json::from_value(json!({
            "success": true,
            "data": { "user": { "canValidate": true, "username": "admin", "role": "director" } }
        }))
        .unwrap();

        let user = response.data.unwrap().user;
        assert!(user.can_validate);
        assert_eq!(user.username.as_deref(), Some("admin"));
    }

    #[test]
    fn pending_response_tolerates_missing_metadata() {
        let response: PendingExpensesResponse = serde_json::from_value(json!({
            "success": true,
            "pending_expenses": [{ "id": "e1", "amount": 100 }]
        }))
        .unwrap();

        assert_eq!(response.pending_expenses.len(), 1);
        assert!(response.count.is_none());
        assert!(response.user_permissions.is_none());
    }
}
