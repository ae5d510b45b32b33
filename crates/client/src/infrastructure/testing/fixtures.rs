//! Simple test fixtures used across unit tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::application::services::{BULK_VALIDATE_PATH, CONNECTION_TEST_PATH, PENDING_PATH};
use crate::ports::outbound::{ApiError, RawApiPort};

pub fn api_request_failed(msg: &str) -> ApiError {
    ApiError::RequestFailed(msg.to_string())
}

/// Minimal pending expense as the backend serializes it
pub fn expense_json(id: &str, amount: Value) -> Value {
    json!({
        "id": id,
        "description": format!("Expense {id}"),
        "amount": amount,
    })
}

/// Three expenses: two in "supplies", one without category
pub fn sample_pending() -> Vec<Value> {
    vec![
        json!({
            "id": "e1",
            "description": "Printer paper",
            "amount": 100,
            "category": { "id": "supplies", "name": "Supplies" },
            "responsible": { "id": "staff-1", "name": "Office" },
            "created_at": "2026-10-17T08:30:00Z",
            "formatted_amount": "100,00 €",
        }),
        json!({
            "id": "e2",
            "description": "Bus rental",
            "amount": "250.00",
        }),
        json!({
            "id": "e3",
            "description": "Markers",
            "amount": 12.5,
            "category": { "id": "supplies", "name": "Supplies" },
        }),
    ]
}

struct BackendState {
    pending: Vec<Value>,
    permissions: Value,
    embed_permissions: bool,
    failures: VecDeque<ApiError>,
    rejection: Option<String>,
    processed_cap: Option<u32>,
    pending_calls: usize,
    validate_calls: usize,
    connection_calls: usize,
    validate_bodies: Vec<Value>,
}

/// In-memory stand-in for the expense workflow endpoints.
///
/// Approving or rejecting removes ids from the pending list, so a refetch
/// observes the same transitions a real backend would produce.
pub struct FakeWorkflowBackend {
    state: Mutex<BackendState>,
}

impl FakeWorkflowBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BackendState {
                pending: Vec::new(),
                permissions: json!({
                    "canValidate": true,
                    "username": "bursar",
                    "role": "admin",
                }),
                embed_permissions: false,
                failures: VecDeque::new(),
                rejection: None,
                processed_cap: None,
                pending_calls: 0,
                validate_calls: 0,
                connection_calls: 0,
                validate_bodies: Vec::new(),
            }),
        }
    }

    pub fn with_pending(self, pending: Vec<Value>) -> Self {
        self.set_pending(pending);
        self
    }

    /// Include `user_permissions` in every pending response
    pub fn embedding_permissions(self) -> Self {
        self.lock().embed_permissions = true;
        self
    }

    pub fn set_pending(&self, pending: Vec<Value>) {
        self.lock().pending = pending;
    }

    pub fn set_can_validate(&self, can_validate: bool) {
        self.lock().permissions["canValidate"] = json!(can_validate);
    }

    /// Fail the next GET, whatever its path
    pub fn fail_next_get(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    /// Answer every bulk validation with `success: false`
    pub fn reject_validations(&self, message: &str) {
        self.lock().rejection = Some(message.to_string());
    }

    /// Process at most `cap` ids per batch
    pub fn cap_processed(&self, cap: u32) {
        self.lock().processed_cap = Some(cap);
    }

    pub fn pending_calls(&self) -> usize {
        self.lock().pending_calls
    }

    pub fn validate_calls(&self) -> usize {
        self.lock().validate_calls
    }

    pub fn connection_calls(&self) -> usize {
        self.lock().connection_calls
    }

    pub fn last_validate_body(&self) -> Option<Value> {
        self.lock().validate_bodies.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FakeWorkflowBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn pending_body(state: &BackendState) -> Value {
    let mut body = json!({
        "success": true,
        "pending_expenses": state.pending,
        "count": state.pending.len(),
    });
    if state.embed_permissions {
        body["user_permissions"] = json!({
            "can_validate": state.permissions["canValidate"],
            "username": state.permissions["username"],
            "role": state.permissions["role"],
        });
    }
    body
}

fn bulk_validate(state: &mut BackendState, body: &Value) -> Value {
    if let Some(message) = &state.rejection {
        return json!({ "success": false, "message": message });
    }

    let requested: Vec<String> = body["expense_ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let cap = state.processed_cap.map(|c| c as usize).unwrap_or(usize::MAX);

    let mut processed: Vec<String> = Vec::new();
    for id in requested {
        if processed.len() >= cap {
            break;
        }
        let before = state.pending.len();
        state.pending.retain(|e| e["id"].as_str() != Some(id.as_str()));
        if state.pending.len() < before {
            processed.push(id);
        }
    }

    let action = body["action"].as_str().unwrap_or("approve");
    let verb = if action == "reject" { "rejected" } else { "approved" };
    json!({
        "success": true,
        "message": format!("{} expense(s) {}", processed.len(), verb),
        "processed_count": processed.len(),
    })
}

#[async_trait]
impl RawApiPort for FakeWorkflowBackend {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let mut state = self.lock();
        match path {
            PENDING_PATH => state.pending_calls += 1,
            CONNECTION_TEST_PATH => state.connection_calls += 1,
            _ => {}
        }
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }

        match path {
            PENDING_PATH => Ok(pending_body(&state)),
            CONNECTION_TEST_PATH => Ok(json!({
                "success": true,
                "data": { "user": state.permissions },
            })),
            _ => Err(ApiError::http(404, "Not found")),
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        if path != BULK_VALIDATE_PATH {
            return Err(ApiError::http(404, "Not found"));
        }
        let mut state = self.lock();
        state.validate_calls += 1;
        state.validate_bodies.push(body.clone());
        Ok(bulk_validate(&mut state, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bulk_validate_removes_processed_ids() {
        let backend = FakeWorkflowBackend::new().with_pending(sample_pending());

        let response = backend
            .post_json(
                BULK_VALIDATE_PATH,
                &json!({ "expense_ids": ["e1", "missing"], "action": "approve" }),
            )
            .await
            .unwrap();

        assert_eq!(response["processed_count"], json!(1));
        let pending = backend.get_json(PENDING_PATH).await.unwrap();
        assert_eq!(pending["count"], json!(2));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let backend = FakeWorkflowBackend::new();
        let err = backend.get_json("/api/nope").await.unwrap_err();
        assert_eq!(err, ApiError::http(404, "Not found"));
    }
}
