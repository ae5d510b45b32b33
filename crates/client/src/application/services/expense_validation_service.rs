//! Expense Validation Service - pending expenses and batch decisions
//!
//! This service handles:
//! - Checking whether the signed-in user may validate expenses
//! - Fetching the pending-expense snapshot
//! - Submitting approve/reject batches and refreshing afterwards
//! - Selection bookkeeping and derived views for renderers
//!
//! The backend is authoritative for every transition. Locally the service
//! only keeps the last snapshot, optimistic counters and a flat error string.
//! Nothing is removed from the list until a refetch says so.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use rust_decimal::Decimal;
use tokio::sync::watch;

use bursar_domain::{
    grouping, ExpenseGroup, ExpenseId, PendingExpense, UserPermissions, ValidationAction,
    ValidationDecision, ValidationStats,
};

use crate::application::api::Api;
use crate::application::dto::{
    BulkValidateRequest, BulkValidateResponse, ConnectionTestResponse, PendingExpensesResponse,
};
use crate::application::error::{EnsureSuccess, ServiceError};
use crate::application::state::{Activity, ValidationState, ValidationView};
use crate::ports::outbound::{ApiError, ClockPort, Notice, NotifierPort, RawApiPort};

/// Pending-expense snapshot endpoint
pub const PENDING_PATH: &str = "/api/expenses/workflow/pending";

/// Batch decision endpoint
pub const BULK_VALIDATE_PATH: &str = "/api/expenses/workflow/bulk-validate";

/// Connection check that also reports the caller's validation capability
pub const CONNECTION_TEST_PATH: &str = "/api/expenses/workflow/test";

const PERMISSIONS_ERROR: &str = "Unable to verify validation permissions";
const LOAD_ERROR: &str = "Failed to load pending expenses";
const VALIDATE_ERROR: &str = "Failed to validate expenses";
const CAPABILITY_REVOKED: &str = "You can no longer validate expenses";

/// Result of a batch the server accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub action: ValidationAction,
    /// Number of ids sent
    pub submitted: usize,
    /// Number of expenses the server reports as processed
    pub processed_count: u32,
    pub message: String,
}

/// Client-side controller for the expense validation workflow.
///
/// Methods take `&self` and may run concurrently (a background poll racing a
/// submission is expected). The last response to resolve wins.
pub struct ExpenseValidationService {
    api: Api,
    notifier: Arc<dyn NotifierPort>,
    clock: Arc<dyn ClockPort>,
    state: RwLock<ValidationState>,
    revision: watch::Sender<u64>,
}

impl ExpenseValidationService {
    pub fn new(
        api: Arc<dyn RawApiPort>,
        notifier: Arc<dyn NotifierPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let today = clock.now().date_naive();
        let (revision, _) = watch::channel(0);
        Self {
            api: Api::new(api),
            notifier,
            clock,
            state: RwLock::new(ValidationState::new(today)),
            revision,
        }
    }

    // -------------------------------------------------------------------------
    // Remote operations
    // -------------------------------------------------------------------------

    /// Ask the backend whether the current user may validate expenses.
    ///
    /// The answer gates polling. Failures leave the previous permissions in
    /// place and set the generic error banner; there is no automatic retry.
    pub async fn load_permissions(&self) -> Result<UserPermissions, ServiceError> {
        match self.fetch_permissions().await {
            Ok(permissions) => {
                tracing::info!(
                    can_validate = permissions.can_validate,
                    username = ?permissions.username,
                    role = ?permissions.role,
                    "Loaded validation permissions"
                );
                let stored = permissions.clone();
                self.update(|state| state.permissions = Some(stored));
                Ok(permissions)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load validation permissions");
                self.update(|state| state.error = Some(PERMISSIONS_ERROR.to_string()));
                Err(e)
            }
        }
    }

    /// Fetch the pending snapshot and replace the local list wholesale.
    ///
    /// On failure the previous list stays as it was and the error banner is
    /// overwritten.
    pub async fn load_pending_expenses(&self) -> Result<Vec<PendingExpense>, ServiceError> {
        let _loading = self.begin(Activity::Loading);

        match self.fetch_pending().await {
            Ok(response) => {
                let loaded_at = self.clock.now();
                let expenses = response.pending_expenses;
                if let Some(count) = response.count {
                    if count != expenses.len() {
                        tracing::debug!(
                            reported = count,
                            received = expenses.len(),
                            "Pending count differs from returned items; using items"
                        );
                    }
                }
                tracing::debug!(count = expenses.len(), "Loaded pending expenses");

                let snapshot = expenses.clone();
                let permissions = response.user_permissions;
                let revoked = self.update(move |state| {
                    state.apply_snapshot(expenses, loaded_at);
                    let Some(permissions) = permissions else {
                        return false;
                    };
                    let revoked = !permissions.can_validate && state.can_validate();
                    state.permissions = Some(permissions);
                    revoked
                });
                if revoked {
                    tracing::info!("Validation capability revoked by server");
                    self.notify(Notice::info(CAPABILITY_REVOKED));
                }
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load pending expenses");
                let message = e.user_message(LOAD_ERROR);
                self.update(|state| state.error = Some(message));
                Err(e)
            }
        }
    }

    /// Approve or reject a batch of expenses.
    ///
    /// On success the matching "today" counter grows by the server's
    /// `processed_count` and the snapshot is refetched. On failure an error
    /// notice is shown and local state is left untouched.
    pub async fn validate(
        &self,
        ids: impl IntoIterator<Item = ExpenseId>,
        action: ValidationAction,
        notes: Option<String>,
    ) -> Result<ValidationOutcome, ServiceError> {
        let decision = match ValidationDecision::new(ids, action, notes) {
            Ok(decision) => decision,
            Err(e) => {
                let error = ServiceError::from(e);
                self.notify(Notice::warning(error.user_message(VALIDATE_ERROR)));
                return Err(error);
            }
        };
        self.submit(decision).await
    }

    /// Single-expense shorthand for [`validate`](Self::validate)
    pub async fn validate_one(
        &self,
        id: impl Into<ExpenseId>,
        action: ValidationAction,
        notes: Option<String>,
    ) -> Result<ValidationOutcome, ServiceError> {
        self.validate([id.into()], action, notes).await
    }

    /// Validate whatever is currently selected
    pub async fn validate_selected(
        &self,
        action: ValidationAction,
        notes: Option<String>,
    ) -> Result<ValidationOutcome, ServiceError> {
        let selected = self.selected_ids();
        self.validate(selected, action, notes).await
    }

    /// Submit an already-built decision
    pub async fn submit(
        &self,
        decision: ValidationDecision,
    ) -> Result<ValidationOutcome, ServiceError> {
        let submitting = self.begin(Activity::Submitting);
        let action = decision.action();
        // Amount known locally at submission time; the capital impact built
        // from it is an approximation of what the server books.
        let approved_amount = match action {
            ValidationAction::Approve => self.amount_of(decision.expense_ids()),
            ValidationAction::Reject => Decimal::ZERO,
        };

        let request = BulkValidateRequest::from(&decision);
        let response = match self.post_bulk(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    action = %action,
                    batch_size = decision.len(),
                    "Expense validation failed"
                );
                self.notify(Notice::error(e.user_message(VALIDATE_ERROR)));
                return Err(e);
            }
        };

        let processed_count = response.processed_count;
        let today = self.clock.now().date_naive();
        let submitted: HashSet<&ExpenseId> = decision.expense_ids().iter().collect();
        self.update(|state| {
            state.stats.roll_over(today);
            state
                .stats
                .record_batch(action, processed_count, approved_amount);
            state.selected.retain(|id| !submitted.contains(id));
        });

        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                format!("{} expense(s) {}", processed_count, action.past_tense())
            });
        tracing::info!(
            action = %action,
            submitted = decision.len(),
            processed = processed_count,
            "Expense batch validated"
        );
        self.notify(Notice::success(message.clone()));
        drop(submitting);

        // The refetch is the only source of truth for what left the list.
        if let Err(e) = self.load_pending_expenses().await {
            tracing::debug!(error = %e, "Refresh after validation failed");
        }

        Ok(ValidationOutcome {
            action,
            submitted: decision.len(),
            processed_count,
            message,
        })
    }

    async fn fetch_permissions(&self) -> Result<UserPermissions, ServiceError> {
        let response: ConnectionTestResponse = self.api.get(CONNECTION_TEST_PATH).await?;
        let response = response.ensure_success(PERMISSIONS_ERROR)?;
        response.data.map(|data| data.user).ok_or_else(|| {
            ServiceError::Api(ApiError::ParseError(
                "connection check returned no user".to_string(),
            ))
        })
    }

    async fn fetch_pending(&self) -> Result<PendingExpensesResponse, ServiceError> {
        let response: PendingExpensesResponse = self.api.get(PENDING_PATH).await?;
        response.ensure_success(LOAD_ERROR)
    }

    async fn post_bulk(
        &self,
        request: &BulkValidateRequest,
    ) -> Result<BulkValidateResponse, ServiceError> {
        let response: BulkValidateResponse = self.api.post(BULK_VALIDATE_PATH, request).await?;
        response.ensure_success(VALIDATE_ERROR)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Toggle an id in the selection. Ids absent from the snapshot are ignored.
    ///
    /// Returns whether the id is selected afterwards.
    pub fn toggle_selection(&self, id: &ExpenseId) -> bool {
        self.update(|state| {
            if let Some(pos) = state.selected.iter().position(|s| s == id) {
                state.selected.remove(pos);
                return false;
            }
            if state.pending.iter().any(|e| &e.id == id) {
                state.selected.push(id.clone());
                return true;
            }
            false
        })
    }

    pub fn select_all(&self) {
        self.update(|state| {
            state.selected = state.pending.iter().map(|e| e.id.clone()).collect();
        });
    }

    pub fn clear_selection(&self) {
        self.update(|state| state.selected.clear());
    }

    pub fn selected_ids(&self) -> Vec<ExpenseId> {
        self.read().selected.clone()
    }

    // -------------------------------------------------------------------------
    // Read-only views
    // -------------------------------------------------------------------------

    pub fn pending_expenses(&self) -> Vec<PendingExpense> {
        self.read().pending.clone()
    }

    pub fn stats(&self) -> ValidationStats {
        self.read().stats.clone()
    }

    pub fn permissions(&self) -> Option<UserPermissions> {
        self.read().permissions.clone()
    }

    pub fn can_validate(&self) -> bool {
        self.read().can_validate()
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.update(|state| state.error = None);
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_active(Activity::Loading)
    }

    pub fn is_submitting(&self) -> bool {
        self.read().is_active(Activity::Submitting)
    }

    pub fn snapshot(&self) -> ValidationView {
        self.read().view()
    }

    pub fn total_pending_amount(&self) -> Decimal {
        grouping::total_amount(&self.read().pending)
    }

    pub fn group_by_category(&self) -> Vec<ExpenseGroup> {
        grouping::group_by_category(&self.read().pending)
    }

    pub fn group_by_responsible(&self) -> Vec<ExpenseGroup> {
        grouping::group_by_responsible(&self.read().pending)
    }

    /// Receiver that ticks on every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, ValidationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate state and signal subscribers. The lock is released before the
    /// signal and is never held across an await point.
    fn update<R>(&self, f: impl FnOnce(&mut ValidationState) -> R) -> R {
        let result = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        result
    }

    fn begin(&self, activity: Activity) -> ActivityGuard<'_> {
        self.update(|state| state.begin(activity));
        ActivityGuard {
            service: self,
            activity,
        }
    }

    fn amount_of(&self, ids: &[ExpenseId]) -> Decimal {
        let ids: HashSet<&ExpenseId> = ids.iter().collect();
        self.read()
            .pending
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| e.amount)
            .sum()
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(level = %notice.level, text = %notice.message, "Notice");
        self.notifier.notify(notice);
    }
}

/// Lowers an in-flight flag when the operation settles, including early returns
struct ActivityGuard<'a> {
    service: &'a ExpenseValidationService,
    activity: Activity,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        let activity = self.activity;
        self.service.update(|state| state.finish(activity));
    }
}
