//! Background refresh of the pending-expense snapshot
//!
//! Polling runs only while the user can validate. The returned `PollHandle`
//! is the only way to keep it alive: stopping or dropping the handle cancels
//! the schedule. A refresh already in flight is allowed to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::services::ExpenseValidationService;

/// Refresh period used by the admin dashboard
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periods are clamped to this range before the timer is created
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Handle to a running poll schedule
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop scheduling new refreshes
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// True once stopped or once the loop exited on its own
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
            || self
                .task
                .as_ref()
                .map(JoinHandle::is_finished)
                .unwrap_or(true)
    }

    /// Resolves once the schedule is stopped, by the caller or by the loop
    pub async fn stopped(&self) {
        self.cancel.cancelled().await;
    }

    /// Wait for the poll loop to exit
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Poll task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start refreshing every `interval`, first refresh one interval from now.
///
/// Returns `None` without creating a timer when the user cannot validate.
pub fn start_polling(
    service: Arc<ExpenseValidationService>,
    interval: Duration,
) -> Option<PollHandle> {
    if !service.can_validate() {
        tracing::info!("Validation not permitted; polling not started");
        return None;
    }

    let period = interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
    if period != interval {
        tracing::warn!(
            requested_secs = interval.as_secs(),
            period_secs = period.as_secs(),
            "Poll interval out of range; clamped"
        );
    }

    let cancel = CancellationToken::new();
    let task = tokio::spawn(poll_loop(service, period, cancel.clone()));
    tracing::info!(interval_secs = period.as_secs(), "Started pending expense polling");

    Some(PollHandle {
        cancel,
        task: Some(task),
    })
}

/// Check permissions, load the first snapshot and start polling.
///
/// Returns `None` when the permission check fails or denies validation; in
/// that case the pending list is never requested.
pub async fn activate(
    service: Arc<ExpenseValidationService>,
    interval: Duration,
) -> Option<PollHandle> {
    match service.load_permissions().await {
        Ok(permissions) if permissions.can_validate => {}
        Ok(_) => {
            tracing::info!("User cannot validate expenses");
            return None;
        }
        Err(_) => return None,
    }

    if let Err(e) = service.load_pending_expenses().await {
        tracing::debug!(error = %e, "Initial load failed; polling will retry");
    }

    start_polling(service, interval)
}

async fn poll_loop(
    service: Arc<ExpenseValidationService>,
    period: Duration,
    cancel: CancellationToken,
) {
    // Cancels on every exit path, unwinding included, so `stopped()` resolves.
    let _stopped = cancel.clone().drop_guard();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Pending expense polling stopped");
                break;
            }
            _ = ticker.tick() => {}
        }

        if !service.can_validate() {
            tracing::info!("Validation capability lost; polling stopped");
            break;
        }

        if let Err(e) = service.load_pending_expenses().await {
            tracing::debug!(error = %e, "Scheduled refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{CONNECTION_TEST_PATH, PENDING_PATH};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::notifier::ChannelNotifier;
    use crate::infrastructure::testing::fixtures::{sample_pending, FakeWorkflowBackend};
    use crate::ports::outbound::{MockRawApiPort, RawApiPort};
    use serde_json::json;

    fn service_over(backend: Arc<dyn RawApiPort>) -> Arc<ExpenseValidationService> {
        let (notifier, _rx) = ChannelNotifier::new();
        Arc::new(ExpenseValidationService::new(
            backend,
            Arc::new(notifier),
            Arc::new(FixedClock::default()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_user_gets_no_timer_and_no_fetch() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json()
            .withf(|path| path == CONNECTION_TEST_PATH)
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "success": true,
                    "data": { "user": { "canValidate": false, "username": "jdoe", "role": "staff" } }
                }))
            });
        raw.expect_get_json()
            .withf(|path| path == PENDING_PATH)
            .never();

        let service = service_over(Arc::new(raw));
        let handle = activate(service.clone(), DEFAULT_POLL_INTERVAL).await;

        assert!(handle.is_none());
        time::sleep(Duration::from_secs(120)).await;
        assert!(service.pending_expenses().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_polling_refuses_without_permissions() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());

        assert!(start_polling(service, DEFAULT_POLL_INTERVAL).is_none());
        assert_eq!(backend.pending_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_every_interval_until_stopped() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());

        let handle = activate(service.clone(), DEFAULT_POLL_INTERVAL)
            .await
            .unwrap();
        assert_eq!(backend.pending_calls(), 1);
        assert_eq!(service.pending_expenses().len(), 3);

        time::sleep(Duration::from_secs(65)).await;
        assert_eq!(backend.pending_calls(), 3);

        handle.stop();
        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.pending_calls(), 3);
        assert!(handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());

        let handle = activate(service, DEFAULT_POLL_INTERVAL).await.unwrap();
        drop(handle);

        time::sleep(Duration::from_secs(95)).await;
        assert_eq!(backend.pending_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capability_loss_ends_the_loop() {
        let backend = Arc::new(
            FakeWorkflowBackend::new()
                .with_pending(sample_pending())
                .embedding_permissions(),
        );
        let service = service_over(backend.clone());
        let handle = activate(service.clone(), DEFAULT_POLL_INTERVAL)
            .await
            .unwrap();

        backend.set_can_validate(false);
        time::sleep(Duration::from_secs(31)).await;
        assert!(!service.can_validate());

        handle.join().await;
        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.pending_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_resolves_when_loop_exits_on_its_own() {
        let backend = Arc::new(
            FakeWorkflowBackend::new()
                .with_pending(sample_pending())
                .embedding_permissions(),
        );
        let service = service_over(backend.clone());
        let handle = activate(service, DEFAULT_POLL_INTERVAL).await.unwrap();

        backend.set_can_validate(false);
        let stopped = time::timeout(Duration::from_secs(120), handle.stopped()).await;

        assert!(stopped.is_ok());
        assert!(handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_interval_is_clamped() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());

        let handle = activate(service, Duration::MAX).await.unwrap();
        time::sleep(Duration::from_secs(60)).await;
        assert!(!handle.is_stopped());
        assert_eq!(backend.pending_calls(), 1);

        time::sleep(MAX_POLL_INTERVAL).await;
        assert_eq!(backend.pending_calls(), 2);
        assert!(!handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_does_not_spin() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());

        let handle = activate(service, Duration::ZERO).await.unwrap();
        time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(backend.pending_calls(), 4);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_does_not_reset_the_timer() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());
        let _handle = activate(service.clone(), DEFAULT_POLL_INTERVAL)
            .await
            .unwrap();

        time::sleep(Duration::from_secs(20)).await;
        service
            .validate_one("e1", bursar_domain::ValidationAction::Approve, None)
            .await
            .unwrap();
        assert_eq!(backend.pending_calls(), 2);

        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(backend.pending_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_keeps_schedule_alive() {
        let backend = Arc::new(FakeWorkflowBackend::new().with_pending(sample_pending()));
        let service = service_over(backend.clone());
        let handle = activate(service.clone(), DEFAULT_POLL_INTERVAL)
            .await
            .unwrap();

        backend.fail_next_get(crate::ports::outbound::ApiError::http(503, "busy"));
        time::sleep(Duration::from_secs(31)).await;
        assert!(service.last_error().is_some());

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.pending_calls(), 3);
        assert!(service.last_error().is_none());
        assert!(!handle.is_stopped());
    }
}
