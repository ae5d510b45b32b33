//! View state owned by the validation service
//!
//! Everything here is a local projection of server state. The list is
//! replaced wholesale on each successful load and never edited in place.

use chrono::{DateTime, NaiveDate, Utc};

use bursar_domain::{ExpenseId, PendingExpense, UserPermissions, ValidationStats};

/// Read-only copy of the state handed to renderers
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationView {
    pub pending: Vec<PendingExpense>,
    pub stats: ValidationStats,
    pub permissions: Option<UserPermissions>,
    pub error: Option<String>,
    pub selected: Vec<ExpenseId>,
    pub is_loading: bool,
    pub is_submitting: bool,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// Which in-flight flag an operation raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Activity {
    Loading,
    Submitting,
}

#[derive(Debug)]
pub(crate) struct ValidationState {
    pub pending: Vec<PendingExpense>,
    pub stats: ValidationStats,
    pub permissions: Option<UserPermissions>,
    pub error: Option<String>,
    pub selected: Vec<ExpenseId>,
    pub last_loaded_at: Option<DateTime<Utc>>,
    // Counters rather than booleans: overlapping calls keep the flag up until
    // the last one settles.
    loading_in_flight: u32,
    submitting_in_flight: u32,
}

impl ValidationState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            pending: Vec::new(),
            stats: ValidationStats::new(today),
            permissions: None,
            error: None,
            selected: Vec::new(),
            last_loaded_at: None,
            loading_in_flight: 0,
            submitting_in_flight: 0,
        }
    }

    pub fn can_validate(&self) -> bool {
        self.permissions
            .as_ref()
            .map(|p| p.can_validate)
            .unwrap_or(false)
    }

    pub fn is_active(&self, activity: Activity) -> bool {
        self.counter(activity) > 0
    }

    pub fn begin(&mut self, activity: Activity) {
        let counter = self.counter_mut(activity);
        *counter = counter.saturating_add(1);
    }

    pub fn finish(&mut self, activity: Activity) {
        let counter = self.counter_mut(activity);
        *counter = counter.saturating_sub(1);
    }

    /// Replace the snapshot and derive everything that depends on it
    pub fn apply_snapshot(&mut self, expenses: Vec<PendingExpense>, loaded_at: DateTime<Utc>) {
        self.stats.roll_over(loaded_at.date_naive());
        self.pending = expenses;
        self.stats.refresh_pending(&self.pending);
        let pending = &self.pending;
        self.selected
            .retain(|id| pending.iter().any(|expense| &expense.id == id));
        self.last_loaded_at = Some(loaded_at);
        self.error = None;
    }

    pub fn view(&self) -> ValidationView {
        ValidationView {
            pending: self.pending.clone(),
            stats: self.stats.clone(),
            permissions: self.permissions.clone(),
            error: self.error.clone(),
            selected: self.selected.clone(),
            is_loading: self.is_active(Activity::Loading),
            is_submitting: self.is_active(Activity::Submitting),
            last_loaded_at: self.last_loaded_at,
        }
    }

    fn counter(&self, activity: Activity) -> u32 {
        match activity {
            Activity::Loading => self.loading_in_flight,
            Activity::Submitting => self.submitting_in_flight,
        }
    }

    fn counter_mut(&mut self, activity: Activity) -> &mut u32 {
        match activity {
            Activity::Loading => &mut self.loading_in_flight,
            Activity::Submitting => &mut self.submitting_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_flags_track_overlapping_calls() {
        let mut state = ValidationState::new(at(1).date_naive());
        state.begin(Activity::Loading);
        state.begin(Activity::Loading);
        state.finish(Activity::Loading);
        assert!(state.is_active(Activity::Loading));
        assert!(!state.is_active(Activity::Submitting));

        state.finish(Activity::Loading);
        state.finish(Activity::Loading);
        assert!(!state.is_active(Activity::Loading));
    }

    #[test]
    fn test_apply_snapshot_prunes_selection_and_clears_error() {
        let mut state = ValidationState::new(at(1).date_naive());
        state.selected = vec![ExpenseId::from("e1"), ExpenseId::from("gone")];
        state.error = Some("stale".to_string());

        state.apply_snapshot(
            vec![
                PendingExpense::new("e1", Decimal::from(100)),
                PendingExpense::new("e2", Decimal::from(250)),
            ],
            at(1),
        );

        assert_eq!(state.selected, vec![ExpenseId::from("e1")]);
        assert_eq!(state.error, None);
        assert_eq!(state.stats.pending_count, 2);
        assert_eq!(state.stats.pending_amount, Decimal::from(350));
        assert_eq!(state.last_loaded_at, Some(at(1)));
    }

    #[test]
    fn test_apply_snapshot_rolls_daily_counters() {
        let mut state = ValidationState::new(at(1).date_naive());
        state.stats.approved_today = 4;

        state.apply_snapshot(Vec::new(), at(2));

        assert_eq!(state.stats.approved_today, 0);
        assert_eq!(state.stats.day, at(2).date_naive());
    }
}
