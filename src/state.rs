use std::collections::HashMap;

use crate::types::{HeartbeatEvent, HeartbeatOutcome, WalletState, WalletStatus};

/// Tracks the last-known status of every loaded wallet.
///
/// Rows keep file order (duplicates included); statuses are keyed by
/// address, so duplicate rows share one entry.
pub struct StatusTable {
    wallets: Vec<String>,
    statuses: HashMap<String, WalletStatus>,
}

impl StatusTable {
    /// Create a `Starting` entry for every wallet before any heartbeat runs.
    pub fn new(wallets: Vec<String>) -> Self {
        let statuses = wallets
            .iter()
            .map(|w| (w.clone(), WalletStatus::default()))
            .collect();
        Self { wallets, statuses }
    }

    /// Wallets in display order.
    pub fn wallets(&self) -> &[String] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn status(&self, wallet: &str) -> Option<&WalletStatus> {
        self.statuses.get(wallet)
    }

    /// Fold one heartbeat result into the table.
    ///
    /// Events for unknown wallets are ignored. Returns whether anything changed.
    pub fn apply(&mut self, event: &HeartbeatEvent) -> bool {
        let Some(status) = self.statuses.get_mut(&event.wallet) else {
            return false;
        };
        match &event.outcome {
            HeartbeatOutcome::Claimed => {
                status.state = WalletState::Claimed;
            }
            HeartbeatOutcome::ClaimFailed => {
                status.state = WalletState::ClaimFailed;
            }
            HeartbeatOutcome::Updated { at, points } => {
                status.state = WalletState::Running;
                status.last_heartbeat = Some(*at);
                if let Some(points) = points {
                    status.points = *points;
                }
                status.error = None;
            }
            HeartbeatOutcome::UpdateFailed(msg) => {
                status.state = WalletState::Error;
                status.error = Some(msg.clone());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn event(wallet: &str, outcome: HeartbeatOutcome) -> HeartbeatEvent {
        HeartbeatEvent {
            wallet: wallet.to_string(),
            outcome,
        }
    }

    fn updated(points: Option<f64>) -> HeartbeatOutcome {
        HeartbeatOutcome::Updated {
            at: Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            points,
        }
    }

    #[test]
    fn one_entry_per_wallet_in_order() {
        let table = StatusTable::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(table.wallets(), ["a", "b", "c"]);
        assert_eq!(table.len(), 3);
        for w in table.wallets() {
            assert_eq!(table.status(w).unwrap().state, WalletState::Starting);
        }
    }

    #[test]
    fn duplicates_share_status() {
        let mut table = StatusTable::new(vec!["a".into(), "a".into()]);
        assert_eq!(table.len(), 2);
        table.apply(&event("a", updated(Some(5.0))));
        assert_eq!(table.status("a").unwrap().points, 5.0);
    }

    #[test]
    fn claim_then_update_runs() {
        let mut table = StatusTable::new(vec!["a".into()]);
        table.apply(&event("a", HeartbeatOutcome::Claimed));
        assert_eq!(table.status("a").unwrap().state, WalletState::Claimed);

        table.apply(&event("a", updated(Some(42.0))));
        let s = table.status("a").unwrap();
        assert_eq!(s.state, WalletState::Running);
        assert_eq!(s.points, 42.0);
        assert!(s.last_heartbeat.is_some());
        assert!(s.error.is_none());
    }

    #[test]
    fn claim_failure_stores_no_error() {
        let mut table = StatusTable::new(vec!["a".into()]);
        table.apply(&event("a", HeartbeatOutcome::ClaimFailed));
        let s = table.status("a").unwrap();
        assert_eq!(s.state, WalletState::ClaimFailed);
        assert!(s.error.is_none());
    }

    #[test]
    fn update_failure_keeps_last_good_values() {
        let mut table = StatusTable::new(vec!["a".into()]);
        table.apply(&event("a", updated(Some(10.0))));
        let before = table.status("a").unwrap().last_heartbeat;

        table.apply(&event("a", HeartbeatOutcome::UpdateFailed("gateway timeout".into())));
        let s = table.status("a").unwrap();
        assert_eq!(s.state, WalletState::Error);
        assert_eq!(s.error.as_deref(), Some("gateway timeout"));
        assert_eq!(s.points, 10.0);
        assert_eq!(s.last_heartbeat, before);
    }

    #[test]
    fn recovery_clears_error() {
        let mut table = StatusTable::new(vec!["a".into()]);
        table.apply(&event("a", HeartbeatOutcome::UpdateFailed("boom".into())));
        table.apply(&event("a", updated(None)));
        let s = table.status("a").unwrap();
        assert_eq!(s.state, WalletState::Running);
        assert!(s.error.is_none());
    }

    #[test]
    fn missing_points_keep_previous_total() {
        let mut table = StatusTable::new(vec!["a".into()]);
        table.apply(&event("a", updated(Some(7.0))));
        table.apply(&event("a", updated(None)));
        assert_eq!(table.status("a").unwrap().points, 7.0);
    }

    #[test]
    fn failures_stay_per_wallet() {
        let mut table = StatusTable::new(vec!["a".into(), "b".into()]);
        table.apply(&event("a", updated(Some(1.0))));
        table.apply(&event("b", HeartbeatOutcome::UpdateFailed("boom".into())));
        assert_eq!(table.status("a").unwrap().state, WalletState::Running);
        assert!(table.status("a").unwrap().error.is_none());
        assert_eq!(table.status("b").unwrap().state, WalletState::Error);
    }

    #[test]
    fn unknown_wallet_ignored() {
        let mut table = StatusTable::new(vec!["a".into()]);
        assert!(!table.apply(&event("zzz", HeartbeatOutcome::Claimed)));
    }
}
