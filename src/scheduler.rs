use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::RewardApi;
use crate::types::{HeartbeatEvent, HeartbeatOutcome};

/// Default gap between heartbeat updates for one wallet.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Runs one heartbeat task per wallet and reports every outcome on `events`.
///
/// Tasks never touch shared state themselves; the receiver applies events.
pub struct Scheduler<A> {
    api: Arc<A>,
    interval: Duration,
    events: UnboundedSender<HeartbeatEvent>,
    handles: HashMap<String, JoinHandle<()>>,
}

impl<A: RewardApi> Scheduler<A> {
    pub fn new(api: Arc<A>, interval: Duration, events: UnboundedSender<HeartbeatEvent>) -> Self {
        Self {
            api,
            interval,
            events,
            handles: HashMap::new(),
        }
    }

    /// Start heartbeats for `wallet`. Returns `false` if it is already running.
    pub fn start(&mut self, wallet: &str) -> bool {
        if self.handles.contains_key(wallet) {
            return false;
        }
        let handle = tokio::spawn(run_heartbeat(
            Arc::clone(&self.api),
            wallet.to_string(),
            self.interval,
            self.events.clone(),
        ));
        self.handles.insert(wallet.to_string(), handle);
        true
    }

    /// Number of wallets with a live heartbeat task.
    pub fn active(&self) -> usize {
        self.handles.len()
    }

    /// Abort every heartbeat task. In-flight requests are dropped.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

impl<A> Drop for Scheduler<A> {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.abort();
        }
    }
}

/// Claim once, update once, then update every `interval` until aborted.
///
/// The ticker is armed after the first update completes. Updates for one
/// wallet never overlap: when an update outlasts the interval, the next one
/// starts as soon as it finishes, and further ticks missed meanwhile are dropped.
async fn run_heartbeat<A: RewardApi>(
    api: Arc<A>,
    wallet: String,
    interval: Duration,
    events: UnboundedSender<HeartbeatEvent>,
) {
    let outcome = match api.claim_points(&wallet).await {
        Ok(()) => {
            info!("Claimed points for {wallet}");
            HeartbeatOutcome::Claimed
        }
        Err(e) => {
            warn!("Claim failed for {wallet}: {e:#}");
            HeartbeatOutcome::ClaimFailed
        }
    };
    if !send(&events, &wallet, outcome) {
        return;
    }

    let outcome = update_once(api.as_ref(), &wallet).await;
    if !send(&events, &wallet, outcome) {
        return;
    }

    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let outcome = update_once(api.as_ref(), &wallet).await;
        if !send(&events, &wallet, outcome) {
            return;
        }
    }
}

async fn update_once<A: RewardApi>(api: &A, wallet: &str) -> HeartbeatOutcome {
    match api.update_points(wallet, Utc::now().timestamp_millis()).await {
        Ok(resp) => {
            debug!("Heartbeat ok for {wallet} (points: {:?})", resp.node_points);
            HeartbeatOutcome::Updated {
                at: Local::now(),
                points: resp.node_points,
            }
        }
        Err(e) => {
            warn!("Heartbeat failed for {wallet}: {e:#}");
            HeartbeatOutcome::UpdateFailed(format!("{e:#}"))
        }
    }
}

/// Returns `false` once the receiver is gone, which ends the task.
fn send(events: &UnboundedSender<HeartbeatEvent>, wallet: &str, outcome: HeartbeatOutcome) -> bool {
    events
        .send(HeartbeatEvent {
            wallet: wallet.to_string(),
            outcome,
        })
        .is_ok()
}
