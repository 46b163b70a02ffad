use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Body of `POST /claim-points`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPointsRequest<'a> {
    pub wallet_address: &'a str,
}

/// Body of `POST /node-points` (heartbeat).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePointsRequest<'a> {
    pub wallet_address: &'a str,
    /// Client clock in Unix milliseconds.
    pub last_start_time: i64,
}

/// Response of `POST /node-points`. Every field is optional; the server is
/// not trusted to always report a total.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePointsResponse {
    #[serde(default)]
    pub node_points: Option<f64>,
}

impl NodePointsResponse {
    /// Parse a response body, treating non-JSON or unexpected shapes as
    /// "no points reported".
    pub fn parse_lenient(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Lifecycle label shown for a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState {
    Starting,
    Claimed,
    ClaimFailed,
    Running,
    Error,
}

impl WalletState {
    pub fn label(self) -> &'static str {
        match self {
            WalletState::Starting => "Starting",
            WalletState::Claimed => "Claimed",
            WalletState::ClaimFailed => "Claim failed",
            WalletState::Running => "Running",
            WalletState::Error => "Error",
        }
    }
}

impl fmt::Display for WalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last-known status of one wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletStatus {
    pub state: WalletState,
    pub last_heartbeat: Option<DateTime<Local>>,
    pub points: f64,
    pub error: Option<String>,
}

impl Default for WalletStatus {
    fn default() -> Self {
        Self {
            state: WalletState::Starting,
            last_heartbeat: None,
            points: 0.0,
            error: None,
        }
    }
}

/// Result of a single claim or update call, reported by a heartbeat task.
#[derive(Debug, Clone, PartialEq)]
pub enum HeartbeatOutcome {
    Claimed,
    /// Claim errors are not kept; only the label changes.
    ClaimFailed,
    Updated {
        at: DateTime<Local>,
        points: Option<f64>,
    },
    UpdateFailed(String),
}

/// Message from a wallet's heartbeat task to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatEvent {
    pub wallet: String,
    pub outcome: HeartbeatOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_body_field_names() {
        let body = UpdatePointsRequest {
            wallet_address: "0xabc",
            last_start_time: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "walletAddress": "0xabc", "lastStartTime": 1_700_000_000_000i64 })
        );
    }

    #[test]
    fn claim_body_field_names() {
        let body = ClaimPointsRequest {
            wallet_address: "0xabc",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "walletAddress": "0xabc" })
        );
    }

    #[test]
    fn response_with_points() {
        let r = NodePointsResponse::parse_lenient(r#"{"nodePoints": 1234, "other": true}"#);
        assert_eq!(r.node_points, Some(1234.0));
    }

    #[test]
    fn response_without_points() {
        let r = NodePointsResponse::parse_lenient(r#"{"message": "ok"}"#);
        assert_eq!(r.node_points, None);
    }

    #[test]
    fn response_not_json() {
        assert_eq!(NodePointsResponse::parse_lenient("OK").node_points, None);
        assert_eq!(NodePointsResponse::parse_lenient("").node_points, None);
    }

    #[test]
    fn response_null_points() {
        let r = NodePointsResponse::parse_lenient(r#"{"nodePoints": null}"#);
        assert_eq!(r.node_points, None);
    }

    #[test]
    fn new_status_is_starting() {
        let s = WalletStatus::default();
        assert_eq!(s.state, WalletState::Starting);
        assert_eq!(s.points, 0.0);
        assert!(s.last_heartbeat.is_none());
        assert!(s.error.is_none());
    }
}
