use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::types::{ClaimPointsRequest, NodePointsResponse, UpdatePointsRequest};

/// The two reward-service calls a heartbeat needs.
///
/// `RewardClient` is the live implementation; tests script their own.
pub trait RewardApi: Send + Sync + 'static {
    /// Claim accrued points for `wallet`.
    fn claim_points(&self, wallet: &str) -> impl Future<Output = Result<()>> + Send;

    /// Report a heartbeat for `wallet`, returning whatever total the server sent back.
    fn update_points(
        &self,
        wallet: &str,
        last_start_time: i64,
    ) -> impl Future<Output = Result<NodePointsResponse>> + Send;
}

/// HTTP client for the LayerEdge dashboard API.
///
/// Built once; every request carries the same browser-like headers.
#[derive(Debug, Clone)]
pub struct RewardClient {
    http: reqwest::Client,
    base_url: String,
}

impl RewardClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let referer = format!("{}/", config.origin.trim_end_matches('/'));
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ORIGIN,
            HeaderValue::from_str(&config.origin).context("invalid api.origin")?,
        );
        headers.insert(
            header::REFERER,
            HeaderValue::from_str(&referer).context("invalid api.origin")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Query the current points for `wallet` (`GET /node-points?wallet=`).
    ///
    /// Returns the raw JSON body; its shape is not relied upon.
    pub async fn check_points(&self, wallet: &str) -> Result<Value> {
        let resp = self
            .http
            .get(self.url("/node-points"))
            .query(&[("wallet", wallet)])
            .send()
            .await
            .context("check points failed")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("check points failed: HTTP {status}");
        }
        let body: Value = resp.json().await.context("check points failed")?;
        Ok(body)
    }
}

impl RewardApi for RewardClient {
    async fn claim_points(&self, wallet: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("/claim-points"))
            .json(&ClaimPointsRequest {
                wallet_address: wallet,
            })
            .send()
            .await
            .context("claim points failed")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("claim points failed: HTTP {status}");
        }
        debug!("Claim for {wallet} returned {status}");
        Ok(())
    }

    async fn update_points(&self, wallet: &str, last_start_time: i64) -> Result<NodePointsResponse> {
        let resp = self
            .http
            .post(self.url("/node-points"))
            .json(&UpdatePointsRequest {
                wallet_address: wallet,
                last_start_time,
            })
            .send()
            .await
            .context("update points failed")?;
        check_update_status(resp.status())?;
        let body = resp.text().await.context("update points failed")?;
        Ok(NodePointsResponse::parse_lenient(&body))
    }
}

/// Map a heartbeat response status to the error shown on the dashboard.
fn check_update_status(status: StatusCode) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::INTERNAL_SERVER_ERROR => bail!("internal server error"),
        StatusCode::GATEWAY_TIMEOUT => bail!("gateway timeout"),
        s => bail!("update points failed: HTTP {s}"),
    }
}
