//! Concrete chain capabilities for the CLI: view queries against a fullnode
//! REST API and submission through an external wallet-bridge endpoint that
//! owns the keys. The console itself never signs anything.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use migra_core::{FinalizationStatus, QueryClient, QueryError, SubmitClient, TxnHandle};
use serde_json::{json, Value};
use tracing::debug;

const FINALIZATION_POLL_INTERVAL: Duration = Duration::from_millis(500);
const FINALIZATION_POLL_LIMIT: u32 = 120;

/// Reject non-HTTPS endpoints unless `allow_insecure` is set.
pub fn validate_endpoint_url(url: &str, allow_insecure: bool) -> Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    if url.starts_with("http://") {
        if allow_insecure {
            return Ok(());
        }
        bail!("Refusing to connect over plain HTTP: {url}\nUse --insecure to allow unencrypted connections.");
    }
    bail!("Invalid endpoint URL scheme: {url}\nExpected an https:// URL.");
}

pub struct ChainGateway {
    http: reqwest::Client,
    node_url: String,
    bridge_url: Option<String>,
}

impl ChainGateway {
    pub fn new(node_url: &str, bridge_url: Option<&str>, allow_insecure: bool) -> Result<Self> {
        validate_endpoint_url(node_url, allow_insecure)?;
        if let Some(bridge) = bridge_url {
            validate_endpoint_url(bridge, allow_insecure)?;
        }
        Ok(Self {
            http: reqwest::Client::new(),
            node_url: node_url.trim_end_matches('/').to_string(),
            bridge_url: bridge_url.map(|b| b.trim_end_matches('/').to_string()),
        })
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge_url.is_some()
    }
}

/// Node error payloads carry an `error_code`; missing-resource codes mean
/// the account simply has nothing of this representation.
fn is_not_found(status: reqwest::StatusCode, body: &Value) -> bool {
    if status == reqwest::StatusCode::NOT_FOUND {
        return true;
    }
    body.get("error_code")
        .and_then(Value::as_str)
        .map(|code| code.ends_with("not_found"))
        .unwrap_or(false)
}

#[async_trait]
impl QueryClient for ChainGateway {
    async fn view(
        &self,
        function: &str,
        arguments: Vec<Value>,
    ) -> std::result::Result<Vec<Value>, QueryError> {
        debug!(%function, "view call");
        let response = self
            .http
            .post(format!("{}/v1/view", self.node_url))
            .json(&json!({
                "function": function,
                "type_arguments": [],
                "arguments": arguments,
            }))
            .send()
            .await
            .map_err(|e| QueryError::Rpc(format!("view request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| QueryError::Rpc(format!("malformed view response: {e}")))?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("view call rejected")
                .to_string();
            if is_not_found(status, &body) {
                return Err(QueryError::ResourceNotFound(message));
            }
            return Err(QueryError::Rpc(format!("{function}: {message}")));
        }

        match body {
            Value::Array(values) => Ok(values),
            other => Err(QueryError::Rpc(format!(
                "expected a result tuple from {function}, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl SubmitClient for ChainGateway {
    async fn submit(&self, function: &str, arguments: Vec<Value>) -> Result<TxnHandle> {
        let bridge = self.bridge_url.as_ref().ok_or_else(|| {
            anyhow!("No wallet bridge configured. Pass --bridge <url> to enable mutating actions.")
        })?;

        let body: Value = self
            .http
            .post(format!("{bridge}/submit"))
            .json(&json!({
                "function": function,
                "type_arguments": [],
                "arguments": arguments,
            }))
            .send()
            .await
            .context("wallet bridge unreachable")?
            .error_for_status()
            .context("wallet bridge rejected the submission")?
            .json()
            .await
            .context("malformed wallet bridge response")?;

        let hash = body
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("wallet bridge response is missing the transaction hash"))?;
        debug!(%function, %hash, "submitted through wallet bridge");
        Ok(TxnHandle {
            hash: hash.to_string(),
        })
    }

    async fn await_finalization(&self, handle: &TxnHandle) -> Result<FinalizationStatus> {
        for _ in 0..FINALIZATION_POLL_LIMIT {
            let response = self
                .http
                .get(format!(
                    "{}/v1/transactions/by_hash/{}",
                    self.node_url, handle.hash
                ))
                .send()
                .await
                .context("finalization poll failed")?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                // Not yet in the mempool view; keep polling.
                tokio::time::sleep(FINALIZATION_POLL_INTERVAL).await;
                continue;
            }

            let body: Value = response
                .error_for_status()
                .context("finalization poll rejected")?
                .json()
                .await
                .context("malformed transaction response")?;

            if body.get("type").and_then(Value::as_str) == Some("pending_transaction") {
                tokio::time::sleep(FINALIZATION_POLL_INTERVAL).await;
                continue;
            }

            return Ok(match body.get("success").and_then(Value::as_bool) {
                Some(true) => FinalizationStatus::Committed,
                _ => FinalizationStatus::Failed(
                    body.get("vm_status")
                        .and_then(Value::as_str)
                        .unwrap_or("transaction failed")
                        .to_string(),
                ),
            });
        }
        bail!("timed out waiting for transaction {} to finalize", handle.hash)
    }
}
