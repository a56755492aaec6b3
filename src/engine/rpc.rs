//! Engine RPC client
//!
//! Talks to the external transfer-engine daemon over a small JSON
//! request/response protocol. The engine owns the peer-to-peer wire protocol;
//! this client only submits jobs, polls status snapshots, and moves the
//! engine's opaque session state in and out as hex-encoded blobs.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::engine::source::Source;
use crate::engine::status::JobStatus;
use crate::engine::{TransferEngine, TransferJob};
use crate::error::RelayError;

/// Default endpoint for a locally running engine daemon
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:7070/rpc";

/// JSON-RPC style client for the transfer engine daemon
pub struct RpcEngine {
    client: reqwest::Client,
    endpoint: String,
}

/// Handle to a job submitted through [`RpcEngine`]
pub struct RpcJob {
    client: reqwest::Client,
    endpoint: String,
    id: u64,
}

impl RpcEngine {
    /// Create a new engine client
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Issue one request to the daemon and return its result payload
    async fn call(&self, method: &str, arguments: Value) -> Result<Value> {
        call(&self.client, &self.endpoint, method, arguments).await
    }
}

/// Shared request helper for [`RpcEngine`] and [`RpcJob`]
async fn call(client: &reqwest::Client, endpoint: &str, method: &str, arguments: Value) -> Result<Value> {
    debug!("Engine RPC call: {}", method);

    let envelope = json!({
        "method": method,
        "arguments": arguments,
    });

    let response = client
        .post(endpoint)
        .json(&envelope)
        .send()
        .await
        .map_err(|e| RelayError::engine_error_with_source("Engine daemon unreachable", e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(RelayError::engine_error_with_source(
            format!("Engine request '{}' failed: {}", method, status),
            error_text,
        )
        .into());
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| RelayError::engine_error_with_source("Invalid engine response", e.to_string()))?;

    if let Some(err) = body.get("error").and_then(Value::as_str) {
        return Err(RelayError::engine_error(format!("Engine rejected '{}': {}", method, err)).into());
    }

    Ok(body)
}

/// Extract a hex-encoded state blob from a `session-save` response
pub(crate) fn parse_state_response(body: &Value) -> Result<Vec<u8>> {
    let encoded = body
        .get("state")
        .and_then(Value::as_str)
        .ok_or_else(|| RelayError::engine_error("Missing state field in session-save response"))?;
    hex::decode(encoded)
        .map_err(|e| RelayError::engine_error_with_source("Invalid hex state blob", e.to_string()).into())
}

/// Extract a job id from a `job-add` response
pub(crate) fn parse_job_id(body: &Value) -> Result<u64> {
    body.get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| RelayError::engine_error("Missing job id in job-add response").into())
}

#[async_trait]
impl TransferEngine for RpcEngine {
    type Job = RpcJob;

    async fn restore(&self, state: &[u8]) -> Result<()> {
        info!("Restoring engine session ({} bytes of state)", state.len());
        self.call("session-load", json!({ "state": hex::encode(state) }))
            .await?;
        Ok(())
    }

    async fn submit(&self, source: &Source, dest: &Path) -> Result<Self::Job> {
        let mut arguments = json!({ "download_dir": dest.to_string_lossy() });

        match source {
            Source::Magnet(uri) => {
                arguments["magnet"] = json!(uri);
            }
            Source::TorrentFile(path) => {
                let data = tokio::fs::read(path).await.map_err(|e| {
                    RelayError::storage_error_full(
                        "Failed to read torrent file",
                        path.display().to_string(),
                        e.to_string(),
                    )
                })?;
                arguments["metainfo"] = json!(hex::encode(data));
            }
        }

        let body = self.call("job-add", arguments).await?;
        let id = parse_job_id(&body)?;
        info!("Submitted {} as job {}", source.describe(), id);

        Ok(RpcJob {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            id,
        })
    }

    async fn save_state(&self) -> Result<Vec<u8>> {
        let body = self.call("session-save", json!({})).await?;
        parse_state_response(&body)
    }
}

#[async_trait]
impl TransferJob for RpcJob {
    async fn status(&self) -> Result<JobStatus> {
        let body = call(&self.client, &self.endpoint, "job-status", json!({ "id": self.id })).await?;
        let status = body
            .get("status")
            .cloned()
            .ok_or_else(|| RelayError::engine_error("Missing status field in job-status response"))?;
        serde_json::from_value(status)
            .map_err(|e| RelayError::engine_error_with_source("Malformed job status", e.to_string()).into())
    }
}
