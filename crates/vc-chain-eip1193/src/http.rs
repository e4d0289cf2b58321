use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use vc_chain_client::{ProviderError, ProviderResult};

use crate::transport::RpcTransport;

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC over HTTP to a node endpoint.
///
/// Reads `VC_RPC_URL` from environment at construction time
/// (default: `http://localhost:8545`). A node has no interactive
/// authorization, so `eth_requestAccounts` is served by `eth_accounts`.
pub struct HttpTransport {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpTransport {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("VC_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ── JSON-RPC envelope ──

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl From<RpcErrorObject> for ProviderError {
    fn from(err: RpcErrorObject) -> Self {
        match err.data {
            Some(Value::String(detail)) if !detail.is_empty() => {
                ProviderError::new(err.code, format!("{}: {detail}", err.message))
            }
            _ => ProviderError::new(err.code, err.message),
        }
    }
}

fn wire_method(method: &str) -> &str {
    match method {
        "eth_requestAccounts" => "eth_accounts",
        other => other,
    }
}

#[async_trait(?Send)]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: wire_method(method),
            params,
        };
        debug!("rpc {} -> {}", body.method, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::disconnected(format!("{method} transport: {err}")))?;

        let status = response.status();
        decode_response(method, status, response.text().await)
    }

    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A body that cannot be read means the connection dropped mid-response.
fn decode_response<E: std::fmt::Display>(
    method: &str,
    status: StatusCode,
    body: Result<String, E>,
) -> ProviderResult<Value> {
    let text =
        body.map_err(|err| ProviderError::disconnected(format!("{method} response body: {err}")))?;
    if !status.is_success() {
        return Err(ProviderError::internal(format!("{method} HTTP {status}: {text}")));
    }

    let envelope: RpcResponse = serde_json::from_str(&text)
        .map_err(|err| ProviderError::internal(format!("{method} parse: {err}")))?;

    if let Some(err) = envelope.error {
        return Err(err.into());
    }
    Ok(envelope.result.unwrap_or(Value::Null))
}
