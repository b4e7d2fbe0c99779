//! Sui JSON-RPC client with automatic endpoint fallback.
//!
//! Endpoints are tried round-robin starting from the last one that
//! worked; a success makes that endpoint sticky for subsequent calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

/// Cycle-level RPC failures. Per-entry data gaps are handled softly by
/// the adapter; these errors mean the chain collaborator is down.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error from {endpoint}: {message}")]
    Rpc { endpoint: String, message: String },

    #[error("all RPC endpoints failed, last error: {last}")]
    AllEndpointsFailed { last: String },
}

/// Sui blockchain RPC client.
pub struct SuiRpcClient {
    client: reqwest::Client,
    endpoints: Vec<String>,
    /// Index of the last endpoint that answered successfully.
    current: AtomicUsize,
}

impl SuiRpcClient {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints,
            current: AtomicUsize::new(0),
        })
    }

    /// Make a JSON-RPC call, falling back across configured endpoints.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let start = self.current.load(Ordering::Relaxed);
        let mut last_error = String::new();

        for attempt in 0..self.endpoints.len() {
            let index = (start + attempt) % self.endpoints.len();
            let endpoint = &self.endpoints[index];

            match self.call_endpoint(endpoint, &payload).await {
                Ok(result) => {
                    if index != start {
                        info!(endpoint = %endpoint, "switched to RPC endpoint");
                        self.current.store(index, Ordering::Relaxed);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "RPC endpoint failed");
                    last_error = err.to_string();
                }
            }
        }

        Err(RpcError::AllEndpointsFailed { last: last_error })
    }

    async fn call_endpoint(&self, endpoint: &str, payload: &Value) -> Result<Value, RpcError> {
        let response = self.client.post(endpoint).json(payload).send().await?;
        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            return Err(RpcError::Rpc {
                endpoint: endpoint.to_string(),
                message: error.to_string(),
            });
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    /// All objects owned by a wallet, following pagination cursors.
    pub async fn get_owned_objects(&self, wallet_address: &str) -> Result<Vec<Value>, RpcError> {
        let mut all_objects = Vec::new();
        let mut cursor = Value::Null;

        loop {
            let result = self
                .call(
                    "suix_getOwnedObjects",
                    json!([
                        wallet_address,
                        {
                            "filter": null,
                            "options": {
                                "showType": true,
                                "showContent": true,
                                "showOwner": true,
                            },
                        },
                        cursor,
                        50,
                    ]),
                )
                .await?;

            if let Some(data) = result.get("data").and_then(Value::as_array) {
                all_objects.extend(data.iter().cloned());
            }

            let has_next = result
                .get("hasNextPage")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            cursor = result.get("nextCursor").cloned().unwrap_or(Value::Null);

            if !has_next || cursor.is_null() {
                break;
            }
        }

        Ok(all_objects)
    }

    /// Detailed information about a single object.
    pub async fn get_object(&self, object_id: &str) -> Result<Value, RpcError> {
        self.call(
            "sui_getObject",
            json!([
                object_id,
                {"showType": true, "showContent": true, "showOwner": true},
            ]),
        )
        .await
    }

    /// A specific dynamic field object of a parent (table lookup).
    pub async fn get_dynamic_field_object(
        &self,
        parent_id: &str,
        key_type: &str,
        key_value: &str,
    ) -> Result<Value, RpcError> {
        let result = self
            .call(
                "suix_getDynamicFieldObject",
                json!([parent_id, {"type": key_type, "value": key_value}]),
            )
            .await?;
        Ok(result.get("data").cloned().unwrap_or(Value::Null))
    }
}
