// ABOUTME: JSON-RPC 2.0 ledger client over HTTP. Speaks to a node or wallet
// ABOUTME: bridge exposing contract_call/contract_send plus eth_accounts.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Identity, IdentityProvider, Ledger, ProfileRegistry, RawPost, Receipt};
use crate::config::FeedConfig;
use crate::error::{ConnectionError, LedgerError};

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

/// A JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Ledger client talking JSON-RPC over HTTP.
///
/// Reads go through `contract_call`, writes through `contract_send`; both take
/// `{to, method, args}` with `from` added for writes. The active account comes
/// from the standard `eth_requestAccounts` / `eth_accounts` pair.
pub struct RpcLedger {
    endpoint_url: String,
    http_client: reqwest::Client,
    post_contract: String,
    registry_contract: String,
    next_id: AtomicU64,
}

impl RpcLedger {
    /// Build a client from configuration. Validates the endpoint URL but does not connect.
    pub fn new(config: &FeedConfig) -> Result<Self, LedgerError> {
        reqwest::Url::parse(&config.rpc_url)
            .map_err(|e| LedgerError::Protocol(format!("Invalid URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("feedsync/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint_url: config.rpc_url.clone(),
            http_client,
            post_contract: config.post_contract.clone(),
            registry_contract: config.registry_contract.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Send one request and return its `result`.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, LedgerError> {
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            method: method.to_string(),
            params,
        };
        tracing::debug!(method, id = request.id, "ledger rpc");

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Protocol(format!(
                "HTTP {} - {}",
                status.as_u16(),
                body
            )));
        }

        let body = response.text().await?;
        let rpc_response: RpcResponse = serde_json::from_str(&body)?;
        unwrap_response(request.id, rpc_response)
    }

    async fn call(&self, contract: &str, method: &str, args: Value) -> Result<Value, LedgerError> {
        self.request(
            "contract_call",
            Some(json!({ "to": contract, "method": method, "args": args })),
        )
        .await
    }

    async fn send(
        &self,
        from: &Identity,
        method: &str,
        args: Value,
    ) -> Result<Receipt, LedgerError> {
        let value = self
            .request(
                "contract_send",
                Some(json!({
                    "to": self.post_contract,
                    "from": from.as_str(),
                    "method": method,
                    "args": args,
                })),
            )
            .await?;
        decode_receipt(&value)
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn total_count(&self) -> Result<u64, LedgerError> {
        let value = self.call(&self.post_contract, "totalPosts", json!([])).await?;
        decode_uint(&value)
    }

    async fn get_record(&self, index: u64) -> Result<RawPost, LedgerError> {
        let value = self.call(&self.post_contract, "getPost", json!([index])).await?;
        decode_post(index, &value)
    }

    async fn has_liked(&self, index: u64, identity: &Identity) -> Result<bool, LedgerError> {
        let value = self
            .call(
                &self.post_contract,
                "hasLikedPost",
                json!([index, identity.as_str()]),
            )
            .await?;
        value
            .as_bool()
            .ok_or_else(|| LedgerError::Protocol(format!("expected bool, got {}", value)))
    }

    async fn like(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError> {
        self.send(from, "likePost", json!([index])).await
    }

    async fn unlike(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError> {
        self.send(from, "dislikePost", json!([index])).await
    }

    async fn create_post(&self, content: &str, from: &Identity) -> Result<Receipt, LedgerError> {
        self.send(from, "createPost", json!([content])).await
    }
}

#[async_trait]
impl ProfileRegistry for RpcLedger {
    async fn avatar_cid(&self, identity: &Identity) -> Result<String, LedgerError> {
        let value = self
            .call(&self.registry_contract, "getCID", json!([identity.as_str()]))
            .await?;
        decode_string(&value)
    }

    async fn username(&self, identity: &Identity) -> Result<String, LedgerError> {
        let value = self
            .call(&self.registry_contract, "getUsername", json!([identity.as_str()]))
            .await?;
        decode_string(&value)
    }
}

#[async_trait]
impl IdentityProvider for RpcLedger {
    async fn current_identity(&self) -> Result<Identity, ConnectionError> {
        // A declined prompt is not fatal; eth_accounts still reports any authorized account.
        if let Err(e) = self.request("eth_requestAccounts", None).await {
            if matches!(e, LedgerError::Http(_)) {
                return Err(ConnectionError::NoProvider);
            }
            tracing::warn!(error = %e, "account access request failed");
        }

        let value = self.request("eth_accounts", None).await?;
        decode_first_account(&value)
    }
}

/// Check the response id and turn an RPC error object into `LedgerError::Rpc`.
pub(crate) fn unwrap_response(expected_id: u64, response: RpcResponse) -> Result<Value, LedgerError> {
    if response.id != expected_id {
        return Err(LedgerError::Protocol(format!(
            "Response ID {} does not match request ID {}",
            response.id, expected_id
        )));
    }
    if let Some(error) = response.error {
        return Err(LedgerError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    Ok(response.result.unwrap_or(Value::Null))
}

/// Decode an unsigned integer sent as a number, a decimal string, or a `0x` hex string.
pub(crate) fn decode_uint(value: &Value) -> Result<u64, LedgerError> {
    let bad = || LedgerError::Protocol(format!("expected unsigned integer, got {}", value));
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(bad),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| bad()),
                None => s.parse().map_err(|_| bad()),
            }
        }
        _ => Err(bad()),
    }
}

fn decode_string(value: &Value) -> Result<String, LedgerError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(LedgerError::Protocol(format!("expected string, got {}", other))),
    }
}

/// Decode a `getPost` result: a positional tuple `[author, content, timestamp, likeCount]`
/// either as an array or as an object keyed `"0".."3"` or by field name.
pub(crate) fn decode_post(index: u64, value: &Value) -> Result<RawPost, LedgerError> {
    let author_raw = decode_string(post_field(value, index, 0, "author")?)?;
    let author = Identity::parse(&author_raw)
        .map_err(|_| LedgerError::Protocol(format!("post {} has invalid author {}", index, author_raw)))?;

    Ok(RawPost {
        index,
        author,
        content: decode_string(post_field(value, index, 1, "content")?)?,
        created_at: decode_uint(post_field(value, index, 2, "timestamp")?)?,
        like_count: decode_uint(post_field(value, index, 3, "likeCount")?)?,
    })
}

fn post_field<'a>(
    value: &'a Value,
    index: u64,
    pos: usize,
    name: &str,
) -> Result<&'a Value, LedgerError> {
    let found = match value {
        Value::Array(items) => items.get(pos),
        Value::Object(map) => map.get(&pos.to_string()).or_else(|| map.get(name)),
        _ => None,
    };
    found.ok_or_else(|| LedgerError::Protocol(format!("post {} missing field {}", index, name)))
}

/// Decode a transaction receipt, picking the post index out of a `PostCreated` event.
pub(crate) fn decode_receipt(value: &Value) -> Result<Receipt, LedgerError> {
    let tx_hash = value
        .get("transactionHash")
        .and_then(Value::as_str)
        .ok_or_else(|| LedgerError::Protocol("receipt missing transactionHash".to_string()))?
        .to_string();

    let post_index = value
        .pointer("/events/PostCreated/returnValues/postId")
        .map(decode_uint)
        .transpose()?;

    let timestamp = value
        .get("blockTimestamp")
        .map(decode_uint)
        .transpose()?;

    Ok(Receipt {
        tx_hash,
        post_index,
        timestamp,
    })
}

fn decode_first_account(value: &Value) -> Result<Identity, ConnectionError> {
    let first = value
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(Value::as_str)
        .ok_or(ConnectionError::NoIdentity)?;
    Identity::parse(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = FeedConfig::new().rpc_url("not-a-valid-url");
        assert!(RpcLedger::new(&config).is_err());
    }

    #[test]
    fn test_new_keeps_endpoint() {
        let config = FeedConfig::new().rpc_url("https://rpc.example.com");
        let ledger = RpcLedger::new(&config).unwrap();
        assert_eq!(ledger.endpoint_url(), "https://rpc.example.com");
    }

    #[test]
    fn test_decode_uint_forms() {
        assert_eq!(decode_uint(&json!(25)).unwrap(), 25);
        assert_eq!(decode_uint(&json!("25")).unwrap(), 25);
        assert_eq!(decode_uint(&json!("0x19")).unwrap(), 25);
        assert!(decode_uint(&json!(-1)).is_err());
        assert!(decode_uint(&json!(true)).is_err());
    }

    #[test]
    fn test_decode_post_from_array() {
        let post = decode_post(7, &json!([AUTHOR, "gm", "1700000000", "3"])).unwrap();
        assert_eq!(post.index, 7);
        assert_eq!(post.author.as_str(), AUTHOR);
        assert_eq!(post.content, "gm");
        assert_eq!(post.created_at, 1_700_000_000);
        assert_eq!(post.like_count, 3);
    }

    #[test]
    fn test_decode_post_from_positional_object() {
        let value = json!({"0": AUTHOR, "1": "hello", "2": 1700000001u64, "3": 0});
        let post = decode_post(0, &value).unwrap();
        assert_eq!(post.content, "hello");
        assert_eq!(post.like_count, 0);
    }

    #[test]
    fn test_decode_post_missing_field() {
        let err = decode_post(1, &json!([AUTHOR, "x"])).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_decode_receipt_with_event() {
        let value = json!({
            "transactionHash": "0xdead",
            "events": {"PostCreated": {"returnValues": {"postId": "42"}}},
            "blockTimestamp": "0x6553f100"
        });
        let receipt = decode_receipt(&value).unwrap();
        assert_eq!(receipt.tx_hash, "0xdead");
        assert_eq!(receipt.post_index, Some(42));
        assert_eq!(receipt.timestamp, Some(0x6553f100));
    }

    #[test]
    fn test_decode_receipt_without_event() {
        let receipt = decode_receipt(&json!({"transactionHash": "0xbeef"})).unwrap();
        assert_eq!(receipt.post_index, None);
        assert_eq!(receipt.timestamp, None);
    }

    #[test]
    fn test_unwrap_response_error_object() {
        let response = RpcResponse {
            jsonrpc: "2.0".to_string(),
            id: 3,
            result: None,
            error: Some(RpcErrorObject {
                code: 4001,
                message: "User rejected the request.".to_string(),
                data: None,
            }),
        };
        let err = unwrap_response(3, response).unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[test]
    fn test_unwrap_response_id_mismatch() {
        let response = RpcResponse {
            jsonrpc: "2.0".to_string(),
            id: 9,
            result: Some(json!(1)),
            error: None,
        };
        assert!(matches!(
            unwrap_response(3, response),
            Err(LedgerError::Protocol(_))
        ));
    }

    #[test]
    fn test_first_account() {
        assert_eq!(
            decode_first_account(&json!([AUTHOR])).unwrap().as_str(),
            AUTHOR
        );
        assert!(matches!(
            decode_first_account(&json!([])),
            Err(ConnectionError::NoIdentity)
        ));
    }
}
