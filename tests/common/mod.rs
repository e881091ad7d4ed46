//! Shared utilities for integration tests: a scriptable JSON-RPC endpoint.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, B256};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kettle_harness::chain::{ChainClient, ChainRole, TxSettings};
use kettle_harness::config::ChainEndpointConfig;

pub const CHAIN_ID: u64 = 16_813_125;
pub const KETTLE: Address = Address::new([0x4b; 20]);
pub const TX_HASH: B256 = B256::new([0xaa; 32]);
pub const DEPLOYED: Address = Address::new([0xdc; 20]);

/// Anvil's first dev key.
pub const FUNDER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum RpcReply {
    Result(Value),
    Error { code: i64, message: String, data: Option<Value> },
}

impl RpcReply {
    pub fn error(message: impl Into<String>) -> Self {
        RpcReply::Error { code: -32000, message: message.into(), data: None }
    }
}

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

type Handler = dyn Fn(&str, &Value) -> Option<RpcReply> + Send + Sync;

struct MockState {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

/// A running mock endpoint.
#[derive(Clone)]
pub struct MockRpc {
    pub url: String,
    state: Arc<MockState>,
}

impl MockRpc {
    /// All calls so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Calls of one method.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.method == method).collect()
    }

    pub fn endpoint(&self) -> ChainEndpointConfig {
        ChainEndpointConfig { rpc_url: self.url.clone(), private_key: FUNDER_KEY.to_string() }
    }

    pub async fn client(&self, role: ChainRole) -> ChainClient {
        ChainClient::connect(role, &self.endpoint(), fast_settings()).await.unwrap()
    }
}

/// Receipt polling tuned for tests.
pub fn fast_settings() -> TxSettings {
    TxSettings {
        poll_interval: Duration::from_millis(10),
        receipt_timeout: Duration::from_secs(5),
        default_gas_limit: 1_000_000,
        transfer_gas_limit: 21_000,
    }
}

/// Start a mock endpoint on an ephemeral port.
///
/// `handler` sees every request first; returning `None` falls through to
/// [`default_reply`].
pub async fn start_mock_rpc<F>(handler: F) -> MockRpc
where
    F: Fn(&str, &Value) -> Option<RpcReply> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(MockState { handler: Box::new(handler), calls: Mutex::new(Vec::new()) });
    let app = Router::new().route("/", post(handle_rpc)).with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockRpc { url: format!("http://{}", addr), state }
}

/// A mock that only gives the canned replies.
pub async fn start_default_mock() -> MockRpc {
    start_mock_rpc(|_, _| None).await
}

async fn handle_rpc(
    State(state): State<Arc<MockState>>,
    Json(request): Json<RpcRequest>,
) -> Json<Value> {
    state.calls.lock().unwrap().push(RecordedCall {
        method: request.method.clone(),
        params: request.params.clone(),
    });

    let reply = (state.handler)(&request.method, &request.params)
        .unwrap_or_else(|| default_reply(&request.method, &request.params));

    let body = match reply {
        RpcReply::Result(result) => json!({ "jsonrpc": "2.0", "id": request.id, "result": result }),
        RpcReply::Error { code, message, data } => {
            let mut error = json!({ "code": code, "message": message });
            if let Some(data) = data {
                error["data"] = data;
            }
            json!({ "jsonrpc": "2.0", "id": request.id, "error": error })
        }
    };
    Json(body)
}

/// Canned replies for a healthy chain where every transaction succeeds.
pub fn default_reply(method: &str, _params: &Value) -> RpcReply {
    match method {
        "eth_chainId" => RpcReply::Result(json!(format!("{:#x}", CHAIN_ID))),
        "eth_kettleAddress" => RpcReply::Result(json!([format!("{:#x}", KETTLE)])),
        "eth_gasPrice" => RpcReply::Result(json!("0x3b9aca00")),
        "eth_getTransactionCount" => RpcReply::Result(json!("0x0")),
        "eth_getBalance" => RpcReply::Result(json!("0x0")),
        "eth_sendRawTransaction" => RpcReply::Result(json!(format!("{:#x}", TX_HASH))),
        "eth_getTransactionReceipt" => RpcReply::Result(receipt_json(TX_HASH, true, None, vec![])),
        "eth_call" => RpcReply::Result(json!("0x")),
        other => RpcReply::Error {
            code: -32601,
            message: format!("the method {} does not exist/is not available", other),
            data: None,
        },
    }
}

/// An `eth_getTransactionReceipt` result as a kettle would return it.
pub fn receipt_json(
    tx_hash: B256,
    success: bool,
    contract_address: Option<Address>,
    logs: Vec<Value>,
) -> Value {
    json!({
        "transactionHash": format!("{:#x}", tx_hash),
        "type": "0x50",
        "status": if success { "0x1" } else { "0x0" },
        "blockNumber": "0x1",
        "contractAddress": contract_address.map(|a| format!("{:#x}", a)),
        "logs": logs,
    })
}

/// First positional param parsed as an address.
pub fn param_address(params: &Value) -> Option<Address> {
    params.get(0)?.as_str()?.parse().ok()
}
