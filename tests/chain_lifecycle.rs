//! Deployment, funding and receipt handling against a mock endpoint.

mod common;

use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{hex, Address, U256};
use serde_json::json;

use common::{
    param_address, receipt_json, start_default_mock, start_mock_rpc, RpcReply, DEPLOYED, KETTLE,
    TX_HASH,
};
use kettle_harness::chain::{ChainRole, HarnessError, PendingTransaction, RpcFailure};
use kettle_harness::config::HarnessConfig;
use kettle_harness::contract::{ContractArtifact, ContractHandle};
use kettle_harness::Harness;

const ARTIFACT: &str = r#"{
    "abi": [
        { "type": "constructor", "inputs": [{ "name": "owner", "type": "address" }], "stateMutability": "nonpayable" },
        { "type": "function", "name": "owner", "inputs": [], "outputs": [{ "name": "owner", "type": "address" }], "stateMutability": "view" }
    ],
    "bytecode": { "object": "0x6080604052" }
}"#;

#[tokio::test]
async fn test_connect_discovers_chain_and_kettle() {
    let mock = start_default_mock().await;
    let client = mock.client(ChainRole::Confidential).await;

    assert_eq!(client.chain_id(), common::CHAIN_ID);
    assert_eq!(client.kettle_address(), Some(KETTLE));

    let public = mock.client(ChainRole::Public).await;
    assert_eq!(public.kettle_address(), None);
    assert_eq!(mock.calls_to("eth_kettleAddress").len(), 1);
}

#[tokio::test]
async fn test_connect_fails_without_kettle_address() {
    let mock = start_mock_rpc(|method, _| {
        (method == "eth_kettleAddress").then(|| RpcReply::Result(json!([])))
    })
    .await;

    let result = kettle_harness::ChainClient::connect(
        ChainRole::Confidential,
        &mock.endpoint(),
        common::fast_settings(),
    )
    .await;
    assert!(matches!(result, Err(HarnessError::Rpc(_))));
}

#[tokio::test]
async fn test_deploy_artifact_and_call() {
    let owner = Address::repeat_byte(0x0f);
    let mock = start_mock_rpc(move |method, _| match method {
        "eth_getTransactionReceipt" => {
            Some(RpcReply::Result(receipt_json(TX_HASH, true, Some(DEPLOYED), vec![])))
        }
        "eth_call" => {
            let word = DynSolValue::Address(owner).abi_encode();
            Some(RpcReply::Result(json!(format!("0x{}", hex::encode(word)))))
        }
        _ => None,
    })
    .await;

    let client = mock.client(ChainRole::Confidential).await;
    let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
    let handle = client
        .deploy_artifact(&artifact, &[DynSolValue::Address(owner)])
        .await
        .unwrap();

    assert_eq!(handle.address(), DEPLOYED);
    assert_eq!(handle.signer(), client.funder());

    // creation is a plain legacy transaction even on the kettle
    let sends = mock.calls_to("eth_sendRawTransaction");
    let raw = sends[0].params[0].as_str().unwrap();
    assert!(!raw.starts_with("0x43"));
    assert!(raw.contains("6080604052"));

    let values = handle.call("owner", &[]).await.unwrap();
    assert_eq!(values.address("owner").unwrap(), owner);
}

#[tokio::test]
async fn test_deploy_failure_status() {
    let mock = start_mock_rpc(|method, _| {
        (method == "eth_getTransactionReceipt")
            .then(|| RpcReply::Result(receipt_json(TX_HASH, false, None, vec![])))
    })
    .await;

    let client = mock.client(ChainRole::Public).await;
    let err = client.deploy(&[0x60, 0x80], &[], JsonAbi::new()).await.unwrap_err();
    assert!(matches!(err, HarnessError::DeploymentFailed(hash) if hash == TX_HASH));
}

#[tokio::test]
async fn test_call_revert_is_reported() {
    let mock = start_mock_rpc(|method, _| {
        (method == "eth_call").then(|| RpcReply::Error {
            code: 3,
            message: "execution reverted".to_string(),
            data: Some(json!("0xdeadbeef")),
        })
    })
    .await;

    let client = mock.client(ChainRole::Public).await;
    let abi = JsonAbi::parse(["function owner() returns (address)"]).unwrap();
    let handle = ContractHandle::at(DEPLOYED, abi, client.clone(), client.funder().clone());

    let err = handle.call("owner", &[]).await.unwrap_err();
    match err {
        HarnessError::CallReverted(reason) => assert!(reason.contains("0xdeadbeef")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_call_node_failure_is_not_a_revert() {
    let mock = start_mock_rpc(|method, _| {
        (method == "eth_call").then(|| RpcReply::Error {
            code: -32601,
            message: "the method eth_call does not exist/is not available".to_string(),
            data: None,
        })
    })
    .await;

    let client = mock.client(ChainRole::Public).await;
    let abi = JsonAbi::parse(["function owner() returns (address)"]).unwrap();
    let handle = ContractHandle::at(DEPLOYED, abi, client.clone(), client.funder().clone());

    let err = handle.call("owner", &[]).await.unwrap_err();
    match err {
        HarnessError::Rpc(RpcFailure { code, message, .. }) => {
            assert_eq!(code, Some(-32601));
            assert!(message.contains("eth_call"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fund_account_exact_balance() {
    let target = Address::repeat_byte(0x22);
    let mock = start_mock_rpc(move |method, params| {
        if method != "eth_getBalance" {
            return None;
        }
        let balance =
            if param_address(params) == Some(target) { "0x64" } else { "0xde0b6b3a7640000" };
        Some(RpcReply::Result(json!(balance)))
    })
    .await;

    let client = mock.client(ChainRole::Public).await;
    client.fund_account(target, U256::from(100)).await.unwrap();
    assert_eq!(client.balance(target).await.unwrap(), U256::from(100));
}

#[tokio::test]
async fn test_fund_account_rejects_preexisting_balance() {
    let target = Address::repeat_byte(0x23);
    let mock = start_mock_rpc(move |method, params| {
        (method == "eth_getBalance" && param_address(params) == Some(target))
            .then(|| RpcReply::Result(json!("0x96")))
    })
    .await;

    let client = mock.client(ChainRole::Confidential).await;
    let err = client.fund_account(target, U256::from(100)).await.unwrap_err();

    match err {
        HarnessError::FundingMismatch { address, expected, actual } => {
            assert_eq!(address, target);
            assert_eq!(expected, U256::from(100));
            assert_eq!(actual, U256::from(150));
        }
        other => panic!("unexpected error: {other}"),
    }
    // the transfer itself went through
    assert_eq!(mock.calls_to("eth_sendRawTransaction").len(), 1);
}

#[tokio::test]
async fn test_await_receipt_times_out() {
    let mock = start_mock_rpc(|method, _| {
        (method == "eth_getTransactionReceipt").then(|| RpcReply::Result(serde_json::Value::Null))
    })
    .await;

    let client = mock.client(ChainRole::Public).await;
    let pending = PendingTransaction { hash: TX_HASH };
    let err = client
        .await_receipt(&pending, Some(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Timeout(d) if d == Duration::from_millis(100)));
    assert!(mock.calls_to("eth_getTransactionReceipt").len() >= 2);
}

#[tokio::test]
async fn test_admission_error_keeps_node_message() {
    let mock = start_mock_rpc(|method, _| {
        (method == "eth_sendRawTransaction")
            .then(|| RpcReply::error("insufficient funds for gas * price + value"))
    })
    .await;

    let client = mock.client(ChainRole::Public).await;
    let err = client.fund_account(Address::repeat_byte(1), U256::from(1)).await.unwrap_err();

    match err {
        HarnessError::Rpc(RpcFailure { code, message, .. }) => {
            assert_eq!(code, Some(-32000));
            assert_eq!(message, "insufficient funds for gas * price + value");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_public_chain_rejects_confidential_inputs() {
    let mock = start_default_mock().await;
    let client = mock.client(ChainRole::Public).await;
    let abi = JsonAbi::parse(["function ping()"]).unwrap();
    let handle = ContractHandle::at(DEPLOYED, abi, client.clone(), client.funder().clone());

    let err = handle.submit_transaction("ping", &[], b"secret").await.unwrap_err();
    assert!(matches!(err, HarnessError::Unsupported(_)));
    assert!(mock.calls_to("eth_sendRawTransaction").is_empty());

    handle.send_transaction("ping", &[], &[]).await.unwrap();
    assert_eq!(mock.calls_to("eth_sendRawTransaction").len(), 1);
}

#[tokio::test]
async fn test_harness_connects_both_chains() {
    let kettle = start_default_mock().await;
    let l1 = start_default_mock().await;

    let mut config = HarnessConfig::default();
    config.kettle = kettle.endpoint();
    config.l1.rpc_url = l1.url.clone();

    let harness = Harness::connect(config.clone()).await.unwrap();
    assert_eq!(harness.kettle_address(), KETTLE);
    assert!(matches!(harness.l1(), Err(HarnessError::Unsupported(_))));

    config.l1.enabled = true;
    let harness = Harness::connect(config).await.unwrap();
    assert_eq!(harness.l1().unwrap().role(), ChainRole::Public);
    assert!(l1.calls_to("eth_kettleAddress").is_empty());
}
