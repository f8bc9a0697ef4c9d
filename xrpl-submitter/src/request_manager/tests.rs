use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::sleep;
use tracing_test::traced_test;

use xrpl_core::{RequestId, XrplError};

use super::RequestManager;
use crate::SubmitterMetrics;

const LONG_TIMEOUT: Duration = Duration::from_secs(30);

fn manager() -> RequestManager {
    RequestManager::new(SubmitterMetrics::dummy_instance())
}

#[tokio::test]
async fn test_assigns_increasing_ids_and_injects_them() {
    let manager = manager();
    let (first, first_message, _h1) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();
    let (second, second_message, _h2) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();

    assert_eq!(first, RequestId::Number(0));
    assert_eq!(second, RequestId::Number(1));
    let wire: Value = serde_json::from_str(&first_message).unwrap();
    assert_eq!(wire, json!({"command": "ping", "id": 0}));
    let wire: Value = serde_json::from_str(&second_message).unwrap();
    assert_eq!(wire["id"], json!(1));
    assert_eq!(manager.pending().len(), 2);
}

#[tokio::test]
async fn test_keeps_caller_supplied_id() {
    let manager = manager();
    let (id, message, _handle) = manager
        .create_request(json!({"command": "ping", "id": "mine"}), LONG_TIMEOUT)
        .unwrap();
    assert_eq!(id, RequestId::from("mine"));
    assert!(message.contains("\"id\":\"mine\""));
}

#[tokio::test]
async fn test_duplicate_id_fails_without_touching_the_table() {
    let manager = manager();
    let (_, _, handle) = manager
        .create_request(json!({"command": "ping", "id": 7}), LONG_TIMEOUT)
        .unwrap();

    let duplicate = manager.create_request(json!({"command": "fee", "id": 7}), LONG_TIMEOUT);
    assert!(matches!(
        duplicate,
        Err(XrplError::DuplicateRequest { id }) if id == RequestId::Number(7)
    ));
    assert_eq!(manager.pending().len(), 1);

    // the original call is still live and settles normally
    manager
        .handle_response(json!({"id": 7, "status": "success", "type": "response", "result": {}}))
        .unwrap();
    let response = handle.response().await.unwrap();
    assert_eq!(response["type"], json!("response"));
}

#[tokio::test]
async fn test_success_resolves_without_status() {
    let manager = manager();
    let (id, _, handle) = manager
        .create_request(json!({"command": "server_info"}), LONG_TIMEOUT)
        .unwrap();
    manager
        .handle_response(json!({
            "id": id.to_json(),
            "status": "success",
            "type": "response",
            "result": {"info": {"build_version": "2.0.0"}},
        }))
        .unwrap();

    let response = handle.response().await.unwrap();
    assert!(response.get("status").is_none());
    assert_eq!(response["result"]["info"]["build_version"], json!("2.0.0"));
    assert!(manager.pending().is_empty());
}

#[tokio::test]
async fn test_missing_status_is_a_format_error() {
    let manager = manager();
    let (id, _, handle) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();
    manager
        .handle_response(json!({"id": id.to_json(), "result": {}}))
        .unwrap();

    let err = handle.response().await.unwrap_err();
    assert!(
        matches!(err, XrplError::ResponseFormat { ref message, .. } if message == "Response has no status")
    );
    assert!(manager.pending().is_empty());
}

#[tokio::test]
async fn test_error_status_prefers_error_message() {
    let manager = manager();
    let (first, _, with_message) = manager
        .create_request(json!({"command": "tx"}), LONG_TIMEOUT)
        .unwrap();
    let (second, _, code_only) = manager
        .create_request(json!({"command": "tx"}), LONG_TIMEOUT)
        .unwrap();

    manager
        .handle_response(json!({
            "id": first.to_json(),
            "status": "error",
            "error": "txnNotFound",
            "error_message": "Transaction not found.",
        }))
        .unwrap();
    manager
        .handle_response(json!({"id": second.to_json(), "status": "error", "error": "invalidTransaction"}))
        .unwrap();

    let err = with_message.response().await.unwrap_err();
    assert_eq!(err.to_string(), "Transaction not found.");
    assert!(err.is_txn_not_found());
    let err = code_only.response().await.unwrap_err();
    assert_eq!(err.to_string(), "invalidTransaction");
    assert_eq!(err.remote_code(), Some("invalidTransaction"));
}

#[tokio::test]
async fn test_unrecognized_status_is_a_format_error() {
    let manager = manager();
    let (id, _, handle) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();
    manager
        .handle_response(json!({"id": id.to_json(), "status": "pending"}))
        .unwrap();

    let err = handle.response().await.unwrap_err();
    assert_eq!(err.to_string(), "unrecognized response.status: pending");
}

#[tokio::test]
async fn test_unknown_id_is_ignored() {
    let manager = manager();
    let (_, _, _handle) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();

    manager
        .handle_response(json!({"id": 999, "status": "success"}))
        .unwrap();
    assert_eq!(manager.pending().len(), 1);
}

#[tokio::test]
async fn test_invalid_id_is_rejected_without_settling_anything() {
    let manager = manager();
    let (_, _, _handle) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();

    for response in [
        json!({"status": "success"}),
        json!({"id": null, "status": "success"}),
        json!({"id": [0], "status": "success"}),
        json!({"id": -3, "status": "success"}),
    ] {
        let err = manager.handle_response(response).unwrap_err();
        assert!(
            matches!(err, XrplError::ResponseFormat { ref message, .. } if message == "valid id not found in response")
        );
    }
    assert_eq!(manager.pending().len(), 1);
}

#[tokio::test]
async fn test_timeout_fails_the_call_and_late_response_is_dropped() {
    let metrics = SubmitterMetrics::dummy_instance();
    let manager = RequestManager::new(metrics.clone());
    let (id, _, handle) = manager
        .create_request(json!({"command": "ledger"}), Duration::from_millis(20))
        .unwrap();
    assert_eq!(handle.id(), &id);

    let err = handle.response().await.unwrap_err();
    match err {
        XrplError::Timeout {
            message,
            id: timed_out,
            request,
        } => {
            assert_eq!(timed_out, id);
            assert_eq!(request, json!({"command": "ledger"}));
            assert!(message.ends_with("with id 0"));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert!(manager.pending().is_empty());
    assert_eq!(metrics.request_timeouts.get(), 1);

    manager
        .handle_response(json!({"id": id.to_json(), "status": "success"}))
        .unwrap();
}

#[tokio::test]
async fn test_response_cancels_the_deadline() {
    let metrics = SubmitterMetrics::dummy_instance();
    let manager = RequestManager::new(metrics.clone());
    let (id, _, handle) = manager
        .create_request(json!({"command": "ping"}), Duration::from_millis(30))
        .unwrap();
    manager
        .handle_response(json!({"id": id.to_json(), "status": "success"}))
        .unwrap();
    assert!(handle.response().await.is_ok());

    sleep(Duration::from_millis(80)).await;
    assert_eq!(metrics.request_timeouts.get(), 0);
}

#[tokio::test]
async fn test_reject_all_empties_the_table() {
    let manager = manager();
    let handles: Vec<_> = (0..3)
        .map(|_| {
            manager
                .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
                .unwrap()
                .2
        })
        .collect();

    manager.reject_all(&XrplError::Disconnected("websocket was closed, 1006".into()));
    assert!(manager.pending().is_empty());
    for handle in handles {
        assert!(matches!(
            handle.response().await,
            Err(XrplError::Disconnected(_))
        ));
    }

    let (id, _, handle) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();
    manager.resolve(&id, json!({"result": {}})).unwrap();
    assert!(handle.response().await.is_ok());
}

#[tokio::test]
#[traced_test]
async fn test_settling_an_unknown_id_is_loud() {
    let manager = manager();
    let id = RequestId::Number(42);

    assert!(matches!(
        manager.resolve(&id, json!({})),
        Err(XrplError::NoPendingCall { action: "resolve", .. })
    ));
    assert!(matches!(
        manager.reject(&id, XrplError::Validation("x".into())),
        Err(XrplError::NoPendingCall { action: "reject", .. })
    ));
    assert!(logs_contain("Tried to resolve a request that is not pending"));
}

#[tokio::test]
async fn test_exactly_one_settlement_wins() {
    let manager = manager();
    let (id, _, handle) = manager
        .create_request(json!({"command": "ping"}), LONG_TIMEOUT)
        .unwrap();

    manager.resolve(&id, json!({"result": "first"})).unwrap();
    assert!(manager.reject(&id, XrplError::Validation("second".into())).is_err());
    manager
        .handle_response(json!({"id": id.to_json(), "status": "success", "result": "third"}))
        .unwrap();

    assert_eq!(handle.response().await.unwrap()["result"], json!("first"));
}
