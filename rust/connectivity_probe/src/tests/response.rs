use crate::config::ExecutionContext;
use crate::errors::ProbeError;
use crate::response::{ConnectivityReport, ProbeResponse, FAILURE_MESSAGE};
use mongodb::bson::doc;

#[test]
fn test_envelope_field_names() {
    let report = ConnectivityReport {
        ping: doc! { "ok": 1 },
        database: "my-app".to_string(),
        collections: vec!["orders".to_string()],
    };
    let response = ProbeResponse::success(report, &ExecutionContext::default());
    let envelope = serde_json::to_value(&response).unwrap();

    assert_eq!(envelope["statusCode"], 200);
    let body: serde_json::Value =
        serde_json::from_str(envelope["body"].as_str().unwrap()).unwrap();
    for field in [
        "success",
        "message",
        "ping",
        "database",
        "collectionsCount",
        "collections",
        "timestamp",
        "vpcInfo",
    ] {
        assert!(body.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn test_failure_body_carries_error_and_code() {
    let error = ProbeError::database("connection refused", Some("ConnectionRefused"));
    let response = ProbeResponse::failure(&error, &ExecutionContext::default());
    let body = response.body_json().unwrap();

    assert_eq!(response.status_code, 500);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], FAILURE_MESSAGE);
    assert_eq!(body["error"], "connection refused");
    assert_eq!(body["errorCode"], "ConnectionRefused");
    assert!(body.get("timestamp").is_some());
    assert!(body.get("vpcInfo").is_some());
}

#[test]
fn test_failure_without_code_omits_it() {
    let response = ProbeResponse::failure(&ProbeError::EmptySecret, &ExecutionContext::default());
    let body = response.body_json().unwrap();
    assert_eq!(body["error"], "Secret value is empty");
    assert!(body.get("errorCode").is_none());
}
