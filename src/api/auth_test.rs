use super::*;
use crate::test_helpers::{MockTransport, envelope_response, harness, ok_data, status_response};
use reqwest::Method;

fn credentials() -> LoginRequest {
    LoginRequest { username: "admin".into(), password: "hunter2".into() }
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_success_sets_session_flag() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(serde_json::Value::Null))]));
    login(&h.client, &credentials()).await.unwrap();

    assert!(h.session.is_authenticated());
    let request = &h.transport.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert!(request.url.ends_with("/auth/login"));
    assert_eq!(request.body, RequestBody::Json(json!({ "username": "admin", "password": "hunter2" })));
}

#[tokio::test]
async fn login_accepts_any_payload() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(json!({ "user": "admin" })))]));
    login(&h.client, &credentials()).await.unwrap();
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn login_rejected_is_returned_raw() {
    let body = json!({ "code": 401, "message": "invalid username or password", "data": null });
    let h = harness(MockTransport::queue(vec![Ok(envelope_response(401, &body))]));

    let err = login(&h.client, &credentials()).await.unwrap_err();
    assert_eq!(err, ApiError::Rejected { status: 401, message: "invalid username or password".into() });
    assert!(!h.session.is_authenticated());
    assert!(h.notifier.notices().is_empty());
    assert!(!h.client.expiry().is_redirecting());
}

#[tokio::test]
async fn login_business_error_keeps_flag_clear() {
    let body = json!({ "code": 4003, "message": "account locked", "data": null });
    let h = harness(MockTransport::queue(vec![Ok(envelope_response(200, &body))]));
    let err = login(&h.client, &credentials()).await.unwrap_err();
    assert_eq!(err.to_string(), "account locked");
    assert!(!h.session.is_authenticated());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_flag() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(serde_json::Value::Null))]));
    h.session.set_authenticated(true).unwrap();
    logout(&h.client).await.unwrap();
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn logout_with_expired_session_succeeds_quietly() {
    let h = harness(MockTransport::queue(vec![Ok(status_response(401))]));
    h.session.set_authenticated(true).unwrap();
    logout(&h.client).await.unwrap();
    assert!(!h.session.is_authenticated());
    assert!(!h.client.expiry().is_redirecting());
}

#[tokio::test]
async fn logout_server_error_still_clears_flag() {
    let h = harness(MockTransport::queue(vec![Ok(status_response(500))]));
    h.session.set_authenticated(true).unwrap();
    assert_eq!(logout(&h.client).await.unwrap_err(), ApiError::Server { status: 500 });
    assert!(!h.session.is_authenticated());
}

// =============================================================================
// check_auth_status
// =============================================================================

#[tokio::test]
async fn status_reconciles_flag_both_ways() {
    let h = harness(MockTransport::queue(vec![
        Ok(ok_data(json!({ "authenticated": true }))),
        Ok(ok_data(json!({ "authenticated": false }))),
    ]));
    assert!(check_auth_status(&h.client).await.unwrap());
    assert!(h.session.is_authenticated());
    assert!(!check_auth_status(&h.client).await.unwrap());
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn status_401_means_signed_out_without_expiry() {
    let h = harness(MockTransport::queue(vec![Ok(status_response(401))]));
    h.session.set_authenticated(true).unwrap();
    assert!(!check_auth_status(&h.client).await.unwrap());
    assert!(!h.session.is_authenticated());
    assert!(h.notifier.notices().is_empty());
    assert!(!h.client.expiry().is_redirecting());
}

#[tokio::test]
async fn status_is_requested_silently() {
    let h = harness(MockTransport::queue(vec![Ok(ok_data(json!({ "authenticated": false })))]));
    check_auth_status(&h.client).await.unwrap();
    let request = &h.transport.requests()[0];
    assert_eq!(request.method, Method::GET);
    assert!(request.url.ends_with("/auth/status"));
}

#[tokio::test]
async fn status_server_error_is_returned() {
    let h = harness(MockTransport::queue(vec![Ok(status_response(503))]));
    assert_eq!(check_auth_status(&h.client).await.unwrap_err(), ApiError::Server { status: 503 });
}
