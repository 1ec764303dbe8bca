//! Integration tests for form submission and its admission control.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with, get, post_form_from, post_json_from,
    post_json_with_origin, post_raw_from, preflight, test_config, ScriptedModelClient,
};
use quickform_api::error::RATE_LIMIT_MESSAGE;
use quickform_core::admission::AdmissionPolicy;
use serde_json::json;

fn app_with_threshold(threshold: usize) -> common::TestApp {
    let mut config = test_config();
    config.admission =
        AdmissionPolicy::new(threshold, Duration::from_secs(10), Duration::from_secs(300));
    build_test_app_with(config, ScriptedModelClient::replying("unused"))
}

// ---------------------------------------------------------------------------
// Test: an admitted submission is stored
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admitted_submission_is_stored() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));

    let response = post_json_from(
        &app.router,
        "/api/v1/submit/task-1",
        "203.0.113.5",
        json!({ "name": "Ada", "score": 91 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(json["message"].is_string());
    assert_eq!(app.submissions.stored(), 1);
}

// ---------------------------------------------------------------------------
// Test: exactly threshold submissions pass, the next is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn burst_over_threshold_is_rejected() {
    let app = app_with_threshold(3);
    let uri = "/api/v1/submit/task-1";

    for _ in 0..3 {
        let response = post_json_from(&app.router, uri, "203.0.113.9", json!({ "n": 1 })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = post_json_from(&app.router, uri, "203.0.113.9", json!({ "n": 1 })).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "rate_limit", "message": RATE_LIMIT_MESSAGE })
    );
    assert_eq!(app.submissions.stored(), 3);
}

// ---------------------------------------------------------------------------
// Test: every rejection appends an audit notice
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejections_append_audit_notice() {
    let app = app_with_threshold(1);
    let uri = "/api/v1/submit/task-2";

    for _ in 0..3 {
        post_json_from(&app.router, uri, "198.51.100.1", json!({})).await;
    }

    let notices = app.submissions.notices();
    assert_eq!(notices.len(), 2);
    let (resource_id, client_key, notice) = &notices[0];
    assert_eq!(resource_id, "task-2");
    assert_eq!(client_key, "198.51.100.1");
    assert!(notice.starts_with('['));
    assert!(notice.contains("client 198.51.100.1 exceeded 1 submissions within 10s"));
    assert!(notice.ends_with("blocked for 5 min"));
}

// ---------------------------------------------------------------------------
// Test: audit log failure does not change the 429
// ---------------------------------------------------------------------------

#[tokio::test]
async fn audit_failure_still_rejects() {
    let app = app_with_threshold(1);
    app.submissions.fail_notices(true);
    let uri = "/api/v1/submit/task-3";

    post_json_from(&app.router, uri, "198.51.100.2", json!({})).await;
    let response = post_json_from(&app.router, uri, "198.51.100.2", json!({})).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// Test: a blacklisted client does not affect others
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clients_are_limited_independently() {
    let app = app_with_threshold(1);
    let uri = "/api/v1/submit/task-4";

    post_json_from(&app.router, uri, "192.0.2.1", json!({})).await;
    let blocked = post_json_from(&app.router, uri, "192.0.2.1", json!({})).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = post_json_from(&app.router, uri, "192.0.2.2", json!({})).await;
    assert_eq!(other.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: recent submissions are newest first with a total count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recent_submissions_returns_latest_three() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));
    let uri = "/api/v1/submit/task-5";

    for n in 1..=5 {
        post_json_from(&app.router, uri, "192.0.2.10", json!({ "n": n })).await;
    }
    post_json_from(&app.router, "/api/v1/submit/other", "192.0.2.10", json!({ "n": 0 })).await;

    let response = get(&app.router, uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["resource_id"], "task-5");
    assert_eq!(json["data"]["total_submissions"], 5);

    let submissions = json["data"]["submissions"].as_array().unwrap();
    assert_eq!(submissions.len(), 3);
    assert_eq!(submissions[0]["data"]["n"], 5);
    assert_eq!(submissions[2]["data"]["n"], 3);
}

// ---------------------------------------------------------------------------
// Test: a throttled client gets 429 even with an undecodable body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn throttled_client_is_rejected_before_body_is_read() {
    let app = app_with_threshold(1);
    let uri = "/api/v1/submit/task-6";

    post_json_from(&app.router, uri, "192.0.2.20", json!({})).await;

    let response =
        post_raw_from(&app.router, uri, "192.0.2.20", "application/json", "{not json").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = post_raw_from(&app.router, uri, "192.0.2.20", "text/plain", "hello").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.submissions.notices().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: an admitted client with an undecodable body gets 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));

    let response = post_raw_from(
        &app.router,
        "/api/v1/submit/task-7",
        "192.0.2.30",
        "application/json",
        "{not json",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    assert_eq!(app.submissions.stored(), 0);
}

// ---------------------------------------------------------------------------
// Test: form-encoded submissions are stored as string fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn form_encoded_submission_is_stored() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));
    let uri = "/api/v1/submit/task-8";

    let response = post_form_from(&app.router, uri, "192.0.2.40", "name=Ada+L&score=91").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    let json = body_json(get(&app.router, uri).await).await;
    let stored = &json["data"]["submissions"][0]["data"];
    assert_eq!(stored["name"], "Ada L");
    assert_eq!(stored["score"], "91");
}

// ---------------------------------------------------------------------------
// Test: preflight from a foreign origin is allowed on submit routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_preflight_allows_any_origin() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));

    let response = preflight(
        &app.router,
        "/api/v1/submit/task-9",
        "https://forms.example.org",
        "POST",
    )
    .await;
    assert!(response.status().is_success());

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }
    assert!(headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .contains("content-type"));
    assert!(headers.get("access-control-allow-credentials").is_none());
}

// ---------------------------------------------------------------------------
// Test: a cross-origin submission carries the CORS header
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cross_origin_submission_is_readable() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));

    let response = post_json_with_origin(
        &app.router,
        "/api/v1/submit/task-10",
        "https://forms.example.org",
        json!({ "answer": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(app.submissions.stored(), 1);
}

// ---------------------------------------------------------------------------
// Test: job routes keep the configured origin list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_routes_reject_foreign_origin_preflight() {
    let app = build_test_app(ScriptedModelClient::replying("unused"));

    let foreign = preflight(
        &app.router,
        "/api/v1/jobs/42",
        "https://forms.example.org",
        "POST",
    )
    .await;
    assert!(foreign.headers().get("access-control-allow-origin").is_none());

    let configured = preflight(&app.router, "/api/v1/jobs/42", "http://localhost:5173", "POST").await;
    assert_eq!(
        configured.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}
