#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use quickform_core::admission::AdmissionPolicy;
use quickform_core::provider::{
    DeadlinePolicy, ProviderConfig, ProviderCredentials, ProviderKind,
};
use quickform_db::models::submission::{NewSubmission, Submission};
use quickform_db::{ReportStore, StoreError, SubmissionStore};
use quickform_providers::{ModelClient, ProviderError};
use serde_json::Value;
use tower::ServiceExt;

use quickform_api::admission::AdmissionController;
use quickform_api::config::ServerConfig;
use quickform_api::engine::runner::JobRunner;
use quickform_api::router::build_app_router;
use quickform_api::state::AppState;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
///
/// Only DeepSeek has credentials; every provider gets a 2-second deadline.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        admission: AdmissionPolicy::default(),
        default_provider: Some("deepseek".to_string()),
        credentials: ProviderCredentials::new().with_key(ProviderKind::DeepSeek, "test-key"),
        deadlines: DeadlinePolicy::uniform(Duration::from_secs(2)),
        model_endpoint_override: None,
        reconcile_interval_secs: 60,
    }
}

// ---------------------------------------------------------------------------
// Report store double
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryReportStore {
    pub fn insert(&self, job_id: &str, report: &str) {
        self.reports
            .lock()
            .unwrap()
            .insert(job_id.to_string(), report.to_string());
    }

    pub fn get(&self, job_id: &str) -> Option<String> {
        self.reports.lock().unwrap().get(job_id).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn persist_result(&self, job_id: &str, report: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("report store offline".to_string()));
        }
        self.insert(job_id, report);
        Ok(())
    }

    async fn load_persisted_result(&self, job_id: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("report store offline".to_string()));
        }
        Ok(self.get(job_id))
    }
}

// ---------------------------------------------------------------------------
// Submission store double
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySubmissionStore {
    submissions: Mutex<Vec<Submission>>,
    notices: Mutex<Vec<(String, String, String)>>,
    fail_notices: AtomicBool,
}

impl MemorySubmissionStore {
    pub fn stored(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    /// `(resource_id, client_key, notice)` triples in append order.
    pub fn notices(&self) -> Vec<(String, String, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn fail_notices(&self, fail: bool) {
        self.fail_notices.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn record_submission(&self, input: &NewSubmission) -> Result<Submission, StoreError> {
        let mut submissions = self.submissions.lock().unwrap();
        let submission = Submission {
            id: submissions.len() as i64 + 1,
            resource_id: input.resource_id.clone(),
            data: input.data.clone(),
            client_key: input.client_key.clone(),
            submitted_at: Utc::now(),
        };
        submissions.push(submission.clone());
        Ok(submission)
    }

    async fn recent_submissions(
        &self,
        resource_id: &str,
        limit: i64,
    ) -> Result<Vec<Submission>, StoreError> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions
            .iter()
            .rev()
            .filter(|s| s.resource_id == resource_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_submissions(&self, resource_id: &str) -> Result<i64, StoreError> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions
            .iter()
            .filter(|s| s.resource_id == resource_id)
            .count() as i64)
    }

    async fn append_rate_limit_notice(
        &self,
        resource_id: &str,
        client_key: &str,
        notice: &str,
    ) -> Result<(), StoreError> {
        if self.fail_notices.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("audit log offline".to_string()));
        }
        self.notices.lock().unwrap().push((
            resource_id.to_string(),
            client_key.to_string(),
            notice.to_string(),
        ));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Model client double
// ---------------------------------------------------------------------------

enum Script {
    Reply(String),
    SlowReply(Duration, String),
    Fail(String),
    Hang,
}

/// A [`ModelClient`] that follows a fixed script and counts its calls.
pub struct ScriptedModelClient {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedModelClient {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn slow(delay: Duration, text: &str) -> Self {
        Self::new(Script::SlowReply(delay, text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Script::Fail(message.to_string()))
    }

    /// Never answers within any test deadline.
    pub fn hanging() -> Self {
        Self::new(Script::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn generate(
        &self,
        _prompt: &str,
        config: &ProviderConfig,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::SlowReply(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Script::Fail(message) => Err(ProviderError::Application {
                provider: config.kind.as_str(),
                message: message.clone(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The router plus handles on every double behind it.
pub struct TestApp {
    pub router: Router,
    pub runner: Arc<JobRunner>,
    pub reports: Arc<MemoryReportStore>,
    pub submissions: Arc<MemorySubmissionStore>,
    pub client: Arc<ScriptedModelClient>,
}

/// Build the full application router over in-memory doubles, using
/// [`test_config`].
pub fn build_test_app(client: ScriptedModelClient) -> TestApp {
    build_test_app_with(test_config(), client)
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app_with(config: ServerConfig, client: ScriptedModelClient) -> TestApp {
    let reports = Arc::new(MemoryReportStore::default());
    let submissions = Arc::new(MemorySubmissionStore::default());
    let client = Arc::new(client);

    let runner = Arc::new(
        JobRunner::new(reports.clone(), client.clone(), config.credentials.clone())
            .with_default_provider(config.default_provider.clone())
            .with_deadlines(config.deadlines.clone()),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        runner: Arc::clone(&runner),
        admission: Arc::new(AdmissionController::new(config.admission)),
        submissions: submissions.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        runner,
        reports,
        submissions,
        client,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST as the client at `ip` (via `X-Forwarded-For`).
pub async fn post_json_from(app: &Router, uri: &str, ip: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a form-encoded body as the client at `ip`.
pub async fn post_form_from(app: &Router, uri: &str, ip: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a raw body with an explicit content type as the client at `ip`.
pub async fn post_raw_from(
    app: &Router,
    uri: &str,
    ip: &str,
    content_type: &str,
    body: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a CORS preflight for `method` from `origin`.
pub async fn preflight(app: &Router, uri: &str, origin: &str, method: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header("origin", origin)
        .header("access-control-request-method", method)
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST JSON with an `Origin` header, as a browser would cross-origin.
pub async fn post_json_with_origin(
    app: &Router,
    uri: &str,
    origin: &str,
    body: Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", origin)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the job leaves `in_progress`.
pub async fn wait_for_terminal(app: &Router, job_id: &str) -> Value {
    let uri = format!("/api/v1/jobs/{job_id}/status");
    for _ in 0..500 {
        let json = body_json(get(app, &uri).await).await;
        if json["status"] != "in_progress" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached a terminal state");
}
