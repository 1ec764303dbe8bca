use std::str::FromStr;
use std::time::Duration;

use quickform_core::admission::{
    AdmissionPolicy, DEFAULT_BLACKLIST, DEFAULT_THRESHOLD, DEFAULT_WINDOW,
};
use quickform_core::provider::{DeadlinePolicy, ProviderCredentials, ProviderKind};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to stop after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Sliding-window policy for `POST /submit/{resource_id}`.
    pub admission: AdmissionPolicy,
    /// Provider used when a job does not name one.
    pub default_provider: Option<String>,
    /// API keys per provider.
    pub credentials: ProviderCredentials,
    /// Per-provider model call deadlines.
    pub deadlines: DeadlinePolicy,
    /// Send every model call to this URL instead of the provider's own
    /// endpoint (local gateway or mock server).
    pub model_endpoint_override: Option<String>,
    /// How often failed report writes are retried (default: `60`).
    pub reconcile_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default                 |
    /// |-------------------------------------|-------------------------|
    /// | `HOST`                              | `0.0.0.0`               |
    /// | `PORT`                              | `3000`                  |
    /// | `CORS_ORIGINS`                      | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`              | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`             | `30`                    |
    /// | `SUBMIT_RATE_LIMIT_THRESHOLD`       | `50`                    |
    /// | `SUBMIT_RATE_LIMIT_WINDOW_SECS`     | `10`                    |
    /// | `SUBMIT_BLACKLIST_SECS`             | `300`                   |
    /// | `AI_PROVIDER`                       | `deepseek`              |
    /// | `DEEPSEEK_API_KEY` etc.             | unset                   |
    /// | `ANALYSIS_DEADLINE_<PROVIDER>_SECS` | provider default        |
    /// | `MODEL_ENDPOINT_OVERRIDE`           | unset                   |
    /// | `RECONCILE_INTERVAL_SECS`           | `60`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", 30);

        let admission = AdmissionPolicy::new(
            parse_env("SUBMIT_RATE_LIMIT_THRESHOLD", DEFAULT_THRESHOLD),
            Duration::from_secs(parse_env(
                "SUBMIT_RATE_LIMIT_WINDOW_SECS",
                DEFAULT_WINDOW.as_secs(),
            )),
            Duration::from_secs(parse_env("SUBMIT_BLACKLIST_SECS", DEFAULT_BLACKLIST.as_secs())),
        );

        let default_provider = std::env::var("AI_PROVIDER")
            .ok()
            .or_else(|| Some(ProviderKind::DeepSeek.as_str().to_string()));

        let credentials = ProviderKind::ALL
            .into_iter()
            .fold(ProviderCredentials::new(), |creds, kind| {
                match std::env::var(credential_var(kind)) {
                    Ok(key) => creds.with_key(kind, key),
                    Err(_) => creds,
                }
            });

        let deadlines = deadlines_from(|var| std::env::var(var).ok());

        let model_endpoint_override = std::env::var("MODEL_ENDPOINT_OVERRIDE")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let reconcile_interval_secs: u64 = parse_env("RECONCILE_INTERVAL_SECS", 60);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            admission,
            default_provider,
            credentials,
            deadlines,
            model_endpoint_override,
            reconcile_interval_secs,
        }
    }
}

/// Environment variable holding the API key for `kind`.
pub fn credential_var(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
        ProviderKind::Doubao => "DOUBAO_API_KEY",
        ProviderKind::Qwen => "QWEN_API_KEY",
        ProviderKind::ChatServer => "CHAT_SERVER_API_TOKEN",
    }
}

/// Per-provider deadlines from `ANALYSIS_DEADLINE_<PROVIDER>_SECS`.
///
/// `lookup` returns the raw value of a variable, if set.
fn deadlines_from(lookup: impl Fn(&str) -> Option<String>) -> DeadlinePolicy {
    ProviderKind::ALL
        .into_iter()
        .fold(DeadlinePolicy::default(), |policy, kind| {
            let var = format!("ANALYSIS_DEADLINE_{}_SECS", kind.as_str().to_uppercase());
            match lookup(&var) {
                Some(raw) => {
                    let secs: u64 = parse_value(&var, &raw);
                    policy.with_deadline(kind, Duration::from_secs(secs))
                }
                None => policy,
            }
        })
}

/// Read `key` and parse it, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => default,
    }
}

/// Parse a present value. Panics when malformed so misconfiguration fails
/// fast at startup.
fn parse_value<T>(key: &str, raw: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{key} must be valid: {e}"))
}
