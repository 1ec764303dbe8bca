//! AI provider selection, credentials and per-provider deadlines.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;

/// Deadline for the SiliconFlow relay, which queues requests before answering.
const CHAT_SERVER_DEADLINE: Duration = Duration::from_secs(180);

/// Deadline for DeepSeek and Qwen.
const SLOW_PROVIDER_DEADLINE: Duration = Duration::from_secs(120);

/// Deadline for every other provider.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(90);

/// The text-generation services the engine knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    DeepSeek,
    Doubao,
    Qwen,
    ChatServer,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::DeepSeek,
        ProviderKind::Doubao,
        ProviderKind::Qwen,
        ProviderKind::ChatServer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::Doubao => "doubao",
            Self::Qwen => "qwen",
            Self::ChatServer => "chat_server",
        }
    }

    /// Deadline used when no override is configured.
    pub fn default_deadline(self) -> Duration {
        match self {
            Self::ChatServer => CHAT_SERVER_DEADLINE,
            Self::DeepSeek | Self::Qwen => SLOW_PROVIDER_DEADLINE,
            Self::Doubao => DEFAULT_DEADLINE,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "doubao" => Ok(Self::Doubao),
            "qwen" => Ok(Self::Qwen),
            "chat_server" | "siliconflow" => Ok(Self::ChatServer),
            other => Err(AnalysisError::Configuration(format!(
                "Unsupported AI provider: {other}"
            ))),
        }
    }
}

/// API keys for each provider, as loaded from configuration.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    keys: HashMap<ProviderKind, String>,
}

impl ProviderCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key. Blank keys are ignored.
    pub fn with_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.trim().is_empty() {
            self.keys.insert(kind, key.trim().to_string());
        }
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        self.keys.get(&kind).map(String::as_str)
    }

    /// Resolve a provider name into a callable configuration.
    ///
    /// Fails with [`AnalysisError::Configuration`] when no provider is
    /// selected, the name is unknown, or the selected provider has no key.
    pub fn resolve(&self, selected: Option<&str>) -> Result<ProviderConfig, AnalysisError> {
        let name = selected
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                AnalysisError::Configuration("No AI provider is configured".to_string())
            })?;
        let kind: ProviderKind = name.parse()?;
        let api_key = self.get(kind).ok_or_else(|| {
            AnalysisError::Configuration(format!("API key for {kind} is not configured"))
        })?;
        Ok(ProviderConfig {
            kind,
            api_key: api_key.to_string(),
        })
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut configured: Vec<_> = self.keys.keys().map(|k| k.as_str()).collect();
        configured.sort_unstable();
        f.debug_struct("ProviderCredentials")
            .field("configured", &configured)
            .finish()
    }
}

/// A fully resolved provider: which service to call and with what key.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Per-provider deadlines enforced around the model call.
#[derive(Debug, Clone, Default)]
pub struct DeadlinePolicy {
    overrides: HashMap<ProviderKind, Duration>,
}

impl DeadlinePolicy {
    /// Override the deadline for one provider.
    pub fn with_deadline(mut self, kind: ProviderKind, deadline: Duration) -> Self {
        self.overrides.insert(kind, deadline);
        self
    }

    /// Use the same deadline for every provider.
    pub fn uniform(deadline: Duration) -> Self {
        ProviderKind::ALL
            .into_iter()
            .fold(Self::default(), |policy, kind| policy.with_deadline(kind, deadline))
    }

    pub fn deadline_for(&self, kind: ProviderKind) -> Duration {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_deadline())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
