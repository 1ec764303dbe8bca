//! Request bodies and response parsing for each provider.
//!
//! Pure functions over `serde_json::Value`; the HTTP layer lives in
//! [`crate::client`].

use quickform_core::provider::ProviderKind;
use serde_json::{json, Value};

use crate::error::ProviderError;

/// System message sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "Your audience is usually teachers and students.";

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 4000;

/// Maximum characters of a raw response quoted in error messages.
const SNIPPET_CHARS: usize = 200;

/// Endpoint URL for a provider.
pub fn endpoint(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
        ProviderKind::Doubao => "https://ark.cn-beijing.volces.com/api/v3/chat/completions",
        ProviderKind::Qwen => {
            "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation"
        }
        ProviderKind::ChatServer => "https://api.siliconflow.cn/v1/chat/completions",
    }
}

/// Model name requested from a provider.
pub fn model_name(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::DeepSeek => "deepseek-chat",
        ProviderKind::Doubao => "doubao-seed-1-6-251015",
        ProviderKind::Qwen => "qwen-plus",
        ProviderKind::ChatServer => "deepseek-ai/DeepSeek-V2.5",
    }
}

fn messages(prompt: &str) -> Value {
    json!([
        { "role": "system", "content": SYSTEM_PROMPT },
        { "role": "user", "content": prompt },
    ])
}

/// Build the JSON request body for `kind`.
pub fn request_body(kind: ProviderKind, prompt: &str) -> Value {
    match kind {
        ProviderKind::DeepSeek | ProviderKind::Doubao => json!({
            "model": model_name(kind),
            "messages": messages(prompt),
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        }),
        ProviderKind::Qwen => json!({
            "model": model_name(kind),
            "input": { "messages": messages(prompt) },
            "parameters": { "temperature": TEMPERATURE, "max_tokens": MAX_TOKENS },
        }),
        ProviderKind::ChatServer => json!({
            "model": model_name(kind),
            "messages": messages(prompt),
        }),
    }
}

/// Extract the generated text from a successful HTTP response body.
pub fn parse_response(kind: ProviderKind, body: &Value) -> Result<String, ProviderError> {
    let provider = kind.as_str();

    if let Some(message) = application_error(kind, body) {
        return Err(ProviderError::Application { provider, message });
    }

    let text = match kind {
        ProviderKind::Qwen => body
            .pointer("/output/text")
            .and_then(Value::as_str)
            .or_else(|| first_choice_text(body.get("choices")))
            .or_else(|| first_choice_text(body.pointer("/data/choices"))),
        _ => first_choice_text(body.get("choices")),
    };

    text.map(str::to_string)
        .ok_or_else(|| ProviderError::UnexpectedResponse {
            provider,
            snippet: snippet(&body.to_string()),
        })
}

/// `choices[0].message.content`, falling back to `choices[0].text`.
fn first_choice_text(choices: Option<&Value>) -> Option<&str> {
    let choice = choices?.as_array()?.first()?;
    choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| choice.get("text").and_then(Value::as_str))
}

/// Detect an error description embedded in an HTTP 200 body.
fn application_error(kind: ProviderKind, body: &Value) -> Option<String> {
    if kind == ProviderKind::Qwen {
        if let Some(code) = body.get("code").filter(|c| !c.is_null()) {
            let code = code.as_str().map(str::to_string).unwrap_or_else(|| code.to_string());
            if code != "200" {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Some(format!("{message} (code: {code})"));
            }
        }
    }

    let error = body.get("error").filter(|e| !e.is_null())?;
    Some(
        error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| snippet(&error.to_string())),
    )
}

/// First [`SNIPPET_CHARS`] characters of `raw`.
pub fn snippet(raw: &str) -> String {
    raw.chars().take(SNIPPET_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
