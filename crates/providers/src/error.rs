/// Errors from a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("{provider} API error ({status}): {body}")]
    ApiError {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// HTTP success, but the payload describes a failure.
    #[error("{provider} returned an error: {message}")]
    Application {
        provider: &'static str,
        message: String,
    },

    /// The payload matched none of the known response shapes.
    #[error("{provider} returned an unrecognised response: {snippet}")]
    UnexpectedResponse {
        provider: &'static str,
        snippet: String,
    },

    /// The caller stopped waiting and cancelled the request.
    #[error("Request cancelled")]
    Cancelled,
}
