//! Clients for the third-party text-generation services used by the
//! analysis engine.
//!
//! [`ModelClient`] is the seam the engine depends on; [`HttpModelClient`]
//! talks to DeepSeek, Doubao, Qwen (DashScope) and the SiliconFlow relay
//! over HTTP using [`reqwest`].

pub mod client;
pub mod error;
pub mod payload;

pub use client::{HttpModelClient, ModelClient};
pub use error::ProviderError;
