//! Request extractors shared by handlers.
//!
//! - [`client_key::ClientKey`] -- Identifies the submitting client for admission control.

pub mod client_key;
