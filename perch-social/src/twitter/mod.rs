//! Twitter/X API integration surface exposed to the publisher.
//!
//! Submodules provide the OAuth 1.0a request signer, the HTTP client
//! wrapper for the v1.1 posting endpoints, and strongly typed response
//! models.
pub mod client;
pub mod oauth;
pub mod types;

pub use client::{PostedUpdate, StatusPoster, TwitterApi};
pub use oauth::OauthKeys;
