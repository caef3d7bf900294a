//! Social network posting clients used by Perch.
//!
//! Currently only the Twitter/X pipeline is implemented: OAuth 1.0a request
//! signing, the v1.1 media + status endpoints, and the [`StatusPoster`]
//! seam the publisher talks through.
pub mod twitter;

pub use twitter::{PostedUpdate, StatusPoster, TwitterApi};
