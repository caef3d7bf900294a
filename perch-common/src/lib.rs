//! Common types and utilities shared across Perch crates.
//!
//! This crate defines the stage-level error taxonomy and the observability
//! helpers used by the `perch` binary and its tests. It is intentionally
//! lightweight so that every crate in the workspace can depend on it without
//! pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`PublishError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation

pub mod observability;

/// Error types for the two posting stages plus credential verification.
///
/// Each variant carries the underlying cause so the log line can show what
/// actually went wrong (network, missing HTML region, file I/O, API error)
/// while callers branch only on the stage that failed.
#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    /// The posting service rejected or failed the credential check.
    #[error("credential verification failed")]
    Credential(#[source] anyhow::Error),

    /// The image stage failed: page fetch, image region lookup, image
    /// download, scratch file write, or the image post itself.
    #[error("image stage failed for {url}")]
    ImageStage {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The text stage failed: description region lookup or the reply post.
    /// The image post from the earlier stage stands.
    #[error("text stage failed for {url}")]
    TextStage {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PublishError {
    /// Short tag used in log fields to distinguish failure kinds.
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::Credential(_) => "credential",
            PublishError::ImageStage { .. } => "image_stage",
            PublishError::TextStage { .. } => "text_stage",
        }
    }
}

/// Convenient alias for results that use [`PublishError`].
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_tags() {
        let e = PublishError::Credential(anyhow::anyhow!("denied"));
        assert_eq!(e.kind(), "credential");

        let e = PublishError::ImageStage {
            url: "http://example.test/finch".into(),
            source: anyhow::anyhow!("no image region"),
        };
        assert_eq!(e.kind(), "image_stage");
        assert!(e.to_string().contains("http://example.test/finch"));
    }
}
