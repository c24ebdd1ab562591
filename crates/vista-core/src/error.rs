//! Error types for the interaction core.
//!
//! Transition cancellation is deliberately *not* an error: a superseded camera
//! animation is expected control flow and is delivered as a
//! [`crate::transition::TransitionCompletion`] with `cancelled = true`.

use thiserror::Error;

/// Recoverable failure while fetching overlay content for a POI.
///
/// The state machine reacts by falling back to `Focused` and reporting the
/// error through the presenter exactly once; the frame loop keeps running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The content fragment could not be read or fetched.
    #[error("failed to fetch content fragment '{path}': {reason}")]
    Fetch { path: String, reason: String },

    /// The fragment was fetched but contained nothing to show.
    #[error("content fragment '{path}' is empty")]
    Empty { path: String },
}

/// Fatal scene-configuration problem, surfaced before the interactive loop
/// is ever entered.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scene config: {0}")]
    Invalid(String),
}
