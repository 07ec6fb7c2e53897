//! Error types for the pagemark library.
//!
//! Three layers of failure, from widest to narrowest:
//!
//! * [`RenameError`] is **fatal**: the run cannot start at all (directory
//!   missing, listing unreadable, configuration invalid). Returned as
//!   `Err(RenameError)` from [`crate::run::rename_pages`].
//!
//! * [`FileError`] / [`DetectionError`] are **non-fatal**: one file could not be
//!   labelled or renamed. Recorded in [`crate::output::FileOutcome::Failed`]
//!   and the run moves on to the next file.
//!
//! * [`ClassifyError`]: a single classifier attempt failed. The detector
//!   decides from [`ClassifyError::is_transient`] whether to try again or give
//!   up, and folds the last attempt into a [`DetectionError`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run before any file is touched.
#[derive(Debug, Error)]
pub enum RenameError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Target directory does not exist.
    #[error("Directory '{path}' not found.")]
    DirectoryNotFound { path: PathBuf },

    /// Target path exists but is a file.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// The directory listing could not be read.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client for the classifier could not be constructed.
    #[error("Failed to initialise classifier: {0}")]
    ClassifierInit(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a page label could not be produced for one file.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionError {
    /// No API key configured. Never retried.
    #[error("GOOGLE_API_KEY not found in environment variables.")]
    MissingCredential,

    /// The image vanished between listing and detection. Never retried.
    #[error("Image file not found at {path}")]
    ImageNotFound { path: PathBuf },

    /// The image could not be decoded or re-encoded.
    #[error("Failed to encode image '{path}': {detail}")]
    Encoding { path: PathBuf, detail: String },

    /// Every attempt exceeded the per-call deadline.
    #[error("Gemini API request exceeded {secs} seconds timeout after {attempts} attempts.")]
    Timeout { secs: u64, attempts: u32 },

    /// Every attempt failed at the transport / HTTP layer.
    #[error("Request failed after {attempts} attempts: {detail}")]
    Transport { attempts: u32, detail: String },

    /// Every attempt returned a payload that did not have the expected shape.
    #[error("Response parsing error after {attempts} attempts: {detail}. Raw response: {raw}")]
    MalformedResponse {
        attempts: u32,
        detail: String,
        raw: String,
    },

    /// The remote safety filter rejected the request. Never retried.
    #[error("Prompt blocked by Gemini: {reason}")]
    Blocked { reason: String },
}

impl DetectionError {
    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionError::MissingCredential => "missing_credential",
            DetectionError::ImageNotFound { .. } => "image_not_found",
            DetectionError::Encoding { .. } => "encoding",
            DetectionError::Timeout { .. } => "timeout",
            DetectionError::Transport { .. } => "transport",
            DetectionError::MalformedResponse { .. } => "malformed_response",
            DetectionError::Blocked { .. } => "blocked",
        }
    }
}

/// Outcome of a single failed classifier attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The attempt did not complete within the deadline.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, or non-success HTTP status.
    #[error("request failed: {0}")]
    Transport(String),

    /// A response arrived but the label could not be extracted.
    #[error("malformed response: {detail}")]
    Malformed { detail: String, raw: String },

    /// The service refused the content.
    #[error("blocked: {0}")]
    Blocked(String),
}

impl ClassifyError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ClassifyError::Blocked(_))
    }
}

/// A file-scoped failure recorded in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum FileError {
    /// No label could be detected.
    #[error("{0}")]
    Detection(#[from] DetectionError),

    /// The computed target name is already taken.
    #[error("Target '{target}' already exists")]
    Collision { target: String },

    /// The filesystem refused the rename.
    #[error("Error renaming to '{target}': {detail}")]
    RenameFailed { target: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_is_terminal() {
        assert!(!ClassifyError::Blocked("SAFETY".into()).is_transient());
        assert!(ClassifyError::Timeout.is_transient());
        assert!(ClassifyError::Transport("HTTP 503".into()).is_transient());
        assert!(ClassifyError::Malformed {
            detail: "missing field".into(),
            raw: "{}".into()
        }
        .is_transient());
    }

    #[test]
    fn timeout_display_mentions_limit_and_attempts() {
        let e = DetectionError::Timeout {
            secs: 30,
            attempts: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains("30 seconds"), "got: {msg}");
        assert!(msg.contains("3 attempts"), "got: {msg}");
    }

    #[test]
    fn malformed_display_includes_raw_response() {
        let e = DetectionError::MalformedResponse {
            attempts: 1,
            detail: "missing candidates".into(),
            raw: r#"{"foo":1}"#.into(),
        };
        assert!(e.to_string().contains(r#"{"foo":1}"#));
    }

    #[test]
    fn file_error_serialises_with_stage_tag() {
        let e = FileError::Detection(DetectionError::MissingCredential);
        let json = serde_json::to_value(&e).expect("serialise");
        assert_eq!(json["stage"], "detection");
        assert_eq!(json["kind"], "missing_credential");
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(
            DetectionError::Blocked {
                reason: "OTHER".into()
            }
            .kind(),
            "blocked"
        );
    }
}
