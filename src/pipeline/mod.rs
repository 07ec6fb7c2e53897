//! Per-file pipeline stages.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the orchestrator in [`crate::run`] only wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ encode ──▶ detect ──▶ rename
//! (list)   (RGB PNG)  (VLM)      (_label_name.ext)
//! ```
//!
//! 1. [`scan`]: validate the directory, filter by extension, sort by name
//! 2. [`encode`]: decode the scan and re-encode it as base64 PNG
//! 3. [`detect`]: call the classifier with timeout and bounded retries;
//!    the only stage with network I/O
//! 4. [`rename`]: build the target name and rename without overwriting

pub mod detect;
pub mod encode;
pub mod rename;
pub mod scan;
