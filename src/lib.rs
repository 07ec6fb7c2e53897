//! # pagemark
//!
//! Rename scanned page images by the page number printed on each page.
//!
//! ## Why this crate?
//!
//! A scanner hands you `scan0001.png … scan0312.png` in capture order, which
//! stops matching the book the moment a page is rescanned or the feeder
//! skips. Instead this crate asks a Vision Language Model which page it is
//! looking at and prefixes the file with that label, so
//! `scan0017.png` becomes `_0009_scan0017.png` and the cover becomes
//! `_cover_scan0001.png`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Scan    list .png/.jpg/.jpeg/.gif/.bmp/.tiff/.webp, sort by name
//!  ├─ 2. Encode  decode → RGB → PNG → base64
//!  ├─ 3. Detect  Gemini generateContent with a {page_number} schema,
//!  │             per-attempt timeout, bounded retries
//!  └─ 4. Rename  _<label>_<name>, never overwriting, skipping names that
//!                already start with `_`
//! ```
//!
//! Files are processed one at a time. An interrupted run can simply be
//! started again: renamed files carry the `_` marker and are skipped.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagemark::{rename_pages, RenameConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenameConfig::builder()
//!         .api_key(std::env::var("GOOGLE_API_KEY")?)
//!         .build()?;
//!     let summary = rename_pages("/pages", &config).await?;
//!     eprintln!("{} renamed, {} failed", summary.renamed, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagemark` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classifier;
pub mod config;
pub mod error;
pub mod label;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use classifier::{GeminiClassifier, PageClassifier};
pub use config::{Backoff, NamingScheme, RenameConfig, RenameConfigBuilder, RetryPolicy};
pub use error::{ClassifyError, DetectionError, FileError, RenameError};
pub use label::PageLabel;
pub use output::{FileOutcome, RunSummary};
pub use pipeline::encode::EncodedImage;
pub use progress::{
    NoopProgressCallback, ProgressCallback, ProgressSnapshot, RenameProgressCallback,
};
pub use run::{rename_pages, rename_pages_sync};
