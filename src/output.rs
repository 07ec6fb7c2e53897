//! Result types returned by a rename run.

use crate::error::FileError;
use crate::label::PageLabel;
use serde::{Deserialize, Serialize};

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Renamed (or, in dry-run mode, would be renamed).
    Renamed {
        from: String,
        to: String,
        /// `None` under [`crate::config::NamingScheme::Index`].
        label: Option<PageLabel>,
        dry_run: bool,
    },
    /// Already carried the marker prefix.
    Skipped { name: String },
    /// Left untouched because detection or the rename failed.
    Failed { name: String, error: FileError },
}

impl FileOutcome {
    /// The file's name when the run found it.
    pub fn original_name(&self) -> &str {
        match self {
            FileOutcome::Renamed { from, .. } => from,
            FileOutcome::Skipped { name } | FileOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Aggregate result of a run, in processing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Image files found in the directory.
    pub total_files: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
    pub outcomes: Vec<FileOutcome>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Renamed { .. } => self.renamed += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}
