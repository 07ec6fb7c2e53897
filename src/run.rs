//! Rename orchestration: walk a directory and rename every page image.
//!
//! Files are processed strictly one after another in name order. A failure
//! on one file is recorded and the run continues; only problems with the
//! directory itself abort the run.

use crate::classifier::{GeminiClassifier, PageClassifier};
use crate::config::{NamingScheme, RenameConfig};
use crate::error::RenameError;
use crate::output::{FileOutcome, RunSummary};
use crate::pipeline::{detect, rename, scan};
use crate::progress::ProgressSnapshot;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rename every page image in `directory`.
///
/// # Returns
/// `Ok(RunSummary)` once every file has been visited, even if some files
/// failed (check `summary.failed`).
///
/// # Errors
/// Returns `Err(RenameError)` only when the run cannot start:
/// - directory missing, not a directory, or unreadable
/// - classifier could not be constructed
pub async fn rename_pages(
    directory: impl AsRef<Path>,
    config: &RenameConfig,
) -> Result<RunSummary, RenameError> {
    let run_start = Instant::now();
    let dir = directory.as_ref();
    info!("Starting rename run: {}", dir.display());

    // ── Step 1: List and order files ─────────────────────────────────────
    let files = scan::list_image_files(dir)?;
    let total = files.len();
    let mut summary = RunSummary {
        total_files: total,
        ..RunSummary::default()
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    if files.is_empty() {
        info!("No image files found in '{}'.", dir.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_run_complete(&summary);
        }
        return Ok(summary);
    }

    // ── Step 2: Classifier (label naming only) ───────────────────────────
    let classifier = match config.naming {
        NamingScheme::Label => Some(resolve_classifier(config)?),
        NamingScheme::Index => None,
    };

    // ── Step 3: One file at a time ───────────────────────────────────────
    let loop_start = Instant::now();
    for (index, name) in files.iter().enumerate() {
        let progress = ProgressSnapshot::compute(index, total, loop_start.elapsed());
        info!("{progress}");
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(name, &progress);
        }

        let outcome = process_file(dir, index, name, classifier.as_deref(), config).await;
        report(&outcome, config);
        summary.record(outcome);
    }

    summary.duration_ms = run_start.elapsed().as_millis() as u64;
    info!(
        "Rename complete: {} renamed, {} skipped, {} failed, {}ms",
        summary.renamed, summary.skipped, summary.failed, summary.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&summary);
    }

    Ok(summary)
}

/// Synchronous wrapper around [`rename_pages`].
///
/// Creates a single-threaded tokio runtime internally.
pub fn rename_pages_sync(
    directory: impl AsRef<Path>,
    config: &RenameConfig,
) -> Result<RunSummary, RenameError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RenameError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(rename_pages(directory, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the injected classifier if there is one, else build the Gemini client.
fn resolve_classifier(config: &RenameConfig) -> Result<Arc<dyn PageClassifier>, RenameError> {
    if let Some(ref classifier) = config.classifier {
        return Ok(Arc::clone(classifier));
    }
    Ok(Arc::new(GeminiClassifier::from_config(config)?))
}

async fn process_file(
    dir: &Path,
    index: usize,
    name: &str,
    classifier: Option<&dyn PageClassifier>,
    config: &RenameConfig,
) -> FileOutcome {
    if rename::is_marked(name) {
        info!("Skipping '{}' as it already starts with an underscore.", name);
        return FileOutcome::Skipped {
            name: name.to_string(),
        };
    }

    let (target, label) = match classifier {
        None => (rename::indexed_name(index + 1, name), None),
        Some(classifier) => {
            match detect::detect_label(classifier, &dir.join(name), config).await {
                Ok(label) => (rename::labelled_name(&label, name), Some(label)),
                Err(e) => {
                    return FileOutcome::Failed {
                        name: name.to_string(),
                        error: e.into(),
                    }
                }
            }
        }
    };

    let result = if config.dry_run {
        rename::ensure_vacant(dir, &target).await
    } else {
        rename::rename_in(dir, name, &target).await
    };

    match result {
        Ok(()) => FileOutcome::Renamed {
            from: name.to_string(),
            to: target,
            label,
            dry_run: config.dry_run,
        },
        Err(error) => FileOutcome::Failed {
            name: name.to_string(),
            error,
        },
    }
}

fn report(outcome: &FileOutcome, config: &RenameConfig) {
    let cb = config.progress_callback.as_ref();
    match outcome {
        FileOutcome::Renamed {
            from, to, dry_run, ..
        } => {
            if *dry_run {
                info!("Would rename: '{}' -> '{}'", from, to);
            } else {
                info!("Renamed: '{}' -> '{}'", from, to);
            }
            if let Some(cb) = cb {
                cb.on_file_renamed(from, to);
            }
        }
        FileOutcome::Skipped { name } => {
            debug!("Skipped {}", name);
            if let Some(cb) = cb {
                cb.on_file_skipped(name);
            }
        }
        FileOutcome::Failed { name, error } => {
            warn!("Error processing '{}': {}", name, error);
            if let Some(cb) = cb {
                cb.on_file_error(name, &error.to_string());
            }
        }
    }
}
