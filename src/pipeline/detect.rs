//! Page detection: image file → [`PageLabel`], with bounded retries.
//!
//! ## Failure classes
//!
//! | Condition | Retried | Result after last attempt |
//! |-----------|---------|---------------------------|
//! | no API key, file missing, undecodable image | never | immediate error |
//! | attempt exceeds `timeout` | yes | [`DetectionError::Timeout`] |
//! | transport / HTTP failure | yes | [`DetectionError::Transport`] |
//! | unparseable response | yes | [`DetectionError::MalformedResponse`] |
//! | safety block | never | [`DetectionError::Blocked`] |
//!
//! `config.retry.max_attempts` counts the first attempt, so the default of 1
//! means "no retry". The deadline is enforced here with `tokio::time::timeout`
//! so it applies to any [`PageClassifier`], not just the HTTP one.

use crate::classifier::PageClassifier;
use crate::config::RenameConfig;
use crate::error::{ClassifyError, DetectionError};
use crate::label::PageLabel;
use crate::pipeline::encode::{encode_image, EncodedImage};
use std::path::Path;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Detect the page label of the image at `path`.
pub async fn detect_label(
    classifier: &dyn PageClassifier,
    path: &Path,
    config: &RenameConfig,
) -> Result<PageLabel, DetectionError> {
    if config.api_key.is_none() {
        return Err(DetectionError::MissingCredential);
    }
    if !path.is_file() {
        return Err(DetectionError::ImageNotFound {
            path: path.to_path_buf(),
        });
    }

    let image = encode_blocking(path).await?;

    let max_attempts = config.retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let err = match timeout(config.timeout, classifier.classify(&image)).await {
            Err(_elapsed) => ClassifyError::Timeout,
            Ok(Ok(raw)) => match PageLabel::normalize(&raw) {
                Some(label) => {
                    debug!("{}: raw label {:?} → {}", path.display(), raw, label);
                    return Ok(label);
                }
                None => ClassifyError::Malformed {
                    detail: "empty label".into(),
                    raw,
                },
            },
            Ok(Err(e)) => e,
        };

        if !err.is_transient() || attempt >= max_attempts {
            return Err(into_detection_error(err, attempt, config));
        }

        let delay = config.retry.delay_after(attempt);
        warn!(
            "{}: attempt {}/{} failed: {}. Retrying in {:?}",
            path.display(),
            attempt,
            max_attempts,
            err,
            delay
        );
        sleep(delay).await;
        attempt += 1;
    }
}

/// Decode and re-encode off the async thread; image decoding is CPU-bound.
async fn encode_blocking(path: &Path) -> Result<EncodedImage, DetectionError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || encode_image(&owned))
        .await
        .map_err(|e| DetectionError::Encoding {
            path: path.to_path_buf(),
            detail: format!("encoder task failed: {e}"),
        })?
        .map_err(|e| DetectionError::Encoding {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
}

/// Fold the final attempt's failure into the file-level error.
fn into_detection_error(err: ClassifyError, attempts: u32, config: &RenameConfig) -> DetectionError {
    match err {
        ClassifyError::Timeout => DetectionError::Timeout {
            secs: config.timeout.as_secs(),
            attempts,
        },
        ClassifyError::Transport(detail) => DetectionError::Transport { attempts, detail },
        ClassifyError::Malformed { detail, raw } => DetectionError::MalformedResponse {
            attempts,
            detail,
            raw,
        },
        ClassifyError::Blocked(reason) => DetectionError::Blocked { reason },
    }
}
