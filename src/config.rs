//! Configuration types for a rename run.
//!
//! All behaviour is controlled through [`RenameConfig`], built once at
//! startup via its [`RenameConfigBuilder`] and passed by reference into the
//! detector and the orchestrator. Nothing is read from the environment inside
//! the library; the CLI maps environment variables onto builder calls.

use crate::classifier::PageClassifier;
use crate::error::RenameError;
use crate::progress::ProgressCallback;
use crate::prompts::DEFAULT_PROMPT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default remote model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default remote endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Default directory scanned when none is given.
pub const DEFAULT_DIRECTORY: &str = "/pages";

/// Configuration for a rename run.
///
/// # Example
/// ```rust
/// use pagemark::{RenameConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = RenameConfig::builder()
///     .api_key("AIza...")
///     .retry(RetryPolicy::fixed(3, Duration::from_secs(5)))
///     .timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert_eq!(config.retry.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct RenameConfig {
    /// API key sent as `x-goog-api-key`. Required for [`NamingScheme::Label`].
    pub api_key: Option<String>,

    /// Remote model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Remote endpoint base URL. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Classification instruction. Default: [`DEFAULT_PROMPT`].
    pub prompt: String,

    /// How many attempts per file and how long to wait between them.
    pub retry: RetryPolicy,

    /// Per-attempt deadline. Default: 30 s.
    pub timeout: Duration,

    /// Which prefix the renamed files get. Default: [`NamingScheme::Label`].
    pub naming: NamingScheme,

    /// Report the new names without touching the filesystem. Default: false.
    pub dry_run: bool,

    /// Pre-constructed classifier. Takes precedence over the Gemini client
    /// built from `api_key`/`model`/`base_url`.
    pub classifier: Option<Arc<dyn PageClassifier>>,

    /// Per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
            naming: NamingScheme::default(),
            dry_run: false,
            classifier: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt", &self.prompt)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("naming", &self.naming)
            .field("dry_run", &self.dry_run)
            .field(
                "classifier",
                &self.classifier.as_ref().map(|_| "<dyn PageClassifier>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RenameProgressCallback>"),
            )
            .finish()
    }
}

impl RenameConfig {
    /// Create a new builder for `RenameConfig`.
    pub fn builder() -> RenameConfigBuilder {
        RenameConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RenameConfig`].
#[derive(Debug)]
pub struct RenameConfigBuilder {
    config: RenameConfig,
}

impl RenameConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        // An empty variable is the same as an unset one.
        self.config.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn naming(mut self, naming: NamingScheme) -> Self {
        self.config.naming = naming;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn PageClassifier>) -> Self {
        self.config.classifier = Some(classifier);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenameConfig, RenameError> {
        let c = &self.config;
        if c.retry.max_attempts == 0 {
            return Err(RenameError::InvalidConfig(
                "Retry count must be ≥ 1 (it counts the first attempt)".into(),
            ));
        }
        if c.timeout.is_zero() {
            return Err(RenameError::InvalidConfig("Timeout must be > 0".into()));
        }
        if c.model.trim().is_empty() {
            return Err(RenameError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(RenameError::InvalidConfig(format!(
                "Base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        Ok(self.config)
    }
}

// ── Retry policy ─────────────────────────────────────────────────────────

/// Bounded retry policy for classifier calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per file, including the first. Default: 1 (no retry).
    pub max_attempts: u32,
    /// Wait between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(1, Duration::from_secs(5))
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential(base),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(d) => d,
            Backoff::Exponential(base) => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                base.saturating_mul(factor)
            }
        }
    }
}

/// Backoff function between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// Same delay every time.
    Fixed(Duration),
    /// `base`, `2 × base`, `4 × base`, …
    Exponential(Duration),
}

// ── Naming ───────────────────────────────────────────────────────────────

/// How the new filename prefix is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// `_<label>_<name>` where the label is read from the page. (default)
    #[default]
    Label,
    /// `_<NNNN>_<name>` where NNNN is the 1-based position in sorted order.
    /// Never contacts the classifier.
    Index,
}
