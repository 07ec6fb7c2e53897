//! CLI binary for pagemark.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `RenameConfig` and prints progress.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pagemark::config::{DEFAULT_BASE_URL, DEFAULT_DIRECTORY, DEFAULT_MODEL};
use pagemark::prompts::DEFAULT_PROMPT;
use pagemark::{
    rename_pages, NamingScheme, ProgressCallback, ProgressSnapshot, RenameConfig,
    RenameProgressCallback, RetryPolicy, RunSummary,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Renaming");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl RenameProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        if total_files > 0 {
            self.bar.println(format!(
                "{} {}",
                cyan("◆"),
                bold(&format!("Processing {total_files} image files…"))
            ));
        }
    }

    fn on_file_start(&self, file_name: &str, progress: &ProgressSnapshot) {
        let eta = match progress.eta {
            Some(eta) => format!("ETA {}", pagemark::progress::format_duration(eta)),
            None => "ETA not available".to_string(),
        };
        self.bar
            .set_message(format!("{:.1}%  {eta}  {file_name}", progress.percent));
    }

    fn on_file_skipped(&self, file_name: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            dim("–"),
            file_name,
            dim("already renamed")
        ));
        self.bar.inc(1);
    }

    fn on_file_renamed(&self, from: &str, to: &str) {
        self.bar
            .println(format!("  {} {} → {}", green("✓"), from, bold(to)));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file_name: &str, error: &str) {
        // Keep very long errors (raw responses) on one terminal line.
        let msg = if error.chars().count() > 100 {
            let cut: String = error.chars().take(99).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {}  {}", red("✗"), file_name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

/// Plain line-per-file reporting for `--no-progress` and non-TTY use.
struct LineProgressCallback;

impl RenameProgressCallback for LineProgressCallback {
    fn on_file_start(&self, _file_name: &str, progress: &ProgressSnapshot) {
        eprintln!("{progress}");
    }

    fn on_file_skipped(&self, file_name: &str) {
        eprintln!("Skipping '{file_name}' as it already starts with an underscore.");
    }

    fn on_file_renamed(&self, from: &str, to: &str) {
        eprintln!("Renamed: '{from}' -> '{to}'");
    }

    fn on_file_error(&self, file_name: &str, error: &str) {
        eprintln!("Error processing '{file_name}': {error}");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rename every scan in /pages (the default directory)
  GOOGLE_API_KEY=... pagemark

  # Another directory, three attempts per page, 2 s apart
  pagemark ~/scans/book --retries 3 --retry-delay 2

  # See what would happen without renaming anything
  pagemark ~/scans/book --dry-run

  # Number files by sorted position instead (no API key needed)
  pagemark ~/scans/book --naming index

  # Machine-readable summary
  pagemark ~/scans/book --json > summary.json

OUTPUT NAMES:
  scan017.png  →  _0009_scan017.png       (page 9)
  scan001.png  →  _cover_scan001.png      (cover)
  _0009_scan017.png                       (skipped: already renamed)

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY        API key (required for --naming label)
  MAX_RETRIES           Total attempts per page (default 1)
  RETRY_DELAY_SECONDS   Delay between attempts (default 5)
  GEMINI_TIMEOUT        Per-attempt timeout in seconds (default 30)
  GEMINI_MODEL          Model identifier
  GEMINI_BASEURL        Endpoint base URL
  PROMPT_TEXT           Classification prompt
"#;

/// Rename scanned page images by their detected page number.
#[derive(Parser, Debug)]
#[command(
    name = "pagemark",
    version,
    about = "Rename scanned page images by their detected page number",
    long_about = "Ask a Vision Language Model which page each scanned image shows and prefix \
the file name with that label (`_0007_scan.png`, `_cover_scan.png`). Files that already \
start with `_` are skipped, so interrupted runs can be restarted safely.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the scanned pages.
    #[arg(default_value = DEFAULT_DIRECTORY)]
    directory: PathBuf,

    /// API key for the vision endpoint.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Endpoint base URL.
    #[arg(long, env = "GEMINI_BASEURL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Classification prompt.
    #[arg(long, env = "PROMPT_TEXT", default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Read the classification prompt from a file (overrides --prompt).
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Total attempts per page, including the first.
    #[arg(long, env = "MAX_RETRIES", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    retries: u32,

    /// Seconds to wait between attempts.
    #[arg(long, env = "RETRY_DELAY_SECONDS", default_value_t = 5)]
    retry_delay: u64,

    /// Backoff between attempts: fixed or exponential.
    #[arg(long, value_enum, default_value = "fixed")]
    backoff: BackoffArg,

    /// Per-attempt timeout in seconds.
    #[arg(long, env = "GEMINI_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// How the new name prefix is chosen.
    #[arg(long, value_enum, default_value = "label")]
    naming: NamingArg,

    /// Report new names without renaming anything.
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BackoffArg {
    Fixed,
    Exponential,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum NamingArg {
    Label,
    Index,
}

impl From<NamingArg> for NamingScheme {
    fn from(v: NamingArg) -> Self {
        match v {
            NamingArg::Label => NamingScheme::Label,
            NamingArg::Index => NamingScheme::Index,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar or the line reporter gives the per-file feedback;
    // library INFO logs would only duplicate it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose { "debug" } else { "error" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if cli.quiet || cli.json {
        None
    } else if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        Some(Arc::new(LineProgressCallback) as ProgressCallback)
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = rename_pages(&cli.directory, &config)
        .await
        .with_context(|| format!("Rename run failed for '{}'", cli.directory.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        print_summary(&cli, &summary);
    }

    Ok(())
}

fn print_summary(cli: &Cli, summary: &RunSummary) {
    if summary.total_files == 0 {
        eprintln!("No image files found in '{}'.", cli.directory.display());
        return;
    }

    let verb = if cli.dry_run { "would be renamed" } else { "renamed" };
    eprintln!(
        "{} {} {verb}, {} skipped, {} failed  {}",
        if summary.failed == 0 {
            green("✔")
        } else if summary.renamed == 0 && summary.skipped == 0 {
            red("✘")
        } else {
            cyan("⚠")
        },
        bold(&summary.renamed.to_string()),
        summary.skipped,
        if summary.failed == 0 {
            summary.failed.to_string()
        } else {
            red(&summary.failed.to_string())
        },
        dim(&format!("{}ms", summary.duration_ms)),
    );
    eprintln!("Finished processing '{}'.", cli.directory.display());
}

/// Map CLI args to `RenameConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RenameConfig> {
    let prompt = if let Some(ref path) = cli.prompt_file {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?
    } else {
        cli.prompt.clone()
    };

    let delay = Duration::from_secs(cli.retry_delay);
    let retry = match cli.backoff {
        BackoffArg::Fixed => RetryPolicy::fixed(cli.retries, delay),
        BackoffArg::Exponential => RetryPolicy::exponential(cli.retries, delay),
    };

    let mut builder = RenameConfig::builder()
        .model(cli.model.clone())
        .base_url(cli.base_url.clone())
        .prompt(prompt)
        .retry(retry)
        .timeout(Duration::from_secs(cli.timeout))
        .naming(cli.naming.clone().into())
        .dry_run(cli.dry_run);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
