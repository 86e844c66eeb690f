//! CLI binary for unweb.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use unweb::config::{DEFAULT_MAX_CONTENT_BYTES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_USER_AGENT};
use unweb::convert::check_upload;
use unweb::{
    ConversionConfig, ConversionResult, Converter, FetchProgressCallback, ProgressCallback,
    UnwebError,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Byte-count progress bar for remote fetches.
///
/// Starts as a spinner; switches to a bar once the server declares a
/// `Content-Length`.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Fetching");
        bar.set_message("Connecting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl FetchProgressCallback for CliProgressCallback {
    fn on_fetch_start(&self, url: &str, declared_len: Option<u64>) {
        self.bar.set_message(url.to_string());
        if let Some(total) = declared_len {
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
            self.bar.set_length(total);
            self.bar.set_style(style);
        }
    }

    fn on_chunk(&self, bytes_so_far: u64, _declared_len: Option<u64>) {
        self.bar.set_position(bytes_so_far);
    }

    fn on_fetch_complete(&self, _total_bytes: u64) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a web page (stdout)
  unweb https://example.com/article

  # Convert a saved page to a file
  unweb page.html -o page.md

  # Convert HTML piped on stdin
  curl -s https://example.com/ | unweb -

  # JSON output with warnings
  unweb --json https://example.com/ > result.json

LIMITS:
  Remote pages must be text/html, at most 10 MiB (--max-bytes), and arrive
  within 60 s (--timeout). Local files must end in .html or .htm and are
  capped at 5 MiB. URLs pointing at localhost or private IPv4 ranges
  (10/8, 172.16/12, 192.168/16, 127/8) are refused, including via redirects.

ENVIRONMENT VARIABLES:
  UNWEB_OUTPUT, UNWEB_JSON, UNWEB_TIMEOUT, UNWEB_MAX_BYTES,
  UNWEB_MAX_UPLOAD_BYTES, UNWEB_USER_AGENT, UNWEB_NO_PROGRESS,
  UNWEB_VERBOSE, UNWEB_QUIET
  RUST_LOG                overrides the log filter
"#;

/// Convert HTML pages, files and URLs to clean Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "unweb",
    version,
    about = "Convert HTML pages, files and URLs to clean Markdown",
    long_about = "Convert HTML to clean Markdown, keeping only the main content. \
Navigation, footers, sidebars and scripts are dropped. INPUT may be an http(s) URL, \
a local .html/.htm file, or '-' to read HTML from stdin.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTTP/HTTPS URL, local .html/.htm file, or '-' for stdin.
    input: String,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "UNWEB_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (markdown + warnings) instead of Markdown.
    #[arg(long, env = "UNWEB_JSON")]
    json: bool,

    /// Remote fetch timeout in seconds.
    #[arg(long, env = "UNWEB_TIMEOUT", default_value_t = 60,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Maximum remote document size in bytes.
    #[arg(long, env = "UNWEB_MAX_BYTES", default_value_t = DEFAULT_MAX_CONTENT_BYTES)]
    max_bytes: u64,

    /// Maximum local file size in bytes.
    #[arg(long, env = "UNWEB_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,

    /// User-Agent header for remote fetches.
    #[arg(long, env = "UNWEB_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Disable progress bar.
    #[arg(long, env = "UNWEB_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "UNWEB_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "UNWEB_QUIET")]
    quiet: bool,
}

/// Where the HTML comes from.
#[derive(Debug, PartialEq, Eq)]
enum Source<'a> {
    Url(&'a str),
    Stdin,
    File(&'a Path),
}

fn classify_input(input: &str) -> Source<'_> {
    if input == "-" {
        Source::Stdin
    } else if input.contains("://") {
        Source::Url(input)
    } else {
        Source::File(Path::new(input))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let source = classify_input(&cli.input);
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && matches!(source, Source::Url(_));
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn FetchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let converter = Converter::new(config).context("Failed to initialise converter")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = match source {
        Source::Url(url) => converter.convert_url(url).await.map_err(report)?,
        Source::Stdin => {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .context("Failed to read HTML from stdin")?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                anyhow::bail!("HTML content is required");
            }
            converter
                .convert_bytes(&bytes)
                .map_err(|e| report(e.into()))?
        }
        Source::File(path) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let size = tokio::fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?
                .len();
            check_upload(&file_name, size, converter.config().policy.max_upload_bytes)
                .map_err(|e| report(e.into()))?;
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            converter
                .convert_upload(&file_name, &bytes)
                .map_err(report)?
        }
    };

    // ── Emit ─────────────────────────────────────────────────────────────
    if !cli.json && !cli.quiet {
        for w in &result.warnings {
            eprintln!("{} {}", yellow("⚠"), w);
        }
    }

    let rendered = render_output(&result, cli.json)?;
    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, &rendered).await?;
        if !cli.quiet {
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                dim(&format!("{} chars", result.markdown.chars().count())),
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .request_timeout(Duration::from_secs(cli.timeout))
        .max_content_bytes(cli.max_bytes)
        .max_upload_bytes(cli.max_upload_bytes)
        .user_agent(cli.user_agent.clone());

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Wrap a library error so the message names its category.
fn report(e: UnwebError) -> anyhow::Error {
    let category = e.category();
    anyhow::Error::new(e).context(format!("Conversion failed ({category})"))
}

fn render_output(result: &ConversionResult, json: bool) -> Result<String> {
    let mut out = if json {
        serde_json::to_string_pretty(result).context("Failed to serialise output")?
    } else {
        result.markdown.clone()
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Write to `<path>.tmp` then rename, so readers never see a partial file.
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move output into {}", path.display()))?;
    Ok(())
}
