//! # unweb
//!
//! Convert HTML (pasted, uploaded, or fetched from a URL) into clean Markdown,
//! keeping the page's main content and dropping navigation, footers,
//! sidebars and scripts.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL ─▶ 1. Guard    scheme + private-network host checks
//!     ─▶ 2. Fetch    bounded GET (60 s, 10 MiB, text/html only)
//!     ─▶ 3. Decode   charset from header / <meta> / UTF-8
//! HTML ─▶ 4. Extract  <main>/<article>/[role=main], else best-scoring <div>,
//!                     else <body>
//!     ─▶ 5. Render   HTML fragment → Markdown (htmd)
//!     ─▶ 6. Normalize collapse blank-line runs, trim
//!     ─▶ ConversionResult { markdown, warnings }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! let result = unweb::convert_html(
//!     "<nav>Home | About</nav><main><h1>Title</h1><p>Body.</p></main>",
//! )
//! .unwrap();
//! assert!(result.markdown.starts_with("# Title"));
//! assert!(!result.markdown.contains("About"));
//! ```
//!
//! Remote pages go through a [`Converter`], which owns the HTTP client:
//!
//! ```rust,no_run
//! use unweb::{ConversionConfig, Converter};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new(ConversionConfig::default())?;
//! let result = converter.convert_url("https://example.com/").await?;
//! for w in &result.warnings {
//!     eprintln!("warning: {w}");
//! }
//! println!("{}", result.markdown);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `unweb` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! unweb = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod dom;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, FetchPolicy};
pub use convert::{convert_html, convert_url, convert_url_sync, Converter};
pub use error::{ConversionError, ErrorCategory, FetchError, UnwebError, UploadError, UrlError};
pub use output::{ConversionResult, ExtractionMethod};
pub use pipeline::guard::{UrlGuard, ValidatedUrl};
pub use progress::{FetchProgressCallback, NoopProgressCallback, ProgressCallback};
