//! Conversion entry points.
//!
//! ```text
//! paste / upload:        html ─▶ parse ─▶ extract ─▶ render ─▶ normalize
//! url:   guard ─▶ fetch ─▶ html ─▶ ...same as above...
//! ```
//!
//! [`Converter`] owns the configured collaborators (guard, HTTP client,
//! renderer) and is cheap to clone, so a server can build one at startup and
//! hand a clone to every request. The free functions at the bottom build a
//! throwaway converter for one-off calls.
//!
//! Guard and fetch errors reach the caller unchanged inside [`UnwebError`];
//! only parse and render failures become [`ConversionError`].

use crate::config::ConversionConfig;
use crate::dom::{HtmlNode, ParsedDocument};
use crate::error::{ConversionError, UnwebError, UploadError};
use crate::output::ConversionResult;
use crate::pipeline::decode::decode_html;
use crate::pipeline::extract::extract;
use crate::pipeline::fetch::BoundedFetcher;
use crate::pipeline::guard::UrlGuard;
use crate::pipeline::normalize::normalize;
use crate::pipeline::render::{HtmdRenderer, MarkdownRenderer};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// File extensions accepted by [`Converter::convert_upload`].
pub const UPLOAD_EXTENSIONS: &[&str] = &["html", "htm"];

/// A configured HTML-to-Markdown converter.
#[derive(Clone)]
pub struct Converter {
    config: Arc<ConversionConfig>,
    guard: UrlGuard,
    fetcher: BoundedFetcher,
    renderer: Arc<dyn MarkdownRenderer>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Build a converter. Fails only if the HTTP client cannot be created.
    pub fn new(config: ConversionConfig) -> Result<Self, UnwebError> {
        let fetcher = BoundedFetcher::new(&config)?;
        let renderer = Arc::new(HtmdRenderer::new(config.skip_tags.iter().cloned()));
        Ok(Self {
            guard: UrlGuard::new(config.policy.clone()),
            fetcher,
            renderer,
            config: Arc::new(config),
        })
    }

    /// Replace the Markdown renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert an HTML string (paste path).
    pub fn convert_html(&self, html: &str) -> Result<ConversionResult, ConversionError> {
        run_pipeline(html, self.renderer.as_ref()).inspect_err(|e| {
            error!("Conversion failed: {} ({})", e, e.detail());
        })
    }

    /// Decode raw bytes (BOM, `<meta charset>`, else UTF-8) and convert them.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<ConversionResult, ConversionError> {
        self.convert_html(&decode_html(bytes, None))
    }

    /// Convert an uploaded file after checking its name and size.
    pub fn convert_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ConversionResult, UnwebError> {
        check_upload(file_name, bytes.len() as u64, self.config.policy.max_upload_bytes)?;
        info!("Converting upload '{}' ({} bytes)", file_name, bytes.len());
        Ok(self.convert_bytes(bytes)?)
    }

    /// Validate, fetch and convert a remote page (URL path).
    ///
    /// Parsing and rendering run on the blocking thread pool.
    pub async fn convert_url(&self, url: &str) -> Result<ConversionResult, UnwebError> {
        let validated = self.guard.validate(url).inspect_err(|e| {
            warn!("Rejected URL '{}': {}", url, e);
        })?;

        let html = self.fetcher.fetch(&validated).await?;

        let this = self.clone();
        let result = tokio::task::spawn_blocking(move || this.convert_html(&html))
            .await
            .map_err(|e| ConversionError::internal(format!("conversion task failed: {e}")))?;
        Ok(result?)
    }
}

/// Check an upload's name and size in the order: empty, extension, size.
pub fn check_upload(file_name: &str, size: u64, limit: u64) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::MissingFile);
    }

    let allowed = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| UPLOAD_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)));
    if !allowed {
        return Err(UploadError::UnsupportedExtension {
            file_name: file_name.to_string(),
        });
    }

    if size > limit {
        return Err(UploadError::TooLarge { bytes: size, limit });
    }
    Ok(())
}

// ── Pipeline ─────────────────────────────────────────────────────────────

fn run_pipeline(
    html: &str,
    renderer: &dyn MarkdownRenderer,
) -> Result<ConversionResult, ConversionError> {
    let doc = catch_unwind(AssertUnwindSafe(|| ParsedDocument::parse(html)))
        .map_err(|p| ConversionError::parse_failed(panic_message(p.as_ref())))?;

    let (fragment, method, score) = catch_unwind(AssertUnwindSafe(|| {
        extract(&doc).map(|o| (o.node.outer_html(), o.method, o.score))
    }))
    .map_err(|p| ConversionError::internal(panic_message(p.as_ref())))?
    .ok_or_else(|| ConversionError::parse_failed("document has no root element"))?;
    debug!(
        "Extracted {:?} (score {}), {} bytes of HTML",
        method,
        score,
        fragment.len()
    );

    let rendered = catch_unwind(AssertUnwindSafe(|| renderer.render(&fragment)))
        .map_err(|p| ConversionError::internal(panic_message(p.as_ref())))??;

    let markdown = normalize(&rendered);
    let warnings = method.warning().map(str::to_string).into_iter().collect();
    Ok(ConversionResult::new(markdown, warnings))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic with non-string payload".to_string()
    }
}

// ── One-shot helpers ─────────────────────────────────────────────────────

/// Convert an HTML string with the default renderer settings.
///
/// # Example
/// ```rust
/// let result = unweb::convert_html("<main><h1>Title</h1><p>Body.</p></main>").unwrap();
/// assert!(result.markdown.contains("# Title"));
/// assert!(result.warnings.is_empty());
/// ```
pub fn convert_html(html: &str) -> Result<ConversionResult, ConversionError> {
    let renderer = HtmdRenderer::new(crate::config::DEFAULT_SKIP_TAGS.iter().copied());
    run_pipeline(html, &renderer).inspect_err(|e| {
        error!("Conversion failed: {} ({})", e, e.detail());
    })
}

/// Fetch and convert `url` with `config`.
///
/// # Example
/// ```rust,no_run
/// use unweb::{convert_url, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = convert_url("https://example.com/", &ConversionConfig::default()).await?;
/// println!("{}", result.markdown);
/// # Ok(())
/// # }
/// ```
pub async fn convert_url(
    url: &str,
    config: &ConversionConfig,
) -> Result<ConversionResult, UnwebError> {
    Converter::new(config.clone())?.convert_url(url).await
}

/// Synchronous wrapper around [`convert_url`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn convert_url_sync(
    url: &str,
    config: &ConversionConfig,
) -> Result<ConversionResult, UnwebError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConversionError::internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert_url(url, config))
}
