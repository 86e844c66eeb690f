//! Markdown rendering: turn the extracted HTML fragment into Markdown.
//!
//! The heavy lifting is delegated to `htmd`. [`MarkdownRenderer`] is the seam
//! between the pipeline and that library, so a different renderer (or a test
//! double) can be plugged into [`crate::convert::Converter::with_renderer`].
//!
//! ## Output conventions
//!
//! - ATX headings (`# Title`), `-` bullets, fenced code blocks with backticks
//! - Comments are dropped; unknown tags are unwrapped and their text kept
//! - Tags in the skip list are dropped *with* their content. The default list
//!   only covers non-visible markup (`script`, `style`, `head`, ...); page
//!   chrome is stripped by the extractor, and only on the body fallback

use crate::error::ConversionError;
use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use std::fmt;
use std::sync::Arc;

/// Renders an HTML fragment to Markdown.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, html: &str) -> Result<String, ConversionError>;
}

/// [`MarkdownRenderer`] backed by `htmd`.
///
/// The converter is built once and shared by clones.
#[derive(Clone)]
pub struct HtmdRenderer {
    skip_tags: Vec<String>,
    converter: Arc<HtmlToMarkdown>,
}

impl fmt::Debug for HtmdRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmdRenderer")
            .field("skip_tags", &self.skip_tags)
            .finish_non_exhaustive()
    }
}

impl HtmdRenderer {
    pub fn new<I, S>(skip_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let skip_tags: Vec<String> = skip_tags.into_iter().map(Into::into).collect();
        let converter = Arc::new(build_converter(&skip_tags));
        Self {
            skip_tags,
            converter,
        }
    }

    pub fn skip_tags(&self) -> &[String] {
        &self.skip_tags
    }
}

fn build_converter(skip_tags: &[String]) -> HtmlToMarkdown {
    let mut builder = HtmlToMarkdown::builder().options(Options {
        heading_style: HeadingStyle::Atx,
        bullet_list_marker: BulletListMarker::Dash,
        code_block_style: CodeBlockStyle::Fenced,
        code_block_fence: CodeBlockFence::Backticks,
        ..Default::default()
    });
    // htmd asserts on an empty tag group.
    if !skip_tags.is_empty() {
        builder = builder.skip_tags(skip_tags.iter().map(String::as_str).collect());
    }
    builder.build()
}

impl MarkdownRenderer for HtmdRenderer {
    fn render(&self, html: &str) -> Result<String, ConversionError> {
        self.converter
            .convert(html)
            .map_err(|e| ConversionError::internal(format!("htmd: {e}")))
    }
}
