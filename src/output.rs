//! Result types returned by the conversion pipeline.

use serde::{Deserialize, Serialize};

/// Warning recorded when the heuristic scoring tier picked the content.
pub const WARNING_CONTENT_ANALYSIS: &str = "Main content extracted using content analysis";

/// Warning recorded when extraction fell back to the whole body.
pub const WARNING_BODY_FALLBACK: &str = "No main content detected; using entire body";

/// The Markdown produced by one conversion plus advisory warnings.
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Normalized Markdown; never contains three consecutive blank lines.
    pub markdown: String,
    /// Advisory warnings in the order they were raised.
    pub warnings: Vec<String>,
}

impl ConversionResult {
    pub fn new(markdown: String, warnings: Vec<String>) -> Self {
        Self { markdown, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Which extraction tier selected the content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// `<main>`, `<article>`, or `[role="main"]`.
    SemanticTag,
    /// Highest-scoring `<div>` above the threshold.
    HeuristicScore,
    /// `<body>`, or the document element when there is no body.
    BodyFallback,
}

impl ExtractionMethod {
    /// The advisory warning this method records, if any.
    pub fn warning(self) -> Option<&'static str> {
        match self {
            ExtractionMethod::SemanticTag => None,
            ExtractionMethod::HeuristicScore => Some(WARNING_CONTENT_ANALYSIS),
            ExtractionMethod::BodyFallback => Some(WARNING_BODY_FALLBACK),
        }
    }
}
