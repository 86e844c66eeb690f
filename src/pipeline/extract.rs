//! Content extraction: pick the element holding a page's main content.
//!
//! Three tiers, first match wins:
//!
//! 1. **Semantic tag**: `<main>`, then `<article>`, then `[role="main"]`.
//! 2. **Heuristic score**: every `<div>` is scored on text length, paragraph
//!    count and link density; the best one wins if it scores above
//!    [`SCORE_THRESHOLD`].
//! 3. **Body fallback**: `<body>`, or the document element when there is no
//!    body, with its `nav`, `footer` and `aside` descendants removed.
//!
//! Tiers 1 and 2 hand back the element untouched, so a footer or aside
//! inside `<article>` is part of the content.
//!
//! Extraction never fails on a document that has a root element. "Nothing
//! looks like content" is an ordinary outcome and degrades to tier 3.
//!
//! The scoring constants are fixed and have no tuning knobs.

use crate::dom::{HtmlDocument, HtmlNode};
use crate::output::ExtractionMethod;
use tracing::{debug, info, warn};

/// Semantic selectors, in priority order.
pub const SEMANTIC_SELECTORS: &[&str] = &["main", "article", "[role='main']"];

/// Elements scored by the heuristic tier.
pub const CANDIDATE_SELECTOR: &str = "div";

/// A candidate containing any of these scores zero.
pub const EXCLUDED_DESCENDANTS: &str = "nav, footer, aside, script, style";

/// Page chrome removed from the body before it is used as content.
pub const FALLBACK_CHROME: &str = "nav, footer, aside";

/// A winning candidate must score strictly above this.
pub const SCORE_THRESHOLD: u32 = 100;

const CHARS_PER_POINT: usize = 10;
const MAX_LENGTH_POINTS: u32 = 100;
const POINTS_PER_PARAGRAPH: u32 = 10;

/// The element chosen by [`extract`] and how it was found.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome<N> {
    pub node: N,
    pub method: ExtractionMethod,
    /// Winning score; zero unless `method` is `HeuristicScore`.
    pub score: u32,
}

/// Select the main-content element of `doc`.
///
/// Returns `None` only when the document has neither a body nor a root
/// element.
pub fn extract<D: HtmlDocument>(doc: &D) -> Option<ExtractionOutcome<D::Node<'_>>> {
    if let Some((selector, node)) = SEMANTIC_SELECTORS
        .iter()
        .find_map(|sel| doc.select_first(sel).map(|n| (*sel, n)))
    {
        info!("Main content found via semantic tag '{}'", selector);
        return Some(ExtractionOutcome {
            node,
            method: ExtractionMethod::SemanticTag,
            score: 0,
        });
    }

    let mut best: Option<(D::Node<'_>, u32)> = None;
    for (idx, candidate) in doc.select_all(CANDIDATE_SELECTOR).into_iter().enumerate() {
        let score = score_candidate(&candidate);
        debug!("Candidate div #{} scored {}", idx, score);
        // Strictly greater keeps the earliest candidate on ties.
        if best.as_ref().map_or(score > 0, |(_, top)| score > *top) {
            best = Some((candidate, score));
        }
    }

    if let Some((node, score)) = best {
        if score > SCORE_THRESHOLD {
            info!("Main content extracted using content analysis (score {})", score);
            return Some(ExtractionOutcome {
                node,
                method: ExtractionMethod::HeuristicScore,
                score,
            });
        }
        debug!("Best candidate scored {} (threshold {})", score, SCORE_THRESHOLD);
    }

    warn!("No main content detected; using entire body");
    let node = doc.body().or_else(|| doc.document_element())?;
    let removed = node.remove_descendants(FALLBACK_CHROME);
    debug!("Removed {} chrome elements from fallback body", removed);
    Some(ExtractionOutcome {
        node,
        method: ExtractionMethod::BodyFallback,
        score: 0,
    })
}

/// Heuristic content score of one candidate element.
///
/// * 0 if the element contains navigation, footer, sidebar, script or style.
/// * `min(chars / 10, 100)` for the flattened text length.
/// * +10 per descendant `<p>`.
/// * Halved when descendant `<a>` outnumber twice the paragraphs.
pub fn score_candidate<N: HtmlNode>(node: &N) -> u32 {
    if node.select_first(EXCLUDED_DESCENDANTS).is_some() {
        return 0;
    }

    let text_len = node.text_content().chars().count();
    let length_points = u32::try_from(text_len / CHARS_PER_POINT)
        .unwrap_or(u32::MAX)
        .min(MAX_LENGTH_POINTS);

    let paragraphs = node.count("p");
    let paragraph_points = u32::try_from(paragraphs)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_PARAGRAPH);

    let mut score = length_points.saturating_add(paragraph_points);

    let links = node.count("a");
    if links > paragraphs.saturating_mul(2) {
        score /= 2;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ParsedDocument;

    fn para(chars: usize) -> String {
        format!("<p>{}</p>", "A".repeat(chars))
    }

    fn outcome_tag(html: &str) -> (ExtractionMethod, Option<String>, u32) {
        let doc = ParsedDocument::parse(html);
        let out = extract(&doc).unwrap();
        (out.method, out.node.tag_name(), out.score)
    }

    // ── Tier 1 ──────────────────────────────────────────────────────────

    #[test]
    fn main_wins_over_everything() {
        let html = format!(
            "<article>a</article><div>{}</div><main><h1>T</h1></main>",
            para(2000)
        );
        let (method, tag, _) = outcome_tag(&html);
        assert_eq!(method, ExtractionMethod::SemanticTag);
        assert_eq!(tag.as_deref(), Some("main"));
    }

    #[test]
    fn article_before_role_main() {
        let html = r#"<div role="main">r</div><article>a</article>"#;
        let (method, tag, _) = outcome_tag(html);
        assert_eq!(method, ExtractionMethod::SemanticTag);
        assert_eq!(tag.as_deref(), Some("article"));
    }

    #[test]
    fn role_main_is_semantic() {
        let html = r#"<nav>menu</nav><section role="main"><p>hi</p></section>"#;
        let (method, tag, _) = outcome_tag(html);
        assert_eq!(method, ExtractionMethod::SemanticTag);
        assert_eq!(tag.as_deref(), Some("section"));
    }

    #[test]
    fn first_main_in_document_order() {
        let doc = ParsedDocument::parse("<main>one</main><main>two</main>");
        let out = extract(&doc).unwrap();
        assert_eq!(out.node.text_content(), "one");
    }

    // ── Tier 2 ──────────────────────────────────────────────────────────

    #[test]
    fn dense_div_is_selected() {
        let html = format!(
            "<nav>X</nav><div id=\"content\">{}<p>more</p></div>",
            para(1000)
        );
        let doc = ParsedDocument::parse(&html);
        let out = extract(&doc).unwrap();
        assert_eq!(out.method, ExtractionMethod::HeuristicScore);
        // 1004 chars -> 100, two paragraphs -> +20.
        assert_eq!(out.score, 120);
        assert!(!out.node.text_content().contains('X'));
    }

    #[test]
    fn five_hundred_chars_does_not_clear_threshold() {
        let html = format!("<nav>X</nav><div>{}<p>more</p></div>", para(500));
        let (method, tag, score) = outcome_tag(&html);
        assert_eq!(method, ExtractionMethod::BodyFallback);
        assert_eq!(tag.as_deref(), Some("body"));
        assert_eq!(score, 0);
    }

    #[test]
    fn paragraphs_alone_can_clear_threshold() {
        let html = format!("<div>{}</div>", "<p>x</p>".repeat(11));
        let (method, _, score) = outcome_tag(&html);
        assert_eq!(method, ExtractionMethod::HeuristicScore);
        assert_eq!(score, 1 + 110);
    }

    #[test]
    fn exactly_threshold_is_not_enough() {
        // 1000 chars -> 100 points, no paragraphs.
        let html = format!("<div>{}</div>", "A".repeat(1000));
        let (method, _, _) = outcome_tag(&html);
        assert_eq!(method, ExtractionMethod::BodyFallback);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let html = format!(
            "<div id=\"a\">{}</div><div id=\"b\">{}</div>",
            para(1000),
            para(1000)
        );
        let doc = ParsedDocument::parse(&html);
        let out = extract(&doc).unwrap();
        assert_eq!(out.method, ExtractionMethod::HeuristicScore);
        assert!(out.node.outer_html().contains("id=\"a\""));
    }

    #[test]
    fn higher_score_wins_regardless_of_order() {
        let html = format!(
            "<div id=\"small\">{}</div><div id=\"big\">{}{}</div>",
            para(1100),
            para(1100),
            "<p>x</p>".repeat(3)
        );
        let doc = ParsedDocument::parse(&html);
        let out = extract(&doc).unwrap();
        assert!(out.node.outer_html().starts_with("<div id=\"big\""));
        assert_eq!(out.score, 100 + 40);
    }

    #[test]
    fn fallback_body_loses_chrome() {
        let doc = ParsedDocument::parse(
            "<nav>Menu</nav><p>Only text</p><aside>Related</aside><footer>Legal</footer>",
        );
        let out = extract(&doc).unwrap();
        assert_eq!(out.method, ExtractionMethod::BodyFallback);
        assert_eq!(out.node.text_content(), "Only text");
    }

    #[test]
    fn semantic_node_keeps_its_footer_and_aside() {
        let doc = ParsedDocument::parse(
            "<nav>Menu</nav><article><p>Text.</p><footer>By Jane Doe</footer>\
             <aside>Editor note</aside></article>",
        );
        let out = extract(&doc).unwrap();
        assert_eq!(out.method, ExtractionMethod::SemanticTag);
        let text = out.node.text_content();
        assert!(text.contains("By Jane Doe"));
        assert!(text.contains("Editor note"));
    }

    // ── Scoring ─────────────────────────────────────────────────────────

    fn score_of(html: &str) -> u32 {
        let doc = ParsedDocument::parse(html);
        let div = doc.select_first("div").unwrap();
        score_candidate(&div)
    }

    #[test]
    fn excluded_descendants_zero_the_score() {
        for tag in ["nav", "footer", "aside", "script", "style"] {
            let html = format!("<div>{}<{tag}>x</{tag}></div>", para(2000));
            assert_eq!(score_of(&html), 0, "{tag} should exclude");
        }
    }

    #[test]
    fn length_points_are_capped() {
        assert_eq!(score_of(&format!("<div>{}</div>", "A".repeat(5000))), 100);
        assert_eq!(score_of(&format!("<div>{}</div>", "A".repeat(59))), 5);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 300 two-byte characters.
        assert_eq!(score_of(&format!("<div>{}</div>", "é".repeat(300))), 30);
    }

    #[test]
    fn link_dense_blocks_are_halved() {
        // 1 paragraph, 3 links: 3 > 2 -> halve.
        let html = format!(
            "<div>{}<a href=\"#\">l</a><a href=\"#\">l</a><a href=\"#\">l</a></div>",
            para(997)
        );
        assert_eq!(score_of(&html), 110 / 2);

        // 1 paragraph, 2 links: not more than twice -> no penalty.
        let html = format!("<div>{}<a href=\"#\">l</a><a href=\"#\">l</a></div>", para(998));
        assert_eq!(score_of(&html), 110);
    }

    // ── Tier 3 ──────────────────────────────────────────────────────────

    #[test]
    fn empty_document_falls_back_to_body() {
        let (method, tag, _) = outcome_tag("");
        assert_eq!(method, ExtractionMethod::BodyFallback);
        assert_eq!(tag.as_deref(), Some("body"));
    }

    #[test]
    fn only_chrome_falls_back() {
        let html = format!("<div><nav>menu</nav>{}</div>", para(3000));
        let (method, _, _) = outcome_tag(&html);
        assert_eq!(method, ExtractionMethod::BodyFallback);
    }
}
