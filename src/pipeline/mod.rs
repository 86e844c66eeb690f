//! Pipeline stages for HTML-to-Markdown conversion.
//!
//! Each submodule implements exactly one step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! guard ──▶ fetch ──▶ decode ──▶ extract ──▶ render ──▶ normalize
//! (URL)     (HTTP)    (charset)  (DOM)       (htmd)     (blank lines)
//! ```
//!
//! 1. [`guard`]:     scheme and SSRF host checks; pure
//! 2. [`fetch`]:     bounded GET; the only stage with network I/O
//! 3. [`decode`]:    bytes to text using the declared or sniffed charset
//! 4. [`extract`]:   pick the main-content element (semantic tag, score,
//!    or body)
//! 5. [`render`]:    HTML fragment to Markdown via the renderer collaborator
//! 6. [`normalize`]: collapse runs of blank lines and trim
//!
//! Paste and upload conversions start at `decode`/`extract`; only URL
//! conversions run `guard` and `fetch`.

pub mod decode;
pub mod extract;
pub mod fetch;
pub mod guard;
pub mod normalize;
pub mod render;
