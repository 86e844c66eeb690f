//! Byte-to-text decoding for fetched and uploaded HTML.
//!
//! Charset resolution order:
//! 1. byte-order mark
//! 2. `charset=` parameter of the HTTP `Content-Type` header
//! 3. `<meta charset>` or `<meta http-equiv="Content-Type">` in the first
//!    1024 bytes
//! 4. UTF-8
//!
//! Decoding is lossy: invalid sequences become U+FFFD.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;

/// Bytes inspected when sniffing a `<meta>` declaration.
pub const SNIFF_LIMIT: usize = 1024;

static RE_META_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).unwrap());

static RE_HEADER_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i);\s*charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

/// Encoding named by a `Content-Type` header value, if any.
pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    RE_HEADER_CHARSET
        .captures(content_type)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Encoding declared by a `<meta>` tag near the start of `bytes`, if any.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LIMIT)]);
    RE_META_CHARSET
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Decode `bytes` to a `String`, honouring an optional `Content-Type` value.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(UTF_8);

    // `decode` lets a BOM override the label.
    let (text, _used, _had_errors) = encoding.decode(bytes);
    text.into_owned()
}
