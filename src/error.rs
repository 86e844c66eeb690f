//! Error types for the unweb library.
//!
//! Each stage of the pipeline owns its own error enum so callers can match on
//! exactly the failures that stage can produce:
//!
//! * [`UrlError`]: the URL Guard rejected the input (malformed, wrong
//!   scheme, or a forbidden host). Client-side problem, never retried.
//! * [`FetchError`]: the remote side or the network failed (timeout,
//!   non-2xx status, wrong content type, oversized body, transport fault).
//! * [`ConversionError`]: local processing failed. Its `Display` is a short
//!   fixed message; the diagnostic detail is kept in a field for logging.
//! * [`UploadError`]: an uploaded file was rejected before conversion.
//!
//! [`UnwebError`] is the umbrella returned by the URL and upload entry
//! points. It wraps the stage errors transparently so the inner value reaches
//! the caller unchanged, and [`ErrorCategory`] maps every error onto the
//! outward-facing signal a transport layer should emit.

use serde::Serialize;
use thiserror::Error;

/// Outward-facing error classes, one per distinct transport signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Client input is malformed (bad URL, bad upload).
    InvalidInput,
    /// Client input is well-formed but forbidden by policy.
    Forbidden,
    /// Remote document or upload exceeds the size limit.
    PayloadTooLarge,
    /// Remote document is not HTML.
    UnsupportedMediaType,
    /// Remote server or network failed.
    UpstreamFailure,
    /// Remote server did not answer in time.
    GatewayTimeout,
    /// Local processing failed.
    Internal,
}

impl ErrorCategory {
    /// HTTP status code conventionally used for this category.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCategory::InvalidInput => 400,
            ErrorCategory::Forbidden => 403,
            ErrorCategory::PayloadTooLarge => 413,
            ErrorCategory::UnsupportedMediaType => 415,
            ErrorCategory::Internal => 500,
            ErrorCategory::UpstreamFailure => 502,
            ErrorCategory::GatewayTimeout => 504,
        }
    }

    /// Short machine-readable label, e.g. for logs and JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Forbidden => "forbidden",
            ErrorCategory::PayloadTooLarge => "payload_too_large",
            ErrorCategory::UnsupportedMediaType => "unsupported_media_type",
            ErrorCategory::UpstreamFailure => "upstream_failure",
            ErrorCategory::GatewayTimeout => "gateway_timeout",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── URL Guard ────────────────────────────────────────────────────────────

/// Rejections produced by [`crate::pipeline::guard::UrlGuard`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// The input is not an absolute URL with a host.
    #[error("Invalid URL format: '{input}'")]
    InvalidFormat { input: String },

    /// The scheme is not in the allowed set.
    #[error("Unsupported protocol: {scheme}. Only HTTP and HTTPS are allowed")]
    UnsupportedScheme { scheme: String },

    /// The host is loopback, unspecified, or in a private IPv4 range.
    #[error("Access to private IP addresses is not allowed (host '{host}')")]
    ForbiddenHost { host: String },
}

impl UrlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UrlError::InvalidFormat { .. } | UrlError::UnsupportedScheme { .. } => {
                ErrorCategory::InvalidInput
            }
            UrlError::ForbiddenHost { .. } => ErrorCategory::Forbidden,
        }
    }
}

// ── Bounded Fetcher ──────────────────────────────────────────────────────

/// Failures produced by [`crate::pipeline::fetch::BoundedFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the policy timeout.
    #[error("Request timed out after {secs} seconds")]
    Timeout {
        /// Deadline in whole seconds, rounded up.
        secs: u64,
    },

    /// The server answered with a non-2xx status.
    #[error("Failed to fetch URL. Status: {code} {reason}")]
    HttpStatus { code: u16, reason: String },

    /// The server declared a `Content-Type` other than `text/html`.
    #[error("Unsupported content type: {content_type}. Only text/html is supported")]
    UnsupportedContentType { content_type: String },

    /// Declared or streamed body size exceeds the limit.
    #[error("Content too large: {bytes} bytes. Maximum: {limit} bytes")]
    TooLarge { bytes: u64, limit: u64 },

    /// Connection, DNS, TLS, or body-read failure.
    #[error("Failed to fetch URL: {detail}")]
    NetworkError { detail: String },

    /// A redirect hop pointed at a URL the guard rejects.
    #[error("Redirect blocked: {0}")]
    RedirectBlocked(#[source] UrlError),

    /// The HTTP client could not be constructed from the configuration.
    #[error("Failed to build HTTP client: {detail}")]
    ClientBuild { detail: String },
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::Timeout { .. } => ErrorCategory::GatewayTimeout,
            FetchError::TooLarge { .. } => ErrorCategory::PayloadTooLarge,
            FetchError::UnsupportedContentType { .. } => ErrorCategory::UnsupportedMediaType,
            FetchError::RedirectBlocked(_) => ErrorCategory::Forbidden,
            FetchError::ClientBuild { .. } => ErrorCategory::Internal,
            FetchError::HttpStatus { .. } | FetchError::NetworkError { .. } => {
                ErrorCategory::UpstreamFailure
            }
        }
    }
}

// ── Conversion ───────────────────────────────────────────────────────────

/// Local processing failures. `Display` never includes `detail`.
#[derive(Debug, Clone, Error)]
pub enum ConversionError {
    /// The DOM collaborator could not produce a document.
    #[error("Failed to parse HTML")]
    ParseFailed { detail: String },

    /// The renderer or another collaborator failed unexpectedly.
    #[error("Failed to convert HTML to markdown")]
    InternalFailure { detail: String },
}

impl ConversionError {
    pub fn parse_failed(detail: impl Into<String>) -> Self {
        ConversionError::ParseFailed {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ConversionError::InternalFailure {
            detail: detail.into(),
        }
    }

    /// Diagnostic detail for local logs.
    pub fn detail(&self) -> &str {
        match self {
            ConversionError::ParseFailed { detail } | ConversionError::InternalFailure { detail } => {
                detail
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Internal
    }
}

// ── Upload ───────────────────────────────────────────────────────────────

/// Rejections of an uploaded HTML file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No file, or a zero-length file.
    #[error("No file uploaded")]
    MissingFile,

    /// File name does not end in `.html` or `.htm`.
    #[error("Only .html and .htm files are allowed (got '{file_name}')")]
    UnsupportedExtension { file_name: String },

    /// File exceeds the upload limit.
    #[error("File too large: {bytes} bytes. Maximum: {limit} bytes")]
    TooLarge { bytes: u64, limit: u64 },
}

impl UploadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UploadError::TooLarge { .. } => ErrorCategory::PayloadTooLarge,
            UploadError::MissingFile | UploadError::UnsupportedExtension { .. } => {
                ErrorCategory::InvalidInput
            }
        }
    }
}

// ── Umbrella ─────────────────────────────────────────────────────────────

/// Any error an unweb entry point can return.
#[derive(Debug, Error)]
pub enum UnwebError {
    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UnwebError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UnwebError::Url(e) => e.category(),
            UnwebError::Fetch(e) => e.category(),
            UnwebError::Conversion(e) => e.category(),
            UnwebError::Upload(e) => e.category(),
            UnwebError::InvalidConfig(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_error_categories() {
        let e = UrlError::InvalidFormat {
            input: "nope".into(),
        };
        assert_eq!(e.category(), ErrorCategory::InvalidInput);

        let e = UrlError::UnsupportedScheme {
            scheme: "ftp".into(),
        };
        assert_eq!(e.category().http_status(), 400);
        assert!(e.to_string().contains("ftp"));

        let e = UrlError::ForbiddenHost {
            host: "10.0.0.1".into(),
        };
        assert_eq!(e.category().http_status(), 403);
    }

    #[test]
    fn fetch_error_categories_are_distinct() {
        let timeout = FetchError::Timeout { secs: 60 };
        let large = FetchError::TooLarge {
            bytes: 20_000_000,
            limit: 10 * 1024 * 1024,
        };
        let media = FetchError::UnsupportedContentType {
            content_type: "application/pdf".into(),
        };
        let status = FetchError::HttpStatus {
            code: 404,
            reason: "Not Found".into(),
        };

        assert_eq!(timeout.category().http_status(), 504);
        assert_eq!(large.category().http_status(), 413);
        assert_eq!(media.category().http_status(), 415);
        assert_eq!(status.category().http_status(), 502);
        assert!(status.to_string().contains("404"));
        assert!(timeout.to_string().contains("60 seconds"));
    }

    #[test]
    fn conversion_error_hides_detail() {
        let e = ConversionError::internal("renderer exploded at node 42");
        assert_eq!(e.to_string(), "Failed to convert HTML to markdown");
        assert_eq!(e.detail(), "renderer exploded at node 42");
        assert_eq!(e.category(), ErrorCategory::Internal);
    }

    #[test]
    fn umbrella_is_transparent() {
        let inner = UrlError::ForbiddenHost {
            host: "127.0.0.1".into(),
        };
        let msg = inner.to_string();
        let e: UnwebError = inner.into();
        assert_eq!(e.to_string(), msg);
        assert_eq!(e.category(), ErrorCategory::Forbidden);
        assert!(matches!(e, UnwebError::Url(UrlError::ForbiddenHost { .. })));
    }

    #[test]
    fn upload_too_large_maps_to_413() {
        let e = UnwebError::from(UploadError::TooLarge {
            bytes: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        });
        assert_eq!(e.category().http_status(), 413);
    }
}
