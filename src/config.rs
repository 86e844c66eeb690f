//! Configuration types for HTML-to-Markdown conversion.
//!
//! Two layers:
//!
//! * [`FetchPolicy`]: the process-wide, read-only limits that govern remote
//!   fetches and uploads (sizes, timeout, schemes, forbidden hosts). Set once
//!   at startup and shared by every request.
//! * [`ConversionConfig`]: everything a [`crate::convert::Converter`] needs:
//!   the policy plus HTTP client identity, renderer settings, and an optional
//!   progress callback. Built via [`ConversionConfig::builder()`].

use crate::error::UnwebError;
use crate::pipeline::guard::is_forbidden_host;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;
use url::Host;

/// Default cap on a remote document: 10 MiB.
pub const DEFAULT_MAX_CONTENT_BYTES: u64 = 10 * 1024 * 1024;

/// Default cap on an uploaded file: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Default end-to-end timeout for a remote fetch.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default redirect budget per fetch.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// `User-Agent` sent with every remote fetch.
pub const DEFAULT_USER_AGENT: &str = "UnWeb/1.0 (HTML to Markdown Converter)";

/// Tags the renderer drops together with their content.
pub const DEFAULT_SKIP_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Decides whether a parsed URL host must be refused.
pub type HostPredicate = fn(&Host<&str>) -> bool;

/// Limits applied to remote fetches and uploads.
#[derive(Clone)]
pub struct FetchPolicy {
    /// Maximum remote body size, enforced on `Content-Length` and on bytes read.
    pub max_content_bytes: u64,

    /// Maximum uploaded file size.
    pub max_upload_bytes: u64,

    /// Hard deadline for a remote fetch, body included.
    pub request_timeout: Duration,

    /// Lowercase scheme names the guard accepts.
    pub allowed_schemes: Vec<String>,

    /// Returns `true` for hosts the guard must refuse.
    pub blocked_host: HostPredicate,

    /// Redirect hops followed before giving up.
    pub max_redirects: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            blocked_host: is_forbidden_host,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl fmt::Debug for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchPolicy")
            .field("max_content_bytes", &self.max_content_bytes)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("request_timeout", &self.request_timeout)
            .field("allowed_schemes", &self.allowed_schemes)
            .field("blocked_host", &"<fn>")
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

/// Configuration for a [`crate::convert::Converter`].
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use unweb::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .request_timeout(Duration::from_secs(30))
///     .max_content_bytes(2 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.policy.max_content_bytes, 2 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Size, time, and host limits.
    pub policy: FetchPolicy,

    /// `User-Agent` header for remote fetches.
    pub user_agent: String,

    /// Tags the Markdown renderer drops along with their content.
    ///
    /// May be empty. Navigation, footers and sidebars are not listed here:
    /// they are kept inside a selected `<main>` or `<article>` and stripped
    /// by the extractor when it falls back to the whole body.
    pub skip_tags: Vec<String>,

    /// Optional observer for remote fetch progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            policy: FetchPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            skip_tags: DEFAULT_SKIP_TAGS.iter().map(|t| t.to_string()).collect(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("policy", &self.policy)
            .field("user_agent", &self.user_agent)
            .field("skip_tags", &self.skip_tags)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn FetchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn max_content_bytes(mut self, bytes: u64) -> Self {
        self.config.policy.max_content_bytes = bytes;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.policy.max_upload_bytes = bytes;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.policy.request_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, n: usize) -> Self {
        self.config.policy.max_redirects = n;
        self
    }

    pub fn blocked_host(mut self, predicate: HostPredicate) -> Self {
        self.config.policy.blocked_host = predicate;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn skip_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.skip_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, UnwebError> {
        let p = &self.config.policy;
        if p.max_content_bytes == 0 {
            return Err(UnwebError::InvalidConfig(
                "max_content_bytes must be ≥ 1".into(),
            ));
        }
        if p.max_upload_bytes == 0 {
            return Err(UnwebError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if p.request_timeout.is_zero() {
            return Err(UnwebError::InvalidConfig(
                "request_timeout must be non-zero".into(),
            ));
        }
        if p.allowed_schemes.is_empty() {
            return Err(UnwebError::InvalidConfig(
                "at least one URL scheme must be allowed".into(),
            ));
        }
        if self.config.user_agent.trim().is_empty() {
            return Err(UnwebError::InvalidConfig("user_agent must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_constants() {
        let c = ConversionConfig::default();
        assert_eq!(c.policy.max_content_bytes, 10 * 1024 * 1024);
        assert_eq!(c.policy.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(c.policy.request_timeout, Duration::from_secs(60));
        assert_eq!(c.policy.allowed_schemes, vec!["http", "https"]);
        assert_eq!(c.user_agent, DEFAULT_USER_AGENT);
        assert!(c.skip_tags.iter().any(|t| t == "script"));
        assert!(!c.skip_tags.iter().any(|t| t == "footer"));
    }

    #[test]
    fn builder_overrides() {
        let c = ConversionConfig::builder()
            .max_content_bytes(1024)
            .max_upload_bytes(512)
            .request_timeout(Duration::from_millis(250))
            .user_agent("test-agent/0.1")
            .skip_tags(["script"])
            .build()
            .unwrap();
        assert_eq!(c.policy.max_content_bytes, 1024);
        assert_eq!(c.policy.max_upload_bytes, 512);
        assert_eq!(c.policy.request_timeout, Duration::from_millis(250));
        assert_eq!(c.user_agent, "test-agent/0.1");
        assert_eq!(c.skip_tags, vec!["script".to_string()]);
    }

    #[test]
    fn builder_rejects_zero_limits() {
        assert!(ConversionConfig::builder().max_content_bytes(0).build().is_err());
        assert!(ConversionConfig::builder().max_upload_bytes(0).build().is_err());
        assert!(ConversionConfig::builder()
            .request_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn empty_skip_list_builds_and_converts() {
        let c = ConversionConfig::builder()
            .skip_tags(Vec::<String>::new())
            .build()
            .unwrap();
        assert!(c.skip_tags.is_empty());

        let converter = crate::convert::Converter::new(c).unwrap();
        let r = converter.convert_html("<main><p>kept</p></main>").unwrap();
        assert!(r.markdown.contains("kept"));
    }

    #[test]
    fn builder_rejects_empty_scheme_set() {
        let policy = FetchPolicy {
            allowed_schemes: vec![],
            ..FetchPolicy::default()
        };
        let err = ConversionConfig::builder().policy(policy).build().unwrap_err();
        assert!(matches!(err, UnwebError::InvalidConfig(_)));
    }

    #[test]
    fn custom_host_predicate() {
        let c = ConversionConfig::builder()
            .blocked_host(|_| false)
            .build()
            .unwrap();
        assert!(!(c.policy.blocked_host)(&Host::Domain("localhost")));
    }
}
