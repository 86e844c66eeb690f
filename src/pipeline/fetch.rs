//! Bounded Fetcher: a single guarded HTTP GET with hard limits.
//!
//! ## Limits
//!
//! - **Time**: the client carries the policy timeout, and the whole call
//!   (headers and body) is additionally wrapped in `tokio::time::timeout`, so
//!   a server that trickles bytes cannot hold a request open past the
//!   deadline. Bytes already read are dropped on timeout.
//! - **Size**: a declared `Content-Length` above the limit is refused before
//!   any body byte is read; the body is then streamed and the fetch aborts as
//!   soon as the running total crosses the limit, whatever the header said.
//! - **Type**: a `Content-Type` that is present and not `text/html` is refused.
//!   A missing header is accepted.
//! - **Redirects**: every hop is re-checked by the [`UrlGuard`], so a public
//!   URL cannot bounce the fetch into a private network.
//!
//! There is no retry. Each failure is reported once.

use crate::config::{ConversionConfig, FetchPolicy};
use crate::error::{FetchError, UrlError};
use crate::pipeline::decode::decode_html;
use crate::pipeline::guard::{UrlGuard, ValidatedUrl};
use crate::progress::ProgressCallback;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP GET client enforcing a [`FetchPolicy`].
///
/// Built once from an immutable configuration and cheap to clone; clones
/// share the connection pool.
#[derive(Clone)]
pub struct BoundedFetcher {
    client: reqwest::Client,
    policy: FetchPolicy,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for BoundedFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedFetcher")
            .field("policy", &self.policy)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl BoundedFetcher {
    pub fn new(config: &ConversionConfig) -> Result<Self, FetchError> {
        let guard = UrlGuard::new(config.policy.clone());
        let max_redirects = config.policy.max_redirects;

        let redirect = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                return attempt.error(format!("too many redirects (limit {max_redirects})"));
            }
            match guard.check_url(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(e) => {
                    warn!("Blocked redirect to {}: {}", attempt.url(), e);
                    attempt.error(e)
                }
            }
        });

        let client = reqwest::Client::builder()
            .timeout(config.policy.request_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(redirect)
            .build()
            .map_err(|e| FetchError::ClientBuild {
                detail: e.to_string(),
            })?;

        Ok(Self {
            client,
            policy: config.policy.clone(),
            progress: config.progress_callback.clone(),
        })
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// GET `url` and return its decoded text body.
    pub async fn fetch(&self, url: &ValidatedUrl) -> Result<String, FetchError> {
        let deadline = self.policy.request_timeout;
        match tokio::time::timeout(deadline, self.fetch_within_deadline(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Fetch of {} exceeded {:?}", url, deadline);
                Err(self.timeout_error())
            }
        }
    }

    async fn fetch_within_deadline(&self, url: &ValidatedUrl) -> Result<String, FetchError> {
        info!("Fetching {}", url);

        let response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        if let Some(ct) = content_type.as_deref() {
            if !is_html_content_type(ct) {
                return Err(FetchError::UnsupportedContentType {
                    content_type: ct.to_string(),
                });
            }
        }

        let limit = self.policy.max_content_bytes;
        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        if let Some(len) = declared {
            if len > limit {
                return Err(FetchError::TooLarge { bytes: len, limit });
            }
        }

        if let Some(cb) = &self.progress {
            cb.on_fetch_start(url.as_str(), declared);
        }

        let initial = declared.unwrap_or(0).min(limit);
        let mut body: Vec<u8> = Vec::with_capacity(usize::try_from(initial).unwrap_or(0));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            let total = body.len() as u64 + chunk.len() as u64;
            if total > limit {
                debug!("Body of {} crossed {} bytes, aborting", url, limit);
                return Err(FetchError::TooLarge {
                    bytes: total,
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
            if let Some(cb) = &self.progress {
                cb.on_chunk(total, declared);
            }
        }

        let total = body.len() as u64;
        if let Some(cb) = &self.progress {
            cb.on_fetch_complete(total);
        }
        info!("Fetched {} bytes from {}", total, url);

        Ok(decode_html(&body, content_type.as_deref()))
    }

    fn timeout_error(&self) -> FetchError {
        FetchError::Timeout {
            secs: whole_seconds(self.policy.request_timeout),
        }
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            return self.timeout_error();
        }
        if err.is_redirect() {
            if let Some(url_err) = find_url_error(&err) {
                return FetchError::RedirectBlocked(url_err.clone());
            }
        }
        FetchError::NetworkError {
            detail: error_chain(&err),
        }
    }
}

/// `d` in seconds, rounded up so sub-second deadlines never report 0.
fn whole_seconds(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// `true` when `content_type` is `text/html`, with or without parameters.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("text/html"))
}

fn find_url_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a UrlError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<UrlError>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}

/// `outer: inner: innermost`, skipping repeated messages.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let msg = e.to_string();
        if parts.last() != Some(&msg) {
            parts.push(msg);
        }
        current = e.source();
    }
    parts.join(": ")
}
