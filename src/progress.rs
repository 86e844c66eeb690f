//! Progress-callback trait for remote fetch events.
//!
//! Inject an [`Arc<dyn FetchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to observe a
//! URL conversion while the body streams in. The CLI uses it to drive a
//! byte-count progress bar; a server could forward the same events to a
//! WebSocket. Paste and upload conversions never call it.
//!
//! # Example
//!
//! ```rust
//! use unweb::{ConversionConfig, FetchProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
//!
//! struct ByteCounter {
//!     seen: AtomicU64,
//! }
//!
//! impl FetchProgressCallback for ByteCounter {
//!     fn on_chunk(&self, bytes_so_far: u64, _declared: Option<u64>) {
//!         self.seen.store(bytes_so_far, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(ByteCounter { seen: AtomicU64::new(0) });
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn FetchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the Bounded Fetcher as a remote body is read.
///
/// Implementations must be `Send + Sync`: one converter may serve many
/// requests concurrently. All methods default to no-ops.
pub trait FetchProgressCallback: Send + Sync {
    /// Called once the response headers passed status and type checks.
    ///
    /// `declared_len` is the `Content-Length`, when the server sent one.
    fn on_fetch_start(&self, url: &str, declared_len: Option<u64>) {
        let _ = (url, declared_len);
    }

    /// Called after every body chunk with the running byte total.
    fn on_chunk(&self, bytes_so_far: u64, declared_len: Option<u64>) {
        let _ = (bytes_so_far, declared_len);
    }

    /// Called once the full body has been read within limits.
    fn on_fetch_complete(&self, total_bytes: u64) {
        let _ = total_bytes;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl FetchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn FetchProgressCallback>;
