//! Document store abstraction
//!
//! The pipeline writes pages through [`DocumentStore`] and reads back
//! previous pages for the manual-section merge. [`put_with_retry`]
//! retries connection failures with exponential backoff; auth failures
//! and rejections are never retried.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tracing::warn;

/// Store failures, split by retry behavior
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Transient transport failure; retried with backoff
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Credential failure; fails the write immediately
    #[error("store authentication failed: {0}")]
    Auth(String),

    /// The store refused the content
    #[error("store rejected the page: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Whether another attempt can succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Destination for rendered pages
pub trait DocumentStore: Send + Sync {
    /// Write one page at `path`, replacing any existing content
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the write fails.
    fn put(&self, path: &str, markdown: &str) -> Result<(), StoreError>;

    /// Read the page at `path`, `None` when absent
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the read fails.
    fn get(&self, path: &str) -> Result<Option<String>, StoreError>;
}

/// Retry behavior for store writes
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

/// Write with retries on connection failures only
///
/// # Errors
/// Returns the last error once attempts are exhausted, or immediately
/// for non-retryable failures.
pub fn put_with_retry(
    store: &dyn DocumentStore,
    policy: RetryPolicy,
    path: &str,
    markdown: &str,
) -> Result<(), StoreError> {
    let mut delay = policy.base_delay;
    let mut attempt = 1;
    loop {
        match store.put(path, markdown) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                warn!(path, attempt, error = %err, "store write failed, retrying");
                std::thread::sleep(delay);
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Filesystem-backed store, pages under a root directory
#[derive(Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Store rooted at `root`; created on first write
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl DocumentStore for FsDocumentStore {
    fn put(&self, path: &str, markdown: &str) -> Result<(), StoreError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| StoreError::Connection(err.to_string()))?;
        }
        fs::write(&full, markdown).map_err(|err| StoreError::Connection(err.to_string()))
    }

    fn get(&self, path: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.resolve(path)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Connection(err.to_string())),
        }
    }
}

/// In-memory store, used in tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<BTreeMap<String, String>>,
    puts: Mutex<u64>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far
    #[must_use]
    pub fn put_count(&self) -> u64 {
        self.puts.lock().map(|n| *n).unwrap_or(0)
    }

    /// All stored paths, sorted
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.pages
            .lock()
            .map(|pages| pages.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryStore {
    fn put(&self, path: &str, markdown: &str) -> Result<(), StoreError> {
        let mut pages = self
            .pages
            .lock()
            .map_err(|_| StoreError::Connection("store mutex poisoned".to_string()))?;
        pages.insert(path.to_string(), markdown.to_string());
        if let Ok(mut puts) = self.puts.lock() {
            *puts += 1;
        }
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<String>, StoreError> {
        let pages = self
            .pages
            .lock()
            .map_err(|_| StoreError::Connection("store mutex poisoned".to_string()))?;
        Ok(pages.get(path).cloned())
    }
}
