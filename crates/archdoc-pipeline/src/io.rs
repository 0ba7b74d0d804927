//! Source file reading
//!
//! Discovery files are produced by an external tool and may be mid-write
//! when a run starts; transient read failures get a few retries before
//! the level is marked failed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

const READ_ATTEMPTS: u32 = 3;
const READ_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Read failures after retries
#[derive(Debug, thiserror::Error)]
#[error("failed to read {path}: {source}")]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
    )
}

/// Read a source file, retrying transient failures
///
/// Missing files fail immediately; there is nothing to wait for.
///
/// # Errors
/// Returns a [`ReadError`] once attempts are exhausted or on a
/// non-transient failure.
pub fn read_source(path: &Path) -> Result<String, ReadError> {
    let mut attempt = 1;
    loop {
        match fs::read_to_string(path) {
            Ok(text) => return Ok(text),
            Err(err) if is_transient(err.kind()) && attempt < READ_ATTEMPTS => {
                warn!(path = %path.display(), attempt, error = %err, "transient read failure");
                std::thread::sleep(READ_RETRY_DELAY);
                attempt += 1;
            }
            Err(source) => {
                return Err(ReadError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}
