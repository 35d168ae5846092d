//! Local cache error types.

use thiserror::Error;

/// Errors that can occur against the local key-value cache.
///
/// All cache failures are recoverable: the cache only stores convenience
/// copies (timer settings, the daily ticket-progress snapshot), so callers
/// log and continue with defaults.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A cached entry could not be encoded or decoded.
    #[error("cache entry format invalid: {0}")]
    Format(#[from] serde_json::Error),

    /// No cache directory could be determined for this platform.
    #[error("no cache directory available")]
    NoCacheDir,
}
