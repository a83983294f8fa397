//! Error types for address lookups and registry maintenance.

use std::path::PathBuf;

/// Errors that can occur while normalizing, resolving, or refreshing.
///
/// An unregistered prefix is *not* an error: resolvers return `Ok(None)`
/// (or [`crate::Lookup::NotFound`]) for that case.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The input is not a usable MAC address (wrong length or non-hex).
    #[error("invalid MAC address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    /// The remote registry could not be reached or answered badly.
    #[error("network error: {0}")]
    Network(String),

    /// The local registry file could not be read or written.
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// There is no local registry and it cannot be downloaded.
    #[error("no OUI registry at {} and no network access to download it", .path.display())]
    Unavailable { path: PathBuf },
}

impl LookupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LookupError>;
