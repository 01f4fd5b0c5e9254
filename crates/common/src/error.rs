//! Universal error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0}")]
    Other(String),
}

pub type FolioResult<T> = Result<T, FolioError>;

/// Classified outcome of a metadata fetch that did not yield data.
///
/// The class decides how the fetch gate caches the miss: a `NotFound` or
/// `Rejected` is a stable answer worth the full success TTL, while an
/// `Upstream`/`Network` failure is negative-cached briefly and counted
/// toward the per-key blacklist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP 429 — trips the global circuit breaker.
    #[error("rate limited by upstream")]
    RateLimited,

    /// HTTP 404 — the token is not listed upstream.
    #[error("token not listed upstream")]
    NotFound,

    /// Any other 4xx — the request itself is bad; retrying won't help.
    #[error("request rejected by upstream (HTTP {status})")]
    Rejected { status: u16 },

    /// 5xx — upstream is unwell; worth retrying after backoff.
    #[error("upstream failure (HTTP {status})")]
    Upstream { status: u16 },

    /// Transport-level failure (DNS, timeout, connection reset).
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => FetchError::RateLimited,
            404 => FetchError::NotFound,
            400..=499 => FetchError::Rejected { status },
            _ => FetchError::Upstream { status },
        }
    }

    /// Whether the answer is stable enough to negative-cache for the
    /// full success TTL instead of the short failure TTL. Everything
    /// else counts toward the per-key blacklist.
    pub fn is_stable_miss(&self) -> bool {
        matches!(self, FetchError::NotFound | FetchError::Rejected { .. })
    }
}
