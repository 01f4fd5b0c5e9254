//! Provider traits — the contract between the engine and provider modules.
//!
//! The core never talks HTTP directly; it dispatches through these traits
//! so tests can swap in deterministic mock providers.

use async_trait::async_trait;

use crate::error::{FetchError, FolioResult};
use crate::types::{PortfolioData, TokenAttributes};

/// Token metadata lookup — one token on one network.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch and normalize metadata for `(network, address)`.
    ///
    /// Implementations classify every non-success outcome into a
    /// [`FetchError`] variant; the fetch gate decides caching and
    /// backoff from the class alone.
    async fn token_metadata(
        &self,
        network: &str,
        address: &str,
    ) -> Result<TokenAttributes, FetchError>;
}

/// Per-address portfolio lookup.
#[async_trait]
pub trait PortfolioProvider: Send + Sync {
    /// Fetch the full portfolio for a wallet address.
    async fn portfolio(&self, address: &str) -> FolioResult<PortfolioData>;
}
