//! The one injectable service object a consumer constructs per process.
//!
//! Bundles the fetch gate and the aggregator so callers (CLI, tests,
//! embedding applications) hold a single handle with no hidden globals.

use std::sync::Arc;

use folio_common::traits::{MetadataProvider, PortfolioProvider};
use folio_common::types::{TokenAttributes, TokenDetail};

use crate::aggregator::{AddressSet, PortfolioAggregator, PortfolioBundle};
use crate::gate::FetchGate;
use crate::preload::{preload_token_logos, PreloadHandle};

/// Portfolio engine facade.
pub struct PortfolioService {
    gate: Arc<FetchGate>,
    aggregator: PortfolioAggregator,
}

impl PortfolioService {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        portfolios: Arc<dyn PortfolioProvider>,
    ) -> Self {
        Self {
            gate: Arc::new(FetchGate::new(metadata)),
            aggregator: PortfolioAggregator::new(portfolios),
        }
    }

    /// Run a fresh aggregation for the address set. Re-running with the
    /// same set is the `refetch` of the exposed interface — aggregation
    /// is always from scratch.
    pub async fn aggregate(&self, set: &AddressSet) -> PortfolioBundle {
        self.aggregator.aggregate(set).await
    }

    /// Gate-backed metadata lookup; `None` means suppressed or absent.
    pub async fn fetch_token_data(
        &self,
        network: &str,
        address: &str,
        fallback_image: Option<String>,
    ) -> Option<TokenAttributes> {
        self.gate.fetch(network, address, fallback_image).await
    }

    /// Evict and re-fetch one token, bypassing a fresh cache entry.
    pub async fn force_refresh_token_data(
        &self,
        network: &str,
        address: &str,
        fallback_image: Option<String>,
    ) -> Option<TokenAttributes> {
        self.gate.force_refresh(network, address, fallback_image).await
    }

    /// Kick off a background cache warm-up for the given tokens.
    pub fn preload_token_logos(&self, tokens: &[TokenDetail]) -> PreloadHandle {
        preload_token_logos(&self.gate, tokens)
    }
}
