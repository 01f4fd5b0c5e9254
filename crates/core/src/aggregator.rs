//! Multi-address portfolio aggregation.
//!
//! Merges the primary wallet, the Farcaster custody address and any
//! verified addresses into one tagged view. Individual fetch failures are
//! logged and contribute nothing; the aggregation always completes for
//! the rest.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use folio_common::traits::PortfolioProvider;
use folio_common::types::{AggregatedPortfolio, PortfolioData, TokenDetail, TokenSource};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// The address classes feeding one aggregation.
#[derive(Debug, Clone, Default)]
pub struct AddressSet {
    /// Primary wallet address.
    pub primary: Option<String>,
    /// Farcaster custody address.
    pub custody: Option<String>,
    /// Farcaster-verified addresses (may contain non-EVM entries and
    /// duplicates; both are filtered out before fetching).
    pub verified: Vec<String>,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct PortfolioBundle {
    /// The primary wallet's portfolio, untagged, as fetched.
    pub portfolio: Option<PortfolioData>,
    /// The custody address's portfolio, untagged, as fetched.
    pub farcaster_portfolio: Option<PortfolioData>,
    /// Verified portfolios keyed by address. Zero-net-worth portfolios
    /// are excluded from this map entirely (they still count toward the
    /// aggregate totals — as zero).
    pub farcaster_verified_portfolios: HashMap<String, PortfolioData>,
    /// The merged, source-tagged view.
    pub aggregated: AggregatedPortfolio,
}

/// Aggregator over an injected per-address portfolio provider.
pub struct PortfolioAggregator {
    provider: Arc<dyn PortfolioProvider>,
}

/// Tag a portfolio's holdings with their provenance, on copies — the
/// fetched portfolio itself stays untouched.
fn tagged(details: &[TokenDetail], source: TokenSource, address: &str) -> Vec<TokenDetail> {
    details
        .iter()
        .map(|d| {
            let mut copy = d.clone();
            copy.source = Some(source);
            copy.source_address = Some(address.to_string());
            copy
        })
        .collect()
}

impl PortfolioAggregator {
    pub fn new(provider: Arc<dyn PortfolioProvider>) -> Self {
        Self { provider }
    }

    /// Verified addresses, filtered to EVM (`0x`-prefixed) entries and
    /// case-insensitively deduplicated against the primary address, the
    /// custody address and each other.
    fn plan_verified(&self, set: &AddressSet) -> Vec<String> {
        let mut seen: HashSet<String> = set
            .primary
            .iter()
            .chain(set.custody.iter())
            .map(|a| a.to_lowercase())
            .collect();

        set.verified
            .iter()
            .filter(|a| a.to_lowercase().starts_with("0x"))
            .filter(|a| seen.insert(a.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Fetch one address, swallowing failures into `None`.
    async fn fetch_one(&self, address: &str) -> Option<PortfolioData> {
        match self.provider.portfolio(address).await {
            Ok(p) => Some(p),
            Err(err) => {
                warn!(address, %err, "portfolio fetch failed, contributing zero");
                None
            }
        }
    }

    /// Run a full aggregation from scratch for the given address set.
    pub async fn aggregate(&self, set: &AddressSet) -> PortfolioBundle {
        let verified_addrs = self.plan_verified(set);

        let primary_fut = async {
            match &set.primary {
                Some(a) => self.fetch_one(a).await,
                None => None,
            }
        };
        let custody_fut = async {
            match &set.custody {
                Some(a) => self.fetch_one(a).await,
                None => None,
            }
        };
        let verified_fut = join_all(verified_addrs.iter().map(|a| self.fetch_one(a)));

        let (portfolio, farcaster_portfolio, verified_results) =
            tokio::join!(primary_fut, custody_fut, verified_fut);

        let mut aggregated = AggregatedPortfolio::default();

        if let (Some(addr), Some(p)) = (&set.primary, &portfolio) {
            Self::accumulate(&mut aggregated, p);
            aggregated
                .tokens
                .extend(tagged(&p.tokens, TokenSource::Ethereum, addr));
            aggregated
                .nfts
                .extend(tagged(&p.nfts, TokenSource::Ethereum, addr));
        }

        if let (Some(addr), Some(p)) = (&set.custody, &farcaster_portfolio) {
            Self::accumulate(&mut aggregated, p);
            aggregated
                .tokens
                .extend(tagged(&p.tokens, TokenSource::Farcaster, addr));
            aggregated
                .nfts
                .extend(tagged(&p.nfts, TokenSource::Farcaster, addr));
        }

        let mut farcaster_verified_portfolios = HashMap::new();
        for (addr, fetched) in verified_addrs.iter().zip(verified_results) {
            let Some(p) = fetched else { continue };
            // Totals include every fetched portfolio, zero or not.
            Self::accumulate(&mut aggregated, &p);
            if p.total_net_worth <= Decimal::ZERO {
                continue;
            }
            aggregated
                .tokens
                .extend(tagged(&p.tokens, TokenSource::Verified, addr));
            aggregated
                .nfts
                .extend(tagged(&p.nfts, TokenSource::Verified, addr));
            farcaster_verified_portfolios.insert(addr.clone(), p);
        }

        info!(
            addresses = usize::from(set.primary.is_some())
                + usize::from(set.custody.is_some())
                + verified_addrs.len(),
            tokens = aggregated.tokens.len(),
            net_worth = %aggregated.total_net_worth,
            "portfolio aggregation complete"
        );

        PortfolioBundle {
            portfolio,
            farcaster_portfolio,
            farcaster_verified_portfolios,
            aggregated,
        }
    }

    fn accumulate(agg: &mut AggregatedPortfolio, p: &PortfolioData) {
        agg.total_net_worth += p.total_net_worth;
        agg.total_balance_usd_tokens += p.total_balance_usd_tokens;
        agg.total_balance_usd_app += p.total_balance_usd_app;
        agg.nft_usd_net_worth += p.nft_usd_net_worth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_common::error::{FolioError, FolioResult};
    use folio_common::types::Token;
    use std::sync::Mutex;

    fn detail(network: &str, symbol: &str, balance_usd: i64) -> TokenDetail {
        TokenDetail {
            network: network.into(),
            token: Token {
                address: format!("0x{}", symbol.to_lowercase()),
                symbol: symbol.into(),
                name: symbol.into(),
                decimals: 18,
                balance: Decimal::ONE,
                balance_usd: Decimal::from(balance_usd),
                price: Decimal::from(balance_usd),
                market_cap: None,
            },
            source: None,
            source_address: None,
        }
    }

    fn portfolio(net_worth: i64, tokens: Vec<TokenDetail>) -> PortfolioData {
        PortfolioData {
            total_net_worth: Decimal::from(net_worth),
            total_balance_usd_tokens: Decimal::from(net_worth),
            total_balance_usd_app: Decimal::ZERO,
            nft_usd_net_worth: Decimal::ZERO,
            tokens,
            nfts: vec![],
        }
    }

    /// Provider backed by a fixed address → portfolio map; unknown
    /// addresses fail like a gateway 502 would.
    struct MapProvider {
        portfolios: HashMap<String, PortfolioData>,
        requests: Mutex<Vec<String>>,
    }

    impl MapProvider {
        fn new(entries: Vec<(&str, PortfolioData)>) -> Arc<Self> {
            Arc::new(Self {
                portfolios: entries
                    .into_iter()
                    .map(|(a, p)| (a.to_lowercase(), p))
                    .collect(),
                requests: Mutex::new(vec![]),
            })
        }

        fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PortfolioProvider for MapProvider {
        async fn portfolio(&self, address: &str) -> FolioResult<PortfolioData> {
            self.requests.lock().unwrap().push(address.to_string());
            self.portfolios
                .get(&address.to_lowercase())
                .cloned()
                .ok_or(FolioError::Gateway {
                    status: 502,
                    message: "upstream unavailable".into(),
                })
        }
    }

    #[tokio::test]
    async fn test_zero_net_worth_verified_portfolio_is_dropped_from_map() {
        let provider = MapProvider::new(vec![
            ("0xaaa", portfolio(100, vec![detail("base", "ETH", 100)])),
            ("0xbbb", portfolio(0, vec![])),
        ]);
        let agg = PortfolioAggregator::new(provider);

        let bundle = agg
            .aggregate(&AddressSet {
                primary: Some("0xAAA".into()),
                custody: None,
                verified: vec!["0xBBB".into()],
            })
            .await;

        assert_eq!(bundle.aggregated.total_net_worth, Decimal::from(100));
        assert!(bundle.farcaster_verified_portfolios.is_empty());
        assert!(bundle.portfolio.is_some());
    }

    #[tokio::test]
    async fn test_sources_tagged_and_totals_summed() {
        let provider = MapProvider::new(vec![
            ("0xaaa", portfolio(200, vec![detail("ethereum", "ETH", 200)])),
            ("0xbbb", portfolio(50, vec![detail("base", "ETH", 50)])),
        ]);
        let agg = PortfolioAggregator::new(provider);

        let bundle = agg
            .aggregate(&AddressSet {
                primary: Some("0xAAA".into()),
                custody: None,
                verified: vec!["0xBBB".into()],
            })
            .await;

        assert_eq!(bundle.aggregated.total_net_worth, Decimal::from(250));
        assert_eq!(bundle.aggregated.tokens.len(), 2);

        let sources: Vec<_> = bundle
            .aggregated
            .tokens
            .iter()
            .map(|t| t.source.unwrap())
            .collect();
        assert!(sources.contains(&TokenSource::Ethereum));
        assert!(sources.contains(&TokenSource::Verified));

        let verified_entry = bundle
            .aggregated
            .tokens
            .iter()
            .find(|t| t.source == Some(TokenSource::Verified))
            .unwrap();
        assert_eq!(verified_entry.source_address.as_deref(), Some("0xBBB"));
    }

    #[tokio::test]
    async fn test_fetched_portfolios_stay_untagged() {
        let provider = MapProvider::new(vec![(
            "0xaaa",
            portfolio(100, vec![detail("base", "ETH", 100)]),
        )]);
        let agg = PortfolioAggregator::new(provider);

        let bundle = agg
            .aggregate(&AddressSet {
                primary: Some("0xaaa".into()),
                ..Default::default()
            })
            .await;

        // Tagging happens on merge copies only.
        assert!(bundle.portfolio.unwrap().tokens[0].source.is_none());
        assert_eq!(
            bundle.aggregated.tokens[0].source,
            Some(TokenSource::Ethereum)
        );
    }

    #[tokio::test]
    async fn test_verified_filtering_and_dedupe() {
        let provider = MapProvider::new(vec![
            ("0xaaa", portfolio(10, vec![])),
            ("0xccc", portfolio(20, vec![detail("base", "USDC", 20)])),
        ]);
        let agg = PortfolioAggregator::new(provider.clone());

        let bundle = agg
            .aggregate(&AddressSet {
                primary: Some("0xAAA".into()),
                custody: None,
                verified: vec![
                    "0xAaA".into(),                   // dup of primary (case-insensitive)
                    "bc1qw508d6qejxtdg4y5r3zar".into(), // non-EVM, filtered
                    "0xCCC".into(),
                    "0xccc".into(), // dup of the entry above
                ],
            })
            .await;

        let mut requested = provider.requested();
        requested.sort();
        assert_eq!(requested, vec!["0xAAA".to_string(), "0xCCC".to_string()]);
        assert_eq!(bundle.aggregated.total_net_worth, Decimal::from(30));
        assert_eq!(bundle.farcaster_verified_portfolios.len(), 1);
    }

    #[tokio::test]
    async fn test_one_failed_fetch_does_not_sink_the_rest() {
        let provider = MapProvider::new(vec![(
            "0xaaa",
            portfolio(100, vec![detail("base", "ETH", 100)]),
        )]);
        let agg = PortfolioAggregator::new(provider);

        let bundle = agg
            .aggregate(&AddressSet {
                primary: Some("0xaaa".into()),
                custody: Some("0xdead".into()), // provider fails this one
                verified: vec![],
            })
            .await;

        assert!(bundle.farcaster_portfolio.is_none());
        assert_eq!(bundle.aggregated.total_net_worth, Decimal::from(100));
        assert_eq!(bundle.aggregated.tokens.len(), 1);
    }
}
