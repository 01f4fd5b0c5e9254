//! Universal types shared across the engine and provider modules.
//!
//! Wire shapes follow the portfolio gateway's camelCase JSON; everything
//! downstream (consolidation, CLI, JSON output) consumes only these.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Provenance of a holding after aggregation — set once at merge time,
/// never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// The primary wallet address.
    Ethereum,
    /// The Farcaster custody address.
    Farcaster,
    /// One of the Farcaster-verified addresses.
    Verified,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Ethereum => write!(f, "ethereum"),
            TokenSource::Farcaster => write!(f, "farcaster"),
            TokenSource::Verified => write!(f, "verified"),
        }
    }
}

/// A single token balance as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub balance: Decimal,
    #[serde(rename = "balanceUSD")]
    pub balance_usd: Decimal,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,
}

/// A token balance bound to the network it lives on.
/// Uniqueness key is `(network, token.address)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetail {
    pub network: String,
    pub token: Token,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TokenSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
}

/// Cross-chain view of one symbol — derived, recomputed per aggregation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedToken {
    pub symbol: String,
    pub chains: Vec<TokenDetail>,
    /// The chain entry holding the largest USD balance.
    pub primary_chain: TokenDetail,
    #[serde(rename = "totalBalanceUSD")]
    pub total_balance_usd: Decimal,
}

/// A single address's portfolio as returned by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioData {
    pub total_net_worth: Decimal,
    pub total_balance_usd_tokens: Decimal,
    #[serde(rename = "totalBalanceUSDApp")]
    pub total_balance_usd_app: Decimal,
    pub nft_usd_net_worth: Decimal,
    #[serde(default)]
    pub tokens: Vec<TokenDetail>,
    #[serde(default)]
    pub nfts: Vec<TokenDetail>,
}

/// The merged view across primary, custody and verified portfolios.
/// Totals are summed across every fetched portfolio; token and NFT
/// entries carry their provenance tags.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPortfolio {
    pub total_net_worth: Decimal,
    pub total_balance_usd_tokens: Decimal,
    #[serde(rename = "totalBalanceUSDApp")]
    pub total_balance_usd_app: Decimal,
    pub nft_usd_net_worth: Decimal,
    pub tokens: Vec<TokenDetail>,
    pub nfts: Vec<TokenDetail>,
}

/// Normalized token metadata from the metadata provider.
///
/// `image_url` is `None` when the upstream has no real logo (including
/// its `missing.png` placeholder) — the fetch gate substitutes the
/// caller's fallback in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAttributes {
    pub address: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price_usd: Option<Decimal>,
    #[serde(default)]
    pub market_cap_usd: Option<Decimal>,
    #[serde(default)]
    pub price_change_h24: Option<Decimal>,
}
