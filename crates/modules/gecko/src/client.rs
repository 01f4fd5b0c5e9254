//! GeckoTerminal REST client implementing the metadata provider seam.
//!
//! One endpoint is used: `GET /networks/{network}/tokens/{address}` with
//! `include=top_pools`, which carries price, supply and logo data plus
//! the pools needed for the 24h price change and the market-cap
//! fallback chain.

use std::time::Duration;

use async_trait::async_trait;
use folio_common::error::{FetchError, FolioError, FolioResult};
use folio_common::traits::MetadataProvider;
use folio_common::types::TokenAttributes;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Map a gateway network slug to the id GeckoTerminal expects.
/// Unknown slugs pass through unchanged.
pub fn gecko_network(network: &str) -> &str {
    match network {
        "ethereum" => "eth",
        "polygon" => "polygon_pos",
        "avalanche" => "avax",
        "binance-smart-chain" | "bsc" => "bsc",
        "gnosis" => "xdai",
        "fantom" => "ftm",
        other => other,
    }
}

/// GeckoTerminal API client.
pub struct GeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeckoClient {
    pub fn new(base_url: &str) -> FolioResult<Self> {
        Url::parse(base_url)
            .map_err(|e| FolioError::Config(format!("Invalid GeckoTerminal URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FolioError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MetadataProvider for GeckoClient {
    async fn token_metadata(
        &self,
        network: &str,
        address: &str,
    ) -> Result<TokenAttributes, FetchError> {
        let url = format!(
            "{}/networks/{}/tokens/{}",
            self.base_url,
            gecko_network(network),
            address
        );
        debug!(%url, "requesting token metadata");

        let response = self
            .http
            .get(&url)
            .query(&[("include", "top_pools")])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(format!("malformed response: {e}")))?;

        Ok(normalize(body))
    }
}

// Wire shapes. Numeric fields arrive as JSON strings (or null); they
// are kept as strings and parsed leniently during normalization.

#[derive(Debug, Deserialize)]
struct TokenResponse {
    data: TokenData,
    #[serde(default)]
    included: Vec<IncludedResource>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    attributes: RawTokenAttributes,
}

#[derive(Debug, Deserialize)]
struct RawTokenAttributes {
    address: String,
    name: String,
    symbol: String,
    #[serde(default)]
    decimals: Option<u32>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    market_cap_usd: Option<String>,
    #[serde(default)]
    total_supply: Option<String>,
    #[serde(default)]
    normalized_total_supply: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncludedResource {
    #[serde(rename = "type")]
    kind: String,
    attributes: PoolAttributes,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
    #[serde(default)]
    market_cap_usd: Option<String>,
    #[serde(default)]
    price_change_percentage: Option<PriceChange>,
}

#[derive(Debug, Deserialize)]
struct PriceChange {
    #[serde(default)]
    h24: Option<String>,
}

fn parse_decimal(raw: &Option<String>) -> Option<Decimal> {
    raw.as_deref().and_then(|s| s.parse().ok())
}

/// Total supply in whole tokens. Prefers the upstream's pre-normalized
/// figure; otherwise shifts the raw supply down by `decimals`.
fn adjusted_supply(attrs: &RawTokenAttributes) -> Option<Decimal> {
    if let Some(supply) = parse_decimal(&attrs.normalized_total_supply) {
        return Some(supply);
    }
    let raw = parse_decimal(&attrs.total_supply)?;
    let decimals = attrs.decimals?;
    let divisor = 10u128
        .checked_pow(decimals)
        .and_then(|p| Decimal::try_from(i128::try_from(p).ok()?).ok())?;
    raw.checked_div(divisor)
}

fn normalize(body: TokenResponse) -> TokenAttributes {
    let attrs = body.data.attributes;
    let price_usd = parse_decimal(&attrs.price_usd);

    let pools: Vec<&PoolAttributes> = body
        .included
        .iter()
        .filter(|r| r.kind == "pool")
        .map(|r| &r.attributes)
        .collect();

    // Market cap chain: token attribute, then the first pool that
    // reports one, then price times adjusted supply.
    let market_cap_usd = parse_decimal(&attrs.market_cap_usd)
        .or_else(|| {
            pools
                .iter()
                .find_map(|p| parse_decimal(&p.market_cap_usd))
        })
        .or_else(|| {
            let supply = adjusted_supply(&attrs)?;
            price_usd?.checked_mul(supply)
        });

    let price_change_h24 = pools.iter().find_map(|p| {
        p.price_change_percentage
            .as_ref()
            .and_then(|c| parse_decimal(&c.h24))
    });

    // The upstream serves a "missing.png" placeholder for tokens with
    // no real logo; treat it as absent so callers can substitute.
    let image_url = attrs
        .image_url
        .filter(|u| !u.ends_with("missing.png"));

    TokenAttributes {
        address: attrs.address,
        name: attrs.name,
        symbol: attrs.symbol,
        decimals: attrs.decimals,
        image_url,
        price_usd,
        market_cap_usd,
        price_change_h24,
    }
}
