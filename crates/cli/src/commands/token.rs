use anyhow::Result;
use folio_core::workspace;
use folio_utils::output::{render, OutputFormat, TokenOutput};

/// `folio token <network> <address> [--refresh]`
pub async fn run(network: &str, address: &str, refresh: bool, fmt: OutputFormat) -> Result<()> {
    let config = workspace::load_config()?;
    let service = super::service(&config)?;

    let attrs = if refresh {
        service.force_refresh_token_data(network, address, None).await
    } else {
        service.fetch_token_data(network, address, None).await
    };

    let output = match attrs {
        Some(a) => TokenOutput {
            network: network.to_string(),
            address: address.to_string(),
            name: a.name,
            symbol: a.symbol,
            price_usd: a.price_usd,
            market_cap_usd: a.market_cap_usd,
            price_change_h24: a.price_change_h24,
            image_url: a.image_url,
            found: true,
        },
        None => TokenOutput {
            network: network.to_string(),
            address: address.to_string(),
            name: String::new(),
            symbol: String::new(),
            price_usd: None,
            market_cap_usd: None,
            price_change_h24: None,
            image_url: None,
            found: false,
        },
    };
    render(fmt, &output)
}
