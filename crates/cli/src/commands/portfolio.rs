use anyhow::Result;
use folio_core::aggregator::AddressSet;
use folio_core::consolidate::{
    consolidate_tokens_by_symbol, filter_consolidated_by_balance, sort_consolidated_by_balance,
};
use folio_core::workspace;
use folio_utils::output::{render, HoldingRow, OutputFormat, PortfolioOutput};
use rust_decimal::Decimal;

/// `folio portfolio <address> [--custody A] [--verified A]...`
#[allow(clippy::too_many_arguments)]
pub async fn run(
    address: &str,
    custody: Option<String>,
    verified: Vec<String>,
    hide_dust: bool,
    show_dust: bool,
    threshold: Option<Decimal>,
    enrich: usize,
    fmt: OutputFormat,
) -> Result<()> {
    let config = workspace::load_config()?;
    let service = super::service(&config)?;

    let set = AddressSet {
        primary: Some(address.to_string()),
        custody,
        verified,
    };
    let addresses =
        usize::from(set.primary.is_some()) + usize::from(set.custody.is_some()) + set.verified.len();

    let bundle = service.aggregate(&set).await;

    let consolidated =
        sort_consolidated_by_balance(consolidate_tokens_by_symbol(&bundle.aggregated.tokens));
    let total_groups = consolidated.len();

    let hide = if hide_dust {
        true
    } else if show_dust {
        false
    } else {
        config.display.hide_dust
    };
    let threshold = threshold.unwrap_or(config.display.dust_threshold);
    let visible = filter_consolidated_by_balance(consolidated, hide, threshold);
    let hidden = total_groups - visible.len();

    let mut holdings: Vec<HoldingRow> = visible
        .iter()
        .map(|c| HoldingRow {
            symbol: c.symbol.clone(),
            networks: c.chains.len(),
            primary_network: c.primary_chain.network.clone(),
            balance_usd: c.total_balance_usd,
            price_usd: Some(c.primary_chain.token.price),
            price_change_h24: None,
        })
        .collect();

    // Live metadata for the largest holdings; the fetch gate paces and
    // caps the upstream requests.
    for (row, group) in holdings.iter_mut().zip(visible.iter()).take(enrich) {
        let attrs = service
            .fetch_token_data(
                &group.primary_chain.network,
                &group.primary_chain.token.address,
                None,
            )
            .await;
        if let Some(attrs) = attrs {
            if attrs.price_usd.is_some() {
                row.price_usd = attrs.price_usd;
            }
            row.price_change_h24 = attrs.price_change_h24;
        }
    }

    let output = PortfolioOutput {
        addresses,
        total_net_worth: bundle.aggregated.total_net_worth,
        total_balance_usd_tokens: bundle.aggregated.total_balance_usd_tokens,
        total_balance_usd_app: bundle.aggregated.total_balance_usd_app,
        nft_usd_net_worth: bundle.aggregated.nft_usd_net_worth,
        holdings,
        hidden,
    };
    render(fmt, &output)
}
