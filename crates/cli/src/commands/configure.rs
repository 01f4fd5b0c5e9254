use anyhow::Result;
use folio_core::workspace;
use folio_utils::output::{render_json_or, ConfigOutput, OutputFormat, TableDisplay};
use rust_decimal::Decimal;

/// `folio configure show` — display current config.
pub fn run(fmt: OutputFormat) -> Result<()> {
    let config = workspace::load_config()?;

    let output = ConfigOutput {
        gateway_url: config.endpoints.gateway_url.clone(),
        gecko_url: config.endpoints.gecko_url.clone(),
        hide_dust: config.display.hide_dust,
        dust_threshold: config.display.dust_threshold,
    };

    if !render_json_or(fmt, &output)? {
        output.print_table();
        println!();
        println!("Tip: edit settings with `folio configure gateway|gecko|hide-dust|threshold`.");
    }

    Ok(())
}

/// `folio configure gateway <url>`
pub fn set_gateway(url: &str) -> Result<()> {
    folio_mod_zapper::GatewayClient::new(url)?;
    let mut config = workspace::load_config()?;
    config.endpoints.gateway_url = url.trim_end_matches('/').to_string();
    workspace::save_config(&config)?;
    println!("✓ Gateway URL set to {}", config.endpoints.gateway_url);
    Ok(())
}

/// `folio configure gecko <url>`
pub fn set_gecko(url: &str) -> Result<()> {
    folio_mod_gecko::GeckoClient::new(url)?;
    let mut config = workspace::load_config()?;
    config.endpoints.gecko_url = url.trim_end_matches('/').to_string();
    workspace::save_config(&config)?;
    println!("✓ Gecko URL set to {}", config.endpoints.gecko_url);
    Ok(())
}

/// `folio configure hide-dust <true|false>`
pub fn set_hide_dust(enabled: bool) -> Result<()> {
    let mut config = workspace::load_config()?;
    config.display.hide_dust = enabled;
    workspace::save_config(&config)?;
    println!("✓ hide_dust = {enabled}");
    Ok(())
}

/// `folio configure threshold <usd>`
pub fn set_threshold(value: Decimal) -> Result<()> {
    let mut config = workspace::load_config()?;
    config.display.dust_threshold = value;
    workspace::save_config(&config)?;
    println!("✓ Dust threshold set to ${value}");
    Ok(())
}
