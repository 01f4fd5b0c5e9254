pub mod configure;
pub mod doctor;
pub mod portfolio;
pub mod token;

use std::sync::Arc;

use anyhow::Result;
use folio_core::config::AppConfig;
use folio_core::PortfolioService;
use folio_mod_gecko::GeckoClient;
use folio_mod_zapper::GatewayClient;

/// Build the portfolio service from the active config.
pub fn service(config: &AppConfig) -> Result<PortfolioService> {
    let gecko = GeckoClient::new(&config.endpoints.gecko_url)?;
    let gateway = GatewayClient::new(&config.endpoints.gateway_url)?;
    Ok(PortfolioService::new(Arc::new(gecko), Arc::new(gateway)))
}
