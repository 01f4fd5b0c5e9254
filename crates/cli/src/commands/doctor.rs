use anyhow::Result;
use folio_core::config::AppConfig;
use folio_core::workspace;
use folio_mod_zapper::GatewayClient;
use folio_utils::output::{render, DoctorOutput, OutputFormat};

/// `folio doctor` — check config and gateway reachability.
pub async fn run(fmt: OutputFormat) -> Result<()> {
    let loaded = workspace::load_config();
    let config_ok = loaded.is_ok();
    let config = loaded.unwrap_or_else(|_| AppConfig::default());

    let gateway_ok = match GatewayClient::new(&config.endpoints.gateway_url) {
        Ok(client) => client.health().await,
        Err(_) => false,
    };

    let output = DoctorOutput {
        config_ok,
        gateway_url: config.endpoints.gateway_url,
        gateway_ok,
    };
    render(fmt, &output)
}
