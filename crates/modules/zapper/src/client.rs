//! Portfolio gateway client. The gateway proxies Zapper and returns the
//! camelCase portfolio shape defined in `folio-common`.

use std::time::Duration;

use async_trait::async_trait;
use folio_common::error::{FolioError, FolioResult};
use folio_common::traits::PortfolioProvider;
use folio_common::types::PortfolioData;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the hosted portfolio gateway.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> FolioResult<Self> {
        Url::parse(base_url)
            .map_err(|e| FolioError::Config(format!("Invalid gateway URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FolioError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check if the gateway is reachable.
    pub async fn health(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(r) => r.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl PortfolioProvider for GatewayClient {
    async fn portfolio(&self, address: &str) -> FolioResult<PortfolioData> {
        let url = format!("{}/api/portfolio/{}", self.base_url, address);
        debug!(%url, "requesting portfolio");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("Failed to reach gateway at {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FolioError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<PortfolioData>()
            .await
            .map_err(|e| FolioError::Network(format!("Malformed gateway response: {e}")))
    }
}
