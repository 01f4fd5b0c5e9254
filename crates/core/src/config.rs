//! Application configuration — `~/.folio/config.toml`.

use folio_common::constants::{GATEWAY_BASE_URL, GECKO_BASE_URL};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level config file shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub endpoints: EndpointsConfig,
    pub display: DisplayConfig,
}

/// Upstream base URLs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointsConfig {
    /// Portfolio gateway base URL.
    pub gateway_url: String,
    /// GeckoTerminal API base URL.
    pub gecko_url: String,
}

/// Presentation defaults for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Hide dust holdings by default.
    pub hide_dust: bool,
    /// USD threshold below which a consolidated holding is dust.
    pub dust_threshold: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig {
                gateway_url: GATEWAY_BASE_URL.to_string(),
                gecko_url: GECKO_BASE_URL.to_string(),
            },
            display: DisplayConfig {
                hide_dust: true,
                dust_threshold: Decimal::ONE,
            },
        }
    }
}

impl AppConfig {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = AppConfig::default();
        let raw = config.to_toml_string().unwrap();
        let back = AppConfig::from_toml_str(&raw).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.display.hide_dust);
        assert_eq!(config.display.dust_threshold, Decimal::ONE);
        assert!(config.endpoints.gecko_url.contains("geckoterminal"));
    }

    #[test]
    fn test_missing_field_is_an_error_not_a_panic() {
        // Schema drift is handled by the workspace loader regenerating
        // defaults; here it must surface as a plain Err.
        assert!(AppConfig::from_toml_str("[endpoints]\ngateway_url = \"x\"").is_err());
    }
}
