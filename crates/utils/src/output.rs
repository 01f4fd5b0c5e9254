//! Unified output rendering: JSON or human-readable table.
//!
//! Usage:
//! ```ignore
//! use folio_utils::output::{OutputFormat, render};
//!
//! let data = PortfolioOutput { ... };
//! render(format, &data)?;
//! ```

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::format::{format_usd, short_addr};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default).
    Table,
    /// Compact JSON (for piping to jq, scripts).
    Json,
    /// Pretty-printed JSON (for reading).
    JsonPretty,
}

/// Trait for types that can render as a human-readable table.
///
/// Implement this on each structured output type to define
/// how it looks in table mode.
pub trait TableDisplay {
    fn print_table(&self);
}

/// Render structured output — JSON or table depending on format.
///
/// For JSON formats, uses `serde_json` serialization.
/// For table format, calls `TableDisplay::print_table()`.
pub fn render<T: Serialize + TableDisplay>(format: OutputFormat, data: &T) -> Result<()> {
    match format {
        OutputFormat::Table => {
            data.print_table();
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(data)?;
            println!("{json}");
            Ok(())
        }
        OutputFormat::JsonPretty => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Render just the JSON formats (for types that handle their own table display).
/// Returns true if JSON was rendered, false if table mode was requested.
pub fn render_json_or<T: Serialize>(format: OutputFormat, data: &T) -> Result<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            let json = serde_json::to_string(data)?;
            println!("{json}");
            Ok(true)
        }
        OutputFormat::JsonPretty => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
            Ok(true)
        }
    }
}

// ─── Structured output types ────────────────────────────────────────

/// One consolidated holding row.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRow {
    pub symbol: String,
    /// How many chain entries were merged into this row.
    pub networks: usize,
    /// Network of the chain entry with the largest USD balance.
    pub primary_network: String,
    pub balance_usd: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_h24: Option<Decimal>,
}

/// Aggregated portfolio view for the `portfolio` command.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioOutput {
    pub addresses: usize,
    pub total_net_worth: Decimal,
    pub total_balance_usd_tokens: Decimal,
    pub total_balance_usd_app: Decimal,
    pub nft_usd_net_worth: Decimal,
    pub holdings: Vec<HoldingRow>,
    /// Holdings hidden by the dust filter.
    pub hidden: usize,
}

/// Single-token metadata view for the `token` command.
#[derive(Debug, Clone, Serialize)]
pub struct TokenOutput {
    pub network: String,
    pub address: String,
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_usd: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_h24: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// False when the lookup was suppressed or the token is unlisted.
    pub found: bool,
}

/// Current configuration for the `configure` command.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub gateway_url: String,
    pub gecko_url: String,
    pub hide_dust: bool,
    pub dust_threshold: Decimal,
}

/// Health check results for the `doctor` command.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorOutput {
    pub config_ok: bool,
    pub gateway_url: String,
    pub gateway_ok: bool,
}

// ─── TableDisplay implementations ───────────────────────────────────

fn pct(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "—".to_string(),
    }
}

impl TableDisplay for PortfolioOutput {
    fn print_table(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  PORTFOLIO SUMMARY                                       ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Addresses   : {:<41}║", self.addresses);
        println!("║  Net Worth   : {:<41}║", format_usd(self.total_net_worth));
        println!("║  Tokens      : {:<41}║", format_usd(self.total_balance_usd_tokens));
        println!("║  Apps        : {:<41}║", format_usd(self.total_balance_usd_app));
        println!("║  NFTs        : {:<41}║", format_usd(self.nft_usd_net_worth));
        println!("╠══════════════════════════════════════════════════════════╣");

        if self.holdings.is_empty() {
            println!("║  No holdings.                                            ║");
        } else {
            println!("║  {:<8} │ {:>4} │ {:<12} │ {:>12} │ {:>8} ║", "Symbol", "Nets", "Primary", "Value", "24h");
            println!("║  ────────┼──────┼──────────────┼──────────────┼──────────║");
            for h in &self.holdings {
                println!(
                    "║  {:<8} │ {:>4} │ {:<12} │ {:>12} │ {:>8} ║",
                    h.symbol,
                    h.networks,
                    h.primary_network,
                    format_usd(h.balance_usd),
                    pct(h.price_change_h24),
                );
            }
        }
        println!("╚══════════════════════════════════════════════════════════╝");

        if self.hidden > 0 {
            println!("({} dust holdings hidden)", self.hidden);
        }
    }
}

impl TableDisplay for TokenOutput {
    fn print_table(&self) {
        if !self.found {
            println!("✗ No metadata for {} on {}.", short_addr(&self.address), self.network);
            return;
        }

        let dash = "—";
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  TOKEN METADATA                                          ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Name        : {:<41}║", self.name);
        println!("║  Symbol      : {:<41}║", self.symbol);
        println!("║  Network     : {:<41}║", self.network);
        println!("║  Address     : {:<41}║", short_addr(&self.address));
        println!(
            "║  Price       : {:<41}║",
            self.price_usd.map(format_usd).unwrap_or_else(|| dash.into())
        );
        println!(
            "║  Market Cap  : {:<41}║",
            self.market_cap_usd.map(format_usd).unwrap_or_else(|| dash.into())
        );
        println!("║  24h Change  : {:<41}║", pct(self.price_change_h24));
        println!(
            "║  Logo        : {:<41}║",
            self.image_url.as_deref().unwrap_or(dash)
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

impl TableDisplay for ConfigOutput {
    fn print_table(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  FOLIO CONFIGURATION                                     ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Gateway   : {:<43}║", self.gateway_url);
        println!("║  Gecko     : {:<43}║", self.gecko_url);
        println!("║  Hide Dust : {:<43}║", self.hide_dust);
        println!("║  Threshold : {:<43}║", format_usd(self.dust_threshold));
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

impl TableDisplay for DoctorOutput {
    fn print_table(&self) {
        println!("┌─────────────────────────────────────────────┐");
        println!("│  FOLIO DOCTOR                               │");
        println!("├─────────────────────────────────────────────┤");
        println!(
            "│  Config   : {}                               │",
            if self.config_ok { "✓" } else { "✗" }
        );
        println!(
            "│  Gateway  : {}  {:<28}│",
            if self.gateway_ok { "✓" } else { "✗" },
            self.gateway_url,
        );
        println!("└─────────────────────────────────────────────┘");
    }
}
