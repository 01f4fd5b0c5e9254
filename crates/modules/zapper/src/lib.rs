//! Portfolio gateway module — per-address balances via the hosted
//! Zapper proxy.

mod client;

pub use client::GatewayClient;
