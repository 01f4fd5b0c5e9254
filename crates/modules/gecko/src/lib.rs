//! GeckoTerminal token metadata module.

mod client;

pub use client::{gecko_network, GeckoClient};
