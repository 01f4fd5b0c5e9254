//! Folio core engine — token metadata cache, rate-limited fetch gate,
//! portfolio aggregation and consolidation.
//!
//! Everything stateful lives inside [`PortfolioService`] (or the parts it
//! bundles) — construct one per process, or one per test. There are no
//! module-level singletons.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod consolidate;
pub mod gate;
pub mod preload;
pub mod service;
pub mod workspace;

pub use aggregator::{AddressSet, PortfolioAggregator, PortfolioBundle};
pub use cache::{CacheLookup, TokenCache};
pub use gate::FetchGate;
pub use preload::PreloadHandle;
pub use service::PortfolioService;
pub use workspace::init_workspace;
