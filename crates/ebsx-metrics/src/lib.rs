//! ebsx-metrics — scrape-time metric collection for the EBS snapshot exporter.
//!
//! Nothing here holds values between scrapes. Every registered
//! [`ScrapeCollector`] builds fresh `prometheus` metrics when the registry is
//! gathered; the HTTP layer encodes the families with `prometheus`'s text
//! encoder.
//!
//! # Architecture
//!
//! ```text
//! ScrapeRegistry
//!   ├── register() ← called once per collector at startup
//!   └── gather() → fresh prometheus::Registry per scrape,
//!                  collectors run in sequence, families merged by name
//! ```

pub mod build_info;
pub mod registry;

pub use build_info::BuildInfoCollector;
pub use registry::{CollectFuture, ScrapeCollector, ScrapeRegistry};
