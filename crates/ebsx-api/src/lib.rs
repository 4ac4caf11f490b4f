//! ebsx-api — HTTP routes for the EBS snapshot exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Landing page linking to `/metrics` |
//! | GET | `/metrics` | Prometheus exposition, collected live per request |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use ebsx_metrics::ScrapeRegistry;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<ScrapeRegistry>,
}

/// Build the exporter router over a fully populated registry.
pub fn build_router(registry: Arc<ScrapeRegistry>) -> Router {
    let state = ApiState { registry };

    Router::new()
        .route("/", get(handlers::landing_page))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
