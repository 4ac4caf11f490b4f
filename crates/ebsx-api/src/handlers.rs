//! Route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, error};

use crate::ApiState;

const LANDING_PAGE: &str = r#"<html>
<head><title>EBS Snapshot Exporter</title></head>
<body>
<h1>EBS Snapshot Exporter</h1>
<p><a href='/metrics'>Metrics</a></p>
</body>
</html>
"#;

/// GET /
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// GET /metrics
///
/// Runs every registered collector inline with the request; nothing is
/// cached between scrapes.
pub async fn prometheus_metrics(State(state): State<ApiState>) -> Response {
    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    let encoded = match state.registry.gather().await {
        Ok(families) => encoder.encode(&families, &mut body),
        Err(e) => Err(e),
    };
    if let Err(e) = encoded {
        error!(error = %e, "failed to gather metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    debug!(bytes = body.len(), "metrics scrape served");
    (
        StatusCode::OK,
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ebsx_metrics::{BuildInfoCollector, CollectFuture, ScrapeCollector, ScrapeRegistry};
    use prometheus::Registry;

    fn build_info() -> Arc<BuildInfoCollector> {
        Arc::new(BuildInfoCollector::new("ebs_snapshot_exporter", "0.1.0", "").unwrap())
    }

    fn test_state() -> ApiState {
        let mut registry = ScrapeRegistry::new();
        registry.register(build_info());
        ApiState {
            registry: Arc::new(registry),
        }
    }

    /// Registers metrics that clash with the build info gauge.
    struct Clashing;

    impl ScrapeCollector for Clashing {
        fn collect_into<'a>(&'a self, registry: &'a Registry) -> CollectFuture<'a> {
            let gauge = prometheus::Gauge::new("ebs_snapshot_exporter_build_info", "Other help.");
            Box::pin(async move { registry.register(Box::new(gauge?)) })
        }
    }

    #[tokio::test]
    async fn landing_page_links_metrics() {
        let Html(body) = landing_page().await;
        assert!(body.contains("<a href='/metrics'>"));
    }

    #[tokio::test]
    async fn metrics_content_type() {
        let resp = prometheus_metrics(State(test_state())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/plain; version=0.0.4"));
    }

    #[tokio::test]
    async fn metrics_body() {
        let resp = prometheus_metrics(State(test_state())).await.into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("# TYPE ebs_snapshot_exporter_build_info gauge\n"));
        assert!(body.contains("ebs_snapshot_exporter_build_info{revision=\"\",version=\"0.1.0\"} 1\n"));
    }

    #[tokio::test]
    async fn metrics_registration_conflict_is_server_error() {
        let mut registry = ScrapeRegistry::new();
        registry.register(build_info());
        registry.register(Arc::new(Clashing));
        let state = ApiState {
            registry: Arc::new(registry),
        };
        let resp = prometheus_metrics(State(state)).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
