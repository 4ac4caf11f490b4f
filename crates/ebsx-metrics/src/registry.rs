//! Scrape registry.
//!
//! The registry is an explicit value built once at startup and handed to the
//! HTTP layer. Gathering creates a fresh [`prometheus::Registry`], lets every
//! collector fill it in registration order, inline with the caller, and
//! returns the merged families. No metric value outlives the scrape that
//! produced it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use prometheus::proto::MetricFamily;
use prometheus::Registry;
use tracing::debug;

/// Boxed future returned by [`ScrapeCollector::collect_into`].
pub type CollectFuture<'a> = Pin<Box<dyn Future<Output = prometheus::Result<()>> + Send + 'a>>;

/// Produces fresh metrics on every scrape.
///
/// `prometheus::core::Collector` is synchronous; collectors that have to
/// await an upstream call do so here and register the resulting metrics
/// into the scrape's registry. Upstream failures are reported through the
/// collector's own metrics (e.g. an `up` gauge of 0); an `Err` means the
/// metrics themselves could not be built or registered.
pub trait ScrapeCollector: Send + Sync {
    fn collect_into<'a>(&'a self, registry: &'a Registry) -> CollectFuture<'a>;
}

#[derive(Default)]
pub struct ScrapeRegistry {
    collectors: Vec<Arc<dyn ScrapeCollector>>,
}

impl ScrapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Collectors are run in registration order.
    pub fn register(&mut self, collector: Arc<dyn ScrapeCollector>) {
        self.collectors.push(collector);
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Run every collector and gather the result.
    ///
    /// Metrics of the same name coming from different collectors (one per
    /// target) are merged into one family by the prometheus registry, so the
    /// exposition carries a single `# HELP`/`# TYPE` header per name.
    /// Families without samples are dropped.
    pub async fn gather(&self) -> prometheus::Result<Vec<MetricFamily>> {
        let registry = Registry::new();
        for collector in &self.collectors {
            collector.collect_into(&registry).await?;
        }

        let families = registry.gather();
        debug!(
            collectors = self.collectors.len(),
            families = families.len(),
            "registry gathered"
        );
        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{GaugeVec, Opts};

    struct Fixed {
        target: &'static str,
        values: Vec<f64>,
    }

    impl ScrapeCollector for Fixed {
        fn collect_into<'a>(&'a self, registry: &'a Registry) -> CollectFuture<'a> {
            Box::pin(async move {
                let gauge = GaugeVec::new(
                    Opts::new("test_value", "A test value.").const_label("target", self.target),
                    &["idx"],
                )?;
                for (i, v) in self.values.iter().enumerate() {
                    let idx = i.to_string();
                    gauge.get_metric_with_label_values(&[idx.as_str()])?.set(*v);
                }
                registry.register(Box::new(gauge))
            })
        }
    }

    fn label<'a>(metric: &'a prometheus::proto::Metric, name: &str) -> Option<&'a str> {
        metric
            .get_label()
            .iter()
            .find(|l| l.get_name() == name)
            .map(|l| l.get_value())
    }

    #[tokio::test]
    async fn gather_empty_registry() {
        let registry = ScrapeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.gather().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gather_merges_same_name_across_collectors() {
        let mut registry = ScrapeRegistry::new();
        registry.register(Arc::new(Fixed { target: "a", values: vec![1.0, 2.0] }));
        registry.register(Arc::new(Fixed { target: "b", values: vec![3.0] }));
        assert_eq!(registry.len(), 2);

        let families = registry.gather().await.unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "test_value");

        let mut targets: Vec<_> = families[0]
            .get_metric()
            .iter()
            .map(|m| label(m, "target").unwrap())
            .collect();
        targets.sort();
        assert_eq!(targets, vec!["a", "a", "b"]);
    }

    #[tokio::test]
    async fn empty_family_dropped() {
        let mut registry = ScrapeRegistry::new();
        registry.register(Arc::new(Fixed { target: "a", values: vec![] }));
        assert!(registry.gather().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_collector_fails_gather() {
        let mut registry = ScrapeRegistry::new();
        registry.register(Arc::new(Fixed { target: "a", values: vec![1.0] }));
        registry.register(Arc::new(Fixed { target: "a", values: vec![2.0] }));
        assert!(registry.gather().await.is_err());
    }

    #[tokio::test]
    async fn each_gather_starts_fresh() {
        let mut registry = ScrapeRegistry::new();
        registry.register(Arc::new(Fixed { target: "a", values: vec![1.0] }));
        for _ in 0..2 {
            let families = registry.gather().await.unwrap();
            assert_eq!(families[0].get_metric().len(), 1);
        }
    }
}
