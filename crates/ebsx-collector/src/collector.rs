//! Per-target snapshot collector.
//!
//! Each scrape takes the collector's lock, lists the target's snapshots once
//! and registers into the scrape's registry:
//!
//! - `ebs_snapshot_up{target}` — 1 if the upstream call succeeded, else 0
//! - `ebs_snapshot_volume_size{target, snapshot, volume, region, progress, state, <tags>}`
//! - `ebs_snapshot_start_time{...same labels...}` — epoch seconds
//!
//! On upstream failure only the `up` gauge is registered.

use std::sync::Arc;

use ebsx_config::{ExportedTag, Filter, Target};
use ebsx_metrics::{CollectFuture, ScrapeCollector};
use prometheus::{Gauge, GaugeVec, Opts, Registry};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::source::{Snapshot, SnapshotSource};

/// Metric namespace shared by every target collector.
pub const NAMESPACE: &str = "ebs_snapshot";

/// Variable labels present on every snapshot sample, before exported tags.
const SNAPSHOT_LABELS: [&str; 5] = ["snapshot", "volume", "region", "progress", "state"];

pub struct TargetCollector {
    name: String,
    region: String,
    filters: Vec<Filter>,
    /// Variable label names: the snapshot labels, then one per exported tag.
    labels: Vec<String>,
    /// Tag keys to read, parallel to the exported-tag entries of `labels`.
    tag_keys: Vec<String>,
    source: Arc<dyn SnapshotSource>,
    /// Held for the whole of a scrape.
    lock: Mutex<()>,
    up: Opts,
    volume_size: Opts,
    start_time: Opts,
}

impl TargetCollector {
    /// Create the collector for target `name`. The label schema is computed
    /// here and never changes afterwards.
    pub fn new(
        name: &str,
        target: &Target,
        exported_tags: &[ExportedTag],
        source: Arc<dyn SnapshotSource>,
    ) -> Self {
        let opts = |metric: &str, help: &str| {
            Opts::new(metric, help)
                .namespace(NAMESPACE)
                .const_label("target", name)
        };

        Self {
            name: name.to_string(),
            region: target.aws_creds.region.clone(),
            filters: target.filters.clone(),
            labels: SNAPSHOT_LABELS
                .iter()
                .map(|l| l.to_string())
                .chain(exported_tags.iter().map(|t| t.label.clone()))
                .collect(),
            tag_keys: exported_tags.iter().map(|t| t.tag_key.clone()).collect(),
            source,
            lock: Mutex::new(()),
            up: opts("up", "Could the AWS EC2 API be reached."),
            volume_size: opts("volume_size", "Size of volume associated with the EBS snapshot."),
            start_time: opts("start_time", "Start timestamp of the EBS snapshot."),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label values for one snapshot, in `labels` order.
    fn label_values(&self, snapshot: &Snapshot) -> Vec<String> {
        let mut values = Vec::with_capacity(self.labels.len());
        values.push(snapshot.snapshot_id.clone());
        values.push(snapshot.volume_id.clone());
        values.push(self.region.clone());
        values.push(snapshot.progress.clone());
        values.push(snapshot.state.clone());
        for key in &self.tag_keys {
            values.push(snapshot.tag(key).unwrap_or_default().to_string());
        }
        values
    }

    fn snapshot_gauge(&self, opts: &Opts) -> prometheus::Result<GaugeVec> {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        GaugeVec::new(opts.clone(), &labels)
    }

    async fn scrape(&self, registry: &Registry) -> prometheus::Result<()> {
        let _guard = self.lock.lock().await;

        let up = Gauge::with_opts(self.up.clone())?;
        let snapshots = match self.source.describe_snapshots(&self.filters).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                error!(target_name = %self.name, error = %e, "error collecting metrics from EC2 API");
                return registry.register(Box::new(up));
            }
        };
        up.set(1.0);

        let volume_size = self.snapshot_gauge(&self.volume_size)?;
        let start_time = self.snapshot_gauge(&self.start_time)?;
        for snapshot in &snapshots {
            let values = self.label_values(snapshot);
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            volume_size
                .get_metric_with_label_values(&values)?
                .set(snapshot.volume_size as f64);
            start_time
                .get_metric_with_label_values(&values)?
                .set(snapshot.start_time as f64);
        }

        registry.register(Box::new(up))?;
        registry.register(Box::new(volume_size))?;
        registry.register(Box::new(start_time))?;

        debug!(target_name = %self.name, snapshots = snapshots.len(), "target scraped");
        Ok(())
    }
}

impl ScrapeCollector for TargetCollector {
    fn collect_into<'a>(&'a self, registry: &'a Registry) -> CollectFuture<'a> {
        Box::pin(self.scrape(registry))
    }
}
