//! Build information gauge (`<program>_build_info`).

use prometheus::{GaugeVec, Opts, Registry};

use crate::registry::{CollectFuture, ScrapeCollector};

/// Reports a constant `1` labelled with the program's version and revision.
pub struct BuildInfoCollector {
    info: GaugeVec,
}

impl BuildInfoCollector {
    pub fn new(program: &str, version: &str, revision: &str) -> prometheus::Result<Self> {
        let info = GaugeVec::new(
            Opts::new(
                "build_info",
                format!(
                    "A metric with a constant '1' value labeled by version and revision from which {program} was built."
                ),
            )
            .namespace(program),
            &["version", "revision"],
        )?;
        info.get_metric_with_label_values(&[version, revision])?
            .set(1.0);
        Ok(Self { info })
    }
}

impl ScrapeCollector for BuildInfoCollector {
    fn collect_into<'a>(&'a self, registry: &'a Registry) -> CollectFuture<'a> {
        let result = registry.register(Box::new(self.info.clone()));
        Box::pin(async move { result })
    }
}
