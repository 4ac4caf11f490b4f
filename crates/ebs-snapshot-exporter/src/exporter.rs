//! Startup wiring: config → per-target collectors → registry → HTTP server.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ebsx_collector::{Ec2SnapshotSource, SnapshotSource, TargetCollector};
use ebsx_config::Config;
use ebsx_metrics::{BuildInfoCollector, ScrapeRegistry};
use tracing::{info, warn};

use crate::listen;

const PROGRAM: &str = "ebs_snapshot_exporter";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const REVISION: &str = match option_env!("EBSX_GIT_REVISION") {
    Some(rev) => rev,
    None => "",
};

#[derive(Debug)]
pub struct Options {
    pub config_file: PathBuf,
    pub config_check: bool,
    pub listen_address: String,
}

pub async fn run(options: Options) -> anyhow::Result<()> {
    info!(version = VERSION, revision = REVISION, "starting {PROGRAM}");

    let config = Config::from_file(&options.config_file).context("error loading config")?;
    if options.config_check {
        info!(path = ?options.config_file, "config file is ok, exiting");
        return Ok(());
    }
    info!(path = ?options.config_file, targets = config.targets.len(), "loaded config file");

    let mut sources: BTreeMap<String, Arc<dyn SnapshotSource>> = BTreeMap::new();
    for (name, target) in &config.targets {
        let source = Ec2SnapshotSource::from_credentials(&target.aws_creds).await;
        sources.insert(name.clone(), Arc::new(source));
    }

    let registry = build_registry(&config, sources)?;
    let router = ebsx_api::build_router(Arc::new(registry));

    let listener = listen::bind(&options.listen_address).await?;
    info!(addr = %listener.local_addr()?, "listening on address");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("{PROGRAM} stopped");
    Ok(())
}

/// Register one collector per target, plus build info. Every target must
/// have a source.
fn build_registry(
    config: &Config,
    mut sources: BTreeMap<String, Arc<dyn SnapshotSource>>,
) -> anyhow::Result<ScrapeRegistry> {
    let exported_tags = config.exported_tags();
    let mut registry = ScrapeRegistry::new();

    for (name, target) in &config.targets {
        let source = sources
            .remove(name)
            .with_context(|| format!("no snapshot source for target {name:?}"))?;
        info!(target_name = %name, region = %target.aws_creds.region, "registering target");
        registry.register(Arc::new(TargetCollector::new(
            name,
            target,
            &exported_tags,
            source,
        )));
    }

    let build_info = BuildInfoCollector::new(PROGRAM, VERSION, REVISION)
        .context("error creating build info metric")?;
    registry.register(Arc::new(build_info));
    Ok(registry)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
