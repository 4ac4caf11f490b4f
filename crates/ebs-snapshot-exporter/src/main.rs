//! ebs_snapshot_exporter — Prometheus exporter for AWS EBS snapshots.
//!
//! Loads the target list from a YAML config, builds one collector per
//! target and serves `/metrics`, listing each target's snapshots live on
//! every scrape.
//!
//! # Usage
//!
//! ```text
//! ebs_snapshot_exporter --config.file /etc/ebs_snapshot_exporter.yaml --web.listen-address :9608
//! ebs_snapshot_exporter --config.file config.yaml --config.check
//! ```

mod exporter;
mod listen;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::logging::{LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "ebs_snapshot_exporter",
    version,
    about = "Prometheus exporter for AWS EBS snapshots"
)]
struct Cli {
    /// EBS snapshot exporter configuration file.
    #[arg(long = "config.file", value_name = "PATH", default_value = "config.yaml")]
    config_file: PathBuf,

    /// Validate the config file and then exit.
    #[arg(long = "config.check")]
    config_check: bool,

    /// Address to listen on for HTTP requests (`:port` binds all interfaces).
    #[arg(long = "web.listen-address", value_name = "ADDR", default_value = ":9608")]
    listen_address: String,

    /// Only log messages with the given severity or above.
    #[arg(long = "log.level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Output format of log messages.
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level, cli.log_format);

    let options = exporter::Options {
        config_file: cli.config_file,
        config_check: cli.config_check,
        listen_address: cli.listen_address,
    };

    match exporter::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "ebs_snapshot_exporter failed");
            ExitCode::FAILURE
        }
    }
}
