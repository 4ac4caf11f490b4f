//! ebsx-config — configuration for the EBS snapshot exporter.
//!
//! The exporter is driven by a single YAML file naming the targets to poll
//! and the snapshot tags to surface as metric labels:
//!
//! ```yaml
//! exported_tags:
//!   owner:
//!   env: Environment
//! targets:
//!   prod:
//!     filters:
//!       - name: owner-id
//!         value: "123456789012"
//!     aws_creds:
//!       region: us-east-1
//!       role_arn: arn:aws:iam::123456789012:role/snapshot-reader
//! ```

pub mod config;
pub mod error;

pub use config::{AwsCredentials, Config, ExportedTag, Filter, Target, FIXED_LABELS};
pub use error::{ConfigError, ConfigResult};
