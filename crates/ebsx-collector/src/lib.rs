//! ebsx-collector — per-target snapshot collection.
//!
//! One [`TargetCollector`] exists per configured target. On every scrape it
//! lists the target's snapshots through a [`SnapshotSource`] and turns each
//! record into `volume_size` and `start_time` gauges, alongside an `up`
//! gauge reporting whether the upstream call succeeded.
//!
//! # Architecture
//!
//! ```text
//! TargetCollector (one per target, exclusive lock per scrape)
//!   └── SnapshotSource::describe_snapshots(filters)
//!         ├── Ec2SnapshotSource  → aws-sdk-ec2 DescribeSnapshots (paginated)
//!         └── StaticSource       → fixed in-memory inventory
//! ```

pub mod collector;
pub mod ec2;
pub mod source;

pub use collector::{TargetCollector, NAMESPACE};
pub use ec2::Ec2SnapshotSource;
pub use source::{Snapshot, SnapshotSource, SourceError, SourceFuture, SourceResult, StaticSource};
