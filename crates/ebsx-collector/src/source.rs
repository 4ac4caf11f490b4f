//! Snapshot sources.
//!
//! A [`SnapshotSource`] lists the snapshots visible to one target. The
//! collector only sees this trait, so the EC2 client can be swapped for an
//! in-memory source in tests.

use std::future::Future;
use std::pin::Pin;

use ebsx_config::Filter;
use thiserror::Error;

/// Result type alias for snapshot listing.
pub type SourceResult<T> = Result<T, SourceError>;

/// Boxed future returned by [`SnapshotSource::describe_snapshots`].
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = SourceResult<Vec<Snapshot>>> + Send + 'a>>;

/// Errors from listing snapshots.
///
/// Authentication, transport and response errors are not told apart; the
/// collector reports all of them the same way.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("DescribeSnapshots failed: {0}")]
    Api(String),
}

/// One snapshot record as returned upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub snapshot_id: String,
    pub volume_id: String,
    /// Volume size in GiB.
    pub volume_size: i64,
    pub progress: String,
    pub state: String,
    /// Start time, seconds since the Unix epoch.
    pub start_time: i64,
    /// Tags in upstream order. Keys may repeat.
    pub tags: Vec<(String, String)>,
}

impl Snapshot {
    /// Value of a tag, or `None` if the snapshot lacks it. When a key occurs
    /// more than once the last occurrence wins.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Lists snapshots matching a set of filters (ANDed).
pub trait SnapshotSource: Send + Sync {
    fn describe_snapshots<'a>(&'a self, filters: &'a [Filter]) -> SourceFuture<'a>;
}

/// A source returning a fixed result on every call.
#[derive(Debug, Clone)]
pub struct StaticSource {
    result: SourceResult<Vec<Snapshot>>,
}

impl StaticSource {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self { result: Ok(snapshots) }
    }

    /// A source whose every call fails with `error`.
    pub fn failing(error: SourceError) -> Self {
        Self { result: Err(error) }
    }
}

impl SnapshotSource for StaticSource {
    fn describe_snapshots<'a>(&'a self, _filters: &'a [Filter]) -> SourceFuture<'a> {
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tags: &[(&str, &str)]) -> Snapshot {
        Snapshot {
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn tag_lookup() {
        let snap = tagged(&[("owner", "team-a"), ("env", "prod")]);
        assert_eq!(snap.tag("owner"), Some("team-a"));
        assert_eq!(snap.tag("env"), Some("prod"));
        assert_eq!(snap.tag("missing"), None);
    }

    #[test]
    fn duplicate_tag_last_wins() {
        let snap = tagged(&[("owner", "first"), ("env", "prod"), ("owner", "last")]);
        assert_eq!(snap.tag("owner"), Some("last"));
    }

    #[tokio::test]
    async fn static_source_repeats_result() {
        let source = StaticSource::failing(SourceError::Api("AuthFailure".into()));
        for _ in 0..2 {
            let err = source.describe_snapshots(&[]).await.unwrap_err();
            assert!(err.to_string().contains("AuthFailure"));
        }
    }
}
