//! EC2-backed snapshot source.
//!
//! Credentials are resolved per target: a static key pair when both halves
//! are configured, otherwise the SDK default chain (environment, profile,
//! IMDS, ...). A configured role is assumed through STS on top of that base.
//!
//! No explicit timeout is set on the DescribeSnapshots call; it is bounded
//! only by the SDK's defaults.

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter as Ec2Filter, Snapshot as Ec2Snapshot};
use aws_sdk_ec2::Client;
use ebsx_config::{AwsCredentials, Filter};
use tracing::debug;

use crate::source::{Snapshot, SnapshotSource, SourceError, SourceFuture};

/// Session name used when assuming a target's role.
const SESSION_NAME: &str = "ebs-snapshot-exporter";

const STATIC_PROVIDER_NAME: &str = "ebsx-static";

/// Lists snapshots with the EC2 `DescribeSnapshots` API, following every
/// result page.
#[derive(Debug, Clone)]
pub struct Ec2SnapshotSource {
    client: Client,
}

impl Ec2SnapshotSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for one target's credentials. Nothing is validated
    /// here; bad regions or credentials surface on the first scrape.
    pub async fn from_credentials(creds: &AwsCredentials) -> Self {
        let region = Region::new(creds.region.clone());

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region.clone());
        if let Some((access_key, secret_key)) = creds.static_keys() {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                STATIC_PROVIDER_NAME,
            ));
        }
        let base = loader.load().await;

        let sdk_config = match creds.role_arn() {
            Some(role_arn) => {
                debug!(%role_arn, region = %creds.region, "assuming role for target");
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(SESSION_NAME)
                    .region(region)
                    .configure(&base)
                    .build()
                    .await;
                base.into_builder()
                    .credentials_provider(SharedCredentialsProvider::new(provider))
                    .build()
            }
            None => base,
        };

        Self::new(Client::new(&sdk_config))
    }
}

impl SnapshotSource for Ec2SnapshotSource {
    fn describe_snapshots<'a>(&'a self, filters: &'a [Filter]) -> SourceFuture<'a> {
        Box::pin(async move {
            let mut request = self.client.describe_snapshots();
            for filter in filters {
                request = request.filters(to_ec2_filter(filter));
            }

            let snapshots: Vec<Ec2Snapshot> = request
                .into_paginator()
                .items()
                .send()
                .collect::<Result<Vec<_>, _>>()
                .await
                .map_err(|e| SourceError::Api(DisplayErrorContext(&e).to_string()))?;

            Ok(snapshots.iter().map(from_ec2_snapshot).collect())
        })
    }
}

fn to_ec2_filter(filter: &Filter) -> Ec2Filter {
    Ec2Filter::builder()
        .name(&filter.name)
        .values(&filter.value)
        .build()
}

/// Absent string fields become `""`, absent numbers `0`.
fn from_ec2_snapshot(s: &Ec2Snapshot) -> Snapshot {
    Snapshot {
        snapshot_id: s.snapshot_id().unwrap_or_default().to_string(),
        volume_id: s.volume_id().unwrap_or_default().to_string(),
        volume_size: s.volume_size().map(i64::from).unwrap_or_default(),
        progress: s.progress().unwrap_or_default().to_string(),
        state: s.state().map(|st| st.as_str().to_string()).unwrap_or_default(),
        start_time: s.start_time().map(|t| t.secs()).unwrap_or_default(),
        tags: s
            .tags()
            .iter()
            .map(|t| {
                (
                    t.key().unwrap_or_default().to_string(),
                    t.value().unwrap_or_default().to_string(),
                )
            })
            .collect(),
    }
}
