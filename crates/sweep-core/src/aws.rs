//! CloudFormation and S3 behind [`StackPlatform`] and [`ObjectStore`].
//!
//! The SDK is async; every call here blocks on a private current-thread
//! runtime so the rest of the crate stays sequential.

use crate::error::{Result, SweepError};
use crate::platform::{
    ObjectStore, ObjectVersionRef, StackPlatform, StackSummary, VersionMarker, VersionPage,
};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::DisplayErrorContext;
use aws_sdk_s3::error::ProvideErrorMetadata;
use std::collections::HashMap;
use tokio::runtime::{Builder, Runtime};

pub const DEFAULT_REGION: &str = "eu-central-1";

const NO_SUCH_BUCKET: &str = "NoSuchBucket";

// S3 reports unversioned objects with this literal version id.
const NULL_VERSION: &str = "null";

pub struct AwsPlatform {
    runtime: Runtime,
    cloudformation: aws_sdk_cloudformation::Client,
    s3: aws_sdk_s3::Client,
}

impl AwsPlatform {
    /// Resolve ambient credentials and build clients for `region`.
    pub fn connect(region: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load(),
        );
        Ok(Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
            runtime,
        })
    }
}

fn service_error<E>(operation: &'static str, err: E) -> SweepError
where
    E: std::error::Error,
{
    SweepError::service(operation, DisplayErrorContext(&err).to_string())
}

fn is_no_such_bucket<E, R>(err: &aws_sdk_s3::error::SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.as_service_error().and_then(|e| e.code()) == Some(NO_SUCH_BUCKET)
}

// ---------------------------------------------------------------------------
// CloudFormation
// ---------------------------------------------------------------------------

impl StackPlatform for AwsPlatform {
    fn list_stacks(&self) -> Result<Vec<StackSummary>> {
        self.runtime.block_on(async {
            let mut stacks = Vec::new();
            let mut pages = self.cloudformation.describe_stacks().into_paginator().send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| service_error("DescribeStacks", e))?;
                for stack in page.stacks() {
                    // Required members are plain `&str` in newer SDK releases.
                    let name: Option<&str> = stack.stack_name().into();
                    let Some(name) = name else {
                        continue;
                    };
                    let tags = stack
                        .tags()
                        .iter()
                        .filter_map(|tag| {
                            let key: Option<&str> = tag.key().into();
                            let value: Option<&str> = tag.value().into();
                            Some((key?.to_string(), value?.to_string()))
                        })
                        .collect();
                    stacks.push(StackSummary {
                        name: name.to_string(),
                        tags,
                    });
                }
            }
            Ok(stacks)
        })
    }

    fn stack_outputs(&self, stack: &str) -> Result<HashMap<String, String>> {
        self.runtime.block_on(async {
            let out = self
                .cloudformation
                .describe_stacks()
                .stack_name(stack)
                .send()
                .await
                .map_err(|e| service_error("DescribeStacks", e))?;
            let described = out.stacks().first().ok_or_else(|| {
                SweepError::service("DescribeStacks", format!("stack '{stack}' not returned"))
            })?;
            Ok(described
                .outputs()
                .iter()
                .filter_map(|o| Some((o.output_key()?.to_string(), o.output_value()?.to_string())))
                .collect())
        })
    }

    fn delete_stack(&self, stack: &str) -> Result<()> {
        self.runtime.block_on(async {
            self.cloudformation
                .delete_stack()
                .stack_name(stack)
                .send()
                .await
                .map_err(|e| service_error("DeleteStack", e))?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

impl ObjectStore for AwsPlatform {
    fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage> {
        self.runtime.block_on(async {
            let mut req = self.s3.list_object_versions().bucket(bucket);
            if let Some(m) = marker {
                req = req
                    .key_marker(m.key_marker.clone())
                    .set_version_id_marker(m.version_id_marker.clone());
            }
            let out = match req.send().await {
                Ok(out) => out,
                Err(e) if is_no_such_bucket(&e) => {
                    return Err(SweepError::BucketNotFound(bucket.to_string()))
                }
                Err(e) => return Err(service_error("ListObjectVersions", e)),
            };

            let versions = out
                .versions()
                .iter()
                .filter_map(|v| version_ref(v.key(), v.version_id()));
            let markers = out
                .delete_markers()
                .iter()
                .filter_map(|d| version_ref(d.key(), d.version_id()));

            let truncated: Option<bool> = out.is_truncated().into();
            let next = next_marker(
                truncated,
                out.next_key_marker(),
                out.next_version_id_marker(),
            );

            Ok(VersionPage {
                versions: versions.chain(markers).collect(),
                next,
            })
        })
    }

    fn delete_object_version(&self, bucket: &str, version: &ObjectVersionRef) -> Result<()> {
        self.runtime.block_on(async {
            match self
                .s3
                .delete_object()
                .bucket(bucket)
                .key(version.key.clone())
                .version_id(version.version_id.clone())
                .send()
                .await
            {
                Ok(_) => Ok(()),
                Err(e) if is_no_such_bucket(&e) => {
                    Err(SweepError::BucketNotFound(bucket.to_string()))
                }
                Err(e) => Err(service_error("DeleteObject", e)),
            }
        })
    }
}

/// Where the next listing page starts, or `None` when the listing is done.
fn next_marker(
    truncated: Option<bool>,
    key_marker: Option<&str>,
    version_id_marker: Option<&str>,
) -> Option<VersionMarker> {
    match (truncated, key_marker) {
        (Some(true), Some(key)) => Some(VersionMarker {
            key_marker: key.to_string(),
            version_id_marker: version_id_marker.map(str::to_string),
        }),
        _ => None,
    }
}

fn version_ref(key: Option<&str>, version_id: Option<&str>) -> Option<ObjectVersionRef> {
    Some(ObjectVersionRef {
        key: key?.to_string(),
        version_id: version_id.unwrap_or(NULL_VERSION).to_string(),
    })
}
