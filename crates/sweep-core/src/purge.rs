//! Emptying a stack's private-assets bucket ahead of teardown.
//!
//! A versioned bucket keeps every historical version and delete marker, so a
//! plain delete leaves it non-empty and the stack deletion fails. Each
//! version is removed explicitly by key and version id.

use crate::error::{Result, SweepError};
use crate::platform::{ObjectStore, ObjectVersionRef, StackPlatform};
use crate::reconcile::DeletionSet;
use tracing::{debug, info, warn};

pub const BUCKET_OUTPUT_KEY: &str = "PrivateAssetsBucketDomainName";

const BUCKET_DOMAIN_SUFFIX: &str = ".s3.amazonaws.com";

// ---------------------------------------------------------------------------
// PurgedSet
// ---------------------------------------------------------------------------

/// A deletion set whose buckets have all been emptied.
///
/// Only [`purge_all`] builds one, so the delete phase cannot start before
/// the purge phase has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgedSet {
    stacks: DeletionSet,
}

impl PurgedSet {
    pub fn stacks(&self) -> &DeletionSet {
        &self.stacks
    }

    #[cfg(test)]
    pub(crate) fn assume_purged(stacks: DeletionSet) -> Self {
        Self { stacks }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Emptied { deleted: usize },
    BucketMissing,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn `my-bucket.s3.amazonaws.com` into `my-bucket`.
pub fn bucket_name(domain_name: &str) -> &str {
    domain_name
        .strip_suffix(BUCKET_DOMAIN_SUFFIX)
        .unwrap_or(domain_name)
}

/// Resolve the bucket a stack stores its private assets in.
pub fn stack_bucket(platform: &impl StackPlatform, stack: &str) -> Result<String> {
    let outputs = platform.stack_outputs(stack)?;
    let domain = outputs
        .get(BUCKET_OUTPUT_KEY)
        .ok_or_else(|| SweepError::MissingOutput {
            stack: stack.to_string(),
            key: BUCKET_OUTPUT_KEY.to_string(),
        })?;
    Ok(bucket_name(domain).to_string())
}

/// Every version and delete marker in `bucket`, across all pages.
pub fn list_all_versions(store: &impl ObjectStore, bucket: &str) -> Result<Vec<ObjectVersionRef>> {
    let mut versions = Vec::new();
    let mut marker = None;
    loop {
        let page = store.list_object_versions(bucket, marker.as_ref())?;
        versions.extend(page.versions);
        match page.next {
            Some(next) => marker = Some(next),
            None => break,
        }
    }
    Ok(versions)
}

// ---------------------------------------------------------------------------
// Purge
// ---------------------------------------------------------------------------

/// Delete every version in `bucket`. A missing bucket counts as clean.
pub fn purge_bucket(store: &impl ObjectStore, bucket: &str) -> Result<PurgeOutcome> {
    let versions = match list_all_versions(store, bucket) {
        Ok(v) => v,
        Err(SweepError::BucketNotFound(_)) => {
            warn!(bucket, "bucket not found, continuing to stack delete");
            return Ok(PurgeOutcome::BucketMissing);
        }
        Err(e) => return Err(e),
    };

    for version in &versions {
        match store.delete_object_version(bucket, version) {
            Ok(()) => debug!(
                bucket,
                key = %version.key,
                version_id = %version.version_id,
                "deleted"
            ),
            Err(SweepError::BucketNotFound(_)) => {
                warn!(bucket, "bucket disappeared while purging, continuing to stack delete");
                return Ok(PurgeOutcome::BucketMissing);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(PurgeOutcome::Emptied {
        deleted: versions.len(),
    })
}

/// Empty the bucket behind one stack.
pub fn purge_stack(
    platform: &impl StackPlatform,
    store: &impl ObjectStore,
    stack: &str,
) -> Result<PurgeOutcome> {
    let bucket = stack_bucket(platform, stack)?;
    let outcome = purge_bucket(store, &bucket)?;
    if let PurgeOutcome::Emptied { deleted } = outcome {
        info!(stack, bucket = %bucket, deleted, "bucket emptied");
    }
    Ok(outcome)
}

/// Purge every stack in the set, one at a time. Stops at the first failure.
pub fn purge_all(
    platform: &impl StackPlatform,
    store: &impl ObjectStore,
    stacks: DeletionSet,
) -> Result<PurgedSet> {
    for stack in stacks.iter() {
        purge_stack(platform, store, stack)?;
    }
    Ok(PurgedSet { stacks })
}
