//! Seams to the outside world.
//!
//! The reconciliation and teardown logic only talks to these traits. The
//! real implementations live in [`crate::aws`] and [`crate::github`]; tests
//! use in-memory fakes.

use crate::error::Result;
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Stacks
// ---------------------------------------------------------------------------

/// A deployed stack as reported by the platform's describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSummary {
    pub name: String,
    /// Tags in the order the platform returned them.
    pub tags: Vec<(String, String)>,
}

pub trait StackPlatform {
    /// Every stack in the target region, pagination fully drained.
    fn list_stacks(&self) -> Result<Vec<StackSummary>>;

    /// The stack's outputs, keyed by output name.
    fn stack_outputs(&self, stack: &str) -> Result<HashMap<String, String>>;

    /// Request deletion. Returns once the request is accepted.
    fn delete_stack(&self, stack: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// One object version or delete marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectVersionRef {
    pub key: String,
    pub version_id: String,
}

/// Continuation point for a version listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionPage {
    /// Versions followed by delete markers.
    pub versions: Vec<ObjectVersionRef>,
    /// `None` when this is the last page.
    pub next: Option<VersionMarker>,
}

pub trait ObjectStore {
    /// One page of object versions and delete markers.
    ///
    /// Returns [`crate::SweepError::BucketNotFound`] when the bucket does
    /// not exist.
    fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage>;

    fn delete_object_version(&self, bucket: &str, version: &ObjectVersionRef) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

pub type BranchSet = BTreeSet<String>;

pub trait BranchSource {
    /// All branch names currently on `repo`.
    fn branches(&self, repo: &str) -> Result<BranchSet>;
}
