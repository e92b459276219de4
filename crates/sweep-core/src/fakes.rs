//! In-memory platform, store and branch source for unit tests.

use crate::error::{Result, SweepError};
use crate::inventory::BRANCH_TAG;
use crate::platform::{
    BranchSet, BranchSource, ObjectStore, ObjectVersionRef, StackPlatform, StackSummary,
    VersionMarker, VersionPage,
};
use crate::purge::BUCKET_OUTPUT_KEY;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// FakePlatform
// ---------------------------------------------------------------------------

struct FakeStack {
    name: String,
    branch: Option<String>,
    bucket_domain: Option<String>,
}

#[derive(Default)]
pub struct FakePlatform {
    stacks: Vec<FakeStack>,
    fail_list: bool,
    fail_delete: BTreeSet<String>,
    deleted: RefCell<Vec<String>>,
    calls: RefCell<Vec<String>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(
        mut self,
        name: &str,
        branch: Option<&str>,
        bucket_domain: Option<&str>,
    ) -> Self {
        self.stacks.push(FakeStack {
            name: name.to_string(),
            branch: branch.map(str::to_string),
            bucket_domain: bucket_domain.map(str::to_string),
        });
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_delete(mut self, stack: &str) -> Self {
        self.fail_delete.insert(stack.to_string());
        self
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }

    /// Every call made, e.g. `"outputs stack-x"` or `"delete stack-x"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn find(&self, stack: &str) -> Result<&FakeStack> {
        self.stacks.iter().find(|s| s.name == stack).ok_or_else(|| {
            SweepError::service(
                "DescribeStacks",
                format!("Stack with id {stack} does not exist"),
            )
        })
    }
}

impl StackPlatform for FakePlatform {
    fn list_stacks(&self) -> Result<Vec<StackSummary>> {
        self.calls.borrow_mut().push("list".to_string());
        if self.fail_list {
            return Err(SweepError::service("DescribeStacks", "ExpiredToken"));
        }
        Ok(self
            .stacks
            .iter()
            .map(|s| StackSummary {
                name: s.name.clone(),
                tags: s
                    .branch
                    .iter()
                    .map(|b| (BRANCH_TAG.to_string(), b.clone()))
                    .collect(),
            })
            .collect())
    }

    fn stack_outputs(&self, stack: &str) -> Result<HashMap<String, String>> {
        self.calls.borrow_mut().push(format!("outputs {stack}"));
        let found = self.find(stack)?;
        Ok(found
            .bucket_domain
            .iter()
            .map(|d| (BUCKET_OUTPUT_KEY.to_string(), d.clone()))
            .collect())
    }

    fn delete_stack(&self, stack: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("delete {stack}"));
        if self.fail_delete.contains(stack) {
            return Err(SweepError::service("DeleteStack", "AccessDenied"));
        }
        self.find(stack)?;
        self.deleted.borrow_mut().push(stack.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeStore
// ---------------------------------------------------------------------------

pub struct FakeStore {
    buckets: RefCell<BTreeMap<String, Vec<ObjectVersionRef>>>,
    page_size: usize,
    fail_deletes: BTreeSet<String>,
    log: RefCell<Vec<String>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            buckets: RefCell::new(BTreeMap::new()),
            page_size: 1000,
            fail_deletes: BTreeSet::new(),
            log: RefCell::new(Vec::new()),
        }
    }
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bucket holding one version per key.
    pub fn with_bucket(self, bucket: &str, keys: &[&str]) -> Self {
        self.buckets.borrow_mut().entry(bucket.to_string()).or_default().extend(
            keys.iter().map(|k| ObjectVersionRef {
                key: k.to_string(),
                version_id: format!("v-{k}"),
            }),
        );
        self
    }

    pub fn with_delete_markers(self, bucket: &str, keys: &[&str]) -> Self {
        self.buckets.borrow_mut().entry(bucket.to_string()).or_default().extend(
            keys.iter().map(|k| ObjectVersionRef {
                key: k.to_string(),
                version_id: format!("dm-{k}"),
            }),
        );
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn failing_deletes(mut self, bucket: &str) -> Self {
        self.fail_deletes.insert(bucket.to_string());
        self
    }

    /// True when the bucket is gone or holds nothing.
    pub fn is_empty(&self, bucket: &str) -> bool {
        self.buckets
            .borrow()
            .get(bucket)
            .map_or(true, |versions| versions.is_empty())
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<ObjectVersionRef>> {
        self.buckets.borrow().clone()
    }

    /// Every call made, e.g. `"list assets"` or `"delete assets a"`.
    pub fn call_log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn list_calls(&self, bucket: &str) -> usize {
        let entry = format!("list {bucket}");
        self.log.borrow().iter().filter(|c| **c == entry).count()
    }
}

impl ObjectStore for FakeStore {
    fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> Result<VersionPage> {
        self.log.borrow_mut().push(format!("list {bucket}"));
        let buckets = self.buckets.borrow();
        let versions = buckets
            .get(bucket)
            .ok_or_else(|| SweepError::BucketNotFound(bucket.to_string()))?;

        let start = match marker {
            None => 0,
            Some(m) => versions
                .iter()
                .position(|v| {
                    v.key == m.key_marker && Some(&v.version_id) == m.version_id_marker.as_ref()
                })
                .map_or(versions.len(), |p| p + 1),
        };
        let end = (start + self.page_size).min(versions.len());
        let page: Vec<ObjectVersionRef> = versions[start..end].to_vec();
        let next = match page.last() {
            Some(last) if end < versions.len() => Some(VersionMarker {
                key_marker: last.key.clone(),
                version_id_marker: Some(last.version_id.clone()),
            }),
            _ => None,
        };
        Ok(VersionPage {
            versions: page,
            next,
        })
    }

    fn delete_object_version(&self, bucket: &str, version: &ObjectVersionRef) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("delete {bucket} {}", version.key));
        if self.fail_deletes.contains(bucket) {
            return Err(SweepError::service("DeleteObject", "SlowDown"));
        }
        let mut buckets = self.buckets.borrow_mut();
        let versions = buckets
            .get_mut(bucket)
            .ok_or_else(|| SweepError::BucketNotFound(bucket.to_string()))?;
        versions.retain(|v| v != version);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeBranches
// ---------------------------------------------------------------------------

pub struct FakeBranches {
    repo: String,
    branches: BranchSet,
}

impl FakeBranches {
    pub fn new(repo: &str, branches: &[&str]) -> Self {
        Self {
            repo: repo.to_string(),
            branches: branches.iter().map(|b| b.to_string()).collect(),
        }
    }
}

impl BranchSource for FakeBranches {
    fn branches(&self, repo: &str) -> Result<BranchSet> {
        if repo != self.repo {
            return Err(SweepError::RepoNotFound(repo.to_string()));
        }
        Ok(self.branches.clone())
    }
}
