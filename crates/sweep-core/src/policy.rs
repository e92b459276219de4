use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_PROTECTED_BRANCHES: &[&str] = &["staging", "master", "demo"];

const DEFAULT_PROTECTED_STACKS: &[&str] = &[
    "alasco-app-staging-staging",
    "alasco-app-production-production",
    "alasco-app-production-demo",
];

// ---------------------------------------------------------------------------
// ProtectionPolicy
// ---------------------------------------------------------------------------

/// Branches and stacks that are never deleted, whatever reconciliation says.
///
/// The two lists are checked independently: a stack is protected when either
/// its branch or its own identifier is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionPolicy {
    #[serde(default)]
    pub protected_branches: BTreeSet<String>,
    #[serde(default)]
    pub protected_stacks: BTreeSet<String>,
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROTECTED_BRANCHES.iter().copied(),
            DEFAULT_PROTECTED_STACKS.iter().copied(),
        )
    }
}

impl ProtectionPolicy {
    pub fn new<B, S>(branches: B, stacks: S) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            protected_branches: branches.into_iter().map(Into::into).collect(),
            protected_stacks: stacks.into_iter().map(Into::into).collect(),
        }
    }

    /// A policy that protects nothing.
    pub fn empty() -> Self {
        Self {
            protected_branches: BTreeSet::new(),
            protected_stacks: BTreeSet::new(),
        }
    }

    /// Load a policy from a YAML file. Missing keys mean an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let policy: ProtectionPolicy = serde_yaml::from_str(&data)?;
        Ok(policy)
    }

    pub fn is_protected_branch(&self, name: &str) -> bool {
        self.protected_branches.contains(name)
    }

    pub fn is_protected_stack(&self, id: &str) -> bool {
        self.protected_stacks.contains(id)
    }
}
