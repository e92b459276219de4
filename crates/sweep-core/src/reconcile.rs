use crate::inventory::StackInventory;
use crate::platform::BranchSet;
use crate::policy::ProtectionPolicy;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// DeletionSet
// ---------------------------------------------------------------------------

/// Stack identifiers chosen for teardown in this run. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSet(BTreeSet<String>);

impl DeletionSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, stack: &str) -> bool {
        self.0.contains(stack)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DeletionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// reconcile
// ---------------------------------------------------------------------------

/// Stacks whose branch is gone and that the policy does not protect.
pub fn reconcile(
    inventory: &StackInventory,
    live_branches: &BranchSet,
    policy: &ProtectionPolicy,
) -> DeletionSet {
    inventory
        .iter()
        .filter(|(branch, stack)| {
            !(live_branches.contains(*branch)
                || policy.is_protected_branch(branch)
                || policy.is_protected_stack(stack))
        })
        .map(|(_, stack)| stack.clone())
        .collect()
}
