//! One reconciliation pass: plan, then purge, then delete.
//!
//! ```text
//! INVENTORY_COLLECTED → BRANCHES_COLLECTED → DELETION_SET_COMPUTED
//!     ├─ (empty) terminal
//!     └─ PURGING → DELETING → DONE
//! ```
//!
//! Nothing is mutated before `PURGING`. No state survives the run; a failed
//! run is retried from the start.

use crate::delete::delete_all;
use crate::error::Result;
use crate::inventory::{read_inventory, StackInventory};
use crate::platform::{BranchSet, BranchSource, ObjectStore, StackPlatform};
use crate::policy::ProtectionPolicy;
use crate::purge::purge_all;
use crate::reconcile::{reconcile, DeletionSet};
use std::fmt;
use std::io::Write;
use tracing::info;

// ---------------------------------------------------------------------------
// RunPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    InventoryCollected,
    BranchesCollected,
    DeletionSetComputed,
    Purging,
    Deleting,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::InventoryCollected => "inventory_collected",
            RunPhase::BranchesCollected => "branches_collected",
            RunPhase::DeletionSetComputed => "deletion_set_computed",
            RunPhase::Purging => "purging",
            RunPhase::Deleting => "deleting",
            RunPhase::Done => "done",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Everything gathered before the first destructive call.
#[derive(Debug, Clone)]
pub struct Plan {
    pub inventory: StackInventory,
    pub live_branches: BranchSet,
    pub deletion: DeletionSet,
}

/// List the stacks about to be torn down.
pub fn write_deletion_set(out: &mut impl Write, stacks: &DeletionSet) -> std::io::Result<()> {
    writeln!(out, "Deleting stacks:")?;
    for stack in stacks.iter() {
        writeln!(out, "  - {stack}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sweeper
// ---------------------------------------------------------------------------

pub struct Sweeper<'a, P, S, B> {
    platform: &'a P,
    store: &'a S,
    branches: &'a B,
    policy: &'a ProtectionPolicy,
}

impl<'a, P, S, B> Sweeper<'a, P, S, B>
where
    P: StackPlatform,
    S: ObjectStore,
    B: BranchSource,
{
    pub fn new(
        platform: &'a P,
        store: &'a S,
        branches: &'a B,
        policy: &'a ProtectionPolicy,
    ) -> Self {
        Self {
            platform,
            store,
            branches,
            policy,
        }
    }

    /// Collect inventory and branches and compute the deletion set.
    pub fn plan(&self, repo: &str) -> Result<Plan> {
        let inventory = read_inventory(self.platform)?;
        info!(phase = %RunPhase::InventoryCollected, stacks = inventory.len());

        let live_branches = self.branches.branches(repo)?;
        info!(phase = %RunPhase::BranchesCollected, repo, branches = live_branches.len());

        let deletion = reconcile(&inventory, &live_branches, self.policy);
        info!(phase = %RunPhase::DeletionSetComputed, to_delete = deletion.len());

        Ok(Plan {
            inventory,
            live_branches,
            deletion,
        })
    }

    /// Empty every bucket, then request every stack deletion.
    ///
    /// Returns the stacks whose deletion was accepted. An empty set makes no
    /// platform calls at all.
    pub fn execute(&self, deletion: DeletionSet) -> Result<Vec<String>> {
        if deletion.is_empty() {
            return Ok(Vec::new());
        }

        info!(phase = %RunPhase::Purging, stacks = deletion.len());
        let purged = purge_all(self.platform, self.store, deletion)?;

        info!(phase = %RunPhase::Deleting, stacks = purged.stacks().len());
        let accepted = delete_all(self.platform, purged)?;

        info!(phase = %RunPhase::Done, deleted = accepted.len());
        Ok(accepted)
    }

    /// Plan, report the deletion set to `out`, then tear down.
    ///
    /// The report is written and flushed before the first destructive call.
    pub fn run(&self, repo: &str, out: &mut impl Write) -> Result<Vec<String>> {
        let plan = self.plan(repo)?;
        if plan.deletion.is_empty() {
            writeln!(out, "Found no stacks to delete")?;
            return Ok(Vec::new());
        }

        write_deletion_set(out, &plan.deletion)?;
        out.flush()?;

        let accepted = self.execute(plan.deletion)?;
        writeln!(out, "Requested deletion of {} stack(s)", accepted.len())?;
        Ok(accepted)
    }
}
