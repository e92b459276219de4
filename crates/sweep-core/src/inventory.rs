use crate::error::Result;
use crate::platform::{StackPlatform, StackSummary};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const BRANCH_TAG: &str = "branch";

/// A deployed stack that carries a branch tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRecord {
    pub branch: String,
    pub stack: String,
}

/// branch → stack identifier
pub type StackInventory = BTreeMap<String, String>;

/// Extract the record for one stack. The first `branch` tag wins; stacks
/// without one yield `None`.
pub fn stack_record(summary: &StackSummary) -> Option<StackRecord> {
    summary
        .tags
        .iter()
        .find(|(key, _)| key == BRANCH_TAG)
        .map(|(_, value)| StackRecord {
            branch: value.clone(),
            stack: summary.name.clone(),
        })
}

pub fn build_inventory<'a, I>(stacks: I) -> StackInventory
where
    I: IntoIterator<Item = &'a StackSummary>,
{
    let mut inventory = StackInventory::new();
    for summary in stacks {
        let Some(record) = stack_record(summary) else {
            debug!(stack = %summary.name, "no branch tag, ignoring");
            continue;
        };
        if let Some(previous) = inventory.insert(record.branch.clone(), record.stack.clone()) {
            warn!(
                branch = %record.branch,
                replaced = %previous,
                kept = %record.stack,
                "several stacks tag the same branch; keeping the last one"
            );
        }
    }
    inventory
}

/// Read every stack in the region and map branch names to stack identifiers.
pub fn read_inventory(platform: &impl StackPlatform) -> Result<StackInventory> {
    let stacks = platform.list_stacks()?;
    Ok(build_inventory(&stacks))
}
