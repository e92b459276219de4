use crate::error::{Result, SweepError};
use crate::platform::StackPlatform;
use crate::purge::PurgedSet;
use tracing::{error, info};

/// Request deletion of every purged stack, in order.
///
/// The first rejected request is logged and returned as
/// [`SweepError::DeleteFailed`]; the remaining stacks are left alone.
/// Returns the stacks whose deletion was accepted.
pub fn delete_all(platform: &impl StackPlatform, purged: PurgedSet) -> Result<Vec<String>> {
    let mut accepted = Vec::with_capacity(purged.stacks().len());
    for stack in purged.stacks().iter() {
        if let Err(e) = platform.delete_stack(stack) {
            error!(stack, error = %e, "failed to delete stack");
            return Err(SweepError::DeleteFailed {
                stack: stack.to_string(),
                source: Box::new(e),
            });
        }
        info!(stack, "stack deletion requested");
        accepted.push(stack.to_string());
    }
    Ok(accepted)
}
