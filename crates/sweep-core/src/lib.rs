pub mod aws;
pub mod delete;
pub mod error;
pub mod github;
pub mod inventory;
pub mod platform;
pub mod policy;
pub mod purge;
pub mod reconcile;
pub mod sweep;

#[cfg(test)]
mod fakes;

pub use error::{Result, SweepError};
pub use policy::ProtectionPolicy;
pub use reconcile::DeletionSet;
pub use sweep::{Plan, RunPhase, Sweeper};
