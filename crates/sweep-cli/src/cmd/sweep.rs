use anyhow::Context;
use std::path::PathBuf;
use sweep_core::{aws::AwsPlatform, github, ProtectionPolicy, Sweeper};

pub const POLICY_ENV: &str = "STACK_SWEEP_POLICY";

fn load_policy() -> anyhow::Result<ProtectionPolicy> {
    match std::env::var_os(POLICY_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            ProtectionPolicy::load(&path).with_context(|| {
                format!("failed to load {POLICY_ENV} policy from {}", path.display())
            })
        }
        None => Ok(ProtectionPolicy::default()),
    }
}

/// `stack-sweep <repo>` — delete every stack whose branch is gone from `repo`.
///
/// Credentials and policy are resolved before any cloud call, so a
/// misconfigured run fails without touching the account.
pub fn run(repo: &str, region: &str) -> anyhow::Result<()> {
    github::validate_repo(repo)?;
    let branches = github::GitHubClient::from_env().context("cannot list branches")?;
    let policy = load_policy()?;
    let aws = AwsPlatform::connect(region)
        .with_context(|| format!("failed to set up AWS clients for {region}"))?;

    let sweeper = Sweeper::new(&aws, &aws, &branches, &policy);
    sweeper
        .run(repo, &mut std::io::stdout().lock())
        .with_context(|| format!("sweep of '{repo}' in {region} aborted"))?;
    Ok(())
}
