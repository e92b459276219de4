//! Branch listing over the GitHub REST API.

use crate::error::{Result, SweepError};
use crate::platform::{BranchSet, BranchSource};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_URL_ENV: &str = "GITHUB_API_URL";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SweepError::Auth(format!("{TOKEN_ENV} is empty")));
        }
        let http = Client::builder()
            .user_agent(concat!("stack-sweep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SweepError::service("GitHub client", e.to_string()))?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build a client from `GITHUB_TOKEN` and, if set, `GITHUB_API_URL`.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| SweepError::Auth(format!("{TOKEN_ENV} is not set")))?;
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(api_url, token)
    }

    fn fetch_page(&self, repo: &str, page: usize) -> Result<Vec<Branch>> {
        let url = format!("{}/repos/{repo}/branches", self.api_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("per_page", PER_PAGE), ("page", page)])
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .map_err(|e| SweepError::service("list branches", e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SweepError::Auth(format!(
                "GitHub rejected the token ({})",
                resp.status()
            ))),
            StatusCode::NOT_FOUND => Err(SweepError::RepoNotFound(repo.to_string())),
            status if !status.is_success() => Err(SweepError::service(
                "list branches",
                format!("unexpected status {status}"),
            )),
            _ => resp
                .json::<Vec<Branch>>()
                .map_err(|e| SweepError::service("list branches", e.to_string())),
        }
    }
}

/// Check that `repo` looks like `owner/name`.
pub fn validate_repo(repo: &str) -> Result<()> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(SweepError::Config(format!(
            "repository must be 'owner/name', got '{repo}'"
        ))),
    }
}

impl BranchSource for GitHubClient {
    fn branches(&self, repo: &str) -> Result<BranchSet> {
        validate_repo(repo)?;
        let mut branches = BranchSet::new();
        let mut page = 1;
        loop {
            let batch = self.fetch_page(repo, page)?;
            debug!(repo, page, count = batch.len(), "fetched branch page");
            let done = batch.len() < PER_PAGE;
            branches.extend(batch.into_iter().map(|b| b.name));
            if done {
                break;
            }
            page += 1;
        }
        Ok(branches)
    }
}
