// src/github/fetch.rs
// =============================================================================
// Talks to GitHub: repository metadata, branches, recursive trees and raw
// file contents.
//
// Strategy:
// - The REST API (api.github.com) tells us the default branch, the branch
//   list and the full file tree in one recursive call
// - raw.githubusercontent.com serves the bytes of each file
// - Every call either succeeds or fails with UpstreamUnavailable; there are
//   no retries, the caller decides what to do
//
// The client owns its configuration (hosts, token, deadlines) instead of
// reading globals, so tests can aim it at a wiremock server.
// =============================================================================

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::reference::RepositoryRef;
use super::tree::{retain_files, RepoListing, TreeResponse};
use crate::config::GithubConfig;
use crate::error::{AppError, AppResult};

/// Files above this size are expected to be rare; we warn but still download
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// GitHub rejects API calls without a User-Agent
const USER_AGENT_VALUE: &str = concat!("edu-importer/", env!("CARGO_PKG_VERSION"));

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Branches are listed in a single page of this size
const BRANCH_PAGE_SIZE: &str = "100";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
}

/// What the branch picker needs: every branch plus the one to preselect
#[derive(Debug, Clone, Serialize)]
pub struct BranchListing {
    pub branches: Vec<Branch>,
    pub default_branch: String,
}

#[derive(Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

/// HTTP client for the GitHub API and raw content host
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> AppResult<Self> {
        let http = Client::builder().user_agent(USER_AGENT_VALUE).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Asks GitHub which branch a repository uses by default
    pub async fn default_branch(&self, reference: &RepositoryRef) -> AppResult<String> {
        let url = self.api_url(&["repos", &reference.owner, &reference.name])?;
        let info: RepositoryInfo = self
            .send(self.api_get(url, self.config.metadata_timeout))
            .await?
            .json()
            .await?;

        debug!(repo = %reference, branch = %info.default_branch, "resolved default branch");
        Ok(info.default_branch)
    }

    /// The reference's branch if it has one, otherwise the default branch
    pub async fn resolve_branch(&self, reference: &RepositoryRef) -> AppResult<String> {
        match &reference.branch {
            Some(branch) => Ok(branch.clone()),
            None => self.default_branch(reference).await,
        }
    }

    /// Lists up to 100 branch names
    pub async fn list_branches(&self, reference: &RepositoryRef) -> AppResult<Vec<Branch>> {
        let mut url = self.api_url(&["repos", &reference.owner, &reference.name, "branches"])?;
        url.query_pairs_mut().append_pair("per_page", BRANCH_PAGE_SIZE);

        let branches: Vec<Branch> = self
            .send(self.api_get(url, self.config.metadata_timeout))
            .await?
            .json()
            .await?;

        Ok(branches)
    }

    /// Branch list and default branch together, as the branch picker wants them
    pub async fn branch_listing(&self, reference: &RepositoryRef) -> AppResult<BranchListing> {
        let branches = self.list_branches(reference).await?;
        let default_branch = self.default_branch(reference).await?;
        Ok(BranchListing {
            branches,
            default_branch,
        })
    }

    /// Lists every importable file of the repository in one recursive call.
    ///
    /// Resolves the default branch first when the reference has none; the
    /// branch actually used is returned alongside the files.
    pub async fn fetch_files(&self, reference: &RepositoryRef) -> AppResult<RepoListing> {
        let branch = self.resolve_branch(reference).await?;

        let mut url = self.api_url(&[
            "repos",
            &reference.owner,
            &reference.name,
            "git",
            "trees",
            &branch,
        ])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let listing: TreeResponse = self
            .send(self.api_get(url, self.config.transfer_timeout))
            .await?
            .json()
            .await?;

        if listing.truncated {
            warn!(repo = %reference, %branch, "tree listing was truncated by GitHub; some files will be missing");
        }

        let raw_prefix = reference.raw_prefix(&self.config.raw_base, &branch);
        let files = retain_files(listing.tree, &raw_prefix);

        for file in files.iter().filter(|f| f.size > MAX_FILE_SIZE) {
            warn!(path = %file.path, size = file.size, "file exceeds the 5 MB soft limit");
        }

        info!(repo = %reference, %branch, files = files.len(), "listed repository tree");
        Ok(RepoListing { files, branch })
    }

    /// Downloads the raw bytes behind `url`. Any non-2xx status is an error.
    pub async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        let mut request = self.http.get(url).timeout(self.config.transfer_timeout);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let bytes = self.send(request).await?.bytes().await?;
        debug!(url, bytes = bytes.len(), "downloaded file");
        Ok(bytes.to_vec())
    }

    // Builds `{api_base}/seg/seg/...`. Each segment is pushed separately so
    // owner, repo and branch names are escaped correctly.
    fn api_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.api_base).map_err(|e| {
            AppError::UpstreamUnavailable(format!(
                "invalid API base '{}': {}",
                self.config.api_base, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                AppError::UpstreamUnavailable(format!(
                    "API base '{}' cannot take a path",
                    self.config.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn api_get(&self, url: Url, timeout: Duration) -> RequestBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));

        let mut request = self.http.get(url).headers(headers).timeout(timeout);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        request
    }

    // Sends a request and turns non-2xx answers into UpstreamUnavailable,
    // keeping GitHub's own message when it sent one.
    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);

        Err(AppError::UpstreamUnavailable(format!(
            "HTTP {} for {}: {}",
            status, url, detail
        )))
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why one recursive tree call instead of walking directories?
//    - `?recursive=1` returns the whole tree in a single round trip
//    - Very large repositories come back with `truncated: true`; we log it
//      and import what we got rather than paging through subtrees
//
// 2. Why send the token to raw.githubusercontent.com too?
//    - Private repositories need it there as well as on the API
//
// 3. Why is there no retry?
//    - An import that half-fails should fail loudly; the user can run it
//      again. Rate limits and auth errors surface as UpstreamUnavailable.
// -----------------------------------------------------------------------------
