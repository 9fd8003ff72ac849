// src/github/reference.rs
// =============================================================================
// Turns a user-supplied GitHub URL into (owner, repo, branch).
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo/tree/branch
//   - either of the above with a trailing slash or a .git suffix
//
// The branch is optional. When it's missing we leave it as None and let
// the fetcher ask GitHub for the default branch later (see fetch.rs).
// Nothing here touches the network, so a URL for a repository that doesn't
// exist still parses fine; we find out when we try to list its tree.
// =============================================================================

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{AppError, AppResult};

// Unanchored on purpose: "www.github.com/..." and "git@github.com/..." style
// strings match too, and anything after the branch segment is ignored.
static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)(?:/tree/([^/]+))?")
        .expect("repository URL pattern is valid")
});

/// A repository on GitHub, optionally pinned to a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    /// None means "whatever the default branch is"
    pub branch: Option<String>,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        self.branch = if branch.is_empty() { None } else { Some(branch) };
        self
    }

    /// Prefix every file of this repository shares on the raw content host.
    ///
    /// Example: `https://raw.githubusercontent.com/acme/demo/main/`
    pub fn raw_prefix(&self, raw_base: &str, branch: &str) -> String {
        format!(
            "{}/{}/{}/{}/",
            raw_base.trim_end_matches('/'),
            self.owner,
            self.name,
            branch
        )
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "{}/{}@{}", self.owner, self.name, branch),
            None => write!(f, "{}/{}", self.owner, self.name),
        }
    }
}

/// Parses a GitHub repository URL.
///
/// Fails with [`AppError::MalformedReference`] when the string doesn't look
/// like `github.com/<owner>/<repo>[/tree/<branch>]`.
pub fn resolve_reference(url: &str) -> AppResult<RepositoryRef> {
    let trimmed = url.trim();
    let trimmed = trimmed.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let captures = REPO_URL
        .captures(trimmed)
        .ok_or_else(|| AppError::MalformedReference(trimmed.to_string()))?;

    // Both groups are `[^/]+`, so they're never empty when the pattern matches
    let owner = &captures[1];
    let name = &captures[2];
    let branch = captures.get(3).map(|m| m.as_str()).unwrap_or("");

    Ok(RepositoryRef::new(owner, name).with_branch(branch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_and_repo() {
        let r = resolve_reference("https://github.com/rust-lang/rust").unwrap();
        assert_eq!(r.owner, "rust-lang");
        assert_eq!(r.name, "rust");
        assert_eq!(r.branch, None);
    }

    #[test]
    fn test_parse_with_git_suffix_and_trailing_slash() {
        for url in [
            "https://github.com/user/repo.git",
            "https://github.com/user/repo/",
            "https://github.com/user/repo.git//",
            "https://github.com/user/repo///",
            "github.com/user/repo",
            "http://www.github.com/user/repo",
        ] {
            let r = resolve_reference(url).unwrap();
            assert_eq!((r.owner.as_str(), r.name.as_str()), ("user", "repo"), "{}", url);
            assert_eq!(r.branch, None, "{}", url);
        }
    }

    #[test]
    fn test_parse_tree_branch() {
        let r = resolve_reference("https://github.com/acme/demo/tree/gh-pages/").unwrap();
        assert_eq!(r.owner, "acme");
        assert_eq!(r.name, "demo");
        assert_eq!(r.branch.as_deref(), Some("gh-pages"));
    }

    #[test]
    fn test_branch_is_single_segment() {
        let r = resolve_reference("https://github.com/acme/demo/tree/feature/login").unwrap();
        assert_eq!(r.branch.as_deref(), Some("feature"));
    }

    #[test]
    fn test_parse_invalid_url() {
        for url in [
            "https://gitlab.com/user/repo",
            "https://github.com/user",
            "not a url",
            "",
        ] {
            let err = resolve_reference(url).unwrap_err();
            assert!(matches!(err, AppError::MalformedReference(_)), "{}", url);
        }
    }

    #[test]
    fn test_raw_prefix() {
        let r = RepositoryRef::new("o", "r");
        assert_eq!(
            r.raw_prefix("https://raw.githubusercontent.com/", "main"),
            "https://raw.githubusercontent.com/o/r/main/"
        );
    }
}
