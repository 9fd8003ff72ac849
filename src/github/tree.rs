// src/github/tree.rs
// =============================================================================
// Types for GitHub's recursive tree listing, plus the filter that decides
// which entries are worth downloading.
//
// GitHub returns every object in the tree: files ("blob"), directories
// ("tree") and submodules ("commit"). Only blobs become files. Hidden paths
// and a couple of well-known junk files are skipped too.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Filenames we never import, matched as exact path suffixes
pub const IGNORED_SUFFIXES: &[&str] = &[".gitignore", ".DS_Store"];

/// What a tree entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    /// Directories, submodules, anything else GitHub may add later
    #[serde(other)]
    Other,
}

/// One item of `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
}

/// The body of a tree listing; `truncated` is set when GitHub gave up early
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// A file we intend to download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoFile {
    pub path: String,
    pub size: u64,
    pub download_url: String,
}

/// The files of a repository at one branch
#[derive(Debug, Clone, Serialize)]
pub struct RepoListing {
    pub files: Vec<RepoFile>,
    /// The branch actually listed (the default branch if none was given)
    pub branch: String,
}

impl RepoListing {
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Returns true for entries we skip: hidden top-level paths and denylisted files
pub fn is_ignored(path: &str) -> bool {
    path.starts_with('.') || IGNORED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Keeps the blobs worth importing, in listing order.
///
/// `raw_prefix` is the repository's raw-content prefix ending in a slash;
/// each path is appended as-is, without percent-encoding.
pub fn retain_files(entries: Vec<TreeEntry>, raw_prefix: &str) -> Vec<RepoFile> {
    entries
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::Blob)
        .filter(|entry| !is_ignored(&entry.path))
        .map(|entry| RepoFile {
            download_url: format!("{}{}", raw_prefix, entry.path),
            path: entry.path,
            size: entry.size,
        })
        .collect()
}
