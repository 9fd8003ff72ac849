// src/github/mod.rs
// =============================================================================
// This module handles everything that talks to GitHub.
//
// - reference: parsing GitHub URLs into owner/repo/branch
// - tree: the recursive tree listing and the file filter
// - fetch: the HTTP client (default branch, branches, tree, raw downloads)
// =============================================================================

mod fetch;
mod reference;
mod tree;

pub use fetch::{BranchListing, GithubClient};
pub use reference::{resolve_reference, RepositoryRef};
pub use tree::RepoFile;
