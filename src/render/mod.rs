// src/render/mod.rs
// =============================================================================
// Deciding what to show for a repository, and showing it.
//
// Submodules:
// - entry: picks the HTML file that represents a repository
// - rewrite: points relative asset links at the raw content host
// - live: fetch + pick + rewrite, for browsing a branch without importing
// =============================================================================

mod entry;
mod live;
mod rewrite;

pub use entry::pick_entry;
pub use live::render_live;
