// src/assignments/mod.rs
// =============================================================================
// Assignments: the ledger of records and the import/delete workflow that
// fills it from GitHub.
// =============================================================================

mod import;
mod store;

pub use import::{delete_assignment, import_repository, read_entry_html, ImportRequest};
pub use store::{Assignment, AssignmentFilter, AssignmentStore, AssignmentUpdate};
