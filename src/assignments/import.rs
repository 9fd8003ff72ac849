// src/assignments/import.rs
// =============================================================================
// The assignment lifecycle: import from GitHub, read the entry page back,
// delete.
//
// Import order:
// 1. Parse the URL (fails fast on a bad URL, nothing is written)
// 2. List the repository tree (resolves the default branch if needed)
// 3. Create the assignment record
// 4. Download every file into storage/<id>/original/
// 5. Pick the entry file and record it
//
// If a download fails at step 4 the import stops right there. The record
// from step 3 stays, without an entry path, next to whatever files were
// already written. Nothing is rolled back.
// =============================================================================

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::store::{Assignment, NewAssignment};
use crate::error::{AppError, AppResult};
use crate::github::{resolve_reference, RepoFile};
use crate::render::pick_entry;
use crate::state::AppState;

/// Body of an import request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject_area: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Imports a GitHub repository as a new assignment.
pub async fn import_repository(state: &AppState, request: ImportRequest) -> AppResult<Assignment> {
    let github_url = request
        .github_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("github_url is required".to_string()))?;

    let reference = resolve_reference(github_url)?;
    let listing = state.github.fetch_files(&reference).await?;

    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| reference.name.clone());

    let assignment = state.store.create(NewAssignment {
        title,
        description: request.description,
        subject_area: request.subject_area,
        tags: request.tags,
        github_url: Some(github_url.to_string()),
        github_branch: Some(listing.branch.clone()),
    })?;

    info!(
        id = assignment.id,
        repo = %reference,
        branch = %listing.branch,
        files = listing.files.len(),
        "importing repository"
    );

    if let Err(e) = download_into_storage(state, assignment.id, &listing.files).await {
        error!(id = assignment.id, error = %e, "import aborted; assignment left without entry file");
        return Err(e);
    }

    let paths = listing.paths();
    match pick_entry(paths.as_slice()) {
        Some(entry) => {
            info!(id = assignment.id, %entry, "import finished");
            state.store.set_entry_path(assignment.id, &entry)
        }
        None => {
            warn!(id = assignment.id, "import finished, but the repository has no HTML entry file");
            Ok(assignment)
        }
    }
}

// Downloads run through an ordered stream at most `download_concurrency`
// wide. Returning early on the first error drops the stream, which cancels
// whatever downloads were still in flight.
async fn download_into_storage(
    state: &AppState,
    assignment_id: u64,
    files: &[RepoFile],
) -> AppResult<()> {
    // Each future owns its file and a client handle. Futures that borrow from
    // the slice can't be spawned or used as an axum handler.
    let mut downloads = stream::iter(files.to_vec())
        .map(|file| {
            let github = state.github.clone();
            async move {
                let bytes = github.download(&file.download_url).await?;
                Ok::<_, AppError>((file, bytes))
            }
        })
        .buffered(state.download_concurrency.max(1));

    while let Some(result) = downloads.next().await {
        let (file, bytes) = result?;
        state
            .storage
            .save_file(assignment_id, &file.path, &bytes)
            .await?;
    }

    Ok(())
}

/// Reads the stored entry page of an assignment.
pub async fn read_entry_html(state: &AppState, assignment_id: u64) -> AppResult<String> {
    let assignment = state
        .store
        .get(assignment_id)
        .ok_or(AppError::AssignmentNotFound(assignment_id))?;
    let entry = assignment.file_path.ok_or(AppError::EntryNotFound)?;

    let path = state.storage.entry_file(assignment_id, &entry)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(id = assignment_id, path = %path.display(), "entry file missing on disk");
            Err(AppError::EntryNotFound)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes an assignment's stored files, then its record.
pub async fn delete_assignment(state: &AppState, assignment_id: u64) -> AppResult<Assignment> {
    if state.store.get(assignment_id).is_none() {
        return Err(AppError::AssignmentNotFound(assignment_id));
    }

    state.storage.delete_assignment_files(assignment_id).await?;
    let removed = state.store.delete(assignment_id)?;

    info!(id = assignment_id, "deleted assignment");
    Ok(removed)
}
