// src/storage.rs
// =============================================================================
// On-disk layout for imported files:
//
//   <storage_root>/<assignment_id>/original/<path as in the repository>
//
// Files are written once, during import, and the whole <assignment_id>
// directory is removed when the assignment is deleted. Nothing here ever
// edits a file in place.
// =============================================================================

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::AppResult;

/// Subdirectory holding the files exactly as they came from the repository
pub const ORIGINAL_DIR: &str = "original";

#[derive(Debug, Clone)]
pub struct AssignmentStorage {
    root: PathBuf,
}

impl AssignmentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the storage root if it doesn't exist yet
    pub async fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn assignment_dir(&self, assignment_id: u64) -> PathBuf {
        self.root.join(assignment_id.to_string())
    }

    pub fn original_dir(&self, assignment_id: u64) -> PathBuf {
        self.assignment_dir(assignment_id).join(ORIGINAL_DIR)
    }

    /// Writes one imported file, creating parent directories as needed.
    pub async fn save_file(
        &self,
        assignment_id: u64,
        relative_path: &str,
        content: &[u8],
    ) -> AppResult<PathBuf> {
        let dest = self.entry_file(assignment_id, relative_path)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&dest, content).await?;

        debug!(assignment_id, path = relative_path, bytes = content.len(), "stored file");
        Ok(dest)
    }

    /// Location of a stored file; the file itself may not exist.
    ///
    /// Rejects absolute paths and `..` so a repository path can never point
    /// outside the assignment's directory.
    pub fn entry_file(&self, assignment_id: u64, relative_path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(relative_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if relative_path.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to store outside the assignment directory: {}", relative_path),
            )
            .into());
        }

        Ok(self.original_dir(assignment_id).join(relative))
    }

    /// Removes everything stored for an assignment. Missing directories are fine.
    pub async fn delete_assignment_files(&self, assignment_id: u64) -> AppResult<()> {
        match fs::remove_dir_all(self.assignment_dir(assignment_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
