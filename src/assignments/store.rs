// src/assignments/store.rs
// =============================================================================
// The assignment ledger: a JSON file with every assignment record.
//
// The whole ledger is kept in memory behind a mutex and written back after
// each change. Ids are handed out from a counter that never goes backwards,
// so a deleted assignment's id (and its storage directory name) is never
// reused.
// =============================================================================

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub subject_area: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub github_url: Option<String>,
    pub github_branch: Option<String>,
    /// Entry file, relative to the assignment's stored files
    pub file_path: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when an assignment is created
#[derive(Debug, Clone, Default)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub subject_area: Option<String>,
    pub tags: Vec<String>,
    pub github_url: Option<String>,
    pub github_branch: Option<String>,
}

/// Partial edit of an assignment; `None` leaves a field as it is
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssignmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject_area: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl AssignmentUpdate {
    fn apply(self, assignment: &mut Assignment) {
        if let Some(title) = self.title {
            assignment.title = title;
        }
        if let Some(description) = self.description {
            assignment.description = Some(description);
        }
        if let Some(subject_area) = self.subject_area {
            assignment.subject_area = Some(subject_area);
        }
        if let Some(tags) = self.tags {
            assignment.tags = tags;
        }
        if let Some(is_published) = self.is_published {
            assignment.is_published = is_published;
        }
    }
}

/// Listing filters; the defaults match the public assignment list
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssignmentFilter {
    pub search: Option<String>,
    pub subject_area: Option<String>,
    pub published_only: bool,
    pub skip: usize,
    pub limit: usize,
}

impl Default for AssignmentFilter {
    fn default() -> Self {
        Self {
            search: None,
            subject_area: None,
            published_only: true,
            skip: 0,
            limit: 50,
        }
    }
}

impl AssignmentFilter {
    fn matches(&self, assignment: &Assignment) -> bool {
        if self.published_only && !assignment.is_published {
            return false;
        }
        if let Some(subject) = &self.subject_area {
            if assignment.subject_area.as_ref() != Some(subject) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            // ASCII case folding, the same as an SQL LIKE match
            let needle = needle.to_ascii_lowercase();
            let in_title = assignment.title.to_ascii_lowercase().contains(&needle);
            let in_description = assignment
                .description
                .as_deref()
                .is_some_and(|d| d.to_ascii_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Ledger {
    next_id: u64,
    assignments: Vec<Assignment>,
}

#[derive(Debug)]
pub struct AssignmentStore {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl AssignmentStore {
    /// Loads the ledger at `path`, or starts an empty one if the file doesn't exist.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let ledger = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ledger {
                next_id: 1,
                assignments: Vec::new(),
            },
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
        })
    }

    pub fn create(&self, new: NewAssignment) -> AppResult<Assignment> {
        let assignment = self.commit(|ledger| {
            let now = Utc::now();
            let assignment = Assignment {
                id: ledger.next_id.max(1),
                title: new.title,
                description: new.description,
                subject_area: new.subject_area,
                tags: new.tags,
                github_url: new.github_url,
                github_branch: new.github_branch,
                file_path: None,
                is_published: true,
                created_at: now,
                updated_at: now,
            };

            ledger.next_id = assignment.id + 1;
            ledger.assignments.push(assignment.clone());
            Ok(assignment)
        })?;

        debug!(id = assignment.id, title = %assignment.title, "created assignment");
        Ok(assignment)
    }

    pub fn get(&self, id: u64) -> Option<Assignment> {
        self.lock().assignments.iter().find(|a| a.id == id).cloned()
    }

    /// Newest first, filtered, then paged with skip/limit
    pub fn list(&self, filter: &AssignmentFilter) -> Vec<Assignment> {
        let ledger = self.lock();
        let mut matching: Vec<_> = ledger
            .assignments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching
            .into_iter()
            .skip(filter.skip)
            .take(filter.limit)
            .collect()
    }

    /// Applies a partial edit and bumps `updated_at`
    pub fn update(&self, id: u64, update: AssignmentUpdate) -> AppResult<Assignment> {
        let updated = self.commit(|ledger| {
            let assignment = find_mut(ledger, id)?;
            update.apply(assignment);
            assignment.updated_at = Utc::now();
            Ok(assignment.clone())
        })?;

        debug!(id, published = updated.is_published, "updated assignment");
        Ok(updated)
    }

    /// Records the entry file chosen for an assignment
    pub fn set_entry_path(&self, id: u64, file_path: &str) -> AppResult<Assignment> {
        self.commit(|ledger| {
            let assignment = find_mut(ledger, id)?;
            assignment.file_path = Some(file_path.to_string());
            assignment.updated_at = Utc::now();
            Ok(assignment.clone())
        })
    }

    pub fn delete(&self, id: u64) -> AppResult<Assignment> {
        self.commit(|ledger| {
            let index = ledger
                .assignments
                .iter()
                .position(|a| a.id == id)
                .ok_or(AppError::AssignmentNotFound(id))?;
            Ok(ledger.assignments.remove(index))
        })
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // The ledger is only replaced after a successful write, so a poisoned
        // guard still holds what is on disk
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Changes are made on a copy. The in-memory ledger is swapped only once
    // the copy is on disk, so a failed write changes nothing.
    fn commit<T>(&self, change: impl FnOnce(&mut Ledger) -> AppResult<T>) -> AppResult<T> {
        let mut ledger = self.lock();
        let mut draft = ledger.clone();
        let result = change(&mut draft)?;
        self.persist(&draft)?;
        *ledger = draft;
        Ok(result)
    }

    // Write to a sibling temp file, then rename over the ledger
    fn persist(&self, ledger: &Ledger) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(ledger)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn find_mut(ledger: &mut Ledger, id: u64) -> AppResult<&mut Assignment> {
    ledger
        .assignments
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(AppError::AssignmentNotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_assignment(title: &str) -> NewAssignment {
        NewAssignment {
            title: title.to_string(),
            ..NewAssignment::default()
        }
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssignmentStore::open(dir.path().join("assignments.json")).unwrap();

        let a = store.create(new_assignment("First")).unwrap();
        let b = store.create(new_assignment("Second")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.is_published);
        assert_eq!(a.file_path, None);
    }

    #[test]
    fn test_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/assignments.json");

        {
            let store = AssignmentStore::open(&path).unwrap();
            let a = store.create(new_assignment("Kept")).unwrap();
            store.set_entry_path(a.id, "index.html").unwrap();
        }

        let store = AssignmentStore::open(&path).unwrap();
        let a = store.get(1).unwrap();
        assert_eq!(a.title, "Kept");
        assert_eq!(a.file_path.as_deref(), Some("index.html"));
    }

    #[test]
    fn test_deleted_ids_are_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssignmentStore::open(dir.path().join("assignments.json")).unwrap();

        let a = store.create(new_assignment("Gone")).unwrap();
        store.delete(a.id).unwrap();
        let b = store.create(new_assignment("New")).unwrap();

        assert_eq!(b.id, 2);
        assert!(store.get(a.id).is_none());
        assert!(matches!(store.delete(a.id), Err(AppError::AssignmentNotFound(1))));
    }

    #[test]
    fn test_list_filters_and_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssignmentStore::open(dir.path().join("assignments.json")).unwrap();

        store
            .create(NewAssignment {
                title: "Flexbox basics".to_string(),
                subject_area: Some("web".to_string()),
                ..NewAssignment::default()
            })
            .unwrap();
        store
            .create(NewAssignment {
                title: "Sorting".to_string(),
                description: Some("Bubble sort in the browser".to_string()),
                subject_area: Some("algorithms".to_string()),
                ..NewAssignment::default()
            })
            .unwrap();

        let all = store.list(&AssignmentFilter::default());
        let titles: Vec<_> = all.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Sorting", "Flexbox basics"]);

        let web = store.list(&AssignmentFilter {
            subject_area: Some("web".to_string()),
            ..AssignmentFilter::default()
        });
        assert_eq!(web.len(), 1);

        let searched = store.list(&AssignmentFilter {
            search: Some("browser".to_string()),
            ..AssignmentFilter::default()
        });
        assert_eq!(searched[0].title, "Sorting");

        let folded = store.list(&AssignmentFilter {
            search: Some("flexbox".to_string()),
            ..AssignmentFilter::default()
        });
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].title, "Flexbox basics");

        let paged = store.list(&AssignmentFilter {
            skip: 1,
            limit: 1,
            ..AssignmentFilter::default()
        });
        assert_eq!(paged[0].title, "Flexbox basics");
    }

    #[test]
    fn test_update_unpublishes_and_hides_from_default_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssignmentStore::open(dir.path().join("assignments.json")).unwrap();
        let a = store.create(new_assignment("Draft")).unwrap();

        let updated = store
            .update(
                a.id,
                AssignmentUpdate {
                    title: Some("Draft v2".to_string()),
                    tags: Some(vec!["css".to_string()]),
                    is_published: Some(false),
                    ..AssignmentUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Draft v2");
        assert_eq!(updated.tags, vec!["css"]);
        assert!(!updated.is_published);
        assert!(updated.updated_at >= a.updated_at);
        assert_eq!(updated.created_at, a.created_at);

        assert!(store.list(&AssignmentFilter::default()).is_empty());
        let everything = store.list(&AssignmentFilter {
            published_only: false,
            ..AssignmentFilter::default()
        });
        assert_eq!(everything.len(), 1);

        assert!(matches!(
            store.update(99, AssignmentUpdate::default()),
            Err(AppError::AssignmentNotFound(99))
        ));
    }

    #[test]
    fn test_failed_write_leaves_ledger_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assignments.json");
        let store = AssignmentStore::open(&path).unwrap();
        let kept = store.create(new_assignment("Kept")).unwrap();

        // A directory where the temp file goes makes every write fail
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        assert!(store.create(new_assignment("Lost")).is_err());
        assert!(store.get(2).is_none());

        assert!(store.delete(kept.id).is_err());
        assert!(store.get(kept.id).is_some());

        let unpublish = AssignmentUpdate {
            is_published: Some(false),
            ..AssignmentUpdate::default()
        };
        assert!(store.update(kept.id, unpublish).is_err());
        assert!(store.get(kept.id).unwrap().is_published);

        // The failed create did not consume an id
        std::fs::remove_dir(path.with_extension("json.tmp")).unwrap();
        assert_eq!(store.create(new_assignment("Next")).unwrap().id, 2);
    }
}
