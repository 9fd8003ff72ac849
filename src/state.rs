// src/state.rs
// Everything an import, delete or render needs, built once from the config
// and shared by the CLI commands and the HTTP handlers.

use crate::assignments::AssignmentStore;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::github::GithubClient;
use crate::storage::AssignmentStorage;

#[derive(Debug)]
pub struct AppState {
    pub github: GithubClient,
    pub storage: AssignmentStorage,
    pub store: AssignmentStore,
    pub download_concurrency: usize,
}

impl AppState {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            github: GithubClient::new(config.github.clone())?,
            storage: AssignmentStorage::new(config.storage.storage_root.clone()),
            store: AssignmentStore::open(config.storage.ledger_path.clone())?,
            download_concurrency: config.storage.download_concurrency.max(1),
        })
    }
}
