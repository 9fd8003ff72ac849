// src/server/routes.rs
// =============================================================================
// HTTP handlers. Each one is a thin wrapper: pull parameters out of the
// request, call the matching library function, let AppError pick the
// status code.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::assignments::{self, Assignment, AssignmentFilter, AssignmentUpdate, ImportRequest};
use crate::error::{AppError, AppResult};
use crate::github::{BranchListing, RepositoryRef};
use crate::render::render_live;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RepoQuery {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Deserialize)]
pub struct ServeQuery {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

fn repository(owner: &str, repo: &str) -> AppResult<RepositoryRef> {
    let (owner, repo) = (owner.trim(), repo.trim());
    if owner.is_empty() || repo.is_empty() {
        return Err(AppError::MalformedReference(format!("{}/{}", owner, repo)));
    }
    Ok(RepositoryRef::new(owner, repo))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn branches_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RepoQuery>,
) -> AppResult<Json<BranchListing>> {
    let reference = repository(&query.owner, &query.repo)?;
    Ok(Json(state.github.branch_listing(&reference).await?))
}

pub async fn live_serve_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServeQuery>,
) -> AppResult<Html<String>> {
    let reference = repository(&query.owner, &query.repo)?.with_branch(query.branch.trim());
    Ok(Html(render_live(&state.github, &reference).await?))
}

pub async fn list_assignments_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AssignmentFilter>,
) -> Json<Vec<Assignment>> {
    Json(state.store.list(&filter))
}

pub async fn get_assignment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> AppResult<Json<Assignment>> {
    state
        .store
        .get(id)
        .map(Json)
        .ok_or(AppError::AssignmentNotFound(id))
}

pub async fn import_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> AppResult<Json<Assignment>> {
    Ok(Json(assignments::import_repository(&state, request).await?))
}

pub async fn update_assignment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(update): Json<AssignmentUpdate>,
) -> AppResult<Json<Assignment>> {
    Ok(Json(state.store.update(id, update)?))
}

pub async fn delete_assignment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> AppResult<Json<Value>> {
    assignments::delete_assignment(&state, id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn serve_assignment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> AppResult<Html<String>> {
    Ok(Html(assignments::read_entry_html(&state, id).await?))
}
