use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::core::errors::Error;
use crate::models::{EditorKind, EditorSettings, HistoryEntry, SearchOutcome, SearchRequest};
use crate::services::editor::EditorLauncher;
use crate::services::fs::{self, ListParams, ListResult};
use crate::services::store::run_recorded;

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub program: String,
    pub tool_available: bool,
    pub version: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        program: state.runner.program().to_string(),
        tool_available: state.runner.is_tool_available().await,
        version: state.runner.tool_version().await,
    })
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchOutcome>> {
    let outcome = run_recorded(&state.runner, &state.history, request).await?;
    Ok(Json(outcome))
}

pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let entries = state.history.lock().await.entries().to_vec();
    Json(entries)
}

pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<HistoryEntry>> {
    let entry = state.history.lock().await.get(&id).cloned();
    entry
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("history entry '{id}'")).into())
}

pub async fn remove_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state.history.lock().await.remove(&id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound(format!("history entry '{id}'")).into())
    }
}

pub async fn clear_history(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.history.lock().await.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rerun_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SearchOutcome>> {
    let request = state
        .history
        .lock()
        .await
        .get(&id)
        .map(|entry| entry.request.clone())
        .ok_or_else(|| Error::NotFound(format!("history entry '{id}'")))?;
    let outcome = run_recorded(&state.runner, &state.history, request).await?;
    Ok(Json(outcome))
}

pub async fn get_editor_settings(State(state): State<AppState>) -> Json<EditorSettings> {
    let settings = state.settings.lock().await.settings().clone();
    Json(settings)
}

pub async fn put_editor_settings(
    State(state): State<AppState>,
    Json(settings): Json<EditorSettings>,
) -> ApiResult<Json<EditorSettings>> {
    let mut store = state.settings.lock().await;
    store.save(settings).await?;
    Ok(Json(store.settings().clone()))
}

pub async fn editor_availability(
    State(state): State<AppState>,
) -> Json<BTreeMap<EditorKind, bool>> {
    let launcher = EditorLauncher::new(state.settings.lock().await.settings().clone());
    Json(launcher.check_availability().await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub path: PathBuf,
    pub line: Option<u64>,
}

pub async fn open_in_editor(
    State(state): State<AppState>,
    Json(request): Json<OpenRequest>,
) -> ApiResult<StatusCode> {
    let launcher = EditorLauncher::new(state.settings.lock().await.settings().clone());
    launcher.launch(&request.path, request.line).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn common_directories() -> Json<Vec<String>> {
    Json(
        fs::common_directories()
            .into_iter()
            .map(|dir| dir.to_string_lossy().into_owned())
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub path: String,
    pub cursor: Option<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub hidden: bool,
}

pub async fn list_directories(Query(query): Query<ListQuery>) -> ApiResult<Json<ListResult>> {
    let mut params = ListParams::new(&query.path);
    params.cursor = query.cursor.as_deref();
    params.include_hidden = query.hidden;
    if let Some(limit) = query.limit {
        params.limit = limit;
    }
    Ok(Json(fs::list_subdirectories(params).await?))
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDirectory {
    pub parent: Option<String>,
    pub is_valid: bool,
}

pub async fn parent_directory(Query(query): Query<PathQuery>) -> Json<ParentDirectory> {
    Json(ParentDirectory {
        parent: fs::parent_directory(&query.path).map(|p| p.to_string_lossy().into_owned()),
        is_valid: fs::is_valid_directory(&query.path),
    })
}
