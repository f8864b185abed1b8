use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use crud::{CrudError, CrudOrchestrator, EditForm, Record, TableKind};
use db::ResultSet;
use serde::Serialize;
use tracing::warn;

use crate::{AppState, Envelope};

fn status(err: CrudError) -> StatusCode {
    warn!("{err}");
    match err {
        CrudError::UnknownTable(_) | CrudError::NotFound { .. } => StatusCode::NOT_FOUND,
        CrudError::NoSelection { .. } => StatusCode::BAD_REQUEST,
        CrudError::Validation { .. } | CrudError::UnknownField { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CrudError::WriteFailed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn table_kind(name: &str) -> Result<TableKind, StatusCode> {
    name.parse().map_err(status)
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub table: TableKind,
    pub id_column: &'static str,
    pub rows: ResultSet,
}

pub async fn read(
    Path(table): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Envelope<TableView>>, StatusCode> {
    let table = table_kind(&table)?;
    let rows = CrudOrchestrator::new(state.access()).read(table).await;
    Ok(Json(state.envelope(TableView {
        table,
        id_column: table.id_column(),
        rows,
    })))
}

pub async fn create(
    Path(table): Path<String>,
    State(state): State<AppState>,
    Json(record): Json<Record>,
) -> Result<StatusCode, StatusCode> {
    let table = table_kind(&table)?;
    CrudOrchestrator::new(state.access())
        .create(table, &record)
        .await
        .map_err(status)?;
    Ok(StatusCode::CREATED)
}

pub async fn edit_form(
    Path((table, id)): Path<(String, i64)>,
    State(state): State<AppState>,
) -> Result<Json<EditForm>, StatusCode> {
    let table = table_kind(&table)?;
    CrudOrchestrator::new(state.access())
        .edit_form(table, Some(id))
        .await
        .map(Json)
        .map_err(status)
}

pub async fn update(
    Path((table, id)): Path<(String, i64)>,
    State(state): State<AppState>,
    Json(changes): Json<Record>,
) -> Result<StatusCode, StatusCode> {
    let table = table_kind(&table)?;
    CrudOrchestrator::new(state.access())
        .update(table, Some(id), &changes)
        .await
        .map_err(status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Path((table, id)): Path<(String, i64)>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    let table = table_kind(&table)?;
    CrudOrchestrator::new(state.access())
        .delete(table, Some(id))
        .await
        .map_err(status)?;
    Ok(StatusCode::NO_CONTENT)
}
