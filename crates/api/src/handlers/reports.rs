use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use reports::{ReportError, ReportId, ReportOutput, ReportParams, ReportSummary};
use serde::Deserialize;
use tracing::warn;

use crate::{AppState, Envelope};

pub async fn list() -> Json<Vec<ReportSummary>> {
    Json(reports::catalog())
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub city: Option<String>,
    #[serde(default)]
    pub page: u32,
    /// Return every row instead of one page.
    #[serde(default)]
    pub all: bool,
}

impl ReportQuery {
    pub fn to_params(&self) -> ReportParams {
        let params = ReportParams {
            city: self.city.clone(),
            ..ReportParams::default()
        }
        .page(self.page);
        if self.all {
            params.unpaginated()
        } else {
            params
        }
    }
}

pub async fn run(
    Path(number): Path<u8>,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Envelope<ReportOutput>>, StatusCode> {
    let id = ReportId::try_from(number).map_err(|_| StatusCode::NOT_FOUND)?;
    match reports::run_report(state.access(), id, &query.to_params()).await {
        Ok(output) => Ok(Json(state.envelope(output))),
        Err(e @ ReportError::MissingParameter { .. }) => {
            warn!("{e}");
            Err(StatusCode::BAD_REQUEST)
        }
        Err(ReportError::UnknownReport(_)) => Err(StatusCode::NOT_FOUND),
    }
}
