use axum::extract::State;
use axum::Json;
use reports::{claims_with_details, ClaimsDetail};

use crate::{AppState, Envelope};

/// Claims merged with listing and receiver details. A join that could not
/// be made is reported through the warning, never as an error status.
pub async fn detail(State(state): State<AppState>) -> Json<Envelope<ClaimsDetail>> {
    let detail = claims_with_details(state.access(), &state.claims_schema).await;
    let mut envelope = state.envelope(detail);
    envelope.warning = match (envelope.warning.take(), envelope.data.warning.clone()) {
        (Some(banner), Some(view)) if banner != view => Some(format!("{banner}; {view}")),
        (banner, view) => banner.or(view),
    };
    Json(envelope)
}
