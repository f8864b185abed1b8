//! Handlers called directly against the in-memory fixture.

use std::sync::Arc;

use ::reports::ClaimsSchema;
use api::handlers::{claims, dashboard, reports, tables};
use api::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use crud::Record;
use db::testing::seeded_store;
use db::{DataAccess, DataStore, Value};

async fn state() -> AppState {
    AppState::new(seeded_store().await).await
}

#[tokio::test]
async fn dashboard_reports_counts_and_recent_listings() {
    let state = state().await;
    let Json(body) = dashboard::summary(State(state)).await;
    assert_eq!(body.data.counts.providers, 3);
    assert_eq!(body.data.counts.claims, 4);
    assert_eq!(body.data.recent_listings.len(), 3);
    assert!(body.warning.is_none());
}

#[tokio::test]
async fn envelope_omits_an_absent_warning() {
    let state = state().await;
    let json = serde_json::to_value(state.envelope(1)).unwrap();
    assert_eq!(json, serde_json::json!({ "data": 1 }));

    let offline = AppState::new(DataStore::disconnected("down")).await;
    let json = serde_json::to_value(offline.envelope(1)).unwrap();
    assert!(json["warning"].is_string());
}

#[tokio::test]
async fn listings_accept_comma_separated_filters() {
    let state = state().await;
    let query = dashboard::ListingQuery {
        locations: Some("Adambury, ".into()),
        ..Default::default()
    };
    let Json(body) = dashboard::listings(State(state), Query(query)).await;
    assert_eq!(body.data.filter.locations, vec!["Adambury"]);
    assert_eq!(body.data.listings.len(), 2);
    assert_eq!(body.data.options.locations, vec!["Adambury", "Bakerton"]);
}

#[tokio::test]
async fn report_routes_map_errors_to_status_codes() {
    let state = state().await;

    let Json(body) = reports::run(Path(5), State(state.clone()), Query(Default::default()))
        .await
        .unwrap();
    assert_eq!(body.data.table.cell(0, "Total_Quantity_Available"), Some(&Value::Int(35)));

    let missing_city = reports::run(Path(3), State(state.clone()), Query(Default::default())).await;
    assert_eq!(missing_city.unwrap_err(), StatusCode::BAD_REQUEST);

    let unknown = reports::run(Path(14), State(state.clone()), Query(Default::default())).await;
    assert_eq!(unknown.unwrap_err(), StatusCode::NOT_FOUND);

    let query = reports::ReportQuery {
        city: Some("Adambury".into()),
        page: 0,
        all: true,
    };
    let Json(body) = reports::run(Path(3), State(state), Query(query)).await.unwrap();
    assert_eq!(body.data.table.len(), 2);

    let Json(catalog) = reports::list().await;
    assert_eq!(catalog.len(), 13);
}

#[tokio::test]
async fn claims_route_returns_merged_rows() {
    let state = state().await;
    let Json(body) = claims::detail(State(state)).await;
    assert!(body.data.merged);
    assert_eq!(body.data.table.len(), 4);
    assert!(body.warning.is_none());
}

#[tokio::test]
async fn claims_mismatch_warning_is_not_masked_by_an_old_failure() {
    let mut state = state().await;
    state.claims_schema = Arc::new(ClaimsSchema {
        receiver_key: Some("ReceiverId".into()),
    });
    assert!(!state.store.execute(r#"DELETE FROM "Nowhere""#, &[]).await);

    let Json(body) = claims::detail(State(state)).await;
    assert!(!body.data.merged);
    assert!(body.warning.unwrap().starts_with("Schema mismatch"));
}

#[tokio::test]
async fn table_routes_round_trip() {
    let state = state().await;
    let record = Record::new()
        .with("Name", "Night Shelter")
        .with("Type", "Shelter")
        .with("City", "Bakerton");

    let created = tables::create(Path("receivers".into()), State(state.clone()), Json(record)).await;
    assert_eq!(created, Ok(StatusCode::CREATED));

    let Json(view) = tables::read(Path("Receivers".into()), State(state.clone()))
        .await
        .unwrap();
    assert_eq!(view.data.id_column, "Receiver_ID");
    assert_eq!(view.data.rows.len(), 4);

    let Json(form) = tables::edit_form(Path(("receivers".into(), 4)), State(state.clone()))
        .await
        .unwrap();
    assert_eq!(form.fields[0].current, Value::from("Night Shelter"));

    let updated = tables::update(
        Path(("receivers".into(), 4)),
        State(state.clone()),
        Json(Record::new().with("Contact", "555-0999")),
    )
    .await;
    assert_eq!(updated, Ok(StatusCode::NO_CONTENT));

    let deleted = tables::delete(Path(("receivers".into(), 4)), State(state.clone())).await;
    assert_eq!(deleted, Ok(StatusCode::NO_CONTENT));
    let gone = tables::delete(Path(("receivers".into(), 4)), State(state)).await;
    assert_eq!(gone, Err(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn table_routes_reject_bad_input() {
    let state = state().await;

    let unknown = tables::read(Path("donors".into()), State(state.clone())).await;
    assert_eq!(unknown.unwrap_err(), StatusCode::NOT_FOUND);

    let invalid = tables::create(
        Path("claims".into()),
        State(state.clone()),
        Json(Record::new().with("Food_ID", 1i64).with("Receiver_ID", -2i64).with("Status", "Pending")),
    )
    .await;
    assert_eq!(invalid, Err(StatusCode::UNPROCESSABLE_ENTITY));

    let missing = tables::edit_form(Path(("providers".into(), 404)), State(state)).await;
    assert_eq!(missing.unwrap_err(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn offline_store_surfaces_a_warning() {
    let state = AppState::new(DataStore::disconnected("Error connecting to database: refused")).await;
    let Json(body) = dashboard::summary(State(state.clone())).await;
    assert_eq!(body.data.counts.providers, 0);
    assert!(body.warning.is_some());

    let created = tables::create(
        Path("providers".into()),
        State(state),
        Json(Record::new().with("Name", "Ada").with("Type", "Restaurant")),
    )
    .await;
    assert_eq!(created, Err(StatusCode::INTERNAL_SERVER_ERROR));
}
