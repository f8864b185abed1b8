//! `api` crate — HTTP JSON surface over the dashboard core.
//!
//! Routes (all under `/api/v1`):
//!   GET    /dashboard
//!   GET    /listings?locations=a,b&food_types=..&provider_types=..
//!   GET    /analytics
//!   GET    /claims
//!   GET    /reports
//!   GET    /reports/:number?city=..&page=..&all=true
//!   GET    /tables/:table
//!   POST   /tables/:table
//!   GET    /tables/:table/:id/form
//!   PUT    /tables/:table/:id
//!   DELETE /tables/:table/:id

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use db::{DataAccess, DataStore};
use reports::ClaimsSchema;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod handlers;

pub use error::ApiError;

/// Shared handler state. Cloned per request; the store itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
    /// Receiver identity column, resolved once at startup.
    pub claims_schema: Arc<ClaimsSchema>,
}

impl AppState {
    /// Wrap `store` and resolve the claims schema against it.
    pub async fn new(store: DataStore) -> Self {
        let claims_schema = ClaimsSchema::probe(&store).await;
        Self {
            store: Arc::new(store),
            claims_schema: Arc::new(claims_schema),
        }
    }

    pub fn access(&self) -> &dyn DataAccess {
        self.store.as_ref()
    }

    /// Wrap `data` with the store's current warning banner.
    pub fn envelope<T>(&self, data: T) -> Envelope<T> {
        Envelope {
            data,
            warning: self.store.last_error(),
        }
    }
}

/// Response body for every read route.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/dashboard", get(handlers::dashboard::summary))
        .route("/listings", get(handlers::dashboard::listings))
        .route("/analytics", get(handlers::dashboard::analytics))
        .route("/claims", get(handlers::claims::detail))
        .route("/reports", get(handlers::reports::list))
        .route("/reports/:number", get(handlers::reports::run))
        .route(
            "/tables/:table",
            get(handlers::tables::read).post(handlers::tables::create),
        )
        .route("/tables/:table/:id/form", get(handlers::tables::edit_form))
        .route(
            "/tables/:table/:id",
            axum::routing::put(handlers::tables::update).delete(handlers::tables::delete),
        );

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ApiError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.to_owned(),
            source,
        })?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
