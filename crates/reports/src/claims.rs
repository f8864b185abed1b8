//! Claims detail view: claims joined with their listing and receiver.
//!
//! Deployments disagree on the receiver identity column (`Receiver_ID`,
//! `ReceiverID`, `ReceiverId`). [`ClaimsSchema`] settles that once at startup
//! from the live column lists, and [`claims_with_details`] reuses the answer
//! on every call. When no key can be resolved the join is skipped and the
//! raw claims are returned with a warning.

use db::{DataAccess, ResultSet};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Receiver identity column spellings, tried in order.
pub const RECEIVER_KEY_CANDIDATES: [&str; 3] = ["Receiver_ID", "ReceiverID", "ReceiverId"];

/// Listing columns copied onto each claim.
const LISTING_DETAIL_COLUMNS: [&str; 4] = ["Food_ID", "Food_Name", "Location", "Food_Type"];

/// Pick the column that links claims to receivers.
///
/// Tries each of [`RECEIVER_KEY_CANDIDATES`] present in both tables, then the
/// first claims column ending in `_ID` that receivers also have.
pub fn resolve_receiver_key(claims_columns: &[String], receiver_columns: &[String]) -> Option<String> {
    let shared = |name: &str| {
        claims_columns.iter().any(|c| c == name) && receiver_columns.iter().any(|c| c == name)
    };

    RECEIVER_KEY_CANDIDATES
        .iter()
        .copied()
        .find(|candidate| shared(*candidate))
        .map(|candidate| candidate.to_string())
        .or_else(|| {
            claims_columns
                .iter()
                .find(|c| c.ends_with("_ID") && receiver_columns.contains(c))
                .cloned()
        })
}

/// Schema facts about the claims/receivers pair, resolved once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimsSchema {
    pub receiver_key: Option<String>,
}

impl ClaimsSchema {
    pub fn from_columns(claims_columns: &[String], receiver_columns: &[String]) -> Self {
        Self { receiver_key: resolve_receiver_key(claims_columns, receiver_columns) }
    }

    /// Inspect the live tables. Unreadable tables leave the key unresolved.
    pub async fn probe(store: &dyn DataAccess) -> Self {
        let claims = store.columns("Claims").await.unwrap_or_default();
        let receivers = store.columns("Receivers").await.unwrap_or_default();
        let schema = Self::from_columns(&claims, &receivers);

        match &schema.receiver_key {
            Some(key) => info!("claims join on receiver key '{key}'"),
            None => warn!("no receiver key shared by Claims and Receivers; claims will show unmerged"),
        }
        schema
    }
}

/// Result of the claims detail view.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimsDetail {
    pub table: ResultSet,
    /// `true` when receiver names were merged in.
    pub merged: bool,
    pub warning: Option<String>,
}

impl ClaimsDetail {
    fn raw(table: ResultSet, warning: impl Into<String>) -> Self {
        Self { table, merged: false, warning: Some(warning.into()) }
    }
}

/// One row per claim, with food name, location and food type from the
/// listing and the receiver's `Name`.
#[instrument(skip_all)]
pub async fn claims_with_details(store: &dyn DataAccess, schema: &ClaimsSchema) -> ClaimsDetail {
    let claims = store.query(r#"SELECT * FROM "Claims""#, &[]).await;
    let listings = store.query(r#"SELECT * FROM "Food_Listings_Dataset""#, &[]).await;
    let receivers = store.query(r#"SELECT * FROM "Receivers""#, &[]).await;

    if claims.is_empty() || listings.is_empty() || receivers.is_empty() {
        return ClaimsDetail::raw(claims, "No claims data available");
    }

    let with_food = claims
        .left_join(&listings.select(&LISTING_DETAIL_COLUMNS), "Food_ID", "Food_ID")
        .unwrap_or_else(|| claims.clone());

    let Some(key) = schema.receiver_key.as_deref() else {
        warn!("receiver key unresolved; returning raw claims");
        return ClaimsDetail::raw(claims, "Schema mismatch: no receiver key shared by Claims and Receivers");
    };

    match with_food.left_join(&receivers.select(&[key, "Name"]), key, key) {
        Some(table) => ClaimsDetail { table, merged: true, warning: None },
        None => {
            warn!("receiver key '{key}' missing at query time; returning raw claims");
            ClaimsDetail::raw(claims, format!("Schema mismatch: column '{key}' not found"))
        }
    }
}
