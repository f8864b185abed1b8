use axum::extract::{Query, State};
use axum::Json;
use db::ResultSet;
use reports::insights::{self, Analytics, DashboardSummary, FilterOptions, ListingFilter};
use serde::{Deserialize, Serialize};

use crate::{AppState, Envelope};

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub counts: DashboardSummary,
    pub recent_listings: ResultSet,
}

pub async fn summary(State(state): State<AppState>) -> Json<Envelope<DashboardView>> {
    let store = state.access();
    let view = DashboardView {
        counts: insights::dashboard_summary(store).await,
        recent_listings: insights::recent_listings(store, insights::RECENT_LISTINGS).await,
    };
    Json(state.envelope(view))
}

/// Comma-separated multi-select values.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub locations: Option<String>,
    pub food_types: Option<String>,
    pub provider_types: Option<String>,
}

impl ListingQuery {
    pub fn to_filter(&self) -> ListingFilter {
        fn split(values: &Option<String>) -> Vec<String> {
            values
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect()
        }
        ListingFilter {
            locations: split(&self.locations),
            food_types: split(&self.food_types),
            provider_types: split(&self.provider_types),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingsView {
    pub options: FilterOptions,
    pub filter: ListingFilter,
    pub listings: ResultSet,
}

pub async fn listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<Envelope<ListingsView>> {
    let store = state.access();
    let filter = query.to_filter();
    let view = ListingsView {
        options: insights::filter_options(store).await,
        listings: insights::filter_listings(store, &filter).await,
        filter,
    };
    Json(state.envelope(view))
}

pub async fn analytics(State(state): State<AppState>) -> Json<Envelope<Analytics>> {
    let page = insights::analytics(state.access()).await;
    Json(state.envelope(page))
}
