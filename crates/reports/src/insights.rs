//! Dashboard and analytics views beyond the numbered report catalog:
//! headline counts, recent listings, listing filters, and the provider and
//! location breakdowns shown on the analytics page.

use db::{DataAccess, ResultSet, Value};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of listings shown under "recent activity".
pub const RECENT_LISTINGS: u32 = 10;

/// Number of providers in the top-providers table.
pub const TOP_PROVIDERS: u32 = 10;

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Row counts of the four tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub providers: i64,
    pub receivers: i64,
    pub listings: i64,
    pub claims: i64,
}

#[instrument(skip_all)]
pub async fn dashboard_summary(store: &dyn DataAccess) -> DashboardSummary {
    let set = store
        .query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM "Providers") AS "providers",
                (SELECT COUNT(*) FROM "Receivers") AS "receivers",
                (SELECT COUNT(*) FROM "Food_Listings_Dataset") AS "listings",
                (SELECT COUNT(*) FROM "Claims") AS "claims"
            "#,
            &[],
        )
        .await;

    let count = |name: &str| set.cell(0, name).and_then(Value::as_i64).unwrap_or(0);
    DashboardSummary {
        providers: count("providers"),
        receivers: count("receivers"),
        listings: count("listings"),
        claims: count("claims"),
    }
}

/// The most recently added listings, newest first.
pub async fn recent_listings(store: &dyn DataAccess, limit: u32) -> ResultSet {
    store
        .query(
            r#"SELECT * FROM "Food_Listings_Dataset" ORDER BY "Food_ID" DESC LIMIT $1"#,
            &[limit.into()],
        )
        .await
}

// ---------------------------------------------------------------------------
// Listing filters
// ---------------------------------------------------------------------------

/// Values offered by the listing filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub food_types: Vec<String>,
    pub provider_types: Vec<String>,
}

/// Multi-select listing filter; an empty list leaves that column unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub food_types: Vec<String>,
    #[serde(default)]
    pub provider_types: Vec<String>,
}

impl ListingFilter {
    /// Build the `SELECT` with one bound parameter per selected value.
    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(r#"SELECT * FROM "Food_Listings_Dataset""#);
        let mut params = Vec::new();
        let mut clauses = Vec::new();

        for (column, values) in [
            ("Location", &self.locations),
            ("Food_Type", &self.food_types),
            ("Provider_Type", &self.provider_types),
        ] {
            if values.is_empty() {
                continue;
            }
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| {
                    params.push(Value::from(v.as_str()));
                    format!("${}", params.len())
                })
                .collect();
            clauses.push(format!(r#""{column}" IN ({})"#, placeholders.join(", ")));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(r#" ORDER BY "Food_ID""#);
        (sql, params)
    }
}

pub async fn filter_options(store: &dyn DataAccess) -> FilterOptions {
    async fn distinct(store: &dyn DataAccess, column: &str) -> Vec<String> {
        let sql = format!(
            r#"SELECT DISTINCT "{column}" FROM "Food_Listings_Dataset" WHERE "{column}" IS NOT NULL ORDER BY "{column}""#
        );
        store
            .query(&sql, &[])
            .await
            .rows()
            .iter()
            .map(|r| r[0].to_string())
            .collect()
    }

    FilterOptions {
        locations: distinct(store, "Location").await,
        food_types: distinct(store, "Food_Type").await,
        provider_types: distinct(store, "Provider_Type").await,
    }
}

#[instrument(skip(store))]
pub async fn filter_listings(store: &dyn DataAccess, filter: &ListingFilter) -> ResultSet {
    let (sql, params) = filter.to_sql();
    store.query(&sql, &params).await
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Every provider with its listing count, including providers with none.
pub async fn provider_statistics(store: &dyn DataAccess) -> ResultSet {
    store
        .query(
            r#"
            SELECT p."Name", p."Type", COUNT(f."Food_ID") AS "TotalListings"
            FROM "Providers" p
            LEFT JOIN "Food_Listings_Dataset" f ON p."Provider_ID" = f."Provider_ID"
            GROUP BY p."Name", p."Type"
            ORDER BY "TotalListings" DESC, p."Name" ASC
            "#,
            &[],
        )
        .await
}

/// Providers with the most listings, with their total quantity.
pub async fn top_providers(store: &dyn DataAccess, limit: u32) -> ResultSet {
    store
        .query(
            r#"
            SELECT
                p."Name" AS "ProviderName",
                p."Type" AS "ProviderType",
                COUNT(f."Food_ID") AS "TotalListings",
                SUM(f."Quantity") AS "TotalQuantity"
            FROM "Providers" p
            JOIN "Food_Listings_Dataset" f ON p."Provider_ID" = f."Provider_ID"
            GROUP BY p."Name", p."Type"
            ORDER BY "TotalListings" DESC, "ProviderName" ASC
            LIMIT $1
            "#,
            &[limit.into()],
        )
        .await
}

/// Claims and claimed quantity per listing location.
pub async fn high_demand_locations(store: &dyn DataAccess) -> ResultSet {
    store
        .query(
            r#"
            SELECT
                f."Location",
                COUNT(c."Claim_ID") AS "TotalClaims",
                SUM(f."Quantity") AS "TotalQuantityClaimed"
            FROM "Food_Listings_Dataset" f
            JOIN "Claims" c ON f."Food_ID" = c."Food_ID"
            GROUP BY f."Location"
            ORDER BY "TotalClaims" DESC, f."Location" ASC
            "#,
            &[],
        )
        .await
}

pub async fn food_type_distribution(store: &dyn DataAccess) -> ResultSet {
    store
        .query(
            r#"
            SELECT "Food_Type", COUNT(*) AS "Count"
            FROM "Food_Listings_Dataset"
            GROUP BY "Food_Type"
            ORDER BY "Count" DESC, "Food_Type" ASC
            "#,
            &[],
        )
        .await
}

pub async fn location_distribution(store: &dyn DataAccess) -> ResultSet {
    store
        .query(
            r#"
            SELECT "Location", COUNT(*) AS "Count"
            FROM "Food_Listings_Dataset"
            GROUP BY "Location"
            ORDER BY "Count" DESC, "Location" ASC
            "#,
            &[],
        )
        .await
}

/// Everything on the analytics page.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub food_types: ResultSet,
    pub locations: ResultSet,
    pub top_providers: ResultSet,
    pub high_demand_locations: ResultSet,
}

#[instrument(skip_all)]
pub async fn analytics(store: &dyn DataAccess) -> Analytics {
    Analytics {
        food_types: food_type_distribution(store).await,
        locations: location_distribution(store).await,
        top_providers: top_providers(store, TOP_PROVIDERS).await,
        high_demand_locations: high_demand_locations(store).await,
    }
}
