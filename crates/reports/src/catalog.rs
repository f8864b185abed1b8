//! The fixed catalog of analytical reports.
//!
//! Each report is a titled SQL query over the four food-donation tables.
//! Ordered reports always carry a secondary sort key (the label column,
//! ascending) so ties come back in a stable order on every backend.
//! The provider-contacts report binds its city as a parameter; no report
//! interpolates caller text into SQL.

use db::{DataAccess, ResultSet, Value};
use serde::Serialize;
use tracing::{info, instrument};

use crate::chart::{chart_hint, ChartHint};
use crate::ReportError;

/// Page size of the provider-contacts report.
pub const CONTACTS_PAGE_SIZE: u32 = 5;

/// City used when a caller has not typed one yet.
pub const DEFAULT_CITY: &str = "Adambury";

// ---------------------------------------------------------------------------
// ReportId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum ReportId {
    CityParticipants = 1,
    TopProviderType = 2,
    ProviderContacts = 3,
    TopReceivers = 4,
    TotalQuantity = 5,
    TopListingCity = 6,
    FoodTypeFrequency = 7,
    ClaimsPerFood = 8,
    TopCompletedProvider = 9,
    ClaimStatusShare = 10,
    AverageClaimedQuantity = 11,
    TopCompletedMealType = 12,
    QuantityPerProvider = 13,
}

impl ReportId {
    /// Every report, in catalog order.
    pub const ALL: [ReportId; 13] = [
        ReportId::CityParticipants,
        ReportId::TopProviderType,
        ReportId::ProviderContacts,
        ReportId::TopReceivers,
        ReportId::TotalQuantity,
        ReportId::TopListingCity,
        ReportId::FoodTypeFrequency,
        ReportId::ClaimsPerFood,
        ReportId::TopCompletedProvider,
        ReportId::ClaimStatusShare,
        ReportId::AverageClaimedQuantity,
        ReportId::TopCompletedMealType,
        ReportId::QuantityPerProvider,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::CityParticipants => "How many food providers and receivers are there in each city?",
            Self::TopProviderType => "Which type of food provider contributes the most food?",
            Self::ProviderContacts => "What is the contact information of food providers in a specific city?",
            Self::TopReceivers => "Which receivers have claimed the most food?",
            Self::TotalQuantity => "Total quantity of food available from all providers",
            Self::TopListingCity => "Which city has the highest number of food listings?",
            Self::FoodTypeFrequency => "Most commonly available food types",
            Self::ClaimsPerFood => "How many food claims have been made for each food item?",
            Self::TopCompletedProvider => "Which provider has had the highest number of successful food claims?",
            Self::ClaimStatusShare => "What percentage of food claims are completed vs. pending vs. canceled?",
            Self::AverageClaimedQuantity => "Average quantity of food claimed per receiver",
            Self::TopCompletedMealType => "Meal type claimed the most",
            Self::QuantityPerProvider => "Total quantity of food donated by each provider",
        }
    }

    /// Whether the report needs a city name.
    pub fn takes_city(self) -> bool {
        matches!(self, Self::ProviderContacts)
    }

    /// Whether the result reads as shares of a whole (pie-chart candidates).
    pub fn proportion_like(self) -> bool {
        matches!(
            self,
            Self::TopProviderType
                | Self::FoodTypeFrequency
                | Self::ClaimStatusShare
                | Self::TopCompletedMealType
        )
    }

    /// SQL text for this report under `params`.
    pub fn sql(self, params: &ReportParams) -> &'static str {
        match self {
            Self::CityParticipants => CITY_PARTICIPANTS,
            Self::TopProviderType => TOP_PROVIDER_TYPE,
            Self::ProviderContacts if params.paginate => PROVIDER_CONTACTS_PAGE,
            Self::ProviderContacts => PROVIDER_CONTACTS_ALL,
            Self::TopReceivers => TOP_RECEIVERS,
            Self::TotalQuantity => TOTAL_QUANTITY,
            Self::TopListingCity => TOP_LISTING_CITY,
            Self::FoodTypeFrequency => FOOD_TYPE_FREQUENCY,
            Self::ClaimsPerFood => CLAIMS_PER_FOOD,
            Self::TopCompletedProvider => TOP_COMPLETED_PROVIDER,
            Self::ClaimStatusShare => CLAIM_STATUS_SHARE,
            Self::AverageClaimedQuantity => AVERAGE_CLAIMED_QUANTITY,
            Self::TopCompletedMealType => TOP_COMPLETED_MEAL_TYPE,
            Self::QuantityPerProvider => QUANTITY_PER_PROVIDER,
        }
    }

    /// Positional parameters matching [`ReportId::sql`].
    fn bind_params(self, params: &ReportParams) -> Result<Vec<Value>, ReportError> {
        if !self.takes_city() {
            return Ok(Vec::new());
        }
        let city = params
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ReportError::MissingParameter { report: self.number(), name: "city" })?;

        let mut values = vec![Value::from(city)];
        if params.paginate {
            values.push(Value::Int(i64::from(params.page) * i64::from(CONTACTS_PAGE_SIZE)));
        }
        Ok(values)
    }
}

impl From<ReportId> for u8 {
    fn from(id: ReportId) -> Self {
        id.number()
    }
}

impl TryFrom<u8> for ReportId {
    type Error = ReportError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        ReportId::ALL
            .into_iter()
            .find(|id| id.number() == n)
            .ok_or(ReportError::UnknownReport(n))
    }
}

// ---------------------------------------------------------------------------
// Parameters and output
// ---------------------------------------------------------------------------

/// Caller-supplied inputs. Only the provider-contacts report reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParams {
    pub city: Option<String>,
    /// Zero-based page for the paginated variant.
    pub page: u32,
    /// `false` selects the variant that returns every matching provider.
    pub paginate: bool,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self { city: None, page: 0, paginate: true }
    }
}

impl ReportParams {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self { city: Some(city.into()), ..Self::default() }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn unpaginated(mut self) -> Self {
        self.paginate = false;
        self
    }
}

/// One catalog entry, for listing the catalog without running it.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub number: u8,
    pub title: &'static str,
    pub takes_city: bool,
}

/// A report after it ran.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub id: ReportId,
    pub title: &'static str,
    pub sql: &'static str,
    pub table: ResultSet,
    pub chart: Option<ChartHint>,
}

/// The catalog, in order.
pub fn catalog() -> Vec<ReportSummary> {
    ReportId::ALL
        .iter()
        .map(|id| ReportSummary {
            number: id.number(),
            title: id.title(),
            takes_city: id.takes_city(),
        })
        .collect()
}

/// Run one report.
///
/// Database failures degrade to an empty table (see [`DataAccess::query`]);
/// the only errors are caller mistakes.
#[instrument(skip(store, params), fields(report = id.number()))]
pub async fn run_report(
    store: &dyn DataAccess,
    id: ReportId,
    params: &ReportParams,
) -> Result<ReportOutput, ReportError> {
    let bind = id.bind_params(params)?;
    let sql = id.sql(params);
    let table = store.query(sql, &bind).await;
    let chart = chart_hint(&table, id.proportion_like());

    info!("report {} returned {} rows", id.number(), table.len());

    Ok(ReportOutput { id, title: id.title(), sql, table, chart })
}

/// Run every report. `params` feeds the city report.
pub async fn run_all(store: &dyn DataAccess, params: &ReportParams) -> Vec<Result<ReportOutput, ReportError>> {
    let mut outputs = Vec::with_capacity(ReportId::ALL.len());
    for id in ReportId::ALL {
        outputs.push(run_report(store, id, params).await);
    }
    outputs
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

const CITY_PARTICIPANTS: &str = r#"
SELECT
    "City",
    COUNT(DISTINCT "Provider_ID") AS "Total_Providers",
    COUNT(DISTINCT "Receiver_ID") AS "Total_Receivers"
FROM (
    SELECT "City", "Provider_ID", NULL AS "Receiver_ID" FROM "Providers"
    UNION ALL
    SELECT "City", NULL AS "Provider_ID", "Receiver_ID" FROM "Receivers"
) AS combined
GROUP BY "City"
ORDER BY "City"
"#;

const TOP_PROVIDER_TYPE: &str = r#"
SELECT
    p."Type" AS "Provider_Type",
    SUM(f."Quantity") AS "Total_Quantity"
FROM "Providers" p
JOIN "Food_Listings_Dataset" f ON p."Provider_ID" = f."Provider_ID"
GROUP BY p."Type"
ORDER BY "Total_Quantity" DESC, "Provider_Type" ASC
LIMIT 1
"#;

const PROVIDER_CONTACTS_PAGE: &str = r#"
SELECT "Name", "Type", "Address", "City", "Contact"
FROM "Providers"
WHERE "City" = $1
ORDER BY "Name"
LIMIT 5 OFFSET $2
"#;

const PROVIDER_CONTACTS_ALL: &str = r#"
SELECT "Name", "Type", "Address", "City", "Contact"
FROM "Providers"
WHERE "City" = $1
ORDER BY "Name"
"#;

const TOP_RECEIVERS: &str = r#"
SELECT
    r."Receiver_ID",
    r."Name" AS "Receiver_Name",
    COUNT(c."Claim_ID") AS "Total_Claims"
FROM "Claims" c
JOIN "Receivers" r ON c."Receiver_ID" = r."Receiver_ID"
GROUP BY r."Receiver_ID", r."Name"
ORDER BY "Total_Claims" DESC, "Receiver_Name" ASC
"#;

const TOTAL_QUANTITY: &str = r#"
SELECT SUM("Quantity") AS "Total_Quantity_Available"
FROM "Food_Listings_Dataset"
"#;

const TOP_LISTING_CITY: &str = r#"
SELECT
    p."City",
    COUNT(f."Food_ID") AS "Total_Listings"
FROM "Food_Listings_Dataset" f
JOIN "Providers" p ON f."Provider_ID" = p."Provider_ID"
GROUP BY p."City"
HAVING COUNT(f."Food_ID") = (
    SELECT MAX(per_city."n") FROM (
        SELECT COUNT(f2."Food_ID") AS "n"
        FROM "Food_Listings_Dataset" f2
        JOIN "Providers" p2 ON f2."Provider_ID" = p2."Provider_ID"
        GROUP BY p2."City"
    ) AS per_city
)
ORDER BY p."City"
"#;

const FOOD_TYPE_FREQUENCY: &str = r#"
SELECT
    "Food_Type",
    COUNT("Food_ID") AS "Listings_Count"
FROM "Food_Listings_Dataset"
GROUP BY "Food_Type"
ORDER BY "Listings_Count" DESC, "Food_Type" ASC
"#;

const CLAIMS_PER_FOOD: &str = r#"
SELECT
    fl."Food_Name",
    COUNT(c."Claim_ID") AS "TotalClaims"
FROM "Food_Listings_Dataset" fl
LEFT JOIN "Claims" c ON fl."Food_ID" = c."Food_ID"
GROUP BY fl."Food_Name"
ORDER BY "TotalClaims" DESC, fl."Food_Name" ASC
"#;

const TOP_COMPLETED_PROVIDER: &str = r#"
SELECT
    p."Name" AS "ProviderName",
    COUNT(c."Claim_ID") AS "SuccessfulClaims"
FROM "Providers" p
JOIN "Food_Listings_Dataset" fl ON p."Provider_ID" = fl."Provider_ID"
JOIN "Claims" c ON fl."Food_ID" = c."Food_ID"
WHERE c."Status" = 'Completed'
GROUP BY p."Name"
ORDER BY "SuccessfulClaims" DESC, "ProviderName" ASC
LIMIT 1
"#;

const CLAIM_STATUS_SHARE: &str = r#"
SELECT
    "Status",
    COUNT(*) AS "Count",
    CAST(ROUND(COUNT(*) * 100.0 / NULLIF((SELECT COUNT(*) FROM "Claims"), 0), 2) AS DOUBLE PRECISION) AS "Percentage"
FROM "Claims"
GROUP BY "Status"
ORDER BY "Status"
"#;

const AVERAGE_CLAIMED_QUANTITY: &str = r#"
SELECT
    r."Receiver_ID",
    r."Name" AS "Receiver_Name",
    CAST(AVG(f."Quantity") AS DOUBLE PRECISION) AS "Avg_Quantity_Claimed"
FROM "Claims" c
JOIN "Food_Listings_Dataset" f ON c."Food_ID" = f."Food_ID"
JOIN "Receivers" r ON c."Receiver_ID" = r."Receiver_ID"
WHERE c."Status" = 'Completed'
GROUP BY r."Receiver_ID", r."Name"
ORDER BY "Avg_Quantity_Claimed" DESC, "Receiver_Name" ASC
"#;

const TOP_COMPLETED_MEAL_TYPE: &str = r#"
SELECT
    f."Meal_Type",
    COUNT(*) AS "Claim_Count"
FROM "Claims" c
JOIN "Food_Listings_Dataset" f ON c."Food_ID" = f."Food_ID"
WHERE c."Status" = 'Completed'
GROUP BY f."Meal_Type"
ORDER BY "Claim_Count" DESC, f."Meal_Type" ASC
LIMIT 1
"#;

const QUANTITY_PER_PROVIDER: &str = r#"
SELECT
    p."Provider_ID",
    p."Name" AS "Provider_Name",
    SUM(f."Quantity") AS "Total_Quantity_Donated"
FROM "Food_Listings_Dataset" f
JOIN "Providers" p ON f."Provider_ID" = p."Provider_ID"
GROUP BY p."Provider_ID", p."Name"
ORDER BY "Total_Quantity_Donated" DESC, "Provider_Name" ASC
"#;
