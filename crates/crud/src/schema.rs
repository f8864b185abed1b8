//! Static description of the four editable tables.
//!
//! Each table has a fixed identity column and an ordered list of editable
//! fields. The field list drives insert/update statement generation, form
//! prefill and validation.

use chrono::NaiveDate;
use db::models::{ClaimStatus, MealType, ProviderType, ReceiverType};
use db::Value;
use serde::{Deserialize, Serialize};

use crate::CrudError;

/// Accepted date format for `Date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// TableKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    #[serde(rename = "Providers")]
    Providers,
    #[serde(rename = "Receivers")]
    Receivers,
    #[serde(rename = "Food_Listings_Dataset")]
    FoodListings,
    #[serde(rename = "Claims")]
    Claims,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Providers,
        TableKind::Receivers,
        TableKind::FoodListings,
        TableKind::Claims,
    ];

    /// Table name in the database.
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Providers => "Providers",
            Self::Receivers => "Receivers",
            Self::FoodListings => "Food_Listings_Dataset",
            Self::Claims => "Claims",
        }
    }

    /// Identity column, fixed per table.
    pub fn id_column(self) -> &'static str {
        match self {
            Self::Providers => "Provider_ID",
            Self::Receivers => "Receiver_ID",
            Self::FoodListings => "Food_ID",
            Self::Claims => "Claim_ID",
        }
    }

    /// Editable fields in form order (the identity column is never editable).
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Providers => PROVIDER_FIELDS,
            Self::Receivers => RECEIVER_FIELDS,
            Self::FoodListings => LISTING_FIELDS,
            Self::Claims => CLAIM_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl std::str::FromStr for TableKind {
    type Err = CrudError;

    /// Accepts the database name or a lower-case short alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Providers" | "providers" => Ok(Self::Providers),
            "Receivers" | "receivers" => Ok(Self::Receivers),
            "Food_Listings_Dataset" | "food_listings" | "listings" => Ok(Self::FoodListings),
            "Claims" | "claims" => Ok(Self::Claims),
            other => Err(CrudError::UnknownTable(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer { min: i64 },
    /// ISO-8601 calendar date, stored as `YYYY-MM-DD` text.
    Date,
    Choice { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text, required: false }
    }

    const fn required_text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text, required: true }
    }

    const fn positive(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Integer { min: 1 }, required: true }
    }

    const fn date(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Date, required: true }
    }

    const fn choice(name: &'static str, options: &'static [&'static str]) -> Self {
        Self { name, kind: FieldKind::Choice { options }, required: true }
    }

    /// Validate a submitted value and normalise it for binding.
    ///
    /// Optional text fields default to the empty string; numeric text is
    /// accepted for integer fields.
    pub fn coerce(&self, value: Option<&Value>) -> Result<Value, CrudError> {
        let value = value.filter(|v| !v.is_null());
        let invalid = |reason: String| CrudError::Validation { field: self.name, reason };

        match (self.kind, value) {
            (_, None) if self.required => Err(invalid("is required".into())),

            (FieldKind::Text, None) => Ok(Value::from("")),
            (FieldKind::Text, Some(Value::Text(s))) => {
                if self.required && s.trim().is_empty() {
                    Err(invalid("must not be empty".into()))
                } else {
                    Ok(Value::from(s.as_str()))
                }
            }
            (FieldKind::Text, Some(Value::Int(i))) => Ok(Value::from(i.to_string())),
            (FieldKind::Text, Some(_)) => Err(invalid("must be text".into())),

            (FieldKind::Integer { min }, Some(v)) => {
                let n = match v {
                    Value::Text(s) => s.trim().parse::<i64>().ok(),
                    other => other.as_i64(),
                }
                .ok_or_else(|| invalid("must be a whole number".into()))?;
                if n < min {
                    return Err(invalid(if min == 1 {
                        "must be positive".into()
                    } else {
                        format!("must be at least {min}")
                    }));
                }
                Ok(Value::Int(n))
            }

            (FieldKind::Date, Some(Value::Text(s))) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(|d| Value::from(d.format(DATE_FORMAT).to_string()))
                .map_err(|_| invalid(format!("must be a date like 2026-03-01, got '{s}'"))),
            (FieldKind::Date, Some(_)) => Err(invalid("must be a date".into())),

            (FieldKind::Choice { options }, Some(Value::Text(s))) if options.contains(&s.as_str()) => {
                Ok(Value::from(s.as_str()))
            }
            (FieldKind::Choice { options }, Some(_)) => {
                Err(invalid(format!("must be one of: {}", options.join(", "))))
            }

            // Unreachable with the static field tables: every non-text kind is required.
            (_, None) => Ok(Value::Null),
        }
    }
}

const PROVIDER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required_text("Name"),
    FieldSpec::choice("Type", ProviderType::ALL),
    FieldSpec::text("Address"),
    FieldSpec::text("City"),
    FieldSpec::text("Contact"),
];

const RECEIVER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required_text("Name"),
    FieldSpec::choice("Type", ReceiverType::ALL),
    FieldSpec::text("City"),
    FieldSpec::text("Contact"),
];

const LISTING_FIELDS: &[FieldSpec] = &[
    FieldSpec::required_text("Food_Name"),
    FieldSpec::positive("Quantity"),
    FieldSpec::date("Expiry_Date"),
    FieldSpec::positive("Provider_ID"),
    FieldSpec::choice("Provider_Type", ProviderType::ALL),
    FieldSpec::text("Location"),
    FieldSpec::text("Food_Type"),
    FieldSpec::choice("Meal_Type", MealType::ALL),
];

const CLAIM_FIELDS: &[FieldSpec] = &[
    FieldSpec::positive("Food_ID"),
    FieldSpec::positive("Receiver_ID"),
    FieldSpec::choice("Status", ClaimStatus::ALL),
];
