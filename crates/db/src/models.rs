//! Row structs that map 1-to-1 onto the food-donation tables.
//!
//! Field names follow the database's column names through `serde(rename)`,
//! so a [`ResultSet`](crate::ResultSet) decodes straight into them.

use serde::{Deserialize, Serialize};

/// Generates the label enum boilerplate shared by every categorical column:
/// `Display`, `FromStr`, serde as the label string, and the `ALL` list used
/// to populate form choices.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            /// Every label, in form order.
            pub const ALL: &'static [&'static str] = &[$($label),+];

            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(format!(concat!("unknown ", stringify!($name), ": {}"), other)),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

label_enum! {
    /// Kind of business listing surplus food.
    ProviderType {
        Supermarket => "Supermarket",
        GroceryStore => "Grocery Store",
        Restaurant => "Restaurant",
        CateringService => "Catering Service",
    }
}

label_enum! {
    /// Kind of organisation claiming food.
    ReceiverType {
        Charity => "Charity",
        FoodBank => "Food Bank",
        Shelter => "Shelter",
        CommunityCenter => "Community Center",
    }
}

label_enum! {
    MealType {
        Breakfast => "Breakfast",
        Lunch => "Lunch",
        Dinner => "Dinner",
        Snack => "Snack",
    }
}

label_enum! {
    /// Lifecycle status of a claim.
    ClaimStatus {
        Completed => "Completed",
        Pending => "Pending",
        Canceled => "Canceled",
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(rename = "Provider_ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub provider_type: ProviderType,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

// ---------------------------------------------------------------------------
// Receivers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    /// Some deployments spell this column `ReceiverID` or `ReceiverId`.
    #[serde(rename = "Receiver_ID", alias = "ReceiverID", alias = "ReceiverId")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub receiver_type: ReceiverType,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

// ---------------------------------------------------------------------------
// Food_Listings_Dataset
// ---------------------------------------------------------------------------

/// A posted quantity of food available from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    #[serde(rename = "Food_ID")]
    pub id: i64,
    #[serde(rename = "Food_Name")]
    pub food_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    /// ISO-8601 date (`YYYY-MM-DD`).
    #[serde(rename = "Expiry_Date")]
    pub expiry_date: String,
    #[serde(rename = "Provider_ID")]
    pub provider_id: i64,
    #[serde(rename = "Provider_Type")]
    pub provider_type: ProviderType,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Food_Type")]
    pub food_type: String,
    #[serde(rename = "Meal_Type")]
    pub meal_type: MealType,
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "Claim_ID")]
    pub id: i64,
    #[serde(rename = "Food_ID")]
    pub food_id: i64,
    #[serde(rename = "Receiver_ID", alias = "ReceiverID", alias = "ReceiverId")]
    pub receiver_id: i64,
    #[serde(rename = "Status")]
    pub status: ClaimStatus,
}
