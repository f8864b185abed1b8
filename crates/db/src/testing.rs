//! In-memory SQLite stores for tests across the workspace.
//!
//! Enabled with the `testing` feature; `db`'s own tests get it via `cfg(test)`.

use crate::pool::{connect_url, run_migrations};
use crate::{DataAccess, DataStore, DbConfig, Value};

/// A fresh in-memory database with the bundled schema applied.
pub async fn memory_store() -> DataStore {
    let config = DbConfig::default();
    let pool = connect_url("sqlite::memory:", &config)
        .await
        .expect("in-memory sqlite should open");
    run_migrations(&pool).await.expect("bundled migrations should apply");
    DataStore::new(pool, config.cache_ttl)
}

/// [`memory_store`] populated by [`seed_fixture`].
pub async fn seeded_store() -> DataStore {
    let store = memory_store().await;
    seed_fixture(&store).await;
    store
}

/// Three providers, three receivers, three listings (quantities 10, 5, 20)
/// and four claims (2 Completed, 1 Pending, 1 Canceled).
pub async fn seed_fixture(store: &dyn DataAccess) {
    let providers: [[&str; 5]; 3] = [
        ["Green Grocer", "Grocery Store", "12 Elm St", "Adambury", "555-0101"],
        ["Daily Bread", "Restaurant", "4 Oak Ave", "Adambury", "555-0102"],
        ["Fresh Mart", "Supermarket", "9 Pine Rd", "Bakerton", "555-0103"],
    ];
    for p in providers {
        exec(
            store,
            r#"INSERT INTO "Providers" ("Name", "Type", "Address", "City", "Contact") VALUES ($1, $2, $3, $4, $5)"#,
            p.iter().map(|v| Value::from(*v)).collect(),
        )
        .await;
    }

    let receivers: [[&str; 4]; 3] = [
        ["Hope Shelter", "Shelter", "Adambury", "555-0201"],
        ["City Food Bank", "Food Bank", "Bakerton", "555-0202"],
        ["Kind Hearts", "Charity", "Carlsville", "555-0203"],
    ];
    for r in receivers {
        exec(
            store,
            r#"INSERT INTO "Receivers" ("Name", "Type", "City", "Contact") VALUES ($1, $2, $3, $4)"#,
            r.iter().map(|v| Value::from(*v)).collect(),
        )
        .await;
    }

    let listings: [(&str, i64, &str, i64, &str, &str, &str, &str); 3] = [
        ("Bread", 10, "2026-03-01", 2, "Restaurant", "Adambury", "Vegetarian", "Breakfast"),
        ("Rice", 5, "2026-03-05", 1, "Grocery Store", "Adambury", "Vegan", "Lunch"),
        ("Chicken", 20, "2026-03-03", 3, "Supermarket", "Bakerton", "Non-Vegetarian", "Dinner"),
    ];
    for (name, qty, expiry, provider, ptype, location, food_type, meal) in listings {
        exec(
            store,
            r#"INSERT INTO "Food_Listings_Dataset" ("Food_Name", "Quantity", "Expiry_Date", "Provider_ID", "Provider_Type", "Location", "Food_Type", "Meal_Type") VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            vec![
                name.into(),
                qty.into(),
                expiry.into(),
                provider.into(),
                ptype.into(),
                location.into(),
                food_type.into(),
                meal.into(),
            ],
        )
        .await;
    }

    let claims: [(i64, i64, &str); 4] = [
        (1, 1, "Completed"),
        (1, 2, "Pending"),
        (3, 1, "Completed"),
        (2, 3, "Canceled"),
    ];
    for (food, receiver, status) in claims {
        exec(
            store,
            r#"INSERT INTO "Claims" ("Food_ID", "Receiver_ID", "Status") VALUES ($1, $2, $3)"#,
            vec![food.into(), receiver.into(), status.into()],
        )
        .await;
    }
}

async fn exec(store: &dyn DataAccess, sql: &str, params: Vec<Value>) {
    store
        .try_execute(sql, &params)
        .await
        .unwrap_or_else(|e| panic!("fixture statement failed: {e}\n{sql}"));
}
