//! Data-access layer tests against an in-memory SQLite database.

#![cfg(feature = "testing")]

use db::models::{ClaimStatus, FoodListing, Provider, ProviderType};
use db::testing::{memory_store, seeded_store};
use db::{DataAccess, DataStore, Value};

#[tokio::test]
async fn query_returns_named_columns_and_decodes_into_models() {
    let store = seeded_store().await;

    let set = store
        .query(r#"SELECT * FROM "Providers" ORDER BY "Provider_ID""#, &[])
        .await;
    assert_eq!(set.columns(), &["Provider_ID", "Name", "Type", "Address", "City", "Contact"]);
    assert_eq!(set.len(), 3);

    let providers: Vec<Provider> = set.decode().unwrap();
    assert_eq!(providers[1].name, "Daily Bread");
    assert_eq!(providers[1].provider_type, ProviderType::Restaurant);
    assert_eq!(providers[1].id, 2);
}

#[tokio::test]
async fn empty_result_keeps_its_columns() {
    let store = seeded_store().await;
    let set = store
        .try_query(r#"SELECT * FROM "Claims" WHERE "Status" = $1"#, &["Lost".into()])
        .await
        .unwrap();
    assert!(set.is_empty());
    assert_eq!(set.columns(), &["Claim_ID", "Food_ID", "Receiver_ID", "Status"]);
}

#[tokio::test]
async fn positional_parameters_bind_in_order() {
    let store = seeded_store().await;
    let set = store
        .query(
            r#"SELECT "Food_Name" FROM "Food_Listings_Dataset" WHERE "Quantity" >= $1 AND "Location" = $2"#,
            &[Value::Int(10), "Adambury".into()],
        )
        .await;
    assert_eq!(set.column("Food_Name").unwrap(), vec![&Value::from("Bread")]);
}

#[tokio::test]
async fn aggregates_decode_as_numbers() {
    let store = seeded_store().await;
    let set = store
        .query(
            r#"SELECT SUM("Quantity") AS "Total", CAST(AVG("Quantity") AS DOUBLE PRECISION) AS "Mean" FROM "Food_Listings_Dataset""#,
            &[],
        )
        .await;
    assert_eq!(set.cell(0, "Total").and_then(Value::as_i64), Some(35));
    let mean = set.cell(0, "Mean").and_then(Value::as_f64).unwrap();
    assert!((mean - 35.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn failed_statement_returns_false_and_sets_banner() {
    let store = seeded_store().await;
    assert!(store.last_error().is_none());

    let ok = store
        .execute(r#"INSERT INTO "Nowhere" ("x") VALUES ($1)"#, &[Value::Int(1)])
        .await;
    assert!(!ok);
    assert!(store.last_error().unwrap().starts_with("Database error"));

    store.clear_error();
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn banner_clears_once_the_database_answers_again() {
    let store = seeded_store().await;
    assert!(!store.execute(r#"DELETE FROM "Nowhere""#, &[]).await);
    assert!(store.last_error().is_some());

    let set = store.query(r#"SELECT COUNT(*) AS "n" FROM "Providers""#, &[]).await;
    assert_eq!(set.cell(0, "n"), Some(&Value::Int(3)));
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn disconnected_banner_persists() {
    let store = DataStore::disconnected("Error connecting to database: refused");
    store.query("SELECT 1", &[]).await;
    store.query("SELECT 2", &[]).await;
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn constraint_violation_is_reported_as_failure() {
    let store = seeded_store().await;
    let ok = store
        .execute(
            r#"INSERT INTO "Food_Listings_Dataset" ("Food_Name", "Quantity", "Expiry_Date", "Provider_ID", "Provider_Type", "Meal_Type") VALUES ($1, $2, $3, $4, $5, $6)"#,
            &["Soup".into(), Value::Int(0), "2026-01-01".into(), Value::Int(1), "Restaurant".into(), "Lunch".into()],
        )
        .await;
    assert!(!ok);
}

#[tokio::test]
async fn malformed_read_degrades_to_empty_set() {
    let store = seeded_store().await;
    let set = store.query("SELEKT nonsense", &[]).await;
    assert!(set.is_empty());
    assert!(set.columns().is_empty());
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn disconnected_store_degrades_everything() {
    let store = DataStore::disconnected("Error connecting to database: refused");
    assert!(!store.is_connected());

    assert!(store.query("SELECT 1", &[]).await.is_empty());
    assert!(!store.execute(r#"DELETE FROM "Claims""#, &[]).await);
    assert!(matches!(
        store.try_query("SELECT 1", &[]).await,
        Err(db::DbError::ConnectionUnavailable)
    ));
    assert_eq!(store.last_error().as_deref(), Some("Database connection unavailable"));
}

#[tokio::test]
async fn write_invalidates_cached_reads_of_the_same_table() {
    let store = seeded_store().await;
    let sql = r#"SELECT COUNT(*) AS "n" FROM "Claims""#;

    let before = store.query(sql, &[]).await;
    assert_eq!(before.cell(0, "n"), Some(&Value::Int(4)));
    assert!(!store.cache().is_empty());

    assert!(
        store
            .execute(
                r#"INSERT INTO "Claims" ("Food_ID", "Receiver_ID", "Status") VALUES ($1, $2, $3)"#,
                &[Value::Int(2), Value::Int(2), ClaimStatus::Pending.label().into()],
            )
            .await
    );

    let after = store.query(sql, &[]).await;
    assert_eq!(after.cell(0, "n"), Some(&Value::Int(5)));
}

#[tokio::test]
async fn null_parameters_round_trip() {
    let store = memory_store().await;
    let set = store
        .query(r#"SELECT $1 AS "nothing", $2 AS "word""#, &[Value::Null, "hi".into()])
        .await;
    assert_eq!(set.cell(0, "nothing"), Some(&Value::Null));
    assert_eq!(set.cell(0, "word"), Some(&Value::from("hi")));
}

#[tokio::test]
async fn columns_lists_table_schema() {
    let store = memory_store().await;
    let cols = store.columns("Receivers").await.unwrap();
    assert_eq!(cols, vec!["Receiver_ID", "Name", "Type", "City", "Contact"]);
    assert!(store.columns("Missing").await.is_err());
}

#[tokio::test]
async fn listings_decode_with_enums() {
    let store = seeded_store().await;
    let set = store
        .query(r#"SELECT * FROM "Food_Listings_Dataset" ORDER BY "Food_ID""#, &[])
        .await;
    let listings: Vec<FoodListing> = set.decode().unwrap();
    let quantities: Vec<i64> = listings.iter().map(|l| l.quantity).collect();
    assert_eq!(quantities, vec![10, 5, 20]);
    assert_eq!(listings[2].meal_type, db::models::MealType::Dinner);
}
