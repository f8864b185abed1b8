//! CRUD round trips against the in-memory fixture.

use crud::{CrudError, CrudOrchestrator, Record, TableKind};
use db::testing::seeded_store;
use db::{DataStore, ResultSet, Value};

fn sample(table: TableKind) -> Record {
    match table {
        TableKind::Providers => Record::new()
            .with("Name", "Harvest Hub")
            .with("Type", "Catering Service")
            .with("Address", "1 Elm St")
            .with("City", "Carlsville")
            .with("Contact", "555-0101"),
        TableKind::Receivers => Record::new()
            .with("Name", "Night Shelter")
            .with("Type", "Shelter")
            .with("City", "Bakerton")
            .with("Contact", "555-0202"),
        TableKind::FoodListings => Record::new()
            .with("Food_Name", "Soup")
            .with("Quantity", 4i64)
            .with("Expiry_Date", "2026-05-01")
            .with("Provider_ID", 1i64)
            .with("Provider_Type", "Grocery Store")
            .with("Location", "Adambury")
            .with("Food_Type", "Vegan")
            .with("Meal_Type", "Dinner"),
        TableKind::Claims => Record::new()
            .with("Food_ID", 2i64)
            .with("Receiver_ID", 3i64)
            .with("Status", "Pending"),
    }
}

fn row_with_id(set: &ResultSet, table: TableKind, id: i64) -> Vec<Value> {
    let idx = set.column_index(table.id_column()).unwrap();
    set.rows()
        .iter()
        .find(|row| row[idx] == Value::Int(id))
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn create_then_read_returns_the_submitted_fields() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);

    for table in TableKind::ALL {
        let before = crud.read(table).await.len();
        let record = sample(table);
        crud.create(table, &record).await.unwrap();

        let after = crud.read(table).await;
        assert_eq!(after.len(), before + 1, "{table}");
        let last = after.len() - 1;
        for (field, value) in record.fields() {
            assert_eq!(after.cell(last, field), Some(value), "{table}.{field}");
        }
    }
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn create_fills_missing_optional_text() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);
    let record = Record::new().with("Name", "Quiet Corner").with("Type", "Charity");
    crud.create(TableKind::Receivers, &record).await.unwrap();

    let set = crud.read(TableKind::Receivers).await;
    let last = set.len() - 1;
    assert_eq!(set.cell(last, "City"), Some(&Value::from("")));
    assert_eq!(set.cell(last, "Contact"), Some(&Value::from("")));
}

#[tokio::test]
async fn invalid_records_are_rejected_before_writing() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);

    let zero = sample(TableKind::FoodListings).with("Quantity", 0i64);
    assert_eq!(
        crud.create(TableKind::FoodListings, &zero).await,
        Err(CrudError::Validation {
            field: "Quantity",
            reason: "must be positive".into()
        })
    );

    let blank = sample(TableKind::Providers).with("Name", "");
    assert!(matches!(
        crud.create(TableKind::Providers, &blank).await,
        Err(CrudError::Validation { field: "Name", .. })
    ));

    let bad_status = sample(TableKind::Claims).with("Status", "Lost");
    assert!(matches!(
        crud.create(TableKind::Claims, &bad_status).await,
        Err(CrudError::Validation { field: "Status", .. })
    ));

    let extra = sample(TableKind::Claims).with("Claim_ID", 99i64);
    assert!(matches!(
        crud.create(TableKind::Claims, &extra).await,
        Err(CrudError::UnknownField { .. })
    ));

    assert_eq!(crud.read(TableKind::FoodListings).await.len(), 3);
    assert_eq!(crud.read(TableKind::Providers).await.len(), 3);
    assert_eq!(crud.read(TableKind::Claims).await.len(), 4);
}

#[tokio::test]
async fn update_touches_only_the_selected_row_and_fields() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);
    let table = TableKind::Providers;

    let before = crud.read(table).await;
    crud.update(table, Some(2), &Record::new().with("City", "Carlsville"))
        .await
        .unwrap();
    let after = crud.read(table).await;

    assert_eq!(before.len(), after.len());
    for id in [1, 3] {
        assert_eq!(row_with_id(&before, table, id), row_with_id(&after, table, id));
    }

    let city = after.column_index("City").unwrap();
    let old = row_with_id(&before, table, 2);
    let new = row_with_id(&after, table, 2);
    for (i, (o, n)) in old.iter().zip(&new).enumerate() {
        if i == city {
            assert_eq!(n, &Value::from("Carlsville"));
        } else {
            assert_eq!(o, n, "column {}", after.columns()[i]);
        }
    }
}

#[tokio::test]
async fn update_works_for_every_table() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);
    let changes = [
        (TableKind::Providers, Record::new().with("Contact", "555-9999")),
        (TableKind::Receivers, Record::new().with("Type", "Community Center")),
        (TableKind::FoodListings, Record::new().with("Quantity", "12")),
        (TableKind::Claims, Record::new().with("Status", "Completed")),
    ];

    for (table, change) in changes {
        crud.update(table, Some(1), &change).await.unwrap();
        let set = crud.read(table).await;
        let (field, value) = change.fields().next().unwrap();
        let expected = match value {
            Value::Text(s) if field == "Quantity" => Value::Int(s.parse().unwrap()),
            other => other.clone(),
        };
        assert_eq!(set.cell(0, field), Some(&expected), "{table}.{field}");
    }
}

#[tokio::test]
async fn edit_form_is_prefilled_with_current_values() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);

    let form = crud.edit_form(TableKind::FoodListings, Some(3)).await.unwrap();
    assert_eq!(form.id_column, "Food_ID");
    assert_eq!(form.fields.len(), TableKind::FoodListings.fields().len());
    assert_eq!(form.fields[0].spec.name, "Food_Name");
    assert_eq!(form.fields[0].current, Value::from("Chicken"));

    // Resubmitting the untouched form is a no-op.
    let before = crud.read(TableKind::FoodListings).await;
    crud.update(TableKind::FoodListings, Some(3), &form.to_record())
        .await
        .unwrap();
    assert_eq!(before, crud.read(TableKind::FoodListings).await);
}

#[tokio::test]
async fn update_and_delete_require_a_selection() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);

    assert_eq!(
        crud.delete(TableKind::Claims, None).await,
        Err(CrudError::NoSelection { column: "Claim_ID" })
    );
    assert_eq!(
        crud.update(TableKind::Receivers, None, &Record::new()).await,
        Err(CrudError::NoSelection { column: "Receiver_ID" })
    );
    assert!(matches!(
        crud.edit_form(TableKind::Providers, Some(42)).await,
        Err(CrudError::NotFound { id: 42, .. })
    ));
}

#[tokio::test]
async fn delete_removes_exactly_one_row() {
    let store = seeded_store().await;
    let crud = CrudOrchestrator::new(&store);

    for table in TableKind::ALL {
        let before = crud.ids(table).await;
        crud.delete(table, Some(1)).await.unwrap();
        let after = crud.ids(table).await;
        assert_eq!(after.len(), before.len() - 1, "{table}");
        assert!(!after.contains(&1));
    }

    assert!(matches!(
        crud.delete(TableKind::Providers, Some(1)).await,
        Err(CrudError::NotFound { .. })
    ));
}

#[tokio::test]
async fn writes_fail_cleanly_without_a_connection() {
    let store = DataStore::disconnected("offline");
    let crud = CrudOrchestrator::new(&store);

    assert_eq!(
        crud.create(TableKind::Providers, &sample(TableKind::Providers)).await,
        Err(CrudError::WriteFailed)
    );
    assert_eq!(
        crud.delete(TableKind::Providers, Some(1)).await,
        Err(CrudError::WriteFailed)
    );
    assert!(crud.read(TableKind::Providers).await.is_empty());
    assert!(crud.ids(TableKind::Providers).await.is_empty());
    assert_eq!(
        store.last_error().as_deref(),
        Some("Database connection unavailable")
    );
}
