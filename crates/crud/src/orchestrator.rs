//! Maps a (table, operation) pair onto a parameterised statement and runs
//! it through the data-access layer.

use db::{DataAccess, ResultSet, Value};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::schema::{FieldKind, FieldSpec, TableKind};
use crate::{CrudError, Record};

/// One editable field of an update form, prefilled from the current row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub current: Value,
}

/// Update form for a single row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    pub table: TableKind,
    pub id_column: &'static str,
    pub id: i64,
    pub fields: Vec<FormField>,
}

impl EditForm {
    /// Current values keyed by field name, ready to be edited and submitted.
    pub fn to_record(&self) -> Record {
        self.fields
            .iter()
            .map(|f| (f.spec.name, f.current.clone()))
            .collect()
    }
}

pub struct CrudOrchestrator<'a> {
    store: &'a dyn DataAccess,
}

impl<'a> CrudOrchestrator<'a> {
    pub fn new(store: &'a dyn DataAccess) -> Self {
        Self { store }
    }

    /// Insert a new row. Missing optional text fields are stored as `''`.
    #[instrument(skip(self, table, record), fields(table = %table))]
    pub async fn create(&self, table: TableKind, record: &Record) -> Result<(), CrudError> {
        reject_unknown_fields(table, record)?;
        let values = table
            .fields()
            .iter()
            .map(|spec| spec.coerce(record.get(spec.name)))
            .collect::<Result<Vec<_>, _>>()?;

        let sql = insert_sql(table);
        if !self.store.execute(&sql, &values).await {
            warn!("insert into {table} failed");
            return Err(CrudError::WriteFailed);
        }
        info!("inserted row into {table}");
        Ok(())
    }

    /// Full-table select ordered by identity.
    pub async fn read(&self, table: TableKind) -> ResultSet {
        let sql = format!(
            r#"SELECT * FROM "{}" ORDER BY "{}""#,
            table.sql_name(),
            table.id_column()
        );
        self.store.query(&sql, &[]).await
    }

    /// Identity values available for selection in update/delete forms.
    pub async fn ids(&self, table: TableKind) -> Vec<i64> {
        let sql = format!(
            r#"SELECT "{id}" FROM "{t}" ORDER BY "{id}""#,
            id = table.id_column(),
            t = table.sql_name()
        );
        self.store
            .query(&sql, &[])
            .await
            .rows()
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_i64))
            .collect()
    }

    /// Editable fields of the selected row, defaulted to its current values.
    pub async fn edit_form(&self, table: TableKind, id: Option<i64>) -> Result<EditForm, CrudError> {
        let id = selected(table, id)?;
        let row = self.current_row(table, id).await?;

        let fields = table
            .fields()
            .iter()
            .map(|spec| FormField {
                spec: *spec,
                current: row.cell(0, spec.name).cloned().unwrap_or_default(),
            })
            .collect();

        Ok(EditForm {
            table,
            id_column: table.id_column(),
            id,
            fields,
        })
    }

    /// Apply `changes` over the selected row's current values and write
    /// every editable field back.
    #[instrument(skip(self, table, changes), fields(table = %table))]
    pub async fn update(
        &self,
        table: TableKind,
        id: Option<i64>,
        changes: &Record,
    ) -> Result<(), CrudError> {
        let id = selected(table, id)?;
        reject_unknown_fields(table, changes)?;
        let row = self.current_row(table, id).await?;

        let mut values = table
            .fields()
            .iter()
            .map(|spec| {
                let submitted = changes.get(spec.name).or_else(|| row.cell(0, spec.name));
                spec.coerce(submitted)
            })
            .collect::<Result<Vec<_>, _>>()?;
        values.push(Value::Int(id));

        let sql = update_sql(table);
        if !self.store.execute(&sql, &values).await {
            warn!("update of {table} {id} failed");
            return Err(CrudError::WriteFailed);
        }
        info!("updated {table} {id}");
        Ok(())
    }

    /// Remove the selected row.
    #[instrument(skip(self, table), fields(table = %table))]
    pub async fn delete(&self, table: TableKind, id: Option<i64>) -> Result<(), CrudError> {
        let id = selected(table, id)?;
        self.current_row(table, id).await?;

        let sql = format!(
            r#"DELETE FROM "{}" WHERE "{}" = $1"#,
            table.sql_name(),
            table.id_column()
        );
        if !self.store.execute(&sql, &[Value::Int(id)]).await {
            warn!("delete of {table} {id} failed");
            return Err(CrudError::WriteFailed);
        }
        info!("deleted {table} {id}");
        Ok(())
    }

    /// Fetch the row by identity. A failed lookup is `WriteFailed` (and lands
    /// on the banner); an empty one is `NotFound`.
    async fn current_row(&self, table: TableKind, id: i64) -> Result<ResultSet, CrudError> {
        let sql = format!(
            r#"SELECT * FROM "{}" WHERE "{}" = $1"#,
            table.sql_name(),
            table.id_column()
        );
        let row = self
            .store
            .try_query(&sql, &[Value::Int(id)])
            .await
            .map_err(|e| {
                self.store.report_failure("query", &e);
                CrudError::WriteFailed
            })?;
        if row.is_empty() {
            return Err(CrudError::NotFound {
                table: table.sql_name(),
                column: table.id_column(),
                id,
            });
        }
        Ok(row)
    }
}

fn selected(table: TableKind, id: Option<i64>) -> Result<i64, CrudError> {
    id.ok_or(CrudError::NoSelection {
        column: table.id_column(),
    })
}

fn reject_unknown_fields(table: TableKind, record: &Record) -> Result<(), CrudError> {
    match record.fields().find(|(name, _)| table.field(name).is_none()) {
        Some((name, _)) => Err(CrudError::UnknownField {
            field: name.to_owned(),
            table: table.sql_name(),
        }),
        None => Ok(()),
    }
}

fn quoted_columns(table: TableKind) -> impl Iterator<Item = String> {
    table.fields().iter().map(|f| format!("\"{}\"", f.name))
}

/// `INSERT INTO "T" ("a", "b") VALUES ($1, $2)`
pub fn insert_sql(table: TableKind) -> String {
    let columns: Vec<String> = quoted_columns(table).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        r#"INSERT INTO "{}" ({}) VALUES ({})"#,
        table.sql_name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `UPDATE "T" SET "a" = $1, "b" = $2 WHERE "id" = $3`
pub fn update_sql(table: TableKind) -> String {
    let assignments: Vec<String> = quoted_columns(table)
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", i + 1))
        .collect();
    format!(
        r#"UPDATE "{}" SET {} WHERE "{}" = ${}"#,
        table.sql_name(),
        assignments.join(", "),
        table.id_column(),
        assignments.len() + 1
    )
}

/// Human-readable hint for a field, used by form renderers.
pub fn field_hint(spec: &FieldSpec) -> String {
    match spec.kind {
        FieldKind::Text if spec.required => "text (required)".into(),
        FieldKind::Text => "text".into(),
        FieldKind::Integer { min } => format!("whole number ≥ {min}"),
        FieldKind::Date => "date (YYYY-MM-DD)".into(),
        FieldKind::Choice { options } => options.join(" | "),
    }
}
