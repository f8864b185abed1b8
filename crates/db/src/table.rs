//! Tabular query results.
//!
//! [`ResultSet`] is what every read returns: named columns plus rows of
//! loosely-typed [`Value`] cells. It is deliberately schema-less so the same
//! type carries `SELECT *` output, report aggregates and in-memory joins.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::DbError;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A single cell, or a positional statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Normalised key used when matching rows across result sets.
    ///
    /// `Int(3)` and `Float(3.0)` produce the same key; `Null` never matches.
    pub fn join_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Float(f) if f.fract() == 0.0 => Some((*f as i64).to_string()),
            other => Some(other.to_string()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// ResultSet
// ---------------------------------------------------------------------------

/// Rows with named columns. Column names are kept even when no rows match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Build a result set; every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Distinct non-null values of a column in first-seen order.
    pub fn distinct(&self, column: &str) -> Vec<Value> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| &r[idx])
            .filter(|v| v.join_key().is_some_and(|k| seen.insert(k)))
            .cloned()
            .collect()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> ResultSet {
        Self::new(self.columns.clone(), self.rows.iter().take(n).cloned().collect())
    }

    /// Keep rows whose `column` is one of `allowed`. An empty `allowed`
    /// slice means "no filter"; an unknown column filters everything out.
    pub fn filter_in(&self, column: &str, allowed: &[Value]) -> ResultSet {
        if allowed.is_empty() {
            return self.clone();
        }
        let Some(idx) = self.column_index(column) else {
            return Self::new(self.columns.clone(), Vec::new());
        };
        let keys: HashSet<String> = allowed.iter().filter_map(Value::join_key).collect();
        let rows = self
            .rows
            .iter()
            .filter(|r| r[idx].join_key().is_some_and(|k| keys.contains(&k)))
            .cloned()
            .collect();
        Self::new(self.columns.clone(), rows)
    }

    /// Project onto the listed columns that exist, in the listed order.
    pub fn select(&self, columns: &[&str]) -> ResultSet {
        let picked: Vec<(usize, &str)> = columns
            .iter()
            .filter_map(|c| self.column_index(c).map(|i| (i, *c)))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|r| picked.iter().map(|(i, _)| r[*i].clone()).collect())
            .collect();
        Self::new(picked.iter().map(|(_, c)| c.to_string()).collect(), rows)
    }

    /// Left join `right` onto `self` where `self[left_on] == right[right_on]`.
    ///
    /// Every right-hand column except the join key is appended; a name that
    /// already exists on the left gets a `_right` suffix. Left rows without a
    /// match keep nulls in the appended columns. Returns `None` when either
    /// key column is missing.
    pub fn left_join(&self, right: &ResultSet, left_on: &str, right_on: &str) -> Option<ResultSet> {
        let left_idx = self.column_index(left_on)?;
        let right_idx = right.column_index(right_on)?;

        let appended: Vec<usize> = (0..right.columns.len()).filter(|i| *i != right_idx).collect();

        let mut columns = self.columns.clone();
        for &i in &appended {
            let name = &right.columns[i];
            if columns.contains(name) {
                columns.push(format!("{name}_right"));
            } else {
                columns.push(name.clone());
            }
        }

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, row) in right.rows.iter().enumerate() {
            if let Some(key) = row[right_idx].join_key() {
                index.entry(key).or_default().push(pos);
            }
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let matches = row[left_idx].join_key().and_then(|k| index.get(&k));
            match matches {
                Some(positions) => {
                    for &pos in positions {
                        let mut merged = row.clone();
                        merged.extend(appended.iter().map(|&i| right.rows[pos][i].clone()));
                        rows.push(merged);
                    }
                }
                None => {
                    let mut merged = row.clone();
                    merged.extend(appended.iter().map(|_| Value::Null));
                    rows.push(merged);
                }
            }
        }

        Some(Self::new(columns, rows))
    }

    /// Deserialize every row into `T`, matching fields by column name.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(Value::to_json))
                    .collect();
                Ok(serde_json::from_value(serde_json::Value::Object(object))?)
            })
            .collect()
    }

    /// Render as RFC 4180 CSV with a header line.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_line(&mut out, self.columns.iter().map(String::as_str));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            push_csv_line(&mut out, cells.iter().map(String::as_str));
        }
        out
    }
}

fn push_csv_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Fixed-width text rendering for terminals.
impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(ToString::to_string).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                rendered
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:<w$}"))
                .collect();
            writeln!(f, "{}", padded.join(" | ").trim_end())
        };

        line(f, &self.columns)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &rendered {
            line(f, row)?;
        }
        write!(f, "({} rows)", self.rows.len())
    }
}
