//! Chart hints for tabular results.
//!
//! Only the *kind* of chart and the columns to plot are decided here;
//! rendering belongs to the presentation layer.

use db::ResultSet;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartHint {
    pub kind: ChartKind,
    /// Category axis / slice names (first column).
    pub label_column: String,
    /// Bar heights / slice sizes (last column).
    pub value_column: String,
}

/// Pick a chart for `table`.
///
/// - Pie: exactly two columns and the caller marks the data proportion-like.
/// - Bar: at least two columns, more than one row, and the last column name
///   contains `Total` or `Count`.
/// - Otherwise no chart.
pub fn chart_hint(table: &ResultSet, proportion_like: bool) -> Option<ChartHint> {
    let columns = table.columns();
    if table.is_empty() || columns.len() < 2 {
        return None;
    }

    let label_column = columns[0].clone();
    let value_column = columns[columns.len() - 1].clone();

    let kind = if proportion_like && columns.len() == 2 {
        ChartKind::Pie
    } else if table.len() > 1 && (value_column.contains("Total") || value_column.contains("Count")) {
        ChartKind::Bar
    } else {
        return None;
    };

    Some(ChartHint { kind, label_column, value_column })
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::Value;

    fn table(columns: &[&str], rows: usize) -> ResultSet {
        ResultSet::new(
            columns.iter().map(|c| c.to_string()).collect(),
            (0..rows)
                .map(|i| columns.iter().map(|_| Value::Int(i as i64)).collect())
                .collect(),
        )
    }

    #[test]
    fn two_column_proportion_is_a_pie() {
        let hint = chart_hint(&table(&["Food_Type", "Listings_Count"], 3), true).unwrap();
        assert_eq!(hint.kind, ChartKind::Pie);
        assert_eq!(hint.label_column, "Food_Type");
        assert_eq!(hint.value_column, "Listings_Count");
    }

    #[test]
    fn total_or_count_suffix_is_a_bar() {
        let hint = chart_hint(&table(&["City", "Total_Providers", "Total_Receivers"], 2), false).unwrap();
        assert_eq!(hint.kind, ChartKind::Bar);
        assert_eq!(hint.value_column, "Total_Receivers");

        let hint = chart_hint(&table(&["Food_Name", "TotalClaims"], 2), false).unwrap();
        assert_eq!(hint.kind, ChartKind::Bar);
    }

    #[test]
    fn proportion_with_three_columns_falls_back_to_bar_rule() {
        assert_eq!(chart_hint(&table(&["Status", "Count", "Percentage"], 3), true), None);
        let hint = chart_hint(&table(&["Status", "Percentage", "Count"], 3), true).unwrap();
        assert_eq!(hint.kind, ChartKind::Bar);
    }

    #[test]
    fn single_row_or_single_column_gets_no_bar() {
        assert_eq!(chart_hint(&table(&["ProviderName", "SuccessfulClaims"], 1), false), None);
        assert_eq!(chart_hint(&table(&["Total_Quantity_Available"], 3), false), None);
        assert_eq!(chart_hint(&table(&["Name", "Avg_Quantity"], 4), false), None);
    }

    #[test]
    fn empty_table_gets_no_chart() {
        assert_eq!(chart_hint(&table(&["Food_Type", "Listings_Count"], 0), true), None);
    }
}
