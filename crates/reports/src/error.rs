//! Report-level error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A parameterised report was run without its parameter.
    #[error("report {report} requires the '{name}' parameter")]
    MissingParameter { report: u8, name: &'static str },

    /// No report with this number exists in the catalog.
    #[error("unknown report number {0}")]
    UnknownReport(u8),
}
