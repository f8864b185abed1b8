//! `reports` crate — the reporting catalog and read-only views.
//!
//! - [`catalog`]: the thirteen numbered analytical reports.
//! - [`chart`]: bar/pie hints derived from a result's shape.
//! - [`claims`]: claims joined with listings and receivers, tolerant of the
//!   receiver identity column's spelling.
//! - [`insights`]: dashboard counts, listing filters and analytics tables.

pub mod catalog;
pub mod chart;
pub mod claims;
pub mod error;
pub mod insights;

pub use catalog::{catalog, run_all, run_report, ReportId, ReportOutput, ReportParams, ReportSummary};
pub use chart::{chart_hint, ChartHint, ChartKind};
pub use claims::{claims_with_details, ClaimsDetail, ClaimsSchema};
pub use error::ReportError;
