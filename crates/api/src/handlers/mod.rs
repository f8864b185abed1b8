pub mod claims;
pub mod dashboard;
pub mod reports;
pub mod tables;
