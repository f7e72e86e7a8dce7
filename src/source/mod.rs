//! Source-specific ingestion: data contracts and entry builders.

pub mod ynab;
