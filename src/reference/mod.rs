//! Reference data ingestion
//!
//! - `csv`: quote-aware CSV reading shared with the training loaders
//! - `dose_table`: the typed fertilizer dosage table

pub mod csv;
pub mod dose_table;

pub use dose_table::{DoseTable, ReferenceError};
