//! # Canonical order types
//!
//! Layer 0 of the workspace. Everything downstream (the cleaner, the analytics
//! engine and the CLI) speaks in terms of the types defined here and nothing
//! else. This crate has no knowledge of CSV files or configuration.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Fulfilment, OrderStatus};
pub use error::CoreError;
pub use structs::{OrderRecord, OrderTable, YearMonth};
