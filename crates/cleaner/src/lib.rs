//! # Order export cleaner
//!
//! Turns the raw marketplace order export into the canonical `OrderTable`
//! and reads/writes the cleaned snapshot.
//!
//! - `Cleaner` normalises one raw export: casing, dates, sentinels for
//!   missing values, fulfilment defaulting, zeroed cancelled amounts.
//! - `canonical` persists the result as CSV and loads it back, refusing
//!   files that do not carry every canonical column.
//!
//! The analytics crate never depends on this one; it only sees the table.

pub mod canonical;
pub mod cleaner;
pub mod error;
pub mod normalize;

pub use cleaner::{CleanOutput, Cleaner, CleaningSummary, RejectReason};
pub use error::CleanerError;
