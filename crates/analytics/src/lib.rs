//! # Sales Analytics Engine
//!
//! This crate derives the business KPIs of a retail order export: revenue
//! trends, regional and category rankings, average order value, profit
//! margin, cancellation rate, B2B/B2C split, fulfilment performance and
//! sale-amount outliers.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It knows nothing about
//!   files or terminals. It depends only on `core-types` and the settings
//!   structs of `configuration`.
//! - **Read-only input:** `SalesAnalyzer` borrows an immutable `OrderTable`.
//!   The only state it keeps is a lazily built per-order roll-up, which is
//!   safe to cache because the table cannot change underneath it.
//! - **Explicit empty results:** ratio KPIs return `AnalyticsError` on an
//!   empty table; ranked breakdowns return empty vectors. Nothing divides by
//!   zero and nothing produces NaN.
//!
//! ## Public API
//!
//! - `SalesAnalyzer`: every KPI, plus `generate_report`.
//! - `OrderFilter`: narrows a table before analysis (dashboard filters).
//! - `SalesReport`: all KPIs at once, with per-KPI failures collected.
//! - `Insights`: rule-based highlights and recommendations.

pub mod engine;
pub mod error;
pub mod filter;
#[cfg(test)]
mod fixtures;
mod grouping;
pub mod insights;
pub mod metrics;
pub mod report;
pub mod stats;

pub use engine::{RegionLevel, SalesAnalyzer};
pub use error::AnalyticsError;
pub use filter::OrderFilter;
pub use insights::{FulfilmentGrade, FulfilmentScore, Health, Insights, Recommendation};
pub use metrics::{
    CategoryPerformance, CategoryRankings, Count, DailyOrders, FlaggedRow, FulfilmentStats,
    GroupTotal, MonthlyRevenue, OutlierReport, Segment, SegmentSplit, Summary,
};
pub use report::{KpiFailure, SalesReport};
