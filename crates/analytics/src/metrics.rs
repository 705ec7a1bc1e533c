//! Result structures returned by `SalesAnalyzer`.
//!
//! All of them serialize, so a presentation layer can render them directly
//! or ship them as JSON.

use chrono::NaiveDate;
use core_types::{Fulfilment, YearMonth};
use rust_decimal::Decimal;
use serde::Serialize;

/// Revenue booked in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: YearMonth,
    pub revenue: Decimal,
    /// Distinct orders placed in the month.
    pub orders: usize,
    pub quantity: u64,
}

/// Totals for one group of a ranked breakdown (a state, a category, a SKU).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub revenue: Decimal,
    pub quantity: u64,
    /// Distinct orders with at least one line in the group.
    pub orders: usize,
    pub lines: usize,
}

/// The two independent category rankings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRankings {
    pub by_revenue: Vec<GroupTotal>,
    pub by_quantity: Vec<GroupTotal>,
}

/// One side of the B2B/B2C split.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    pub revenue: Decimal,
    pub orders: usize,
    pub lines: usize,
    /// `None` when the segment has no orders.
    pub average_order_value: Option<Decimal>,
    /// Share of total revenue, `None` when the table has no revenue at all.
    pub revenue_share_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentSplit {
    pub b2b: Segment,
    pub b2c: Segment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfilmentStats {
    pub fulfilment: Fulfilment,
    pub orders: usize,
    pub cancelled_orders: usize,
    pub cancellation_rate_pct: Decimal,
    pub revenue: Decimal,
}

/// A line whose amount lies outside the box-plot fences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedRow {
    /// Zero-based position in the analysed table.
    pub row: usize,
    pub order_id: String,
    pub amount: Decimal,
}

/// Box-plot fences over non-cancelled sale amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub q1: Decimal,
    pub q3: Decimal,
    pub iqr: Decimal,
    pub lower: Decimal,
    pub upper: Decimal,
    /// How many lines the fences were computed over.
    pub sample_size: usize,
    pub flagged: Vec<FlaggedRow>,
}

/// Headline figures of the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_revenue: Decimal,
    pub total_lines: usize,
    pub total_orders: usize,
    pub total_quantity: u64,
    pub states: usize,
    pub categories: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Share of lines flagged B2B; `None` on an empty table.
    pub b2b_line_pct: Option<Decimal>,
}

/// A labelled occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub quantity: u64,
    pub revenue: Decimal,
    /// Mean amount per line in the category.
    pub average_line_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub orders: usize,
}
