use crate::metrics::{
    CategoryPerformance, CategoryRankings, Count, DailyOrders, FulfilmentStats, GroupTotal,
    MonthlyRevenue, OutlierReport, SegmentSplit, Summary,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// A KPI that could not be computed, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiFailure {
    pub kpi: String,
    pub message: String,
}

/// Every KPI of one table, as produced by `SalesAnalyzer::generate_report`.
///
/// This struct is the data transfer object between the analytics engine and
/// whatever presents it (terminal tables, JSON export).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub summary: Summary,

    // I. Headline ratios. `None` when the KPI failed; see `failures`.
    pub average_order_value: Option<Decimal>,
    pub profit_margin_pct: Option<Decimal>,
    pub cancellation_rate_pct: Option<Decimal>,
    /// The assumed cost ratio the margin was computed with.
    pub cost_ratio: Decimal,
    /// Share of lines shipped or delivered.
    pub fulfilment_score_pct: Option<Decimal>,
    /// Revenue health on a 0 to 100 scale.
    pub health_score: Option<Decimal>,

    // II. Breakdowns. Empty when the table is empty.
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub region_sales: Vec<GroupTotal>,
    pub category_sales: CategoryRankings,
    pub b2b_split: SegmentSplit,
    pub fulfilment: Vec<FulfilmentStats>,
    pub status_distribution: Vec<Count>,

    // III. Anomalies.
    pub outliers: Option<OutlierReport>,

    // IV. Products and logistics. Rankings are cut to `analysis.top_n`.
    pub top_cities: Vec<GroupTotal>,
    pub top_products: Vec<GroupTotal>,
    pub size_distribution: Vec<Count>,
    pub service_levels: Vec<Count>,
    pub category_performance: Vec<CategoryPerformance>,
    pub daily_orders: Vec<DailyOrders>,

    pub failures: Vec<KpiFailure>,
}

impl SalesReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
