use crate::error::AnalyticsError;
use crate::grouping::{counts_by, rank_descending, totals_by};
use crate::metrics::{
    CategoryPerformance, CategoryRankings, Count, DailyOrders, FlaggedRow, FulfilmentStats,
    GroupTotal, MonthlyRevenue, OutlierReport, Segment, SegmentSplit, Summary,
};
use crate::report::{KpiFailure, SalesReport};
use crate::stats::{percentage, quartiles};
use chrono::NaiveDate;
use configuration::AnalysisSettings;
use core_types::{Fulfilment, OrderRecord, OrderStatus, OrderTable, YearMonth};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap, HashSet};

// Revenue health score: revenue per line / 10 plus half the fulfilment score,
// capped at 100.
const HEALTH_REVENUE_DIVISOR: Decimal = Decimal::TEN;
const HEALTH_FULFILMENT_WEIGHT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Which column a regional breakdown groups by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionLevel {
    #[default]
    State,
    City,
}

/// All lines of one order, rolled up.
#[derive(Debug)]
struct OrderRollup {
    revenue: Decimal,
    /// True only when every line of the order was cancelled.
    cancelled: bool,
    fulfilment: Fulfilment,
    order_date: NaiveDate,
}

/// Computes the KPI catalogue over one immutable order table.
///
/// Construction is free; the per-order roll-up that several KPIs share is
/// built on first use and reused afterwards.
#[derive(Debug)]
pub struct SalesAnalyzer<'a> {
    table: &'a OrderTable,
    settings: AnalysisSettings,
    orders: OnceCell<Vec<OrderRollup>>,
}

impl<'a> SalesAnalyzer<'a> {
    pub fn new(table: &'a OrderTable, settings: &AnalysisSettings) -> Self {
        Self {
            table,
            settings: settings.clone(),
            orders: OnceCell::new(),
        }
    }

    /// An analyzer with the default cost ratio and outlier fence.
    pub fn with_defaults(table: &'a OrderTable) -> Self {
        Self::new(table, &AnalysisSettings::default())
    }

    pub fn table(&self) -> &'a OrderTable {
        self.table
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    fn rows(&self) -> &'a [OrderRecord] {
        self.table.rows()
    }

    fn ensure_not_empty(&self, kpi: &str) -> Result<(), AnalyticsError> {
        if self.table.is_empty() {
            return Err(AnalyticsError::EmptyDataset(kpi.to_string()));
        }
        Ok(())
    }

    /// Distinct orders in first-appearance order.
    fn orders(&self) -> &[OrderRollup] {
        self.orders.get_or_init(|| {
            let mut index: HashMap<&'a str, usize> = HashMap::new();
            let mut orders: Vec<OrderRollup> = Vec::new();

            for row in self.rows() {
                match index.get(row.order_id.as_str()).copied() {
                    Some(position) => {
                        let order = &mut orders[position];
                        order.revenue += row.amount;
                        order.cancelled &= row.status.is_cancelled();
                    }
                    None => {
                        index.insert(row.order_id.as_str(), orders.len());
                        orders.push(OrderRollup {
                            revenue: row.amount,
                            cancelled: row.status.is_cancelled(),
                            fulfilment: row.fulfilment,
                            order_date: row.order_date,
                        });
                    }
                }
            }

            tracing::debug!(lines = self.table.len(), orders = orders.len(), "Built order roll-up.");
            orders
        })
    }

    pub fn total_revenue(&self) -> Decimal {
        self.rows().iter().map(|r| r.amount).sum()
    }

    /// Number of distinct `order_id`s.
    pub fn order_count(&self) -> usize {
        self.orders().len()
    }

    /// Revenue per calendar month, oldest first. Months without orders are
    /// not invented.
    pub fn monthly_revenue(&self) -> Vec<MonthlyRevenue> {
        let mut months: BTreeMap<YearMonth, (Decimal, u64, HashSet<&str>)> = BTreeMap::new();
        for row in self.rows() {
            let entry = months.entry(row.month()).or_default();
            entry.0 += row.amount;
            entry.1 += u64::from(row.quantity);
            entry.2.insert(row.order_id.as_str());
        }

        months
            .into_iter()
            .map(|(month, (revenue, quantity, orders))| MonthlyRevenue {
                month,
                revenue,
                orders: orders.len(),
                quantity,
            })
            .collect()
    }

    /// Revenue per region, highest first. Ties keep first-appearance order.
    pub fn region_sales(&self, level: RegionLevel) -> Vec<GroupTotal> {
        let mut totals = match level {
            RegionLevel::State => totals_by(self.rows(), |r| r.state.as_str()),
            RegionLevel::City => totals_by(self.rows(), |r| r.city.as_str()),
        };
        rank_descending(&mut totals, |g| g.revenue);
        totals
    }

    /// Categories ranked by revenue and, independently, by units sold.
    pub fn category_sales(&self) -> CategoryRankings {
        let totals = totals_by(self.rows(), |r| r.category.as_str());

        let mut by_revenue = totals.clone();
        rank_descending(&mut by_revenue, |g| g.revenue);

        let mut by_quantity = totals;
        rank_descending(&mut by_quantity, |g| g.quantity);

        CategoryRankings {
            by_revenue,
            by_quantity,
        }
    }

    /// Total revenue divided by the number of distinct orders.
    ///
    /// Multi-line orders count once; cancelled orders count too (with zero
    /// revenue), so every order placed is in the denominator.
    pub fn average_order_value(&self) -> Result<Decimal, AnalyticsError> {
        self.ensure_not_empty("average order value")?;
        let orders = Decimal::from(self.order_count());
        Ok(self.total_revenue() / orders)
    }

    /// Revenue-weighted profit margin, in percent, under the configured cost ratio.
    ///
    /// Lines without revenue (cancellations, zero-amount lines) are left out:
    /// their margin is undefined.
    pub fn profit_margin_pct(&self) -> Result<Decimal, AnalyticsError> {
        self.ensure_not_empty("profit margin")?;

        let cost_ratio = self.settings.cost_ratio;
        let (revenue, profit) = self
            .rows()
            .iter()
            .filter(|r| r.amount > Decimal::ZERO)
            .fold((Decimal::ZERO, Decimal::ZERO), |(revenue, profit), r| {
                let cost = r.amount * cost_ratio;
                (revenue + r.amount, profit + (r.amount - cost))
            });

        percentage(profit, revenue).ok_or_else(|| {
            AnalyticsError::NotEnoughData("no line with a positive amount".to_string())
        })
    }

    /// Percentage of distinct orders that were cancelled.
    pub fn cancellation_rate_pct(&self) -> Result<Decimal, AnalyticsError> {
        self.ensure_not_empty("cancellation rate")?;
        let orders = self.orders();
        let cancelled = orders.iter().filter(|o| o.cancelled).count();
        percentage(Decimal::from(cancelled), Decimal::from(orders.len()))
            .ok_or_else(|| AnalyticsError::Calculation("order roll-up is empty".to_string()))
    }

    /// Revenue, orders and AOV for business versus consumer buyers.
    pub fn b2b_split(&self) -> SegmentSplit {
        let total = self.total_revenue();
        let segment = |b2b: bool| {
            let mut orders = HashSet::new();
            let mut revenue = Decimal::ZERO;
            let mut lines = 0;
            for row in self.rows().iter().filter(|r| r.b2b == b2b) {
                orders.insert(row.order_id.as_str());
                revenue += row.amount;
                lines += 1;
            }
            let average_order_value = if orders.is_empty() {
                None
            } else {
                Some(revenue / Decimal::from(orders.len()))
            };
            Segment {
                revenue,
                orders: orders.len(),
                lines,
                average_order_value,
                revenue_share_pct: percentage(revenue, total),
            }
        };

        SegmentSplit {
            b2b: segment(true),
            b2c: segment(false),
        }
    }

    /// Orders and cancellations per fulfilment type, platform first.
    /// An order is attributed to the fulfilment of its first line.
    pub fn fulfilment_performance(&self) -> Vec<FulfilmentStats> {
        let mut partitions: BTreeMap<Fulfilment, (usize, usize, Decimal)> = BTreeMap::new();
        for order in self.orders() {
            let entry = partitions.entry(order.fulfilment).or_default();
            entry.0 += 1;
            if order.cancelled {
                entry.1 += 1;
            }
            entry.2 += order.revenue;
        }

        partitions
            .into_iter()
            .map(|(fulfilment, (orders, cancelled_orders, revenue))| FulfilmentStats {
                fulfilment,
                orders,
                cancelled_orders,
                // A partition only exists once it has an order.
                cancellation_rate_pct: percentage(
                    Decimal::from(cancelled_orders),
                    Decimal::from(orders),
                )
                .unwrap_or(Decimal::ZERO),
                revenue,
            })
            .collect()
    }

    /// Flags non-cancelled lines whose amount lies outside
    /// `[Q1 - k·IQR, Q3 + k·IQR]`, with `k` the configured fence (1.5).
    pub fn outliers(&self) -> Result<OutlierReport, AnalyticsError> {
        self.ensure_not_empty("outliers")?;

        let sample: Vec<(usize, &OrderRecord)> = self
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.status.is_cancelled())
            .collect();

        let mut amounts: Vec<Decimal> = sample.iter().map(|(_, r)| r.amount).collect();
        amounts.sort();
        let (q1, q3) = quartiles(&amounts).ok_or_else(|| {
            AnalyticsError::NotEnoughData("every line is cancelled".to_string())
        })?;

        let iqr = q3 - q1;
        let reach = iqr * self.settings.outlier_fence;
        let lower = q1 - reach;
        let upper = q3 + reach;

        let flagged = sample
            .iter()
            .filter(|(_, r)| r.amount < lower || r.amount > upper)
            .map(|(row, r)| FlaggedRow {
                row: *row,
                order_id: r.order_id.clone(),
                amount: r.amount,
            })
            .collect();

        Ok(OutlierReport {
            q1,
            q3,
            iqr,
            lower,
            upper,
            sample_size: amounts.len(),
            flagged,
        })
    }

    /// Headline totals of the table.
    pub fn summary(&self) -> Summary {
        let rows = self.rows();
        let states: HashSet<&str> = rows.iter().map(|r| r.state.as_str()).collect();
        let categories: HashSet<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        let b2b_lines = rows.iter().filter(|r| r.b2b).count();

        Summary {
            total_revenue: self.total_revenue(),
            total_lines: rows.len(),
            total_orders: self.order_count(),
            total_quantity: rows.iter().map(|r| u64::from(r.quantity)).sum(),
            states: states.len(),
            categories: categories.len(),
            first_date: rows.iter().map(|r| r.order_date).min(),
            last_date: rows.iter().map(|r| r.order_date).max(),
            b2b_line_pct: percentage(Decimal::from(b2b_lines), Decimal::from(rows.len())),
        }
    }

    /// Lines per status label, most frequent first.
    pub fn status_distribution(&self) -> Vec<Count> {
        counts_by(self.rows(), |r| r.status.as_str())
    }

    /// Lines per size, most frequent first.
    pub fn size_distribution(&self) -> Vec<Count> {
        counts_by(self.rows(), |r| r.size.as_str())
    }

    /// The `n` SKUs with the most units sold.
    pub fn top_products(&self, n: usize) -> Vec<GroupTotal> {
        let mut totals = totals_by(self.rows(), |r| r.sku.as_str());
        rank_descending(&mut totals, |g| g.quantity);
        totals.truncate(n);
        totals
    }

    /// Units, revenue and mean line amount per category, by revenue.
    pub fn category_performance(&self) -> Vec<CategoryPerformance> {
        let mut totals = totals_by(self.rows(), |r| r.category.as_str());
        rank_descending(&mut totals, |g| g.revenue);
        totals
            .into_iter()
            .map(|g| CategoryPerformance {
                // Groups are created from at least one line.
                average_line_amount: g.revenue / Decimal::from(g.lines.max(1)),
                category: g.key,
                quantity: g.quantity,
                revenue: g.revenue,
            })
            .collect()
    }

    /// Distinct orders per calendar day, oldest first.
    pub fn daily_orders(&self) -> Vec<DailyOrders> {
        let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for order in self.orders() {
            *days.entry(order.order_date).or_default() += 1;
        }
        days.into_iter()
            .map(|(date, orders)| DailyOrders { date, orders })
            .collect()
    }

    /// Lines per shipping service level, most frequent first.
    pub fn service_level_distribution(&self) -> Vec<Count> {
        counts_by(self.rows(), |r| r.ship_service_level.as_str())
    }

    /// The `n` cities with the most distinct orders. Revenue does not
    /// affect the order; ties keep first-appearance order.
    pub fn top_cities_by_orders(&self, n: usize) -> Vec<GroupTotal> {
        let mut totals = totals_by(self.rows(), |r| r.city.as_str());
        rank_descending(&mut totals, |g| g.orders);
        totals.truncate(n);
        totals
    }

    /// Percentage of lines that left the warehouse (shipped or delivered).
    pub fn fulfilment_score_pct(&self) -> Result<Decimal, AnalyticsError> {
        self.ensure_not_empty("fulfilment score")?;
        let rows = self.rows();
        let dispatched = rows
            .iter()
            .filter(|r| matches!(r.status, OrderStatus::Shipped | OrderStatus::Delivered))
            .count();
        percentage(Decimal::from(dispatched), Decimal::from(rows.len()))
            .ok_or_else(|| AnalyticsError::Calculation("table has no lines".to_string()))
    }

    /// Revenue health on a 0 to 100 scale:
    /// `min(100, revenue per line / 10 + fulfilment score / 2)`.
    pub fn health_score(&self) -> Result<Decimal, AnalyticsError> {
        let fulfilment = self.fulfilment_score_pct()?;
        let revenue_per_line = self.total_revenue() / Decimal::from(self.table.len());
        let score =
            revenue_per_line / HEALTH_REVENUE_DIVISOR + fulfilment * HEALTH_FULFILMENT_WEIGHT;
        Ok(score.min(Decimal::ONE_HUNDRED))
    }

    /// Cancelled lines per category, most cancelled first.
    pub fn cancellations_by_category(&self) -> Vec<Count> {
        counts_by(
            self.rows().iter().filter(|r| r.status.is_cancelled()),
            |r| r.category.as_str(),
        )
    }

    /// Runs every KPI and gathers the results into one report.
    ///
    /// A KPI that fails is recorded in `failures` and left as `None`; the
    /// rest of the report is still produced.
    pub fn generate_report(&self) -> SalesReport {
        let mut failures = Vec::new();

        let average_order_value =
            attempt("average_order_value", self.average_order_value(), &mut failures);
        let profit_margin_pct =
            attempt("profit_margin_pct", self.profit_margin_pct(), &mut failures);
        let cancellation_rate_pct = attempt(
            "cancellation_rate_pct",
            self.cancellation_rate_pct(),
            &mut failures,
        );
        let outliers = attempt("outliers", self.outliers(), &mut failures);
        let fulfilment_score_pct = attempt(
            "fulfilment_score_pct",
            self.fulfilment_score_pct(),
            &mut failures,
        );
        let health_score = attempt("health_score", self.health_score(), &mut failures);
        let top_n = self.settings.top_n;

        SalesReport {
            summary: self.summary(),
            average_order_value,
            profit_margin_pct,
            cancellation_rate_pct,
            cost_ratio: self.settings.cost_ratio,
            fulfilment_score_pct,
            health_score,
            monthly_revenue: self.monthly_revenue(),
            region_sales: self.region_sales(RegionLevel::State),
            category_sales: self.category_sales(),
            b2b_split: self.b2b_split(),
            fulfilment: self.fulfilment_performance(),
            outliers,
            status_distribution: self.status_distribution(),
            top_cities: self.top_cities_by_orders(top_n),
            top_products: self.top_products(top_n),
            size_distribution: self.size_distribution(),
            service_levels: self.service_level_distribution(),
            category_performance: self.category_performance(),
            daily_orders: self.daily_orders(),
            failures,
        }
    }
}

fn attempt<T>(
    kpi: &str,
    result: Result<T, AnalyticsError>,
    failures: &mut Vec<KpiFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(kpi, error = %e, "KPI could not be computed.");
            failures.push(KpiFailure {
                kpi: kpi.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}
