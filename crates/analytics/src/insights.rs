//! Rule-based highlights and recommendations drawn from the KPIs.

use crate::engine::{RegionLevel, SalesAnalyzer};
use crate::grouping::rank_descending;
use crate::metrics::{Count, GroupTotal, MonthlyRevenue};
use configuration::InsightSettings;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

const UNDERPERFORMING_STATES: usize = 5;
const MOST_CANCELLED_CATEGORIES: usize = 5;
const FOCUS_STATES: usize = 3;
const PEAK_MONTHS: usize = 2;
const UPSELL_CATEGORIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Health {
    Healthy,
    Warning,
}

// Fulfilment score thresholds, in percent of lines dispatched.
const EXCELLENT_FULFILMENT_PCT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
const GOOD_FULFILMENT_PCT: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfilmentGrade {
    Excellent,
    Good,
    NeedsImprovement,
}

impl FulfilmentGrade {
    pub fn from_pct(rate_pct: Decimal) -> Self {
        if rate_pct > EXCELLENT_FULFILMENT_PCT {
            FulfilmentGrade::Excellent
        } else if rate_pct > GOOD_FULFILMENT_PCT {
            FulfilmentGrade::Good
        } else {
            FulfilmentGrade::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfilmentScore {
    pub rate_pct: Decimal,
    pub grade: FulfilmentGrade,
}

/// A named group and the revenue it brought in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub name: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationHealth {
    pub rate_pct: Decimal,
    pub health: Health,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    ReduceCancellations { rate_pct: Decimal },
    FocusStates { states: Vec<String> },
    PlanInventory { months: Vec<String> },
    UpsellCategories { categories: Vec<String> },
    ExpandB2b { share_pct: Decimal },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::ReduceCancellations { rate_pct } => write!(
                f,
                "Reduce the {:.1}% cancellation rate: improve product descriptions and delivery estimates",
                rate_pct
            ),
            Recommendation::FocusStates { states } => {
                write!(f, "Concentrate marketing on the top states: {}", states.join(", "))
            }
            Recommendation::PlanInventory { months } => {
                write!(f, "Plan inventory for peak months: {}", months.join(", "))
            }
            Recommendation::UpsellCategories { categories } => write!(
                f,
                "Consider bundling or upselling in low-AOV categories: {}",
                categories.join(", ")
            ),
            Recommendation::ExpandB2b { share_pct } => write!(
                f,
                "B2B brings only {:.1}% of revenue: explore B2B expansion",
                share_pct
            ),
        }
    }
}

/// Highlights of one table. Each field is `None`/empty when the table does
/// not hold enough data for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub top_state: Option<Highlight>,
    pub top_category: Option<Highlight>,
    pub peak_month: Option<Highlight>,
    pub cancellation: Option<CancellationHealth>,
    pub b2b_revenue_share_pct: Option<Decimal>,
    pub fulfilment: Option<FulfilmentScore>,
    /// See `SalesAnalyzer::health_score`.
    pub health_score: Option<Decimal>,
    /// Lowest-revenue states, weakest first.
    pub underperforming_states: Vec<GroupTotal>,
    pub most_cancelled_categories: Vec<Count>,
    pub recommendations: Vec<Recommendation>,
}

impl Insights {
    pub fn derive(analyzer: &SalesAnalyzer<'_>, settings: &InsightSettings) -> Self {
        let states = analyzer.region_sales(RegionLevel::State);
        let categories = analyzer.category_sales().by_revenue;

        let mut months = analyzer.monthly_revenue();
        rank_descending(&mut months, |m| m.revenue);
        let month_label = |m: &MonthlyRevenue| {
            format!("{} {}", m.month.month_name(), m.month.year)
        };

        let cancellation = analyzer.cancellation_rate_pct().ok().map(|rate_pct| {
            let health = if rate_pct > settings.cancellation_warning_pct {
                Health::Warning
            } else {
                Health::Healthy
            };
            CancellationHealth { rate_pct, health }
        });

        let b2b_revenue_share_pct = analyzer.b2b_split().b2b.revenue_share_pct;

        let fulfilment = analyzer.fulfilment_score_pct().ok().map(|rate_pct| FulfilmentScore {
            rate_pct,
            grade: FulfilmentGrade::from_pct(rate_pct),
        });
        let health_score = analyzer.health_score().ok();

        let mut underperforming_states = states.clone();
        underperforming_states.sort_by(|a, b| a.revenue.cmp(&b.revenue));
        underperforming_states.truncate(UNDERPERFORMING_STATES);

        let mut most_cancelled_categories = analyzer.cancellations_by_category();
        most_cancelled_categories.truncate(MOST_CANCELLED_CATEGORIES);

        let mut recommendations = Vec::new();
        if let Some(c) = &cancellation {
            if c.rate_pct > settings.cancellation_recommend_pct {
                recommendations.push(Recommendation::ReduceCancellations {
                    rate_pct: c.rate_pct,
                });
            }
        }
        if !states.is_empty() {
            recommendations.push(Recommendation::FocusStates {
                states: states.iter().take(FOCUS_STATES).map(|g| g.key.clone()).collect(),
            });
        }
        if !months.is_empty() {
            recommendations.push(Recommendation::PlanInventory {
                months: months.iter().take(PEAK_MONTHS).map(month_label).collect(),
            });
        }
        let mut by_line_value = analyzer.category_performance();
        by_line_value.sort_by(|a, b| a.average_line_amount.cmp(&b.average_line_amount));
        if !by_line_value.is_empty() {
            recommendations.push(Recommendation::UpsellCategories {
                categories: by_line_value
                    .into_iter()
                    .take(UPSELL_CATEGORIES)
                    .map(|c| c.category)
                    .collect(),
            });
        }
        if let Some(share_pct) = b2b_revenue_share_pct {
            if share_pct < settings.b2b_expansion_pct {
                recommendations.push(Recommendation::ExpandB2b { share_pct });
            }
        }

        Self {
            top_state: states.first().map(highlight),
            top_category: categories.first().map(highlight),
            peak_month: months.first().map(|m| Highlight {
                name: month_label(m),
                revenue: m.revenue,
            }),
            cancellation,
            b2b_revenue_share_pct,
            fulfilment,
            health_score,
            underperforming_states,
            most_cancelled_categories,
            recommendations,
        }
    }
}

fn highlight(group: &GroupTotal) -> Highlight {
    Highlight {
        name: group.key.clone(),
        revenue: group.revenue,
    }
}
