//! Terminal rendering of analytics results.

use analytics::{
    CategoryPerformance, Count, DailyOrders, FulfilmentGrade, FulfilmentStats, GroupTotal,
    Health, Insights, MonthlyRevenue, OutlierReport, SalesReport, SegmentSplit, Summary,
};
use cleaner::CleaningSummary;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use rust_decimal::Decimal;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h)));
    table
}

pub fn money(value: Decimal) -> String {
    format!("₹{:.2}", value.round_dp(2))
}

pub fn pct(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

fn or_na<T>(value: Option<T>, format: fn(T) -> String) -> String {
    value.map(format).unwrap_or_else(|| "n/a".to_string())
}

fn section(title: &str) {
    println!("\n{}\n{title}\n{}", "=".repeat(60), "=".repeat(60));
}

pub fn print_summary(summary: &Summary) {
    let mut t = table(&["Metric", "Value"]);
    t.add_row(vec!["Total Revenue".to_string(), money(summary.total_revenue)]);
    t.add_row(vec!["Total Orders".to_string(), summary.total_orders.to_string()]);
    t.add_row(vec!["Order Lines".to_string(), summary.total_lines.to_string()]);
    t.add_row(vec!["Total Quantity Sold".to_string(), summary.total_quantity.to_string()]);
    t.add_row(vec!["States Covered".to_string(), summary.states.to_string()]);
    t.add_row(vec!["Product Categories".to_string(), summary.categories.to_string()]);
    t.add_row(vec!["B2B Lines".to_string(), or_na(summary.b2b_line_pct, pct)]);
    let range = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "n/a".to_string(),
    };
    t.add_row(vec!["Date Range".to_string(), range]);
    println!("{t}");
}

fn print_ranking(title: &str, groups: &[GroupTotal], top_n: usize) {
    section(title);
    let mut t = table(&["#", "Name", "Revenue", "Quantity", "Orders"]);
    for (rank, g) in groups.iter().take(top_n).enumerate() {
        t.add_row(vec![
            (rank + 1).to_string(),
            g.key.clone(),
            money(g.revenue),
            g.quantity.to_string(),
            g.orders.to_string(),
        ]);
    }
    println!("{t}");
}

fn print_months(months: &[MonthlyRevenue]) {
    section("MONTHLY REVENUE");
    let mut t = table(&["Month", "Revenue", "Orders", "Quantity"]);
    for m in months {
        t.add_row(vec![
            m.month.to_string(),
            money(m.revenue),
            m.orders.to_string(),
            m.quantity.to_string(),
        ]);
    }
    println!("{t}");
}

fn print_split(split: &SegmentSplit) {
    section("B2B VS B2C");
    let mut t = table(&["Segment", "Revenue", "Share", "Orders", "AOV"]);
    for (name, segment) in [("B2B", &split.b2b), ("B2C", &split.b2c)] {
        t.add_row(vec![
            name.to_string(),
            money(segment.revenue),
            or_na(segment.revenue_share_pct, pct),
            segment.orders.to_string(),
            or_na(segment.average_order_value, money),
        ]);
    }
    println!("{t}");
}

fn print_fulfilment(stats: &[FulfilmentStats]) {
    section("FULFILMENT PERFORMANCE");
    let mut t = table(&["Fulfilment", "Orders", "Cancelled", "Cancellation Rate", "Revenue"]);
    for s in stats {
        t.add_row(vec![
            s.fulfilment.to_string(),
            s.orders.to_string(),
            s.cancelled_orders.to_string(),
            pct(s.cancellation_rate_pct),
            money(s.revenue),
        ]);
    }
    println!("{t}");
}

fn print_counts(title: &str, label: &str, counts: &[Count], top_n: usize) {
    section(title);
    let mut t = table(&[label, "Lines"]);
    for c in counts.iter().take(top_n) {
        t.add_row(vec![c.key.clone(), c.count.to_string()]);
    }
    println!("{t}");
}

fn print_city_volume(cities: &[GroupTotal]) {
    section("TOP CITIES BY ORDER VOLUME");
    let mut t = table(&["#", "City", "Orders", "Revenue"]);
    for (rank, g) in cities.iter().enumerate() {
        t.add_row(vec![
            (rank + 1).to_string(),
            g.key.clone(),
            g.orders.to_string(),
            money(g.revenue),
        ]);
    }
    println!("{t}");
}

fn print_products(products: &[GroupTotal]) {
    section("TOP PRODUCTS BY QUANTITY SOLD");
    let mut t = table(&["#", "SKU", "Quantity", "Revenue"]);
    for (rank, g) in products.iter().enumerate() {
        t.add_row(vec![
            (rank + 1).to_string(),
            g.key.clone(),
            g.quantity.to_string(),
            money(g.revenue),
        ]);
    }
    println!("{t}");
}

/// The most recent `top_n` days, oldest of them first.
fn print_daily_orders(days: &[DailyOrders], top_n: usize) {
    section("ORDERS OVER TIME (LATEST DAYS)");
    let mut t = table(&["Date", "Orders"]);
    for day in &days[days.len().saturating_sub(top_n)..] {
        t.add_row(vec![day.date.to_string(), day.orders.to_string()]);
    }
    println!("{t}");
}

fn print_outliers(report: &OutlierReport, top_n: usize) {
    section("SALE AMOUNT OUTLIERS");
    println!(
        "Q1 {}  Q3 {}  IQR {}  fences [{}, {}]  {} of {} lines flagged",
        money(report.q1),
        money(report.q3),
        money(report.iqr),
        money(report.lower),
        money(report.upper),
        report.flagged.len(),
        report.sample_size
    );
    let mut largest = report.flagged.clone();
    largest.sort_by(|a, b| b.amount.cmp(&a.amount));
    let mut t = table(&["Row", "Order ID", "Amount"]);
    for f in largest.iter().take(top_n) {
        t.add_row(vec![f.row.to_string(), f.order_id.clone(), money(f.amount)]);
    }
    println!("{t}");
}

pub fn print_category_performance(rows: &[CategoryPerformance], top_n: usize) {
    section("CATEGORY PERFORMANCE");
    let mut t = table(&["Category", "Quantity", "Revenue", "Avg Line Amount"]);
    for c in rows.iter().take(top_n) {
        t.add_row(vec![
            c.category.clone(),
            c.quantity.to_string(),
            money(c.revenue),
            money(c.average_line_amount),
        ]);
    }
    println!("{t}");
}

pub fn print_report(report: &SalesReport, top_n: usize) {
    section("SALES ANALYSIS REPORT");
    print_summary(&report.summary);

    let mut t = table(&["KPI", "Value"]);
    t.add_row(vec![
        "Average Order Value".to_string(),
        or_na(report.average_order_value, money),
    ]);
    t.add_row(vec![
        format!("Average Profit Margin (cost ratio {})", report.cost_ratio),
        or_na(report.profit_margin_pct, pct),
    ]);
    t.add_row(vec![
        "Cancellation Rate".to_string(),
        or_na(report.cancellation_rate_pct, pct),
    ]);
    t.add_row(vec![
        "Fulfilment Score".to_string(),
        or_na(report.fulfilment_score_pct, pct),
    ]);
    t.add_row(vec![
        "Revenue Health Score".to_string(),
        or_na(report.health_score, |s| format!("{:.1} / 100", s.round_dp(1))),
    ]);
    println!("{t}");

    print_months(&report.monthly_revenue);
    print_ranking(
        &format!("TOP {top_n} STATES BY REVENUE"),
        &report.region_sales,
        top_n,
    );
    print_ranking(
        &format!("TOP {top_n} CATEGORIES BY REVENUE"),
        &report.category_sales.by_revenue,
        top_n,
    );
    print_ranking(
        &format!("TOP {top_n} CATEGORIES BY QUANTITY"),
        &report.category_sales.by_quantity,
        top_n,
    );
    print_city_volume(&report.top_cities);
    print_split(&report.b2b_split);
    print_fulfilment(&report.fulfilment);
    print_counts("ORDER STATUS", "Status", &report.status_distribution, top_n);
    print_products(&report.top_products);
    print_counts("SIZE DISTRIBUTION", "Size", &report.size_distribution, top_n);
    print_counts(
        "SHIPPING SERVICE LEVEL",
        "Service Level",
        &report.service_levels,
        top_n,
    );
    print_category_performance(&report.category_performance, top_n);
    print_daily_orders(&report.daily_orders, top_n);
    if let Some(outliers) = &report.outliers {
        print_outliers(outliers, top_n);
    }

    if !report.failures.is_empty() {
        section("KPIS NOT COMPUTED");
        for failure in &report.failures {
            println!("• {}: {}", failure.kpi, failure.message);
        }
    }
}

pub fn print_insights(insights: &Insights) {
    section("TOP INSIGHTS");
    if let Some(state) = &insights.top_state {
        println!("Top performing state: {} with {}", state.name, money(state.revenue));
    }
    if let Some(category) = &insights.top_category {
        println!("Best category: {} generated {}", category.name, money(category.revenue));
    }
    if let Some(month) = &insights.peak_month {
        println!("Peak month: {} recorded {}", month.name, money(month.revenue));
    }
    if let Some(c) = &insights.cancellation {
        match c.health {
            Health::Warning => {
                println!("High cancellation rate detected: {}", pct(c.rate_pct))
            }
            Health::Healthy => {
                println!("Cancellation rate is healthy: {}", pct(c.rate_pct))
            }
        }
    }
    if let Some(f) = &insights.fulfilment {
        let verdict = match f.grade {
            FulfilmentGrade::Excellent => "Excellent fulfilment rate",
            FulfilmentGrade::Good => "Good fulfilment rate",
            FulfilmentGrade::NeedsImprovement => "Fulfilment needs improvement",
        };
        println!("{verdict}: {}", pct(f.rate_pct));
    }
    if let Some(score) = insights.health_score {
        println!("Revenue health score: {:.1} / 100", score.round_dp(1));
    }
    if let Some(share) = insights.b2b_revenue_share_pct {
        println!("B2B orders contribute {} of total revenue", pct(share));
    }

    if !insights.underperforming_states.is_empty() {
        println!("\nUnderperforming states:");
        for g in &insights.underperforming_states {
            println!("• {}: {}", g.key, money(g.revenue));
        }
    }
    if !insights.most_cancelled_categories.is_empty() {
        println!("\nCategories with most cancellations:");
        for c in &insights.most_cancelled_categories {
            println!("• {}: {} lines", c.key, c.count);
        }
    }

    section("RECOMMENDATIONS");
    for recommendation in &insights.recommendations {
        println!("• {recommendation}");
    }
}

pub fn print_cleaning_summary(summary: &CleaningSummary) {
    let mut t = table(&["Cleaning", "Rows"]);
    t.add_row(vec!["Read".to_string(), summary.rows_read.to_string()]);
    t.add_row(vec!["Kept".to_string(), summary.rows_kept.to_string()]);
    t.add_row(vec![
        "Duplicates dropped".to_string(),
        summary.duplicates_dropped.to_string(),
    ]);
    t.add_row(vec![
        "Cancelled amounts zeroed".to_string(),
        summary.cancelled_amounts_zeroed.to_string(),
    ]);
    for (reason, count) in &summary.rejected {
        t.add_row(vec![format!("Rejected: {reason}"), count.to_string()]);
    }
    println!("{t}");
    if !summary.defaulted_columns.is_empty() {
        println!(
            "Columns filled with defaults: {}",
            summary.defaulted_columns.join(", ")
        );
    }
}
