use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{Fulfilment, OrderRecord, OrderStatus, OrderTable};
use serde::{Deserialize, Serialize};

/// Narrows an order table before analysis.
///
/// Empty lists and `None` mean "no restriction". Text matches ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Inclusive lower bound on the order date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the order date.
    pub to: Option<NaiveDate>,
    pub states: Vec<String>,
    pub categories: Vec<String>,
    /// Status labels, classified the same way the cleaner classifies them.
    pub statuses: Vec<String>,
    pub b2b: Option<bool>,
    pub fulfilment: Option<Fulfilment>,
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AnalyticsError::InvalidFilter(format!(
                    "start date {from} is after end date {to}"
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, row: &OrderRecord) -> bool {
        if self.from.is_some_and(|from| row.order_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| row.order_date > to) {
            return false;
        }
        if self.b2b.is_some_and(|b2b| row.b2b != b2b) {
            return false;
        }
        if self.fulfilment.is_some_and(|f| row.fulfilment != f) {
            return false;
        }
        if !self.states.is_empty() && !contains_ignore_case(&self.states, &row.state) {
            return false;
        }
        if !self.categories.is_empty() && !contains_ignore_case(&self.categories, &row.category) {
            return false;
        }
        if !self.statuses.is_empty()
            && !self
                .statuses
                .iter()
                .any(|s| OrderStatus::parse(s) == row.status)
        {
            return false;
        }
        true
    }

    /// Returns the matching rows as a new table; `table` is left untouched.
    pub fn apply(&self, table: &OrderTable) -> Result<OrderTable, AnalyticsError> {
        self.validate()?;
        if self.is_empty() {
            return Ok(table.clone());
        }
        let filtered = table.filtered(|row| self.matches(row));
        tracing::info!(
            before = table.len(),
            after = filtered.len(),
            "Applied order filter."
        );
        Ok(filtered)
    }
}

fn contains_ignore_case(candidates: &[String], value: &str) -> bool {
    candidates
        .iter()
        .any(|c| c.trim().eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{line, table};
    use rust_decimal_macros::dec;

    fn sample() -> OrderTable {
        table(vec![
            line("A", dec!(10)).state("Goa").category("Top").date(2022, 4, 1),
            line("B", dec!(20)).state("Kerala").category("Kurta").date(2022, 4, 20).b2b(),
            line("C", dec!(0)).state("Goa").category("Kurta").date(2022, 5, 2).cancelled(),
            line("D", dec!(40)).state("Delhi").category("Set").date(2022, 6, 9).merchant(),
        ])
    }

    fn ids(table: &OrderTable) -> Vec<&str> {
        table.iter().map(|r| r.order_id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let table = sample();
        let filter = OrderFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&table).unwrap(), table);
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = OrderFilter {
            from: NaiveDate::from_ymd_opt(2022, 4, 20),
            to: NaiveDate::from_ymd_opt(2022, 5, 2),
            ..OrderFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample()).unwrap()), vec!["B", "C"]);
    }

    #[test]
    fn text_filters_ignore_case_and_combine() {
        let filter = OrderFilter {
            states: vec!["goa".to_string(), "KERALA".to_string()],
            categories: vec!["kurta".to_string()],
            ..OrderFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample()).unwrap()), vec!["B", "C"]);
    }

    #[test]
    fn status_filter_uses_status_classification() {
        let filter = OrderFilter {
            statuses: vec!["Cancelled".to_string()],
            ..OrderFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample()).unwrap()), vec!["C"]);
    }

    #[test]
    fn flag_filters() {
        let b2b = OrderFilter {
            b2b: Some(true),
            ..OrderFilter::default()
        };
        assert_eq!(ids(&b2b.apply(&sample()).unwrap()), vec!["B"]);

        let merchant = OrderFilter {
            fulfilment: Some(Fulfilment::Merchant),
            ..OrderFilter::default()
        };
        assert_eq!(ids(&merchant.apply(&sample()).unwrap()), vec!["D"]);
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let filter = OrderFilter {
            from: NaiveDate::from_ymd_opt(2022, 6, 1),
            to: NaiveDate::from_ymd_opt(2022, 4, 1),
            ..OrderFilter::default()
        };
        assert!(matches!(
            filter.apply(&sample()),
            Err(AnalyticsError::InvalidFilter(_))
        ));
    }
}
