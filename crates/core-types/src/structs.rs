use crate::enums::{Fulfilment, OrderStatus};
use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line item of one customer order, after cleaning.
///
/// Every field is populated: absent values in the raw export are replaced by
/// an explicit sentinel during cleaning, never left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Not unique per row; an order may span several line items.
    pub order_id: String,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    /// Always zero for cancelled lines.
    pub amount: Decimal,
    pub quantity: u32,
    pub category: String,
    pub state: String,
    pub city: String,
    pub b2b: bool,
    pub fulfilment: Fulfilment,
    pub fulfilled_by: String,
    pub courier_status: String,
    pub promotion_id: String,
    pub currency: String,
    pub sku: String,
    pub size: String,
    pub ship_service_level: String,
}

impl OrderRecord {
    /// The names of every column in the canonical table, in serialization order.
    pub const COLUMNS: [&'static str; 17] = [
        "order_id",
        "order_date",
        "status",
        "amount",
        "quantity",
        "category",
        "state",
        "city",
        "b2b",
        "fulfilment",
        "fulfilled_by",
        "courier_status",
        "promotion_id",
        "currency",
        "sku",
        "size",
        "ship_service_level",
    ];

    /// Checks the canonical-table contract for a single row.
    pub fn validate(&self, row: usize) -> Result<(), CoreError> {
        let violation = |reason: String| CoreError::InvariantViolation { row, reason };

        if self.amount < Decimal::ZERO {
            return Err(violation(format!("negative amount {}", self.amount)));
        }
        if self.status.is_cancelled() && !self.amount.is_zero() {
            return Err(violation(format!(
                "cancelled line carries amount {}",
                self.amount
            )));
        }

        if self.status.as_str().trim().is_empty() {
            return Err(violation("status label is empty".to_string()));
        }

        let text_fields = [
            ("order_id", &self.order_id),
            ("category", &self.category),
            ("state", &self.state),
            ("city", &self.city),
            ("fulfilled_by", &self.fulfilled_by),
            ("courier_status", &self.courier_status),
            ("promotion_id", &self.promotion_id),
            ("currency", &self.currency),
            ("sku", &self.sku),
            ("size", &self.size),
            ("ship_service_level", &self.ship_service_level),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                return Err(violation(format!("field '{name}' is empty")));
            }
        }

        Ok(())
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.order_date)
    }
}

/// The cleaned, validated order dataset.
///
/// Produced once and never mutated afterwards. Row identifiers used across
/// the workspace are zero-based positions into this table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTable {
    rows: Vec<OrderRecord>,
}

impl OrderTable {
    /// Builds a table, rejecting the first row that breaks the contract.
    pub fn new(rows: Vec<OrderRecord>) -> Result<Self, CoreError> {
        for (index, row) in rows.iter().enumerate() {
            row.validate(index)?;
        }
        Ok(Self { rows })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[OrderRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderRecord> {
        self.rows.iter()
    }

    /// Returns a new table holding the rows that satisfy `predicate`.
    /// Rows are already valid, so no re-validation is needed.
    pub fn filtered<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&OrderRecord) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    pub fn into_rows(self) -> Vec<OrderRecord> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a OrderTable {
    type Item = &'a OrderRecord;
    type IntoIter = std::slice::Iter<'a, OrderRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidInput(
                "month".to_string(),
                format!("{month} is not between 1 and 12"),
            ));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Full English month name, e.g. "April".
    pub fn month_name(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        NAMES[(self.month.clamp(1, 12) - 1) as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(status: OrderStatus, amount: Decimal) -> OrderRecord {
        OrderRecord {
            order_id: "171-0000001-0000001".to_string(),
            order_date: NaiveDate::from_ymd_opt(2022, 4, 30).unwrap(),
            status,
            amount,
            quantity: 1,
            category: "Kurta".to_string(),
            state: "Maharashtra".to_string(),
            city: "Mumbai".to_string(),
            b2b: false,
            fulfilment: Fulfilment::Platform,
            fulfilled_by: "Amazon".to_string(),
            courier_status: "Shipped".to_string(),
            promotion_id: "No Promotion".to_string(),
            currency: "INR".to_string(),
            sku: "JNE3781-KR-XXXL".to_string(),
            size: "3XL".to_string(),
            ship_service_level: "Expedited".to_string(),
        }
    }

    #[test]
    fn valid_rows_build_a_table() {
        let table = OrderTable::new(vec![
            record(OrderStatus::Delivered, dec!(399.00)),
            record(OrderStatus::Cancelled, Decimal::ZERO),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn cancelled_rows_must_have_zero_amount() {
        let err = OrderTable::new(vec![
            record(OrderStatus::Delivered, dec!(10)),
            record(OrderStatus::Cancelled, dec!(300)),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { row: 1, .. }));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let err = OrderTable::new(vec![record(OrderStatus::Shipped, dec!(-1))]).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { row: 0, .. }));
    }

    #[test]
    fn empty_text_fields_are_rejected() {
        let mut row = record(OrderStatus::Shipped, dec!(5));
        row.currency = "  ".to_string();
        assert!(row.validate(3).is_err());
    }

    #[test]
    fn blank_status_labels_are_rejected() {
        let err = OrderTable::new(vec![record(OrderStatus::Other(String::new()), dec!(5))])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { row: 0, .. }));
    }

    #[test]
    fn filtered_keeps_matching_rows_only() {
        let table = OrderTable::new(vec![
            record(OrderStatus::Delivered, dec!(399.00)),
            record(OrderStatus::Cancelled, Decimal::ZERO),
        ])
        .unwrap();
        let live = table.filtered(|r| !r.status.is_cancelled());
        assert_eq!(live.len(), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn year_month_orders_chronologically_and_displays_padded() {
        let march = YearMonth::new(2022, 3).unwrap();
        let december_prior = YearMonth::new(2021, 12).unwrap();
        assert!(december_prior < march);
        assert_eq!(march.to_string(), "2022-03");
        assert_eq!(march.month_name(), "March");
        assert!(YearMonth::new(2022, 13).is_err());
    }
}
