//! Row builders shared by the unit tests.

use chrono::NaiveDate;
use core_types::{Fulfilment, OrderRecord, OrderStatus, OrderTable};
use rust_decimal::Decimal;

pub struct Line {
    record: OrderRecord,
}

/// A delivered, consumer, platform-fulfilled line dated 2022-04-15.
pub fn line(order_id: &str, amount: Decimal) -> Line {
    Line {
        record: OrderRecord {
            order_id: order_id.to_string(),
            order_date: NaiveDate::from_ymd_opt(2022, 4, 15).unwrap(),
            status: OrderStatus::Delivered,
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
            sku: "SKU-1".to_string(),
            size: "M".to_string(),
            ship_service_level: "Standard".to_string(),
        },
    }
}

impl Line {
    pub fn cancelled(mut self) -> Self {
        self.record.status = OrderStatus::Cancelled;
        self.record.amount = Decimal::ZERO;
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.record.status = status;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.record.category = category.to_string();
        self
    }

    pub fn state(mut self, state: &str) -> Self {
        self.record.state = state.to_string();
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.record.city = city.to_string();
        self
    }

    pub fn date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.record.order_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.record.quantity = quantity;
        self
    }

    pub fn b2b(mut self) -> Self {
        self.record.b2b = true;
        self
    }

    pub fn merchant(mut self) -> Self {
        self.record.fulfilment = Fulfilment::Merchant;
        self.record.fulfilled_by = "Easy Ship".to_string();
        self
    }

    pub fn sku(mut self, sku: &str) -> Self {
        self.record.sku = sku.to_string();
        self
    }

    pub fn size(mut self, size: &str) -> Self {
        self.record.size = size.to_string();
        self
    }

    pub fn service_level(mut self, level: &str) -> Self {
        self.record.ship_service_level = level.to_string();
        self
    }
}

pub fn table(lines: Vec<Line>) -> OrderTable {
    OrderTable::new(lines.into_iter().map(|l| l.record).collect()).unwrap()
}

/// Orders A (two lines), B and C (cancelled), as in the reference example.
pub fn reference_table() -> OrderTable {
    use rust_decimal_macros::dec;
    table(vec![
        line("A", dec!(100)).category("Kurta").state("Maharashtra"),
        line("A", dec!(50)).category("Kurta").state("Maharashtra"),
        line("B", dec!(200)).category("Set").state("Karnataka"),
        line("C", dec!(300)).category("Set").state("Karnataka").cancelled(),
    ])
}
