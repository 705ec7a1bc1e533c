use crate::error::CleanerError;
use crate::normalize::{
    header_key, or_sentinel, parse_amount, parse_date, parse_flag, parse_quantity, title_case,
};
use configuration::CleaningConfig;
use core_types::{Fulfilment, OrderRecord, OrderStatus, OrderTable};
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns of the raw export, named as they appear in its header.
mod column {
    pub const ORDER_ID: &str = "Order ID";
    pub const DATE: &str = "Date";
    pub const STATUS: &str = "Status";
    pub const FULFILMENT: &str = "Fulfilment";
    pub const SERVICE_LEVEL: &str = "ship-service-level";
    pub const SKU: &str = "SKU";
    pub const CATEGORY: &str = "Category";
    pub const SIZE: &str = "Size";
    pub const COURIER_STATUS: &str = "Courier Status";
    pub const QTY: &str = "Qty";
    pub const CURRENCY: &str = "currency";
    pub const AMOUNT: &str = "Amount";
    pub const CITY: &str = "ship-city";
    pub const STATE: &str = "ship-state";
    pub const PROMOTION: &str = "promotion-ids";
    pub const B2B: &str = "B2B";
    pub const FULFILLED_BY: &str = "fulfilled-by";

    pub const REQUIRED: [&str; 7] = [ORDER_ID, DATE, STATUS, AMOUNT, QTY, CATEGORY, STATE];

    pub const OPTIONAL: [&str; 10] = [
        FULFILMENT,
        SERVICE_LEVEL,
        SKU,
        SIZE,
        COURIER_STATUS,
        CURRENCY,
        CITY,
        PROMOTION,
        B2B,
        FULFILLED_BY,
    ];
}

const UNKNOWN: &str = "Unknown";

/// Why a raw row did not make it into the canonical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingOrderId,
    InvalidDate,
    InvalidAmount,
    NegativeAmount,
    InvalidQuantity,
    InvalidB2bFlag,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::MissingOrderId => "missing order id",
            RejectReason::InvalidDate => "unparseable date",
            RejectReason::InvalidAmount => "unparseable amount",
            RejectReason::NegativeAmount => "negative amount",
            RejectReason::InvalidQuantity => "invalid quantity",
            RejectReason::InvalidB2bFlag => "unrecognised B2B flag",
        };
        f.write_str(text)
    }
}

/// Bookkeeping for one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub duplicates_dropped: usize,
    /// Cancelled lines whose listed amount was replaced by zero.
    pub cancelled_amounts_zeroed: usize,
    /// Optional columns absent from the header, filled entirely with sentinels.
    pub defaulted_columns: Vec<String>,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl CleaningSummary {
    pub fn rows_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// The canonical table together with how it was obtained.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub table: OrderTable,
    pub summary: CleaningSummary,
}

/// Maps canonical column names to their position in the raw header.
struct ColumnMap {
    positions: HashMap<&'static str, usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, CleanerError> {
        let by_key: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (header_key(name), index))
            .collect();

        let mut positions = HashMap::new();
        for name in column::REQUIRED {
            let index = by_key
                .get(&header_key(name))
                .ok_or_else(|| CleanerError::MissingColumn(name.to_string()))?;
            positions.insert(name, *index);
        }
        for name in column::OPTIONAL {
            if let Some(index) = by_key.get(&header_key(name)) {
                positions.insert(name, *index);
            }
        }

        Ok(Self { positions })
    }

    /// The trimmed cell for `name`, or "" when the column or cell is absent.
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.positions
            .get(name)
            .and_then(|index| record.get(*index))
            .map(str::trim)
            .unwrap_or("")
    }

    fn missing_optional(&self) -> Vec<String> {
        column::OPTIONAL
            .iter()
            .filter(|name| !self.positions.contains_key(*name))
            .map(|name| name.to_string())
            .collect()
    }
}

/// Normalises the raw order export into the canonical table.
#[derive(Debug, Clone)]
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn clean_path(&self, path: &Path) -> Result<CleanOutput, CleanerError> {
        tracing::info!(path = %path.display(), "Cleaning raw order export.");
        let file = File::open(path)?;
        self.clean_reader(file)
    }

    /// Reads a raw export and returns the validated canonical table.
    ///
    /// Rows that cannot be repaired (no order id, unreadable date or amount)
    /// are skipped and counted in the summary; a missing required column
    /// aborts the whole run.
    pub fn clean_reader<R: Read>(&self, reader: R) -> Result<CleanOutput, CleanerError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CleanerError::EmptyInput);
        }
        let columns = ColumnMap::from_headers(&headers)?;

        let mut summary = CleaningSummary {
            defaulted_columns: columns.missing_optional(),
            ..CleaningSummary::default()
        };
        if !summary.defaulted_columns.is_empty() {
            tracing::warn!(
                columns = ?summary.defaulted_columns,
                "Optional columns missing from export; sentinels will be used."
            );
        }

        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut rows = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            summary.rows_read += 1;

            if self.config.drop_duplicates {
                if !seen.insert(fingerprint(&columns, &record)) {
                    summary.duplicates_dropped += 1;
                    continue;
                }
            }

            match self.clean_row(&columns, &record) {
                Ok((row, zeroed)) => {
                    if zeroed {
                        summary.cancelled_amounts_zeroed += 1;
                    }
                    rows.push(row);
                }
                Err(reason) => {
                    tracing::debug!(line = summary.rows_read, %reason, "Rejected raw row.");
                    *summary.rejected.entry(reason).or_insert(0) += 1;
                }
            }
        }

        summary.rows_kept = rows.len();
        let table = OrderTable::new(rows)?;

        tracing::info!(
            read = summary.rows_read,
            kept = summary.rows_kept,
            rejected = summary.rows_rejected(),
            duplicates = summary.duplicates_dropped,
            "Cleaning complete."
        );

        Ok(CleanOutput { table, summary })
    }

    /// Builds one canonical row. The flag reports whether a cancelled line's
    /// amount had to be forced to zero.
    fn clean_row(
        &self,
        columns: &ColumnMap,
        record: &StringRecord,
    ) -> Result<(OrderRecord, bool), RejectReason> {
        let order_id = columns.get(record, column::ORDER_ID);
        if order_id.is_empty() {
            return Err(RejectReason::MissingOrderId);
        }

        let order_date =
            parse_date(columns.get(record, column::DATE)).ok_or(RejectReason::InvalidDate)?;

        let status = OrderStatus::parse(columns.get(record, column::STATUS));

        let listed_amount =
            parse_amount(columns.get(record, column::AMOUNT)).ok_or(RejectReason::InvalidAmount)?;
        if listed_amount < Decimal::ZERO {
            return Err(RejectReason::NegativeAmount);
        }
        let (amount, zeroed) = if status.is_cancelled() {
            (Decimal::ZERO, !listed_amount.is_zero())
        } else {
            (listed_amount, false)
        };

        let quantity =
            parse_quantity(columns.get(record, column::QTY)).ok_or(RejectReason::InvalidQuantity)?;
        let b2b = parse_flag(columns.get(record, column::B2B)).ok_or(RejectReason::InvalidB2bFlag)?;

        let fulfilled_by_raw = columns.get(record, column::FULFILLED_BY);
        let fulfilment = Fulfilment::parse(columns.get(record, column::FULFILMENT)).unwrap_or(
            // A named third-party shipper means the seller arranged delivery.
            if fulfilled_by_raw.is_empty() {
                Fulfilment::Platform
            } else {
                Fulfilment::Merchant
            },
        );
        let fulfilled_by = or_sentinel(fulfilled_by_raw, fulfilment.default_fulfilled_by());

        let row = OrderRecord {
            order_id: order_id.to_string(),
            order_date,
            status,
            amount,
            quantity,
            category: title_or(columns.get(record, column::CATEGORY), UNKNOWN),
            state: title_or(columns.get(record, column::STATE), UNKNOWN),
            city: title_or(columns.get(record, column::CITY), UNKNOWN),
            b2b,
            fulfilment,
            fulfilled_by,
            courier_status: or_sentinel(
                columns.get(record, column::COURIER_STATUS),
                &self.config.default_courier_status,
            ),
            promotion_id: or_sentinel(
                columns.get(record, column::PROMOTION),
                &self.config.default_promotion,
            ),
            currency: or_sentinel(
                &columns.get(record, column::CURRENCY).to_uppercase(),
                &self.config.default_currency,
            ),
            sku: or_sentinel(columns.get(record, column::SKU), UNKNOWN),
            size: or_sentinel(columns.get(record, column::SIZE), "Free"),
            ship_service_level: or_sentinel(
                columns.get(record, column::SERVICE_LEVEL),
                "Standard",
            ),
        };

        Ok((row, zeroed))
    }
}

fn title_or(raw: &str, sentinel: &str) -> String {
    let value = title_case(raw);
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value
    }
}

/// The cells of every recognised column; export-only columns such as a
/// running index are ignored so they cannot hide duplicates.
fn fingerprint(columns: &ColumnMap, record: &StringRecord) -> Vec<String> {
    column::REQUIRED
        .iter()
        .chain(column::OPTIONAL.iter())
        .map(|name| columns.get(record, name).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const HEADER: &str = "index,Order ID,Date,Status,Fulfilment,ship-service-level,Style,SKU,Category,Size,ASIN,Courier Status,Qty,currency,Amount,ship-city,ship-state,ship-postal-code,ship-country,promotion-ids,B2B,fulfilled-by";

    fn clean(body: &str) -> CleanOutput {
        let input = format!("{HEADER}\n{body}");
        Cleaner::new(&CleaningConfig::default())
            .clean_reader(input.as_bytes())
            .unwrap()
    }

    #[test]
    fn normalises_a_typical_export_row() {
        let output = clean(
            "0,405-8078784-5731545,04-30-22,Shipped - Delivered to Buyer,Merchant,Standard,SET389,SET389-KR-NP-S,set,S,B09KXVBD7Z,Shipped,1,INR,647.62,MUMBAI,MAHARASHTRA,400081,IN,,False,Easy Ship\n",
        );
        let rows = output.table.rows();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.order_id, "405-8078784-5731545");
        assert_eq!(row.order_date, NaiveDate::from_ymd_opt(2022, 4, 30).unwrap());
        assert_eq!(row.status, OrderStatus::Delivered);
        assert_eq!(row.amount, dec!(647.62));
        assert_eq!(row.category, "Set");
        assert_eq!(row.state, "Maharashtra");
        assert_eq!(row.city, "Mumbai");
        assert_eq!(row.fulfilment, Fulfilment::Merchant);
        assert_eq!(row.fulfilled_by, "Easy Ship");
        assert_eq!(row.promotion_id, "No Promotion");
        assert!(!row.b2b);
    }

    #[test]
    fn cancelled_lines_lose_their_amount() {
        let output = clean(
            "1,171-9198151-1101146,04-30-22,Cancelled,Amazon,Expedited,JNE3781,JNE3781-KR-XXXL,kurta,3XL,B09K3WFS32,,1,INR,406.00,BENGALURU,KARNATAKA,560085,IN,,False,\n",
        );
        let row = &output.table.rows()[0];
        assert_eq!(row.status, OrderStatus::Cancelled);
        assert_eq!(row.amount, Decimal::ZERO);
        assert_eq!(row.courier_status, "Pending");
        assert_eq!(output.summary.cancelled_amounts_zeroed, 1);
    }

    #[test]
    fn blank_fulfilment_is_derived_from_fulfilled_by() {
        let output = clean(
            "0,A,04-30-22,Shipped,,Standard,S,S-1,kurta,M,X,Shipped,1,,100,PUNE,MAHARASHTRA,1,IN,,False,Easy Ship\n\
             1,B,04-30-22,Shipped,,Standard,S,S-2,kurta,M,X,Shipped,1,,100,PUNE,MAHARASHTRA,1,IN,,False,\n",
        );
        let rows = output.table.rows();
        assert_eq!(rows[0].fulfilment, Fulfilment::Merchant);
        assert_eq!(rows[1].fulfilment, Fulfilment::Platform);
        assert_eq!(rows[1].fulfilled_by, "Amazon");
        assert_eq!(rows[1].currency, "INR");
    }

    #[test]
    fn unrepairable_rows_are_counted_not_kept() {
        let output = clean(
            "0,,04-30-22,Shipped,Amazon,Standard,S,S-1,kurta,M,X,Shipped,1,INR,100,PUNE,MAHARASHTRA,1,IN,,False,\n\
             1,B,yesterday,Shipped,Amazon,Standard,S,S-1,kurta,M,X,Shipped,1,INR,100,PUNE,MAHARASHTRA,1,IN,,False,\n\
             2,C,04-30-22,Shipped,Amazon,Standard,S,S-1,kurta,M,X,Shipped,1,INR,-5,PUNE,MAHARASHTRA,1,IN,,False,\n\
             3,D,04-30-22,Shipped,Amazon,Standard,S,S-1,kurta,M,X,Shipped,1,INR,,PUNE,MAHARASHTRA,1,IN,,False,\n",
        );
        assert_eq!(output.summary.rows_read, 4);
        assert_eq!(output.summary.rows_kept, 1);
        assert_eq!(output.summary.rows_rejected(), 3);
        assert_eq!(output.summary.rejected[&RejectReason::MissingOrderId], 1);
        assert_eq!(output.summary.rejected[&RejectReason::InvalidDate], 1);
        assert_eq!(output.summary.rejected[&RejectReason::NegativeAmount], 1);
        // A blank amount is treated as zero rather than rejected.
        assert_eq!(output.table.rows()[0].amount, Decimal::ZERO);
    }

    #[test]
    fn duplicates_ignore_the_export_index() {
        let line = "Shipped,Amazon,Standard,S,S-1,kurta,M,X,Shipped,1,INR,100,PUNE,MAHARASHTRA,1,IN,,False,";
        let output = clean(&format!("0,A,04-30-22,{line}\n1,A,04-30-22,{line}\n"));
        assert_eq!(output.summary.duplicates_dropped, 1);
        assert_eq!(output.table.len(), 1);
    }

    #[test]
    fn missing_required_column_stops_the_run() {
        let input = "Order ID,Date,Status,Qty,Category,ship-state\nA,04-30-22,Shipped,1,kurta,GOA\n";
        let err = Cleaner::new(&CleaningConfig::default())
            .clean_reader(input.as_bytes())
            .unwrap_err();
        assert!(matches!(err, CleanerError::MissingColumn(ref c) if c == "Amount"));
    }

    #[test]
    fn minimal_export_gets_sentinels_for_optional_columns() {
        let input = "order id,date,status,amount,qty,category,ship state\nA,2022-04-01,Pending,10,1,top,goa\n";
        let output = Cleaner::new(&CleaningConfig::default())
            .clean_reader(input.as_bytes())
            .unwrap();
        let row = &output.table.rows()[0];
        assert_eq!(row.city, "Unknown");
        assert_eq!(row.sku, "Unknown");
        assert_eq!(row.size, "Free");
        assert_eq!(row.fulfilment, Fulfilment::Platform);
        assert_eq!(output.summary.defaulted_columns.len(), 10);
    }

    #[test]
    fn blank_status_gets_the_unknown_label() {
        let input = "order id,date,status,amount,qty,category,ship state\nA,2022-04-01,,10,1,top,goa\n";
        let output = Cleaner::new(&CleaningConfig::default())
            .clean_reader(input.as_bytes())
            .unwrap();
        let row = &output.table.rows()[0];
        assert_eq!(row.status, OrderStatus::Other("Unknown".to_string()));
        assert_eq!(row.status.as_str(), "Unknown");
    }

    #[test]
    fn export_dates_with_small_days_keep_their_year() {
        let output = clean(
            "0,A,05-02-22,Shipped,Amazon,Standard,S,S-1,kurta,M,X,Shipped,1,INR,100,PUNE,MAHARASHTRA,1,IN,,False,\n",
        );
        assert_eq!(
            output.table.rows()[0].order_date,
            NaiveDate::from_ymd_opt(2022, 5, 2).unwrap()
        );
    }

    #[test]
    fn empty_input_is_reported() {
        let err = Cleaner::new(&CleaningConfig::default())
            .clean_reader("".as_bytes())
            .unwrap_err();
        assert!(matches!(err, CleanerError::EmptyInput));
    }
}
