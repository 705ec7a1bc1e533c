use analytics::{RegionLevel, SalesAnalyzer};
use cleaner::{Cleaner, canonical};
use configuration::CleaningConfig;
use rust_decimal_macros::dec;
use std::io::Write;

const RAW_EXPORT: &str = "\
index,Order ID,Date,Status,Fulfilment,Sales Channel,ship-service-level,Style,SKU,Category,Size,ASIN,Courier Status,Qty,currency,Amount,ship-city,ship-state,ship-postal-code,ship-country,promotion-ids,B2B,fulfilled-by
0,404-0000001-0000001,04-15-22,Shipped - Delivered to Buyer,Merchant,Amazon.in,Standard,JNE1,JNE1-KR-M,kurta,M,B01,Shipped,1,INR,100.00,MUMBAI,MAHARASHTRA,400081,IN,,False,Easy Ship
1,404-0000001-0000001,04-15-22,Shipped - Delivered to Buyer,Merchant,Amazon.in,Standard,JNE2,JNE2-KR-L,kurta,L,B02,Shipped,1,INR,50.00,MUMBAI,MAHARASHTRA,400081,IN,,False,Easy Ship
2,404-0000002-0000002,05-02-22,Shipped,Amazon,Amazon.in,Expedited,SET1,SET1-KR-S,set,S,B03,Shipped,2,INR,200.00,BENGALURU,KARNATAKA,560085,IN,,True,
2,404-0000002-0000002,05-02-22,Shipped,Amazon,Amazon.in,Expedited,SET1,SET1-KR-S,set,S,B03,Shipped,2,INR,200.00,BENGALURU,KARNATAKA,560085,IN,,True,
3,404-0000003-0000003,05-03-22,Cancelled,Amazon,Amazon.in,Expedited,SET2,SET2-KR-XL,set,XL,B04,,0,INR,300.00,BENGALURU,KARNATAKA,560085,IN,,False,
4,,05-04-22,Shipped,Amazon,Amazon.in,Expedited,SET3,SET3-KR-XL,set,XL,B05,Shipped,1,INR,80.00,BENGALURU,KARNATAKA,560085,IN,,False,
";

fn raw_export_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    file.write_all(RAW_EXPORT.as_bytes()).unwrap();
    file
}

#[test]
fn raw_export_is_cleaned_persisted_and_analysed() {
    let raw = raw_export_file();
    let output = Cleaner::new(&CleaningConfig::default())
        .clean_path(raw.path())
        .unwrap();

    assert_eq!(output.summary.rows_read, 6);
    assert_eq!(output.summary.duplicates_dropped, 1);
    assert_eq!(output.summary.rows_rejected(), 1);
    assert_eq!(output.summary.cancelled_amounts_zeroed, 1);
    assert_eq!(output.table.len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let cleaned = dir.path().join("clean").join("orders.csv");
    canonical::write_path(&output.table, &cleaned).unwrap();
    let table = canonical::read_path(&cleaned).unwrap();
    assert_eq!(table.rows(), output.table.rows());

    let analyzer = SalesAnalyzer::with_defaults(&table);
    assert_eq!(analyzer.total_revenue(), dec!(350));
    assert_eq!(analyzer.order_count(), 3);
    assert_eq!(analyzer.average_order_value().unwrap().round_dp(2), dec!(116.67));
    assert_eq!(analyzer.cancellation_rate_pct().unwrap().round_dp(2), dec!(33.33));

    let states: Vec<(String, _)> = analyzer
        .region_sales(RegionLevel::State)
        .into_iter()
        .map(|g| (g.key, g.revenue))
        .collect();
    assert_eq!(
        states,
        vec![
            ("Karnataka".to_string(), dec!(200)),
            ("Maharashtra".to_string(), dec!(150)),
        ]
    );

    let months: Vec<String> = analyzer
        .monthly_revenue()
        .iter()
        .map(|m| m.month.to_string())
        .collect();
    assert_eq!(months, vec!["2022-04", "2022-05"]);
}

#[test]
fn full_report_is_complete_and_serializes() {
    let raw = raw_export_file();
    let table = Cleaner::new(&CleaningConfig::default())
        .clean_path(raw.path())
        .unwrap()
        .table;

    let report = SalesAnalyzer::with_defaults(&table).generate_report();
    assert!(report.is_complete(), "failures: {:?}", report.failures);
    assert_eq!(report.summary.total_orders, 3);
    assert_eq!(report.category_sales.by_revenue[0].key, "Set");
    assert_eq!(report.b2b_split.b2b.revenue, dec!(200));

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["total_revenue"], "350.00");
    assert_eq!(json["cost_ratio"], "0.65");
}
