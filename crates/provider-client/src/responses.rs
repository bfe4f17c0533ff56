use serde::Deserialize;

/// One typed row as the provider serves it: the charter number plus the
/// domain-specific numeric fields flattened alongside it.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordRow<T> {
    pub cu_number: i64,
    #[serde(flatten)]
    pub record: T,
}

/// A `(year, quarter)` pair from the period-discovery projection.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodRow {
    pub year: i32,
    pub quarter: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::AssetsRecord;
    use rust_decimal_macros::dec;

    #[test]
    fn record_row_flattens_domain_fields() {
        let json = r#"{
            "cu_number": 5536,
            "total_assets": 500000000,
            "total_loans": "312500000.25",
            "cash_on_hand": null
        }"#;

        let row: RecordRow<AssetsRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(row.cu_number, 5536);
        assert_eq!(row.record.total_assets, Some(dec!(500000000)));
        assert_eq!(row.record.total_loans, Some(dec!(312500000.25)));
        assert_eq!(row.record.cash_on_hand, None);
        assert_eq!(row.record.total_investments, None);
    }
}
