use contracts::domain::a001_sales_record::SalesRecord;

use super::error::DatasetError;

pub const SAMPLE_CSV_FILE_NAME: &str = "dummy_sales_data.csv";

/// Dataset as CSV with the `Date,Region,Rep,Product,Sales` header and ISO dates
pub fn to_csv(records: &[SalesRecord]) -> Result<Vec<u8>, DatasetError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        writer
            .write_record(contracts::domain::a001_sales_record::REQUIRED_COLUMNS)
            .map_err(|e| DatasetError::CsvExport(e.to_string()))?;
    }
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| DatasetError::CsvExport(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| DatasetError::CsvExport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_sales_record::{parser, validation};
    use chrono::NaiveDate;

    #[test]
    fn test_header_and_iso_dates() {
        let records = vec![SalesRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            "North",
            "Alice",
            "Widget A",
            300.25,
        )];
        let text = String::from_utf8(to_csv(&records).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Region,Rep,Product,Sales"));
        assert_eq!(lines.next(), Some("2024-01-03,North,Alice,Widget A,300.25"));
    }

    #[test]
    fn test_empty_dataset_still_has_header() {
        let text = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.trim_end(), "Date,Region,Rep,Product,Sales");
    }

    #[test]
    fn test_export_can_be_uploaded_again() {
        let records = vec![
            SalesRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "North", "Alice", "Widget A", 100.0),
            SalesRecord::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "South", "Bob", "Widget B", 200.5),
        ];
        let bytes = to_csv(&records).unwrap();
        let table = parser::parse_upload(SAMPLE_CSV_FILE_NAME, &bytes).unwrap();
        assert_eq!(validation::validate(&table).unwrap(), records);
    }
}
