use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use contracts::domain::a001_sales_record::{SalesRecord, REQUIRED_COLUMNS};

use super::error::DatasetError;
use super::parser::{serial_to_date, RawCell, RawTable};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

static EMPTY_CELL: RawCell = RawCell::Empty;

/// Required columns absent from `headers` (exact, case-sensitive match), sorted
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    let present: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !present.contains(*column))
        .map(|column| column.to_string())
        .collect();
    missing.sort();
    missing
}

/// Проверяет обязательные колонки и превращает каждую строку в `SalesRecord`.
///
/// Порядок колонок не важен, лишние колонки игнорируются. Полностью пустые
/// строки пропускаются.
pub fn validate(table: &RawTable) -> Result<Vec<SalesRecord>, DatasetError> {
    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns { missing });
    }

    let position = |name: &str| {
        table
            .headers
            .iter()
            .position(|header| header == name)
            .unwrap_or_default()
    };
    let [date_col, region_col, rep_col, product_col, sales_col] = REQUIRED_COLUMNS.map(position);

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        if row.iter().all(RawCell::is_empty) {
            continue;
        }
        let row_number = index + 1;
        let cell = |col: usize| row.get(col).unwrap_or(&EMPTY_CELL);

        let date = coerce_date(cell(date_col)).ok_or_else(|| DatasetError::InvalidValue {
            row: row_number,
            column: "Date",
            value: cell(date_col).display(),
        })?;
        let sales = coerce_sales(cell(sales_col)).ok_or_else(|| DatasetError::InvalidValue {
            row: row_number,
            column: "Sales",
            value: cell(sales_col).display(),
        })?;

        records.push(SalesRecord::new(
            date,
            cell(region_col).display(),
            cell(rep_col).display(),
            cell(product_col).display(),
            sales,
        ));
    }

    Ok(records)
}

pub fn coerce_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(date) => Some(*date),
        RawCell::Number(serial) => serial_to_date(*serial),
        RawCell::Text(text) => parse_date_text(text.trim()),
        RawCell::Empty => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn coerce_sales(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
        RawCell::Empty | RawCell::Date(_) => return None,
    };
    // возвраты и корректировки приходят отрицательными суммами
    value.is_finite().then_some(value)
}
