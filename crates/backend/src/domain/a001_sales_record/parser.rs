use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;

use super::error::DatasetError;

/// Ячейка загруженной таблицы до проверки
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell content as the user would read it
    pub fn display(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(text) => text.clone(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Строка заголовков и строки данных, как они прочитаны из файла
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Spreadsheet,
}

impl UploadFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(UploadFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(UploadFormat::Spreadsheet),
            _ => None,
        }
    }
}

pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<RawTable, DatasetError> {
    match UploadFormat::from_file_name(file_name) {
        Some(UploadFormat::Csv) => parse_csv(bytes),
        Some(UploadFormat::Spreadsheet) => parse_spreadsheet(bytes),
        None => Err(DatasetError::UnsupportedFormat(file_name.to_string())),
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, DatasetError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(value.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

/// Первый лист книги xlsx/xls/ods; первая строка - заголовки
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<RawTable, DatasetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatasetError::Parse("workbook contains no worksheets".to_string()))??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(first) => first.iter().map(|cell| convert_cell(cell).display()).collect(),
        None => Vec::new(),
    };
    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        // as_datetime учитывает систему дат книги (1900 или 1904)
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => RawCell::Date(datetime.date()),
            None => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Text(format!("#{:?}", e)),
    }
}

/// Day 0 of the 1900 date system (with the leap-year bug folded in).
/// Used for plain numeric serials and for the cells the exporter writes.
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Largest serial a spreadsheet can show as a date (9999-12-31)
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    serial_epoch()?.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

pub fn date_to_serial(date: NaiveDate) -> f64 {
    match serial_epoch() {
        Some(epoch) => (date - epoch).num_days() as f64,
        None => 0.0,
    }
}
