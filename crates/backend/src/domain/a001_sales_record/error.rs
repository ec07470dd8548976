use thiserror::Error;

/// Ошибки загрузки датасета продаж
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Unsupported file type '{0}' (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("Error reading file: {0}")]
    Parse(String),

    /// Обязательные колонки, которых нет во входных данных (отсортированы)
    #[error("Missing expected columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// `row` - номер строки данных с 1, без заголовка
    #[error("Row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("CSV export failed: {0}")]
    CsvExport(String),
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Parse(err.to_string())
    }
}

impl From<calamine::Error> for DatasetError {
    fn from(err: calamine::Error) -> Self {
        DatasetError::Parse(err.to_string())
    }
}
