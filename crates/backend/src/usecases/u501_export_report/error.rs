use thiserror::Error;

/// Проблемы шаблона отчета. Любая из них прерывает экспорт, частичный
/// файл не возвращается.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Report template not found: {0}")]
    NotFound(String),

    #[error("Failed to read report template: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report template is not a valid spreadsheet package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("Part '{0}' is missing from the report template")]
    MissingPart(String),

    #[error("Sheet '{sheet}' not found in report template. Available sheets: {available}")]
    SheetNotFound { sheet: String, available: String },

    #[error("Report template layout mismatch: {0}")]
    LayoutMismatch(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),
}

impl TemplateError {
    pub fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        TemplateError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}
