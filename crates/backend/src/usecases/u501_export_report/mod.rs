pub mod error;
pub mod executor;
pub mod layout;
pub mod package;
pub mod sheet;
pub mod styles;
pub mod template;
pub mod xml;

pub use error::TemplateError;
pub use executor::export_report;
pub use layout::{CellRef, SummaryField, TemplateLayout};
pub use template::ReportTemplate;
