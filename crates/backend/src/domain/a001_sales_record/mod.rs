pub mod csv_export;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod parser;
pub mod service;
pub mod validation;
pub mod weighted;

pub use dataset::Dataset;
pub use error::DatasetError;
