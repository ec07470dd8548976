pub mod aggregation;
pub mod filter;
pub mod service;
