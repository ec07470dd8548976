pub mod executor;
pub mod prompt;

pub use executor::InsightSummarizer;
