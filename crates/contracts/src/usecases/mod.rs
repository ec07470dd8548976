pub mod u501_export_report;
pub mod u502_insight_summary;
