pub mod a001_sales_dataset;
pub mod d400_sales_dashboard;
pub mod u501_export_report;
pub mod u502_insight_summary;
