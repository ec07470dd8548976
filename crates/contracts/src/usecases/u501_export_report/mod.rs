use chrono::NaiveDate;

/// MIME type of the generated report
pub const REPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download name of the report, e.g. "Executive Summary Report 24-01-31.xlsx"
pub fn report_file_name(date: NaiveDate) -> String {
    format!("Executive Summary Report {}.xlsx", date.format("%y-%m-%d"))
}
