use chrono::NaiveDateTime;
use contracts::domain::a001_sales_record::SalesRecord;

use super::error::TemplateError;
use super::layout::{CellRef, SummaryField, TemplateLayout};
use super::package::STYLES_PART;
use super::sheet::{Cell, CellValue, Row, SheetData};
use super::styles::add_date_style;
use super::template::ReportTemplate;
use crate::dashboards::d400_sales_dashboard::aggregation::AggregateSummary;
use crate::domain::a001_sales_record::parser::date_to_serial;
use crate::shared::format::join_names;

const SUMMARY_DATE_FORMAT: &str = "%y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%y-%m-%d %H:%M";

/// Заполняет шаблон итоговой статистикой и всеми строками выборки.
///
/// Работает с копией пакета шаблона; при любой ошибке результата нет.
pub fn export_report(
    template: &ReportTemplate,
    records: &[SalesRecord],
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, TemplateError> {
    let layout = template.layout();
    let summary = AggregateSummary::compute(records);
    let mut package = template.package().clone();

    let mut data_sheet = template.data_sheet()?;
    let sample = data_sheet
        .take_row(layout.first_data_row())
        .ok_or_else(|| {
            TemplateError::LayoutMismatch(format!(
                "sheet '{}' has no sample data row {}",
                layout.data_sheet,
                layout.first_data_row()
            ))
        })?;
    let sample_styles: Vec<Option<u32>> = (0..layout.column_count())
        .map(|col| sample.cell(col).and_then(Cell::style))
        .collect();

    let base_date_style = sample_styles
        .get(layout.date_column as usize)
        .copied()
        .flatten();
    let (styles, date_style) = add_date_style(package.part(STYLES_PART)?, base_date_style)?;
    package.set_part(STYLES_PART, styles);

    write_data_rows(
        &mut data_sheet,
        layout,
        &sample,
        &sample_styles,
        date_style,
        records,
    );
    package.set_part(template.data_path(), data_sheet.to_xml());

    let mut summary_sheet = template.summary_sheet()?;
    for (field, value) in summary_values(&summary, generated_at) {
        if let Some(cell) = layout.cell(field) {
            summary_sheet.set_cell(cell, &value, None);
        }
    }
    package.set_part(template.summary_path(), summary_sheet.to_xml());

    package.force_full_recalculation()?;
    let bytes = package.to_bytes()?;

    tracing::info!(
        "Report built: {} rows, total sales {:.2}, {} bytes",
        records.len(),
        summary.total_sales,
        bytes.len()
    );
    Ok(bytes)
}

/// Records go to rows `first..first+N`, the first one taking the sample
/// row's place. Template rows below the sample move down by N, which leaves
/// row `first+N` free for the total.
fn write_data_rows(
    sheet: &mut SheetData,
    layout: &TemplateLayout,
    sample: &Row,
    sample_styles: &[Option<u32>],
    date_style: u32,
    records: &[SalesRecord],
) {
    let first_row = layout.first_data_row();
    let row_count = records.len() as u32;
    sheet.shift_rows(first_row + 1, row_count);

    let rows = records.iter().zip(first_row..).map(|(record, index)| {
        let mut row = Row::like(index, sample);
        for (col, header) in layout.data_headers.iter().enumerate() {
            let col = col as u32;
            let style = if col == layout.date_column {
                Some(date_style)
            } else {
                sample_styles.get(col as usize).copied().flatten()
            };
            row.set_cell(col, &record_value(record, header), style);
        }
        row
    });
    sheet.extend_rows(rows);

    let total = if row_count == 0 {
        CellValue::Number(0.0)
    } else {
        CellValue::Formula(format!(
            "SUM({}:{})",
            CellRef::new(layout.total_column, first_row),
            CellRef::new(layout.total_column, first_row + row_count - 1)
        ))
    };
    sheet.set_cell(
        CellRef::new(layout.total_column, first_row + row_count),
        &total,
        sample_styles.get(layout.total_column as usize).copied().flatten(),
    );
}

fn record_value(record: &SalesRecord, column: &str) -> CellValue {
    match column {
        "Date" => CellValue::Number(date_to_serial(record.date)),
        "Region" => CellValue::Text(record.region.clone()),
        "Rep" => CellValue::Text(record.rep.clone()),
        "Product" => CellValue::Text(record.product.clone()),
        "Sales" => CellValue::Number(record.sales),
        _ => CellValue::Blank,
    }
}

fn summary_values(
    summary: &AggregateSummary,
    generated_at: NaiveDateTime,
) -> Vec<(SummaryField, CellValue)> {
    let date_range = match (summary.min_date, summary.max_date) {
        (Some(min), Some(max)) => CellValue::Text(format!(
            "{} to {}",
            min.format(SUMMARY_DATE_FORMAT),
            max.format(SUMMARY_DATE_FORMAT)
        )),
        _ => CellValue::Blank,
    };

    vec![
        (
            SummaryField::GeneratedAt,
            CellValue::Text(generated_at.format(TIMESTAMP_FORMAT).to_string()),
        ),
        (
            SummaryField::Regions,
            CellValue::Text(join_names(&summary.regions)),
        ),
        (SummaryField::Reps, CellValue::Text(join_names(&summary.reps))),
        (SummaryField::DateRange, date_range),
        (
            SummaryField::TotalSales,
            CellValue::Number(summary.total_sales),
        ),
        (
            SummaryField::AverageDailySales,
            CellValue::Number(summary.mean_daily_sales),
        ),
    ]
}
