use std::path::Path;

use super::error::TemplateError;
use super::layout::{CellRef, TemplateLayout};
use super::package::{XlsxPackage, STYLES_PART};
use super::sheet::SheetData;

/// Шаблон отчета, сверенный с разметкой.
///
/// Загрузка падает сразу, если нет листа, заголовка или целевой строки,
/// поэтому экспорт не пишет в чужую ячейку.
#[derive(Debug, Clone)]
pub struct ReportTemplate {
    package: XlsxPackage,
    layout: TemplateLayout,
    summary_path: String,
    data_path: String,
}

impl ReportTemplate {
    pub fn load(path: &Path, layout: TemplateLayout) -> Result<Self, TemplateError> {
        let package = XlsxPackage::open(path)?;
        Self::from_package(package, layout)
    }

    pub fn from_bytes(bytes: &[u8], layout: TemplateLayout) -> Result<Self, TemplateError> {
        Self::from_package(XlsxPackage::from_bytes(bytes)?, layout)
    }

    fn from_package(package: XlsxPackage, layout: TemplateLayout) -> Result<Self, TemplateError> {
        let summary_path = package.sheet_path(&layout.summary_sheet)?;
        let data_path = package.sheet_path(&layout.data_sheet)?;
        if !package.contains(STYLES_PART) {
            return Err(TemplateError::MissingPart(STYLES_PART.to_string()));
        }

        let template = Self {
            package,
            layout,
            summary_path,
            data_path,
        };
        template.validate_summary_sheet()?;
        template.validate_data_sheet()?;
        Ok(template)
    }

    fn validate_summary_sheet(&self) -> Result<(), TemplateError> {
        let sheet = self.summary_sheet()?;
        for (field, cell) in &self.layout.summary_cells {
            if sheet.row(cell.row).is_none() {
                return Err(TemplateError::LayoutMismatch(format!(
                    "{} targets {} but row {} does not exist in sheet '{}'",
                    field.key(),
                    cell,
                    cell.row,
                    self.layout.summary_sheet
                )));
            }
        }
        Ok(())
    }

    fn validate_data_sheet(&self) -> Result<(), TemplateError> {
        let sheet = self.data_sheet()?;
        let shared_strings = self.package.shared_strings()?;
        let header_row = self.layout.header_row;

        for (col, expected) in self.layout.data_headers.iter().enumerate() {
            let at = CellRef::new(col as u32, header_row);
            let found = sheet.cell(at).and_then(|cell| cell.text(&shared_strings));
            if found.as_deref().map(str::trim) != Some(expected.as_str()) {
                return Err(TemplateError::LayoutMismatch(format!(
                    "sheet '{}' cell {} should hold header '{}', found {}",
                    self.layout.data_sheet,
                    at,
                    expected,
                    found.map_or_else(|| "nothing".to_string(), |text| format!("'{}'", text))
                )));
            }
        }

        if sheet.row(self.layout.first_data_row()).is_none() {
            return Err(TemplateError::LayoutMismatch(format!(
                "sheet '{}' has no sample data row {}",
                self.layout.data_sheet,
                self.layout.first_data_row()
            )));
        }
        Ok(())
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    pub fn package(&self) -> &XlsxPackage {
        &self.package
    }

    pub fn summary_path(&self) -> &str {
        &self.summary_path
    }

    pub fn data_path(&self) -> &str {
        &self.data_path
    }

    pub fn summary_sheet(&self) -> Result<SheetData, TemplateError> {
        SheetData::parse(&self.summary_path, self.package.part(&self.summary_path)?)
    }

    pub fn data_sheet(&self) -> Result<SheetData, TemplateError> {
        SheetData::parse(&self.data_path, self.package.part(&self.data_path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_export_report::layout::SummaryField;
    use crate::usecases::u501_export_report::package::tests::template_path;

    #[test]
    fn test_shipped_template_matches_default_layout() {
        let template = ReportTemplate::load(&template_path(), TemplateLayout::default()).unwrap();
        assert_eq!(template.summary_path(), "xl/worksheets/sheet1.xml");
        assert_eq!(template.data_path(), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_missing_template_file() {
        let err = ReportTemplate::load(Path::new("does/not/exist.xlsx"), TemplateLayout::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn test_wrong_sheet_name_fails_fast() {
        let layout = TemplateLayout {
            data_sheet: "Data".to_string(),
            ..TemplateLayout::default()
        };
        let err = ReportTemplate::load(&template_path(), layout).unwrap_err();
        assert!(matches!(err, TemplateError::SheetNotFound { sheet, .. } if sheet == "Data"));
    }

    #[test]
    fn test_summary_target_outside_template() {
        let mut layout = TemplateLayout::default();
        layout.summary_cells[4] = (SummaryField::TotalSales, CellRef::new(1, 40));
        let err = ReportTemplate::load(&template_path(), layout).unwrap_err();
        match err {
            TemplateError::LayoutMismatch(message) => {
                assert!(message.contains("summary.total_sales"), "{}", message);
                assert!(message.contains("B40"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_mismatch() {
        let mut layout = TemplateLayout::default();
        layout.data_headers[4] = "Revenue".to_string();
        let err = ReportTemplate::load(&template_path(), layout).unwrap_err();
        match err {
            TemplateError::LayoutMismatch(message) => {
                assert!(message.contains("E1"), "{}", message);
                assert!(message.contains("'Sales'"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
