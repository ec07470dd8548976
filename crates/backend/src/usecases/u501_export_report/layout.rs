use std::fmt;
use std::str::FromStr;

use contracts::domain::a001_sales_record::REQUIRED_COLUMNS;

use super::error::TemplateError;

/// Cell address. `col` is 0-based (A = 0), `row` is 1-based as in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub col: u32,
    pub row: u32,
}

impl CellRef {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// 0 -> A, 25 -> Z, 26 -> AA
    pub fn column_letters(col: u32) -> String {
        let mut result = String::new();
        let mut col = col + 1;

        while col > 0 {
            col -= 1;
            result.insert(0, (b'A' + (col % 26) as u8) as char);
            col /= 26;
        }

        result
    }

    /// A -> 0, AA -> 26; `None` for anything but ASCII letters
    pub fn parse_column(letters: &str) -> Option<u32> {
        if letters.is_empty() || letters.len() > 3 {
            return None;
        }
        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }
        Some(col - 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_letters(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('$');
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| TemplateError::InvalidCell(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        let col = CellRef::parse_column(letters.trim_end_matches('$'))
            .ok_or_else(|| TemplateError::InvalidCell(s.to_string()))?;
        let row = digits
            .parse::<u32>()
            .ok()
            .filter(|row| *row > 0)
            .ok_or_else(|| TemplateError::InvalidCell(s.to_string()))?;
        Ok(CellRef::new(col, row))
    }
}

/// Значения, которые пишутся на лист Summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryField {
    GeneratedAt,
    Regions,
    Reps,
    DateRange,
    TotalSales,
    AverageDailySales,
}

impl SummaryField {
    pub const ALL: [SummaryField; 6] = [
        SummaryField::GeneratedAt,
        SummaryField::Regions,
        SummaryField::Reps,
        SummaryField::DateRange,
        SummaryField::TotalSales,
        SummaryField::AverageDailySales,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SummaryField::GeneratedAt => "summary.generated_at",
            SummaryField::Regions => "summary.regions",
            SummaryField::Reps => "summary.reps",
            SummaryField::DateRange => "summary.date_range",
            SummaryField::TotalSales => "summary.total_sales",
            SummaryField::AverageDailySales => "summary.avg_sales_per_day",
        }
    }
}

/// Куда отчет пишет в шаблоне
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    pub summary_sheet: String,
    pub data_sheet: String,
    pub summary_cells: Vec<(SummaryField, CellRef)>,
    /// Ожидаемые заголовки листа данных, по одному на колонку начиная с A
    pub data_headers: Vec<String>,
    pub header_row: u32,
    pub date_column: u32,
    /// Колонка, в которую под блоком данных пишется формула SUM
    pub total_column: u32,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            summary_sheet: "Summary".to_string(),
            data_sheet: "Filtered Data".to_string(),
            summary_cells: vec![
                (SummaryField::GeneratedAt, CellRef::new(1, 21)),
                (SummaryField::Regions, CellRef::new(1, 22)),
                (SummaryField::Reps, CellRef::new(1, 23)),
                (SummaryField::DateRange, CellRef::new(1, 24)),
                (SummaryField::TotalSales, CellRef::new(1, 25)),
                (SummaryField::AverageDailySales, CellRef::new(1, 26)),
            ],
            data_headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            header_row: 1,
            date_column: 0,
            total_column: 4,
        }
    }
}

impl TemplateLayout {
    pub fn cell(&self, field: SummaryField) -> Option<CellRef> {
        self.summary_cells
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, cell)| *cell)
    }

    /// Row of the template's sample data row, reused by the first data row
    pub fn first_data_row(&self) -> u32 {
        self.header_row + 1
    }

    pub fn column_count(&self) -> u32 {
        self.data_headers.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(CellRef::column_letters(0), "A");
        assert_eq!(CellRef::column_letters(25), "Z");
        assert_eq!(CellRef::column_letters(26), "AA");
        assert_eq!(CellRef::column_letters(701), "ZZ");
        assert_eq!(CellRef::parse_column("AA"), Some(26));
        assert_eq!(CellRef::parse_column("zz"), Some(701));
        assert_eq!(CellRef::parse_column("A1"), None);
    }

    #[test]
    fn test_parse_and_print() {
        let cell: CellRef = "B21".parse().unwrap();
        assert_eq!(cell, CellRef::new(1, 21));
        assert_eq!(cell.to_string(), "B21");
        assert_eq!("$E$7".parse::<CellRef>().unwrap(), CellRef::new(4, 7));
        assert!("21".parse::<CellRef>().is_err());
        assert!("B0".parse::<CellRef>().is_err());
        assert!("B".parse::<CellRef>().is_err());
    }

    #[test]
    fn test_default_layout_covers_every_field() {
        let layout = TemplateLayout::default();
        for field in SummaryField::ALL {
            assert!(layout.cell(field).is_some(), "{}", field.key());
        }
        assert_eq!(layout.cell(SummaryField::TotalSales), Some(CellRef::new(1, 25)));
        assert_eq!(layout.first_data_row(), 2);
        assert_eq!(layout.column_count(), 5);
    }
}
