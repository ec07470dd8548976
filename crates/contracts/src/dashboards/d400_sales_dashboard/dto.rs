use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a001_sales_record::SalesRecord;

/// Фильтр, выбранный в боковой панели дашборда.
///
/// `None` значит "без ограничения": все регионы, все менеджеры или открытая
/// граница дат. Явный пустой список не выбирает ничего.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub reps: Option<Vec<String>>,
    /// Inclusive start date
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive end date
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

/// Значения для виджетов фильтра (по умолчанию выбрано все)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct regions in order of first appearance
    pub regions: Vec<String>,
    /// Distinct reps in order of first appearance
    pub reps: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    HorizontalBar,
    Pie,
    Line,
    VerticalBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: String,
    pub value: f64,
}

/// График категория -> значение (столбцы и круговая диаграмма)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryChart {
    pub chart_type: ChartType,
    pub title: String,
    pub data: Vec<CategoryValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// График из нескольких серий по времени
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesChart {
    pub chart_type: ChartType,
    pub title: String,
    pub series: Vec<ChartSeries>,
}

/// Все, что страница дашборда показывает для одного фильтра
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub row_count: usize,
    pub rows: Vec<SalesRecord>,
    pub sales_by_region: CategoryChart,
    pub sales_by_rep: CategoryChart,
    pub cumulative_sales: SeriesChart,
    pub top_products: CategoryChart,
}
