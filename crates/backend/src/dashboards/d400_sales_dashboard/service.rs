use contracts::dashboards::d400_sales_dashboard::{
    CategoryChart, ChartType, DashboardResponse, FilterOptions, FilterSelection, SeriesChart,
};
use contracts::domain::a001_sales_record::SalesRecord;

use super::{aggregation, filter};
use crate::domain::a001_sales_record::Dataset;

/// Строки датасета, прошедшие фильтр
pub fn filtered_view(dataset: &Dataset, selection: &FilterSelection) -> Vec<SalesRecord> {
    filter::apply(dataset.records(), selection)
}

pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    filter::filter_options(dataset.records())
}

/// Отфильтрованные строки и четыре графика дашборда
pub fn build_dashboard(dataset: &Dataset, selection: &FilterSelection) -> DashboardResponse {
    let rows = filtered_view(dataset, selection);
    tracing::debug!(
        "Dashboard: {} of {} rows pass the filter",
        rows.len(),
        dataset.len()
    );

    DashboardResponse {
        row_count: rows.len(),
        sales_by_region: CategoryChart {
            chart_type: ChartType::HorizontalBar,
            title: "Sales by Region".to_string(),
            data: aggregation::sales_by_region(&rows),
        },
        sales_by_rep: CategoryChart {
            chart_type: ChartType::Pie,
            title: "Sales by Rep".to_string(),
            data: aggregation::sales_by_rep(&rows),
        },
        cumulative_sales: SeriesChart {
            chart_type: ChartType::Line,
            title: "Cumulative Sales Trend by Region".to_string(),
            series: aggregation::cumulative_sales(&rows),
        },
        top_products: CategoryChart {
            chart_type: ChartType::VerticalBar,
            title: "Total Sales by Product".to_string(),
            data: aggregation::top_products(&rows),
        },
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a001_sales_record::DatasetOrigin;

    #[test]
    fn test_example_dashboard() {
        let date = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let dataset = Dataset::new(
            vec![
                SalesRecord::new(date(1), "North", "Alice", "Widget A", 100.0),
                SalesRecord::new(date(2), "South", "Bob", "Widget B", 200.0),
                SalesRecord::new(date(3), "North", "Alice", "Widget A", 300.0),
            ],
            DatasetOrigin::Uploaded {
                file_name: "example.csv".to_string(),
            },
        );
        let selection = FilterSelection {
            regions: Some(vec!["North".to_string()]),
            ..Default::default()
        };

        let dashboard = build_dashboard(&dataset, &selection);
        assert_eq!(dashboard.row_count, 2);
        assert_eq!(dashboard.sales_by_region.chart_type, ChartType::HorizontalBar);
        assert_eq!(dashboard.sales_by_region.data.len(), 1);
        assert_eq!(dashboard.sales_by_region.data[0].category, "North");
        assert_eq!(dashboard.sales_by_region.data[0].value, 400.0);
        assert_eq!(dashboard.cumulative_sales.series.len(), 1);
    }

    #[test]
    fn test_empty_selection_renders_empty_charts() {
        let dataset = Dataset::new(Vec::new(), DatasetOrigin::Generated { seed: None });
        let dashboard = build_dashboard(&dataset, &FilterSelection::default());
        assert_eq!(dashboard.row_count, 0);
        assert!(dashboard.top_products.data.is_empty());
    }
}
