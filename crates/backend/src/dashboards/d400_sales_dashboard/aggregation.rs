use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use contracts::dashboards::d400_sales_dashboard::{CategoryValue, ChartSeries, SeriesPoint};
use contracts::domain::a001_sales_record::SalesRecord;

use super::filter::{date_bounds, distinct};

/// Категориальная колонка для группировки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    Rep,
    Product,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Region, Dimension::Rep, Dimension::Product];

    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Rep => "Rep",
            Dimension::Product => "Product",
        }
    }

    pub fn key<'a>(&self, record: &'a SalesRecord) -> &'a str {
        match self {
            Dimension::Region => &record.region,
            Dimension::Rep => &record.rep,
            Dimension::Product => &record.product,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryStats {
    pub total: f64,
    pub mean: f64,
    pub count: usize,
}

/// Сумма, среднее и число строк Sales по значению категории
pub fn breakdown(records: &[SalesRecord], dimension: Dimension) -> BTreeMap<String, CategoryStats> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(dimension.key(record).to_string()).or_default();
        entry.0 += record.sales;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(category, (total, count))| {
            let stats = CategoryStats {
                total,
                mean: total / count as f64,
                count,
            };
            (category, stats)
        })
        .collect()
}

fn totals(records: &[SalesRecord], dimension: Dimension) -> Vec<CategoryValue> {
    breakdown(records, dimension)
        .into_iter()
        .map(|(category, stats)| CategoryValue {
            category,
            value: stats.total,
        })
        .collect()
}

fn ascending(a: &CategoryValue, b: &CategoryValue) -> Ordering {
    a.value
        .total_cmp(&b.value)
        .then_with(|| a.category.cmp(&b.category))
}

fn descending(a: &CategoryValue, b: &CategoryValue) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.category.cmp(&b.category))
}

/// Сумма Sales по регионам, по возрастанию
pub fn sales_by_region(records: &[SalesRecord]) -> Vec<CategoryValue> {
    let mut values = totals(records, Dimension::Region);
    values.sort_by(ascending);
    values
}

/// Сумма Sales по менеджерам, по убыванию
pub fn sales_by_rep(records: &[SalesRecord]) -> Vec<CategoryValue> {
    let mut values = totals(records, Dimension::Rep);
    values.sort_by(descending);
    values
}

/// Сумма Sales по продуктам, по убыванию
pub fn top_products(records: &[SalesRecord]) -> Vec<CategoryValue> {
    let mut values = totals(records, Dimension::Product);
    values.sort_by(descending);
    values
}

/// Нарастающий итог Sales по выборке, отсортированной по дате; серия на регион.
///
/// Итог считается по всей выборке (колонка "Cumulative Sales"), затем точка
/// каждой строки попадает в серию своего региона. Строки одной даты
/// сохраняют порядок выборки.
pub fn cumulative_sales(records: &[SalesRecord]) -> Vec<ChartSeries> {
    let mut sorted: Vec<&SalesRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.date);

    let mut series: BTreeMap<&str, Vec<SeriesPoint>> = BTreeMap::new();
    let mut running = 0.0;
    for record in sorted {
        running += record.sales;
        series.entry(record.region.as_str()).or_default().push(SeriesPoint {
            date: record.date,
            value: running,
        });
    }

    series
        .into_iter()
        .map(|(name, points)| ChartSeries {
            name: name.to_string(),
            points,
        })
        .collect()
}

/// Статистика для экспорта отчета и промпта сводки
#[derive(Debug, Clone)]
pub struct AggregateSummary {
    pub row_count: usize,
    pub by_region: BTreeMap<String, CategoryStats>,
    pub by_rep: BTreeMap<String, CategoryStats>,
    pub by_product: BTreeMap<String, CategoryStats>,
    pub total_sales: f64,
    /// Среднее дневных сумм; NaN, если строк нет
    pub mean_daily_sales: f64,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Distinct regions in order of first appearance
    pub regions: Vec<String>,
    /// Distinct reps in order of first appearance
    pub reps: Vec<String>,
}

impl AggregateSummary {
    pub fn compute(records: &[SalesRecord]) -> Self {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            *daily.entry(record.date).or_default() += record.sales;
        }
        let mean_daily_sales = if daily.is_empty() {
            f64::NAN
        } else {
            daily.values().sum::<f64>() / daily.len() as f64
        };
        let (min_date, max_date) = date_bounds(records);

        Self {
            row_count: records.len(),
            by_region: breakdown(records, Dimension::Region),
            by_rep: breakdown(records, Dimension::Rep),
            by_product: breakdown(records, Dimension::Product),
            total_sales: records.iter().map(|r| r.sales).sum(),
            mean_daily_sales,
            min_date,
            max_date,
            regions: distinct(records.iter().map(|r| r.region.as_str())),
            reps: distinct(records.iter().map(|r| r.rep.as_str())),
        }
    }

    pub fn breakdown(&self, dimension: Dimension) -> &BTreeMap<String, CategoryStats> {
        match dimension {
            Dimension::Region => &self.by_region,
            Dimension::Rep => &self.by_rep,
            Dimension::Product => &self.by_product,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_sales_record::generator::{generate, GeneratorConfig};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn example() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new(date(1), "North", "Alice", "Widget A", 100.0),
            SalesRecord::new(date(2), "South", "Bob", "Widget B", 200.0),
            SalesRecord::new(date(3), "North", "Alice", "Widget A", 300.0),
        ]
    }

    fn pairs(values: &[CategoryValue]) -> Vec<(&str, f64)> {
        values
            .iter()
            .map(|v| (v.category.as_str(), v.value))
            .collect()
    }

    #[test]
    fn test_orderings() {
        let records = example();
        assert_eq!(
            pairs(&sales_by_region(&records)),
            vec![("South", 200.0), ("North", 400.0)]
        );
        assert_eq!(
            pairs(&sales_by_rep(&records)),
            vec![("Alice", 400.0), ("Bob", 200.0)]
        );
        assert_eq!(
            pairs(&top_products(&records)),
            vec![("Widget A", 400.0), ("Widget B", 200.0)]
        );
    }

    #[test]
    fn test_ties_break_by_name() {
        let records = vec![
            SalesRecord::new(date(1), "West", "Zoe", "P", 50.0),
            SalesRecord::new(date(1), "East", "Amy", "P", 50.0),
        ];
        assert_eq!(
            pairs(&sales_by_region(&records)),
            vec![("East", 50.0), ("West", 50.0)]
        );
        assert_eq!(
            pairs(&sales_by_rep(&records)),
            vec![("Amy", 50.0), ("Zoe", 50.0)]
        );
    }

    #[test]
    fn test_cumulative_sorts_by_date_first() {
        let mut records = example();
        records.reverse();
        let series = cumulative_sales(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "North");
        assert_eq!(
            series[0].points,
            vec![
                SeriesPoint { date: date(1), value: 100.0 },
                SeriesPoint { date: date(3), value: 600.0 },
            ]
        );
        assert_eq!(
            series[1].points,
            vec![SeriesPoint { date: date(2), value: 300.0 }]
        );
    }

    #[test]
    fn test_cumulative_is_non_decreasing_per_region() {
        let config = GeneratorConfig::ending_on(date(31)).with_seed(Some(99));
        let mut records = generate(&config);
        records.reverse();
        for series in cumulative_sales(&records) {
            assert!(series
                .points
                .windows(2)
                .all(|w| w[0].date <= w[1].date && w[0].value <= w[1].value));
        }
    }

    #[test]
    fn test_summary() {
        let mut records = example();
        records.push(SalesRecord::new(date(3), "South", "Bob", "Widget C", 100.0));
        let summary = AggregateSummary::compute(&records);
        assert_eq!(summary.total_sales, 700.0);
        // суммы по дням 100, 200, 400
        assert!((summary.mean_daily_sales - 700.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.min_date, Some(date(1)));
        assert_eq!(summary.max_date, Some(date(3)));
        assert_eq!(summary.regions, vec!["North", "South"]);
        assert_eq!(summary.reps, vec!["Alice", "Bob"]);
        let north = summary.breakdown(Dimension::Region)["North"];
        assert_eq!((north.total, north.mean, north.count), (400.0, 200.0, 2));
    }

    #[test]
    fn test_empty_summary_is_nan_not_zero() {
        let summary = AggregateSummary::compute(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.total_sales, 0.0);
        assert!(summary.mean_daily_sales.is_nan());
        assert_eq!(summary.min_date, None);
        assert!(summary.regions.is_empty());
        assert!(sales_by_region(&[]).is_empty());
        assert!(cumulative_sales(&[]).is_empty());
    }
}
