use std::collections::HashSet;

use chrono::NaiveDate;
use contracts::dashboards::d400_sales_dashboard::{FilterOptions, FilterSelection};
use contracts::domain::a001_sales_record::SalesRecord;

/// Уникальные значения в порядке первого появления
pub fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

pub fn date_bounds(records: &[SalesRecord]) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let min = records.iter().map(|r| r.date).min();
    let max = records.iter().map(|r| r.date).max();
    (min, max)
}

pub fn filter_options(records: &[SalesRecord]) -> FilterOptions {
    let (min_date, max_date) = date_bounds(records);
    FilterOptions {
        regions: distinct(records.iter().map(|r| r.region.as_str())),
        reps: distinct(records.iter().map(|r| r.rep.as_str())),
        min_date,
        max_date,
    }
}

struct Predicate<'a> {
    regions: Option<HashSet<&'a str>>,
    reps: Option<HashSet<&'a str>>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

impl<'a> Predicate<'a> {
    fn new(selection: &'a FilterSelection) -> Self {
        let as_set = |values: &'a Option<Vec<String>>| {
            values
                .as_ref()
                .map(|values| values.iter().map(String::as_str).collect::<HashSet<_>>())
        };
        Self {
            regions: as_set(&selection.regions),
            reps: as_set(&selection.reps),
            date_from: selection.date_from,
            date_to: selection.date_to,
        }
    }

    fn matches(&self, record: &SalesRecord) -> bool {
        let member = |set: &Option<HashSet<&str>>, value: &str| {
            set.as_ref().map_or(true, |set| set.contains(value))
        };
        member(&self.regions, record.region.as_str())
            && member(&self.reps, record.rep.as_str())
            && self.date_from.map_or(true, |from| record.date >= from)
            && self.date_to.map_or(true, |to| record.date <= to)
    }
}

/// Rows matching the selection, in dataset order. An inverted date range
/// or an empty region/rep list yields no rows.
pub fn apply(records: &[SalesRecord], selection: &FilterSelection) -> Vec<SalesRecord> {
    let predicate = Predicate::new(selection);
    records
        .iter()
        .filter(|record| predicate.matches(record))
        .cloned()
        .collect()
}
