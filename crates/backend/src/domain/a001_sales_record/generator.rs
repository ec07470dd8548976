use chrono::{Duration, Local, NaiveDate};
use contracts::domain::a001_sales_record::SalesRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::weighted::WeightedChoice;

pub const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

pub const PRODUCTS: [&str; 6] = [
    "Widget A", "Widget B", "Widget C", "Gadget X", "Gadget Y", "Gadget Z",
];

/// Имена менеджеров (выбираются без повторов)
pub const FIRST_NAMES: [&str; 40] = [
    "Alice", "Bob", "Carol", "David", "Emma", "Frank", "Grace", "Henry", "Isabel", "Jack",
    "Karen", "Liam", "Maria", "Nathan", "Olivia", "Paul", "Quinn", "Rachel", "Samuel", "Tina",
    "Victor", "Wendy", "Xavier", "Yvonne", "Zach", "Amber", "Brian", "Chloe", "Derek", "Elena",
    "Felix", "Gloria", "Hugo", "Irene", "Jason", "Laura", "Marcus", "Nina", "Oscar", "Sophie",
];

pub const REP_COUNT: usize = 6;

const MAX_CATEGORY_WEIGHT: u32 = 19;
const MAX_SALE_AMOUNT: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub days: u32,
    pub max_rows_per_day: u32,
    /// Last day of the window (inclusive)
    pub end_date: NaiveDate,
    pub seed: Option<u64>,
    pub modifier_reroll_probability: f64,
}

impl GeneratorConfig {
    pub fn for_today() -> Self {
        Self::ending_on(Local::now().date_naive())
    }

    pub fn ending_on(end_date: NaiveDate) -> Self {
        Self {
            days: 60,
            max_rows_per_day: 100,
            end_date,
            seed: None,
            modifier_reroll_probability: 0.2,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn start_date(&self) -> NaiveDate {
        self.end_date - Duration::days(i64::from(self.days.saturating_sub(1)))
    }
}

#[derive(Debug, Clone)]
struct RepProfile {
    name: String,
    multiplier_lo: f64,
    multiplier_hi: f64,
}

/// Генерация случайного датасета. С seed результат воспроизводим, без seed
/// берется энтропия ОС и каждый вызов дает новые данные.
pub fn generate(config: &GeneratorConfig) -> Vec<SalesRecord> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let records = generate_with_rng(config, &mut rng);
    tracing::debug!(
        "Generated {} sales rows for {} .. {} (seed: {:?})",
        records.len(),
        config.start_date(),
        config.end_date,
        config.seed
    );
    records
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Vec<SalesRecord> {
    let regions = WeightedChoice::with_random_weights(REGIONS, MAX_CATEGORY_WEIGHT, rng);
    let products = WeightedChoice::with_random_weights(PRODUCTS, MAX_CATEGORY_WEIGHT, rng);

    let names: Vec<&str> = FIRST_NAMES
        .choose_multiple(rng, REP_COUNT)
        .copied()
        .collect();
    let profiles: Vec<RepProfile> = names
        .into_iter()
        .map(|name| {
            let a: f64 = rng.gen();
            let b: f64 = rng.gen();
            RepProfile {
                name: name.to_string(),
                multiplier_lo: a.min(b),
                multiplier_hi: a.max(b),
            }
        })
        .collect();
    let reps = WeightedChoice::with_random_weights(profiles, MAX_CATEGORY_WEIGHT, rng);

    let reroll_probability = config.modifier_reroll_probability.clamp(0.0, 1.0);
    let mut daily_modifier: f64 = rng.gen();
    let mut records = Vec::new();
    let start = config.start_date();

    for offset in 0..config.days {
        let date = start + Duration::days(i64::from(offset));
        // все строки дня достаются одному менеджеру
        let Some(rep) = reps.sample(rng) else {
            break;
        };
        let rows = (f64::from(config.max_rows_per_day) * daily_modifier).floor() as usize;

        for _ in 0..rows {
            let (Some(region), Some(product)) = (regions.sample(rng), products.sample(rng))
            else {
                continue;
            };
            let base = rng.gen_range(0.0..=MAX_SALE_AMOUNT);
            let multiplier = rng.gen_range(rep.multiplier_lo..=rep.multiplier_hi);
            records.push(SalesRecord::new(
                date,
                *region,
                rep.name.as_str(),
                *product,
                round_cents(base * multiplier),
            ));
        }

        if rng.gen_bool(reroll_probability) {
            daily_modifier = rng.gen();
        }
    }

    records
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    fn seeded(seed: u64) -> GeneratorConfig {
        GeneratorConfig::ending_on(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
            .with_seed(Some(seed))
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let first = generate(&seeded(11));
        let second = generate(&seeded(11));
        assert_eq!(first, second);
        assert_ne!(first, generate(&seeded(12)));
    }

    #[test]
    fn test_values_come_from_pools() {
        let records = generate(&seeded(3));
        assert!(!records.is_empty());

        let reps: BTreeSet<&str> = records.iter().map(|r| r.rep.as_str()).collect();
        assert!(reps.len() <= REP_COUNT);

        for record in &records {
            assert!(REGIONS.contains(&record.region.as_str()));
            assert!(PRODUCTS.contains(&record.product.as_str()));
            assert!(FIRST_NAMES.contains(&record.rep.as_str()));
            assert!(record.sales >= 0.0 && record.sales <= MAX_SALE_AMOUNT);
            assert_eq!(record.sales, round_cents(record.sales));
        }
    }

    #[test]
    fn test_window_is_sixty_days_ending_on_end_date() {
        let config = seeded(5);
        assert_eq!(
            config.start_date(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );

        for record in generate(&config) {
            assert!(record.date >= config.start_date());
            assert!(record.date <= config.end_date);
        }
    }

    #[test]
    fn test_each_day_has_single_rep_and_bounded_rows() {
        let records = generate(&seeded(21));
        let mut per_day: HashMap<NaiveDate, (BTreeSet<&str>, usize)> = HashMap::new();
        for record in &records {
            let entry = per_day.entry(record.date).or_default();
            entry.0.insert(record.rep.as_str());
            entry.1 += 1;
        }
        for (reps, rows) in per_day.values() {
            assert_eq!(reps.len(), 1);
            assert!(*rows < 100);
        }
    }

    #[test]
    fn test_rows_are_in_date_order() {
        let records = generate(&seeded(8));
        assert!(records.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_zero_days_yields_nothing() {
        let mut config = seeded(1);
        config.days = 0;
        assert!(generate(&config).is_empty());
    }
}
