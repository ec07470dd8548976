use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Categories drawn with explicit relative weights (cumulative-distribution sampling)
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    index: Option<WeightedIndex<u32>>,
}

impl<T> WeightedChoice<T> {
    /// Build from `(item, weight)` pairs. Zero weights are allowed as long
    /// as one weight is positive; otherwise `sample` always returns `None`.
    pub fn new(entries: impl IntoIterator<Item = (T, u32)>) -> Self {
        let (items, weights): (Vec<T>, Vec<u32>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights).ok();
        Self { items, index }
    }

    /// Every item gets a uniform random weight in `1..=max_weight`
    pub fn with_random_weights<R: Rng + ?Sized>(
        items: impl IntoIterator<Item = T>,
        max_weight: u32,
        rng: &mut R,
    ) -> Self {
        let items: Vec<T> = items.into_iter().collect();
        let weights = random_weights(items.len(), max_weight, rng);
        Self::new(items.into_iter().zip(weights))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let index = self.index.as_ref()?;
        self.items.get(index.sample(rng))
    }
}

/// Веса в диапазоне `1..=max_weight`
fn random_weights<R: Rng + ?Sized>(count: usize, max_weight: u32, rng: &mut R) -> Vec<u32> {
    let max_weight = max_weight.max(1);
    (0..count).map(|_| rng.gen_range(1..=max_weight)).collect()
}
