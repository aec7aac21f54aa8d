use crate::domain::model::SampleItem;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// `ceil(n * rate)`, never more than `n`.
pub fn sample_size(n: usize, rate: f64) -> usize {
    if n == 0 || !rate.is_finite() || rate <= 0.0 {
        return 0;
    }
    let wanted = (n as f64 * rate).ceil();
    if wanted >= n as f64 {
        n
    } else {
        wanted as usize
    }
}

/// Uniform sample without replacement.
pub fn sample_items<R: Rng + ?Sized>(
    items: &[SampleItem],
    rate: f64,
    rng: &mut R,
) -> Vec<SampleItem> {
    let amount = sample_size(items.len(), rate);
    items.choose_multiple(rng, amount).cloned().collect()
}

/// Seeded when `seed` is given, otherwise drawn from the thread RNG.
pub fn sample_with_seed(items: &[SampleItem], rate: f64, seed: Option<u64>) -> Vec<SampleItem> {
    match seed {
        Some(seed) => sample_items(items, rate, &mut StdRng::seed_from_u64(seed)),
        None => sample_items(items, rate, &mut rand::thread_rng()),
    }
}
