use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Outcome of a seeded draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<T> {
    pub items: Vec<T>,
    pub requested: usize,
    pub available: usize,
    /// The request covered the whole pool, so everything was returned as is
    pub clamped: bool,
}

impl<T> Sample<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Draw `size` items without replacement using a generator seeded with `seed`.
///
/// The generator lives only for this call, so identical `items` and `seed`
/// always give the same selection in the same order. When `size` reaches the
/// pool size the pool is returned unchanged and `clamped` is set.
pub fn sample<T: Clone>(items: &[T], size: usize, seed: u64) -> Sample<T> {
    let available = items.len();

    if size >= available {
        warn!(
            "Sample size ({}) is not smaller than available pairs ({}), using all available pairs",
            size, available
        );
        return Sample {
            items: items.to_vec(),
            requested: size,
            available,
            clamped: true,
        };
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let picked: Vec<T> = index::sample(&mut rng, available, size)
        .into_iter()
        .map(|idx| items[idx].clone())
        .collect();
    debug!("Drew {} of {} with seed {}", picked.len(), available, seed);

    Sample {
        items: picked,
        requested: size,
        available,
        clamped: false,
    }
}
