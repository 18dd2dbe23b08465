//! Shuffled train/test split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices for the two sides of a split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `round(n * test_fraction)` rows.
///
/// For `n >= 2` both sides are non-empty. A single row goes to training.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = if n < 2 {
        0
    } else {
        ((n as f64 * test_fraction.clamp(0.0, 1.0)).round() as usize).clamp(1, n - 1)
    };

    let train = indices.split_off(n_test);
    SplitIndices {
        train,
        test: indices,
    }
}
