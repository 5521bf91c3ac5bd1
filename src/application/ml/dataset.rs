use crate::application::features::build_features;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Number of trailing prices that feed one feature vector.
pub const WINDOW_SIZE: usize = 30;

/// Supervised examples: one feature row per target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}

/// Slides a `window`-point feature window across the series and pairs each
/// window with the price `horizon` steps past its last point.
///
/// Yields `len - window - horizon` examples (none when the series is too short).
pub fn sliding_windows(
    prices: &[f64],
    volumes: Option<&[f64]>,
    window: usize,
    horizon: usize,
) -> Dataset {
    let mut dataset = Dataset::default();
    let end = prices.len().saturating_sub(horizon);

    for i in window..end {
        let price_window = &prices[i - window..i];
        let volume_window = volumes.and_then(|v| v.get(i - window..i));
        let features = build_features(price_window, volume_window);

        dataset.features.push(features.to_vec());
        dataset.targets.push(prices[i + horizon - 1]);
    }

    dataset
}

/// Shuffles with a fixed seed and holds out `ceil(n * test_fraction)` rows.
///
/// Returns `(train, test)`.
pub fn train_test_split(data: &Dataset, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
    let n = data.len();
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n.saturating_sub(1));

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    (data.select(train_idx), data.select(test_idx))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionErrors {
    pub mae: f64,
    pub rmse: f64,
}

/// Mean absolute error and root mean squared error. Zero for empty input.
pub fn regression_errors(predicted: &[f64], actual: &[f64]) -> RegressionErrors {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return RegressionErrors { mae: 0.0, rmse: 0.0 };
    }

    let (abs_sum, sq_sum) = predicted
        .iter()
        .zip(actual.iter())
        .fold((0.0, 0.0), |(abs_sum, sq_sum), (p, t)| {
            (abs_sum + (p - t).abs(), sq_sum + (p - t).powi(2))
        });

    RegressionErrors {
        mae: abs_sum / n as f64,
        rmse: (sq_sum / n as f64).sqrt(),
    }
}
