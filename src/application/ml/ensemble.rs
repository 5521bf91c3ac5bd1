//! Bagged ensemble of smartcore regression trees.
//!
//! Each tree is fitted on a bootstrap resample of the training rows. The
//! ensemble prediction is the mean of the member predictions, and the
//! members stay individually addressable so callers can measure their spread.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use std::fmt;
use thiserror::Error;

pub type RegressionTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Shape mismatch: {rows} feature rows for {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Matrix creation failed: {0}")]
    Matrix(String),

    #[error("Training error: {0}")]
    Fit(String),

    #[error("Prediction failed: {0}")]
    Predict(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleParameters {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for EnsembleParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl EnsembleParameters {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Serialize, Deserialize)]
pub struct BaggedTreeEnsemble {
    params: EnsembleParameters,
    trees: Vec<RegressionTree>,
}

impl fmt::Debug for BaggedTreeEnsemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaggedTreeEnsemble")
            .field("params", &self.params)
            .field("trees", &self.trees.len())
            .finish()
    }
}

fn to_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, EnsembleError> {
    DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| EnsembleError::Matrix(e.to_string()))
}

impl BaggedTreeEnsemble {
    pub const KIND: &'static str = "BaggedDecisionTreeRegressor";

    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        params: EnsembleParameters,
    ) -> Result<Self, EnsembleError> {
        if targets.is_empty() {
            return Err(EnsembleError::EmptyTrainingSet);
        }
        if features.len() != targets.len() {
            return Err(EnsembleError::ShapeMismatch {
                rows: features.len(),
                targets: targets.len(),
            });
        }

        let tree_params = DecisionTreeRegressorParameters::default()
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_samples_split);

        let n = targets.len();
        let mut trees = Vec::with_capacity(params.n_trees);

        for tree_idx in 0..params.n_trees {
            // One stream per tree keeps a member's resample stable when the
            // tree count changes.
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

            let x: Vec<Vec<f64>> = sample.iter().map(|&i| features[i].clone()).collect();
            let y: Vec<f64> = sample.iter().map(|&i| targets[i]).collect();

            let x = to_matrix(&x)?;
            let tree = DecisionTreeRegressor::fit(&x, &y, tree_params.clone())
                .map_err(|e| EnsembleError::Fit(e.to_string()))?;
            trees.push(tree);
        }

        Ok(Self { params, trees })
    }

    pub fn params(&self) -> &EnsembleParameters {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Prediction of every member for a single feature row.
    pub fn member_predictions(&self, row: &[f64]) -> Result<Vec<f64>, EnsembleError> {
        let input = to_matrix(&[row.to_vec()])?;
        self.trees
            .iter()
            .map(|tree| {
                tree.predict(&input)
                    .map_err(|e| EnsembleError::Predict(e.to_string()))?
                    .first()
                    .copied()
                    .ok_or_else(|| EnsembleError::Predict("No prediction returned".to_string()))
            })
            .collect()
    }

    /// Mean member prediction for each row.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, EnsembleError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let input = to_matrix(rows)?;
        let mut sums = vec![0.0; rows.len()];
        for tree in &self.trees {
            let predictions = tree
                .predict(&input)
                .map_err(|e| EnsembleError::Predict(e.to_string()))?;
            for (sum, p) in sums.iter_mut().zip(predictions.iter()) {
                *sum += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n_trees).collect())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(blob: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| if i < 20 { 10.0 } else { 50.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_fit_and_predict_step_function() {
        let (x, y) = step_dataset();
        let params = EnsembleParameters::default().with_n_trees(15);
        let model = BaggedTreeEnsemble::fit(&x, &y, params).unwrap();
        assert_eq!(model.n_trees(), 15);

        let predictions = model.predict(&[vec![2.0, 2.0], vec![35.0, 2.0]]).unwrap();
        assert!((predictions[0] - 10.0).abs() < 5.0);
        assert!((predictions[1] - 50.0).abs() < 5.0);
    }

    #[test]
    fn test_member_predictions_average_to_predict() {
        let (x, y) = step_dataset();
        let model =
            BaggedTreeEnsemble::fit(&x, &y, EnsembleParameters::default().with_n_trees(10)).unwrap();

        let row = vec![25.0, 1.0];
        let members = model.member_predictions(&row).unwrap();
        assert_eq!(members.len(), 10);
        let mean = members.iter().sum::<f64>() / members.len() as f64;
        let predicted = model.predict(&[row]).unwrap()[0];
        assert!((mean - predicted).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = step_dataset();
        let params = EnsembleParameters::default().with_n_trees(5).with_seed(7);
        let a = BaggedTreeEnsemble::fit(&x, &y, params).unwrap();
        let b = BaggedTreeEnsemble::fit(&x, &y, params).unwrap();
        let row = vec![19.0, 1.0];
        assert_eq!(
            a.member_predictions(&row).unwrap(),
            b.member_predictions(&row).unwrap()
        );
    }

    #[test]
    fn test_json_roundtrip_preserves_predictions() {
        let (x, y) = step_dataset();
        let model =
            BaggedTreeEnsemble::fit(&x, &y, EnsembleParameters::default().with_n_trees(5)).unwrap();
        let restored = BaggedTreeEnsemble::from_json(&model.to_json().unwrap()).unwrap();

        let rows = vec![vec![3.0, 0.0], vec![33.0, 0.0]];
        let before = model.predict(&rows).unwrap();
        let after = restored.predict(&rows).unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a).abs() < 1e-9);
        }
        assert_eq!(restored.params(), model.params());
        assert_eq!(restored.n_trees(), 5);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let err = BaggedTreeEnsemble::fit(&[], &[], EnsembleParameters::default()).unwrap_err();
        assert!(matches!(err, EnsembleError::EmptyTrainingSet));

        let err = BaggedTreeEnsemble::fit(&[vec![1.0]], &[1.0, 2.0], EnsembleParameters::default())
            .unwrap_err();
        assert!(matches!(err, EnsembleError::ShapeMismatch { .. }));
    }
}
