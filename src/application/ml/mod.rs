// Sliding-window datasets, split and error metrics
pub mod dataset;

// Bagged regression-tree ensemble
pub mod ensemble;

// Training / inference service
pub mod forecaster;

pub use ensemble::{BaggedTreeEnsemble, EnsembleError, EnsembleParameters};
pub use forecaster::{ForecastSettings, Forecaster};
