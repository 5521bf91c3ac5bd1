// Shared slice statistics
pub mod stats;

// Technical indicators over price sequences
pub mod indicators;

// Trend label and trade signal voting
pub mod signals;

// Forecast feature engineering
pub mod features;

// Indicator snapshot service
pub mod analyzer;

// Forecast training and inference
pub mod ml;
