// Market data value objects
pub mod market;

// Indicator snapshot, trend and trade signal
pub mod analysis;

// Forecast keys, model state and results
pub mod forecast;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
