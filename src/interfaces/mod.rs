pub mod api;

pub use api::{AnalyticsApi, ApiError, ApiResult};
