use thiserror::Error;

/// Errors surfaced by the analysis and forecasting services.
///
/// The three data/model variants are kept distinct so callers can tell an
/// upstream outage apart from a short series or a broken model store.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Market data unavailable for {resource}: {reason}")]
    DataUnavailable { resource: String, reason: String },

    #[error("Insufficient data for {asset}: {reason}")]
    InsufficientData { asset: String, reason: String },

    #[error("Model unavailable for {key}: {reason}")]
    ModelUnavailable { key: String, reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl AnalyticsError {
    pub fn data_unavailable(resource: impl Into<String>, reason: impl ToString) -> Self {
        AnalyticsError::DataUnavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub fn insufficient_data(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalyticsError::InsufficientData {
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    pub fn model_unavailable(key: impl ToString, reason: impl ToString) -> Self {
        AnalyticsError::ModelUnavailable {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// True when the caller can fix the failure by changing the request
    /// (bad input or an asset with too little history).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InsufficientData { .. } | AnalyticsError::InvalidRequest { .. }
        )
    }
}
