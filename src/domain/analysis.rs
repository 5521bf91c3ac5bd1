use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Sideways => write!(f, "sideways"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "buy"),
            TradeSignal::Sell => write!(f, "sell"),
            TradeSignal::Hold => write!(f, "hold"),
        }
    }
}

/// Indicator snapshot computed from one price series at its last point.
///
/// Numeric fields carry display precision (2 decimals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub asset_id: String,
    pub as_of: DateTime<Utc>,
    pub current_price: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub rsi: f64,
    pub macd: f64,
    pub support: f64,
    pub resistance: f64,
    pub trend: Trend,
    pub signal: TradeSignal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Sideways).unwrap(), "\"sideways\"");
        assert_eq!(serde_json::to_string(&TradeSignal::Buy).unwrap(), "\"buy\"");
        assert_eq!(TradeSignal::Hold.to_string(), "hold");
    }
}
