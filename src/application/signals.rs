use crate::domain::analysis::{TradeSignal, Trend};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Votes needed on one side before the signal leaves `Hold`.
pub const SIGNAL_QUORUM: u8 = 3;

/// Classifies the trend from the last price and the 20/50 averages.
pub fn trend(prices: &[f64], sma_20: f64, sma_50: f64) -> Trend {
    if prices.len() < 2 {
        return Trend::Sideways;
    }

    let current_price = prices[prices.len() - 1];

    if current_price > sma_20 && sma_20 > sma_50 {
        Trend::Up
    } else if current_price < sma_20 && sma_20 < sma_50 {
        Trend::Down
    } else {
        Trend::Sideways
    }
}

/// Buy and sell tallies of the four indicator votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalVotes {
    pub buy: u8,
    pub sell: u8,
}

impl SignalVotes {
    /// RSI, MACD and trend can abstain. The price-vs-SMA20 vote always
    /// lands on one side.
    pub fn tally(rsi: f64, macd: f64, trend: Trend, current_price: f64, sma_20: f64) -> Self {
        let mut votes = SignalVotes::default();

        if rsi < RSI_OVERSOLD {
            votes.buy += 1;
        } else if rsi > RSI_OVERBOUGHT {
            votes.sell += 1;
        }

        if macd > 0.0 {
            votes.buy += 1;
        } else if macd < 0.0 {
            votes.sell += 1;
        }

        match trend {
            Trend::Up => votes.buy += 1,
            Trend::Down => votes.sell += 1,
            Trend::Sideways => {}
        }

        if current_price > sma_20 {
            votes.buy += 1;
        } else {
            votes.sell += 1;
        }

        votes
    }

    pub fn decide(&self) -> TradeSignal {
        if self.buy >= SIGNAL_QUORUM {
            TradeSignal::Buy
        } else if self.sell >= SIGNAL_QUORUM {
            TradeSignal::Sell
        } else {
            TradeSignal::Hold
        }
    }
}

pub fn signal(rsi: f64, macd: f64, trend: Trend, current_price: f64, sma_20: f64) -> TradeSignal {
    SignalVotes::tally(rsi, macd, trend, current_price, sma_20).decide()
}
