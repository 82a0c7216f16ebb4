//! Min/max support-resistance signal.
//!
//! On each bar the close is compared against the min and max close of the
//! rolling window. Touching one extreme produces a buy, touching the other a
//! sell; which is which is set by [`TouchPolicy`]. Order sizes are a fraction
//! of the starting capital, capped by what the account can afford:
//!
//! - buy:  floor(min(initial_cash * buy_fraction / close, cash / close))
//! - sell: floor(min(initial_cash * sell_fraction / close, (value - cash) / close))

use std::fmt;
use std::str::FromStr;

use super::account::AccountState;
use super::error::SupresError;
use super::ohlcv::{check_chronological, PriceBar};
use super::window::RollingWindowStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy(u64),
    Sell(u64),
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy(size) => write!(f, "BUY({})", size),
            Signal::Sell(size) => write!(f, "SELL({})", size),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Which window extreme triggers which side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchPolicy {
    /// Buy at the window high, sell at the window low.
    #[default]
    Breakout,
    /// Buy at the window low (support), sell at the window high (resistance).
    Reversion,
}

impl fmt::Display for TouchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchPolicy::Breakout => write!(f, "breakout"),
            TouchPolicy::Reversion => write!(f, "reversion"),
        }
    }
}

impl FromStr for TouchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakout" => Ok(TouchPolicy::Breakout),
            "reversion" => Ok(TouchPolicy::Reversion),
            other => Err(format!(
                "unknown touch policy '{}', expected breakout or reversion",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub period: usize,
    pub initial_cash: f64,
    pub buy_fraction: f64,
    pub sell_fraction: f64,
    pub touch_policy: TouchPolicy,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            period: 30,
            initial_cash: 100_000.0,
            buy_fraction: 0.1,
            sell_fraction: 0.05,
            touch_policy: TouchPolicy::Breakout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupportResistanceSignal {
    params: SignalParams,
}

impl SupportResistanceSignal {
    pub fn new(params: SignalParams) -> Result<Self, SupresError> {
        if params.period == 0 {
            return Err(SupresError::invalid("period must be at least 1"));
        }
        if !params.initial_cash.is_finite() || params.initial_cash <= 0.0 {
            return Err(SupresError::invalid("initial_cash must be positive"));
        }
        for (name, fraction) in [
            ("buy_fraction", params.buy_fraction),
            ("sell_fraction", params.sell_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(SupresError::invalid(format!(
                    "{} must be in (0, 1], got {}",
                    name, fraction
                )));
            }
        }
        Ok(SupportResistanceSignal { params })
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Decide what to do on `bar` given the most recent bars in `window`.
    ///
    /// `window` must be chronological and must not end after `bar`; only its
    /// last `period` bars are used. Returns `Hold` during warmup and while an
    /// earlier order is still pending. When both sides fire, the buy wins.
    pub fn evaluate(
        &self,
        bar: &PriceBar,
        window: &[PriceBar],
        account: &AccountState,
        order_pending: bool,
    ) -> Result<Signal, SupresError> {
        self.check_inputs(bar, window, account)?;

        if window.len() < self.params.period {
            return Ok(Signal::Hold);
        }
        if order_pending {
            return Ok(Signal::Hold);
        }

        let recent = &window[window.len() - self.params.period..];
        let stats = match RollingWindowStats::from_bars(recent) {
            Some(s) => s,
            None => return Ok(Signal::Hold),
        };

        let (buy_level, sell_level) = match self.params.touch_policy {
            TouchPolicy::Breakout => (stats.max, stats.min),
            TouchPolicy::Reversion => (stats.min, stats.max),
        };
        let close = bar.close;

        if account.cash >= close && close == buy_level {
            let target = self.params.initial_cash * self.params.buy_fraction / close;
            let affordable = account.cash / close;
            if let Some(size) = whole_units(target.min(affordable)) {
                return Ok(Signal::Buy(size));
            }
        }

        if account.has_position() && close == sell_level {
            let target = self.params.initial_cash * self.params.sell_fraction / close;
            let held = account.position_value() / close;
            if let Some(size) = whole_units(target.min(held)) {
                return Ok(Signal::Sell(size));
            }
        }

        Ok(Signal::Hold)
    }

    fn check_inputs(
        &self,
        bar: &PriceBar,
        window: &[PriceBar],
        account: &AccountState,
    ) -> Result<(), SupresError> {
        let last = window
            .last()
            .ok_or_else(|| SupresError::invalid("window is empty"))?;
        bar.check_close()?;
        for b in window {
            b.check_close()?;
        }
        check_chronological(window)?;
        if bar.date < last.date {
            return Err(SupresError::invalid(format!(
                "bar dated {} precedes window end {}",
                bar.date, last.date
            )));
        }
        if !account.cash.is_finite() || !account.total_value.is_finite() || account.cash < 0.0 {
            return Err(SupresError::invalid(format!(
                "account state out of range: cash {}, value {}",
                account.cash, account.total_value
            )));
        }
        Ok(())
    }
}

/// Floor to whole units; zero, negative and non-finite sizes are no trade.
fn whole_units(size: f64) -> Option<u64> {
    if !size.is_finite() || size < 1.0 {
        return None;
    }
    Some(size.floor() as u64)
}
