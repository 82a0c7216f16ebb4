//! Rolling window of the most recent N bars.
//!
//! MIN(n)[i] = min(C[i-j] for j in 0..n-1), MAX(n)[i] likewise.
//! Warmup: no stats until n bars have been pushed.

use std::collections::VecDeque;

use super::error::SupresError;
use super::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingWindowStats {
    pub min: f64,
    pub max: f64,
}

impl RollingWindowStats {
    /// Min and max close over `bars`, or `None` for an empty slice.
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let first = bars.first()?;
        let init = RollingWindowStats {
            min: first.close,
            max: first.close,
        };
        Some(bars.iter().skip(1).fold(init, |acc, bar| RollingWindowStats {
            min: acc.min.min(bar.close),
            max: acc.max.max(bar.close),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    bars: VecDeque<PriceBar>,
}

impl RollingWindow {
    pub fn new(period: usize) -> Result<Self, SupresError> {
        if period == 0 {
            return Err(SupresError::invalid("window period must be at least 1"));
        }
        Ok(RollingWindow {
            period,
            bars: VecDeque::with_capacity(period),
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// True once `period` bars have been seen.
    pub fn is_ready(&self) -> bool {
        self.bars.len() == self.period
    }

    /// Appends `bar`, evicting the oldest once the window is full.
    pub fn push(&mut self, bar: PriceBar) -> Result<(), SupresError> {
        bar.check_close()?;
        if let Some(last) = self.bars.back() {
            if bar.date <= last.date {
                return Err(SupresError::invalid(format!(
                    "bar dated {} does not follow {}",
                    bar.date, last.date
                )));
            }
        }
        self.bars.push_back(bar);
        while self.bars.len() > self.period {
            self.bars.pop_front();
        }
        Ok(())
    }

    /// Bars oldest first.
    pub fn bars(&self) -> Vec<PriceBar> {
        self.bars.iter().cloned().collect()
    }

    pub fn stats(&self) -> Option<RollingWindowStats> {
        if !self.is_ready() {
            return None;
        }
        let (front, back) = self.bars.as_slices();
        match (
            RollingWindowStats::from_bars(front),
            RollingWindowStats::from_bars(back),
        ) {
            (Some(a), Some(b)) => Some(RollingWindowStats {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            }),
            (a, b) => a.or(b),
        }
    }
}
