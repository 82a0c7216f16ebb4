//! OHLCV price bar representation.

use chrono::NaiveDate;

use super::error::SupresError;

/// ISO dates, used for config dates and as the default CSV date format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Rejects a close that cannot be used as a divisor.
    pub fn check_close(&self) -> Result<(), SupresError> {
        if !self.close.is_finite() || self.close <= 0.0 {
            return Err(SupresError::invalid(format!(
                "close on {} must be positive, got {}",
                self.date, self.close
            )));
        }
        Ok(())
    }
}

/// Checks that `bars` are strictly increasing by date.
pub fn check_chronological(bars: &[PriceBar]) -> Result<(), SupresError> {
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(SupresError::invalid(format!(
                "bars out of order: {} followed by {}",
                pair[0].date, pair[1].date
            )));
        }
    }
    Ok(())
}
