//! Data access port trait.

use crate::domain::error::SupresError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars dated within `[start_date, end_date]`, oldest first.
    fn fetch_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SupresError>;

    /// First date, last date and bar count of the whole source.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SupresError>;

    /// Human-readable name used in error messages.
    fn source_name(&self) -> String;
}
