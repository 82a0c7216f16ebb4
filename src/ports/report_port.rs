//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SupresError;
use crate::domain::strategy::Strategy;
use std::path::Path;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &Strategy,
        output_dir: &Path,
    ) -> Result<(), SupresError>;
}
