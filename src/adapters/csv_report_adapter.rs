//! CSV report adapter: one file of closed trades, one of the equity curve.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SupresError;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }
}

fn report_err(path: &Path, e: impl std::fmt::Display) -> SupresError {
    SupresError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn write_trades(result: &BacktestResult, strategy: &Strategy, path: &Path) -> Result<(), SupresError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
    wtr.write_record([
        "strategy",
        "entry_date",
        "exit_date",
        "quantity",
        "entry_price",
        "exit_price",
        "pnl",
        "pnl_net",
        "commission",
    ])
    .map_err(|e| report_err(path, e))?;

    for trade in &result.closed_trades {
        wtr.write_record([
            strategy.name.clone(),
            trade.entry_date.to_string(),
            trade.exit_date.to_string(),
            trade.quantity.to_string(),
            format!("{:.4}", trade.entry_price),
            format!("{:.4}", trade.exit_price),
            format!("{:.2}", trade.pnl),
            format!("{:.2}", trade.pnl_net),
            format!("{:.2}", trade.commission),
        ])
        .map_err(|e| report_err(path, e))?;
    }
    wtr.flush().map_err(|e| report_err(path, e))
}

fn write_equity(result: &BacktestResult, path: &Path) -> Result<(), SupresError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;
    wtr.write_record(["date", "cash", "value"])
        .map_err(|e| report_err(path, e))?;
    for point in &result.equity_curve {
        wtr.write_record([
            point.date.to_string(),
            format!("{:.2}", point.cash),
            format!("{:.2}", point.equity),
        ])
        .map_err(|e| report_err(path, e))?;
    }
    wtr.flush().map_err(|e| report_err(path, e))
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &Strategy,
        output_dir: &Path,
    ) -> Result<(), SupresError> {
        fs::create_dir_all(output_dir)?;
        write_trades(result, strategy, &output_dir.join(TRADES_FILE))?;
        write_equity(result, &output_dir.join(EQUITY_FILE))?;
        Ok(())
    }
}
