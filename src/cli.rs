//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    parse_date, read_double, read_int, validate_backtest_config, validate_data_file,
    validate_strategy_config,
};
use crate::domain::error::SupresError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::DEFAULT_DATE_FORMAT;
use crate::domain::signal::TouchPolicy;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "supres", about = "Min/max support-resistance backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV file overriding [backtest] data_file
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Directory for trades.csv and equity.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range of the data file
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, data.as_ref())
            } else {
                run_backtest(&config, data.as_ref(), output.as_ref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data } => run_info(config.as_ref(), data.as_ref()),
    }
}

fn fail(err: &SupresError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SupresError> {
    FileConfigAdapter::from_file(path).map_err(|e| SupresError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, SupresError> {
    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_capital: read_double(adapter, "backtest", "initial_capital", 100_000.0)?,
        commission_pct: read_double(adapter, "backtest", "commission_pct", 0.0)?,
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<Strategy, SupresError> {
    let defaults = Strategy::default();

    let touch_policy = match adapter.get_string("strategy", "touch_policy") {
        Some(s) => s
            .parse::<TouchPolicy>()
            .map_err(|reason| SupresError::ConfigInvalid {
                section: "strategy".into(),
                key: "touch_policy".into(),
                reason,
            })?,
        None => defaults.touch_policy,
    };

    let period = read_int(adapter, "strategy", "period", defaults.period as i64)?;
    let period = usize::try_from(period)
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| SupresError::ConfigInvalid {
            section: "strategy".into(),
            key: "period".into(),
            reason: "period must be at least 1".into(),
        })?;

    Ok(Strategy {
        name: adapter
            .get_string("strategy", "name")
            .unwrap_or(defaults.name),
        description: adapter
            .get_string("strategy", "description")
            .unwrap_or_default(),
        period,
        buy_fraction: read_double(adapter, "strategy", "buy_fraction", defaults.buy_fraction)?,
        sell_fraction: read_double(adapter, "strategy", "sell_fraction", defaults.sell_fraction)?,
        touch_policy,
    })
}

/// CSV feed from `--data` or `[backtest] data_file`.
pub fn build_data_port(
    adapter: &dyn ConfigPort,
    data_override: Option<&PathBuf>,
) -> Result<CsvAdapter, SupresError> {
    let path = match data_override {
        Some(p) => p.clone(),
        None => {
            validate_data_file(adapter)?;
            PathBuf::from(
                adapter
                    .get_string("backtest", "data_file")
                    .unwrap_or_default()
                    .trim(),
            )
        }
    };
    let date_format = adapter
        .get_string("backtest", "date_format")
        .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
    let null_value = read_double(adapter, "backtest", "null_value", 0.0)?;

    Ok(CsvAdapter::new(path)
        .with_date_format(date_format.trim())
        .with_null_value(null_value))
}

/// Fetch, check for enough bars, run, and compute metrics.
pub fn execute_backtest(
    data_port: &dyn DataPort,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
) -> Result<(BacktestResult, Metrics), SupresError> {
    let bars = data_port.fetch_bars(bt_config.start_date, bt_config.end_date)?;
    if bars.is_empty() {
        return Err(SupresError::NoData {
            source_name: data_port.source_name(),
        });
    }
    if bars.len() < strategy.period {
        return Err(SupresError::InsufficientData {
            source_name: data_port.source_name(),
            bars: bars.len(),
            minimum: strategy.period,
        });
    }

    eprintln!(
        "Running backtest: {} bars, {} to {}",
        bars.len(),
        bt_config.start_date,
        bt_config.end_date,
    );

    let result = backtest_engine::run_backtest(&bars, strategy, bt_config)?;
    let metrics = Metrics::compute(&result);
    Ok((result, metrics))
}

fn load_validated(
    config_path: &Path,
) -> Result<(FileConfigAdapter, Strategy, BacktestConfig), SupresError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    validate_strategy_config(&adapter)?;
    let strategy = build_strategy(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    Ok((adapter, strategy, bt_config))
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let (adapter, strategy, bt_config) = match load_validated(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };
    eprintln!("Loading strategy: {}", strategy.name);
    if !strategy.description.is_empty() {
        eprintln!("  {}", strategy.description);
    }

    let data_port = match build_data_port(&adapter, data_override) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Starting Portfolio Value: {:.2}",
        bt_config.initial_capital
    );

    let (result, metrics) = match execute_backtest(&data_port, &strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    eprintln!("Final Portfolio Value: {:.2}", result.final_value());
    print_summary(&result, &metrics);

    if let Some(dir) = output_path {
        if let Err(e) = CsvReportAdapter::new().write(&result, &strategy, dir) {
            return fail(&e);
        }
        eprintln!("\nReport written to: {}", dir.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!(
        "Signals:          {} buy, {} sell",
        result.signals.buys, result.signals.sells
    );
    eprintln!("Orders Filled:    {}", result.fills.len());
    eprintln!("Closed Trades:    {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Commission Paid:  {:.2}", metrics.total_commission);
}

pub fn run_dry_run(config_path: &Path, data_override: Option<&PathBuf>) -> ExitCode {
    let (adapter, strategy, bt_config) = match load_validated(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(&adapter, data_override) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy: {}", strategy.name);
    if !strategy.description.is_empty() {
        eprintln!("  {}", strategy.description);
    }
    eprintln!("  period:        {}", strategy.period);
    eprintln!("  buy_fraction:  {}", strategy.buy_fraction);
    eprintln!("  sell_fraction: {}", strategy.sell_fraction);
    eprintln!("  touch_policy:  {}", strategy.touch_policy);

    eprintln!("\nBacktest:");
    eprintln!("  data:            {}", data_port.source_name());
    eprintln!(
        "  range:           {} to {}",
        bt_config.start_date, bt_config.end_date
    );
    eprintln!("  initial_capital: {:.2}", bt_config.initial_capital);
    eprintln!("  commission_pct:  {}", bt_config.commission_pct);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    let checks = validate_backtest_config(&adapter)
        .and_then(|_| validate_data_file(&adapter))
        .and_then(|_| validate_strategy_config(&adapter))
        .and_then(|_| build_strategy(&adapter));

    match checks {
        Ok(strategy) => {
            eprintln!(
                "\nStrategy '{}': period {}, {} policy",
                strategy.name, strategy.period, strategy.touch_policy
            );
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_info(config_path: Option<&PathBuf>, data_override: Option<&PathBuf>) -> ExitCode {
    let data_port = match (config_path, data_override) {
        (Some(path), _) => {
            let built =
                load_config(path).and_then(|adapter| build_data_port(&adapter, data_override));
            match built {
                Ok(p) => p,
                Err(e) => return fail(&e),
            }
        }
        (None, Some(data)) => CsvAdapter::new(data.clone()),
        (None, None) => {
            eprintln!("error: --config or --data is required for info");
            return ExitCode::from(1);
        }
    };

    match data_port.data_range() {
        Ok(Some((first, last, count))) => {
            println!(
                "{}: {} bars, {} to {}",
                data_port.source_name(),
                count,
                first,
                last
            );
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", data_port.source_name());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
