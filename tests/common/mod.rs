#![allow(dead_code)]

use chrono::NaiveDate;
use supres::domain::backtest::BacktestConfig;
use supres::domain::error::SupresError;
pub use supres::domain::ohlcv::PriceBar;
use supres::domain::strategy::Strategy;
use supres::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<PriceBar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SupresError> {
        if let Some(reason) = &self.error {
            return Err(SupresError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SupresError> {
        Ok(match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, self.bars.len())),
            _ => None,
        })
    }

    fn source_name(&self) -> String {
        "mock".to_string()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per day from `start_date`, open equal to close.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.01),
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Rises for `up` bars then falls for `down` bars.
pub fn peak_then_decline(start_price: f64, up: usize, down: usize) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..up).map(|i| start_price + i as f64).collect();
    let top = start_price + up as f64;
    closes.extend((0..down).map(|i| top - 1.0 - i as f64));
    closes
}

pub fn sample_strategy(period: usize) -> Strategy {
    Strategy {
        name: "Test".into(),
        period,
        ..Strategy::default()
    }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: date(2017, 1, 1),
        end_date: date(2019, 1, 1),
        initial_capital: 100_000.0,
        commission_pct: 0.0,
    }
}

pub fn csv_content(bars: &[PriceBar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
