//! CSV file data adapter.
//!
//! Expects a header row followed by `date,open,high,low,close,volume`
//! columns in that order. Empty numeric fields take the configured null
//! value. Rows are returned in date order whatever their order in the file;
//! a repeated date is an error.

use crate::domain::error::SupresError;
use crate::domain::ohlcv::{check_chronological, PriceBar, DEFAULT_DATE_FORMAT};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
    date_format: String,
    null_value: f64,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            null_value: 0.0,
        }
    }

    pub fn with_date_format(mut self, date_format: &str) -> Self {
        self.date_format = date_format.to_string();
        self
    }

    pub fn with_null_value(mut self, null_value: f64) -> Self {
        self.null_value = null_value;
        self
    }

    fn read_all(&self) -> Result<Vec<PriceBar>, SupresError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SupresError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| SupresError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            let line = row + 2;

            let date_str = record.get(0).ok_or_else(|| SupresError::Data {
                reason: format!("line {}: missing date column", line),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), &self.date_format).map_err(
                |e| SupresError::Data {
                    reason: format!("line {}: invalid date '{}': {}", line, date_str, e),
                },
            )?;

            bars.push(PriceBar {
                date,
                open: self.parse_field(&record, 1, "open", line)?,
                high: self.parse_field(&record, 2, "high", line)?,
                low: self.parse_field(&record, 3, "low", line)?,
                close: self.parse_field(&record, 4, "close", line)?,
                volume: self.parse_field(&record, 5, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        check_chronological(&bars)?;
        Ok(bars)
    }

    fn parse_field(
        &self,
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        line: usize,
    ) -> Result<f64, SupresError> {
        let raw = record.get(index).ok_or_else(|| SupresError::Data {
            reason: format!("line {}: missing {} column", line, name),
        })?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(self.null_value);
        }
        raw.parse().map_err(|e| SupresError::Data {
            reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SupresError> {
        let bars = self
            .read_all()?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        Ok(bars)
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SupresError> {
        let bars = self.read_all()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}
