//! Position tracking for a single instrument.

use chrono::NaiveDate;

/// Long holding built up by one or more buys.
///
/// A trade opens on the first buy from flat and closes when the holding
/// returns to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub quantity: u64,
    pub avg_price: f64,
    pub entry_date: NaiveDate,
    units_bought: u64,
    units_sold: u64,
    sold_value: f64,
    realized_pnl: f64,
    commission: f64,
}

impl Position {
    pub fn open(date: NaiveDate) -> Self {
        Position {
            quantity: 0,
            avg_price: 0.0,
            entry_date: date,
            units_bought: 0,
            units_sold: 0,
            sold_value: 0.0,
            realized_pnl: 0.0,
            commission: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn add(&mut self, size: u64, price: f64, commission: f64) {
        let total = self.quantity + size;
        self.avg_price =
            (self.quantity as f64 * self.avg_price + size as f64 * price) / total as f64;
        self.quantity = total;
        self.units_bought += size;
        self.commission += commission;
    }

    /// Caller guarantees `size <= quantity`.
    pub fn reduce(&mut self, size: u64, price: f64, commission: f64) {
        self.realized_pnl += size as f64 * (price - self.avg_price);
        self.quantity -= size;
        self.units_sold += size;
        self.sold_value += size as f64 * price;
        self.commission += commission;
    }

    pub fn close(&self, exit_date: NaiveDate) -> ClosedTrade {
        let exit_price = if self.units_sold > 0 {
            self.sold_value / self.units_sold as f64
        } else {
            0.0
        };
        ClosedTrade {
            quantity: self.units_bought,
            entry_price: self.avg_price,
            exit_price,
            entry_date: self.entry_date,
            exit_date,
            pnl: self.realized_pnl,
            pnl_net: self.realized_pnl - self.commission,
            commission: self.commission,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub quantity: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Gross of commission.
    pub pnl: f64,
    pub pnl_net: f64,
    pub commission: f64,
}
