//! Single-instrument broker simulation.
//!
//! Market orders are submitted on one bar and filled at the next bar's open.
//! Commission is a percentage of the fill value. At most one order may be
//! pending; its outcome is returned from [`Broker::on_bar`].

use chrono::NaiveDate;
use std::fmt;

use super::account::AccountState;
use super::error::SupresError;
use super::ohlcv::PriceBar;
use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub side: Side,
    pub size: u64,
    pub submitted: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Completed,
    /// Not enough cash to cover cost plus commission.
    Margin,
    /// Sell larger than the holding.
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderEvent {
    pub side: Side,
    pub status: OrderStatus,
    pub size: u64,
    pub price: f64,
    pub value: f64,
    pub commission: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    Order(OrderEvent),
    TradeClosed(ClosedTrade),
}

/// commission = trade_value * pct / 100
pub fn calculate_commission(trade_value: f64, commission_pct: f64) -> f64 {
    trade_value * commission_pct / 100.0
}

#[derive(Debug, Clone)]
pub struct Broker {
    cash: f64,
    commission_pct: f64,
    position: Option<Position>,
    pending: Option<Order>,
}

impl Broker {
    pub fn new(initial_cash: f64, commission_pct: f64) -> Result<Self, SupresError> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(SupresError::invalid("initial cash must be positive"));
        }
        if !commission_pct.is_finite() || commission_pct < 0.0 {
            return Err(SupresError::invalid("commission must be non-negative"));
        }
        Ok(Broker {
            cash: initial_cash,
            commission_pct,
            position: None,
            pending: None,
        })
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holdings(&self) -> u64 {
        self.position.as_ref().map_or(0, |p| p.quantity)
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshot with the holding marked at `mark_price`.
    pub fn account(&self, mark_price: f64) -> AccountState {
        let held = self
            .position
            .as_ref()
            .map_or(0.0, |p| p.market_value(mark_price));
        AccountState::new(self.cash, self.cash + held)
    }

    pub fn submit(&mut self, order: Order) -> Result<(), SupresError> {
        if self.pending.is_some() {
            return Err(SupresError::OrderPending);
        }
        if order.size == 0 {
            return Err(SupresError::invalid("order size must be positive"));
        }
        self.pending = Some(order);
        Ok(())
    }

    /// Settles the pending order, if any, against `bar`.
    pub fn on_bar(&mut self, bar: &PriceBar) -> Vec<BrokerEvent> {
        let Some(order) = self.pending.take() else {
            return Vec::new();
        };

        let price = fill_price(bar);
        let value = order.size as f64 * price;
        let commission = calculate_commission(value, self.commission_pct);
        let mut event = OrderEvent {
            side: order.side,
            status: OrderStatus::Completed,
            size: order.size,
            price,
            value,
            commission,
            date: bar.date,
        };

        let mut events = Vec::with_capacity(2);
        match order.side {
            Side::Buy => {
                if value + commission > self.cash {
                    event.status = OrderStatus::Margin;
                } else {
                    self.cash -= value + commission;
                    self.position
                        .get_or_insert_with(|| Position::open(bar.date))
                        .add(order.size, price, commission);
                }
                events.push(BrokerEvent::Order(event));
            }
            Side::Sell => match self.position.as_mut() {
                Some(pos) if pos.quantity >= order.size => {
                    self.cash += value - commission;
                    pos.reduce(order.size, price, commission);
                    let closed = pos.is_flat().then(|| pos.close(bar.date));
                    events.push(BrokerEvent::Order(event));
                    if let Some(trade) = closed {
                        self.position = None;
                        events.push(BrokerEvent::TradeClosed(trade));
                    }
                }
                _ => {
                    event.status = OrderStatus::Rejected;
                    events.push(BrokerEvent::Order(event));
                }
            },
        }
        events
    }
}

/// Market orders fill at the open; a missing open falls back to the close.
fn fill_price(bar: &PriceBar) -> f64 {
    if bar.open.is_finite() && bar.open > 0.0 {
        bar.open
    } else {
        bar.close
    }
}
