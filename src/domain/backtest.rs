//! Backtest engine and bar loop.
//!
//! Each bar runs in four steps: settle the pending order at the open, mark
//! the account at the close, evaluate the signal, submit any new order.

use chrono::NaiveDate;

use super::account::AccountState;
use super::broker::{Broker, BrokerEvent, Order, OrderEvent, OrderStatus, Side};
use super::error::SupresError;
use super::ohlcv::PriceBar;
use super::position::ClosedTrade;
use super::signal::{Signal, SupportResistanceSignal};
use super::strategy::Strategy;
use super::window::RollingWindow;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub cash: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub fills: Vec<OrderEvent>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub signals: SignalCounts,
    pub final_account: AccountState,
}

impl BacktestResult {
    pub fn final_value(&self) -> f64 {
        self.final_account.total_value
    }

    pub fn total_commission(&self) -> f64 {
        self.fills
            .iter()
            .filter(|f| f.status == OrderStatus::Completed)
            .map(|f| f.commission)
            .sum()
    }
}

pub fn run_backtest(
    bars: &[PriceBar],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, SupresError> {
    let signal = SupportResistanceSignal::new(strategy.signal_params(config.initial_capital))?;
    let mut window = RollingWindow::new(strategy.period)?;
    let mut broker = Broker::new(config.initial_capital, config.commission_pct)?;

    let mut fills = Vec::new();
    let mut closed_trades = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut signals = SignalCounts::default();

    for bar in bars {
        for event in broker.on_bar(bar) {
            match event {
                BrokerEvent::Order(fill) => {
                    log_fill(&fill);
                    fills.push(fill);
                }
                BrokerEvent::TradeClosed(trade) => {
                    tracing::info!(
                        date = %trade.exit_date,
                        "OPERATION PROFIT, GROSS {:.2}, NET {:.2}",
                        trade.pnl,
                        trade.pnl_net
                    );
                    closed_trades.push(trade);
                }
            }
        }

        let account = broker.account(bar.close);
        tracing::debug!(date = %bar.date, "Cash {:.2} Value {:.2}", account.cash, account.total_value);

        window.push(bar.clone())?;
        tracing::debug!(date = %bar.date, "Close, {:.2}", bar.close);
        if let Some(stats) = window.stats() {
            tracing::debug!(date = %bar.date, max = stats.max, min = stats.min, "window");
        }

        if window.is_ready() {
            let decision = signal.evaluate(bar, &window.bars(), &account, broker.has_pending())?;
            match decision {
                Signal::Buy(size) => {
                    signals.buys += 1;
                    tracing::info!(date = %bar.date, size, "BUY CREATE, {:.2}", bar.close);
                    broker.submit(Order {
                        side: Side::Buy,
                        size,
                        submitted: bar.date,
                    })?;
                }
                Signal::Sell(size) => {
                    signals.sells += 1;
                    tracing::info!(date = %bar.date, size, "SELL CREATE, {:.2}", bar.close);
                    broker.submit(Order {
                        side: Side::Sell,
                        size,
                        submitted: bar.date,
                    })?;
                }
                Signal::Hold => signals.holds += 1,
            }
        }

        equity_curve.push(EquityPoint {
            date: bar.date,
            cash: account.cash,
            equity: account.total_value,
        });
    }

    let final_account = match bars.last() {
        Some(bar) => broker.account(bar.close),
        None => AccountState::new(broker.cash(), broker.cash()),
    };

    Ok(BacktestResult {
        initial_capital: config.initial_capital,
        fills,
        closed_trades,
        equity_curve,
        signals,
        final_account,
    })
}

fn log_fill(fill: &OrderEvent) {
    match fill.status {
        OrderStatus::Completed => tracing::info!(
            date = %fill.date,
            "{} EXECUTED, Price: {:.2}, Cost: {:.2}, Comm {:.2}",
            fill.side,
            fill.price,
            fill.value,
            fill.commission
        ),
        OrderStatus::Margin | OrderStatus::Rejected => tracing::warn!(
            date = %fill.date,
            side = %fill.side,
            status = ?fill.status,
            "Order Canceled/Margin/Rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::TouchPolicy;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn sample_config() -> BacktestConfig {
        BacktestConfig {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            initial_capital: 1000.0,
            commission_pct: 0.0,
        }
    }

    fn strategy(period: usize) -> Strategy {
        Strategy {
            period,
            ..Strategy::default()
        }
    }

    #[test]
    fn rising_prices_buy_then_fill_next_open() {
        // new high every bar once warm
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = run_backtest(&bars, &strategy(3), &sample_config()).unwrap();

        // bars 2, 3 and 4 signal; the last order is still pending at the end
        assert_eq!(result.signals.buys, 3);
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.fills[0].date, bars[3].date);
        // floor(min(1000 * 0.1 / 12, 1000 / 12)) = 8 at open 13
        assert_eq!(result.fills[0].size, 8);
        assert!((result.fills[0].price - 13.0).abs() < f64::EPSILON);
        assert_eq!(result.equity_curve.len(), 5);
    }

    #[test]
    fn warmup_produces_no_signals() {
        let bars = make_bars(&[10.0, 11.0]);
        let result = run_backtest(&bars, &strategy(3), &sample_config()).unwrap();
        assert_eq!(result.signals, SignalCounts::default());
        assert!(result.fills.is_empty());
        assert!((result.final_value() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buy_then_sell_closes_trade() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 9.0, 8.0, 7.0, 6.0, 5.0]);
        let result = run_backtest(&bars, &strategy(3), &sample_config()).unwrap();

        assert!(result.signals.buys >= 1);
        assert!(result.signals.sells >= 1);
        assert!(
            result
                .fills
                .iter()
                .any(|f| f.side == Side::Sell && f.status == OrderStatus::Completed)
        );
        let last = result.equity_curve.last().unwrap();
        assert!((last.equity - result.final_value()).abs() < 1e-9);
    }

    #[test]
    fn equity_equals_cash_plus_holdings() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 12.0, 11.0, 10.0, 15.0]);
        let config = BacktestConfig {
            commission_pct: 0.6,
            ..sample_config()
        };
        let result = run_backtest(&bars, &strategy(3), &config).unwrap();
        for point in &result.equity_curve {
            assert!(point.cash >= 0.0);
            assert!(point.equity >= point.cash);
        }
        assert!(result.total_commission() > 0.0);
    }

    #[test]
    fn reversion_policy_buys_at_lows() {
        let bars = make_bars(&[10.0, 9.0, 8.0, 7.0, 6.0]);
        let s = Strategy {
            touch_policy: TouchPolicy::Reversion,
            ..strategy(3)
        };
        let result = run_backtest(&bars, &s, &sample_config()).unwrap();
        assert!(result.signals.buys >= 1);
        assert_eq!(result.fills[0].side, Side::Buy);
    }

    #[test]
    fn out_of_order_bars_fail() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0]);
        bars.swap(0, 1);
        let err = run_backtest(&bars, &strategy(3), &sample_config()).unwrap_err();
        assert!(matches!(err, SupresError::InvalidInput { .. }));
    }

    #[test]
    fn empty_feed_returns_initial_capital() {
        let result = run_backtest(&[], &strategy(3), &sample_config()).unwrap();
        assert!((result.final_value() - 1000.0).abs() < f64::EPSILON);
        assert!(result.equity_curve.is_empty());
    }
}
