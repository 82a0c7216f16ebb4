//! Performance metrics and statistics.

use super::backtest::{BacktestResult, EquityPoint};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub total_commission: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let initial_capital = result.initial_capital;
        let final_equity = result.final_value();

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let years = result.equity_curve.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&result.equity_curve);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;

        for trade in &result.closed_trades {
            let pnl = trade.pnl_net;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
            } else {
                trades_breakeven += 1;
            }
        }

        let total_trades = trades_won + trades_lost + trades_breakeven;
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            max_drawdown,
            max_drawdown_duration,
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            total_commission: result.total_commission(),
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            max_dd = max_dd.max(dd);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountState;
    use crate::domain::backtest::SignalCounts;
    use crate::domain::position::ClosedTrade;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                cash: v,
                equity: v,
            })
            .collect()
    }

    fn make_trade(pnl_net: f64) -> ClosedTrade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ClosedTrade {
            quantity: 100,
            entry_price: 100.0,
            exit_price: 100.0 + pnl_net / 100.0,
            entry_date,
            exit_date: entry_date + chrono::Duration::days(5),
            pnl: pnl_net,
            pnl_net,
            commission: 0.0,
        }
    }

    fn make_result(equity: &[f64], trades: Vec<ClosedTrade>) -> BacktestResult {
        let initial = equity.first().copied().unwrap_or(100_000.0);
        let last = equity.last().copied().unwrap_or(initial);
        BacktestResult {
            initial_capital: initial,
            fills: Vec::new(),
            closed_trades: trades,
            equity_curve: make_equity_curve(equity),
            signals: SignalCounts::default(),
            final_account: AccountState::new(last, last),
        }
    }

    #[test]
    fn metrics_empty_result() {
        let metrics = Metrics::compute(&make_result(&[], vec![]));
        assert_relative_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.total_trades, 0);
        assert_relative_eq!(metrics.profit_factor, 0.0);
    }

    #[test]
    fn metrics_total_return() {
        let metrics = Metrics::compute(&make_result(&[100_000.0, 110_000.0], vec![]));
        assert_relative_eq!(metrics.total_return, 0.10, epsilon = 1e-9);

        let metrics = Metrics::compute(&make_result(&[100_000.0, 90_000.0], vec![]));
        assert_relative_eq!(metrics.total_return, -0.10, epsilon = 1e-9);
    }

    #[test]
    fn metrics_annualized_flat() {
        let values = vec![100_000.0; 252];
        let metrics = Metrics::compute(&make_result(&values, vec![]));
        assert_relative_eq!(metrics.annualized_return, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn metrics_trade_stats() {
        let trades = vec![
            make_trade(100.0),
            make_trade(-50.0),
            make_trade(200.0),
            make_trade(0.0),
        ];
        let metrics = Metrics::compute(&make_result(&[100_000.0, 100_250.0], trades));

        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.trades_won, 2);
        assert_eq!(metrics.trades_lost, 1);
        assert_eq!(metrics.trades_breakeven, 1);
        assert_relative_eq!(metrics.win_rate, 0.5);
        assert_relative_eq!(metrics.profit_factor, 6.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.avg_win, 150.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.avg_loss, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn metrics_profit_factor_without_losses() {
        let metrics = Metrics::compute(&make_result(&[100.0, 110.0], vec![make_trade(10.0)]));
        assert!(metrics.profit_factor.is_infinite());
    }

    #[test]
    fn max_drawdown() {
        let curve = make_equity_curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let (dd, _) = compute_drawdown(&curve);
        assert_relative_eq!(dd, (110.0 - 80.0) / 110.0, epsilon = 1e-9);
    }

    #[test]
    fn max_drawdown_duration() {
        let curve = make_equity_curve(&[100.0, 110.0, 100.0, 90.0, 85.0, 95.0]);
        let (_, duration) = compute_drawdown(&curve);
        assert_eq!(duration, 4);
    }
}
