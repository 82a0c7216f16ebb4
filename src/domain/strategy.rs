//! Strategy configuration.

use super::signal::{SignalParams, TouchPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    pub period: usize,
    pub buy_fraction: f64,
    pub sell_fraction: f64,
    pub touch_policy: TouchPolicy,
}

impl Default for Strategy {
    fn default() -> Self {
        let params = SignalParams::default();
        Strategy {
            name: "MinMax Support Resistance".into(),
            description: String::new(),
            period: params.period,
            buy_fraction: params.buy_fraction,
            sell_fraction: params.sell_fraction,
            touch_policy: params.touch_policy,
        }
    }
}

impl Strategy {
    /// Order sizes are fractions of the starting capital.
    pub fn signal_params(&self, initial_cash: f64) -> SignalParams {
        SignalParams {
            period: self.period,
            initial_cash,
            buy_fraction: self.buy_fraction,
            sell_fraction: self.sell_fraction,
            touch_policy: self.touch_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_signal_defaults() {
        let s = Strategy::default();
        assert_eq!(s.period, 30);
        assert_eq!(s.buy_fraction, 0.1);
        assert_eq!(s.sell_fraction, 0.05);
        assert_eq!(s.touch_policy, TouchPolicy::Breakout);
    }

    #[test]
    fn signal_params_carry_initial_cash() {
        let s = Strategy {
            period: 20,
            touch_policy: TouchPolicy::Reversion,
            ..Strategy::default()
        };
        let params = s.signal_params(50_000.0);
        assert_eq!(params.period, 20);
        assert_eq!(params.initial_cash, 50_000.0);
        assert_eq!(params.touch_policy, TouchPolicy::Reversion);
    }
}
