//! Account snapshot read by the signal rule.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountState {
    pub cash: f64,
    pub total_value: f64,
}

impl AccountState {
    pub fn new(cash: f64, total_value: f64) -> Self {
        AccountState { cash, total_value }
    }

    /// total_value - cash
    pub fn position_value(&self) -> f64 {
        self.total_value - self.cash
    }

    pub fn has_position(&self) -> bool {
        self.position_value() > 0.0
    }
}
