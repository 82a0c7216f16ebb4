//! Domain error types.

/// Top-level error type for supres.
#[derive(Debug, thiserror::Error)]
pub enum SupresError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data feed error: {reason}")]
    Data { reason: String },

    #[error("no data in {source_name}")]
    NoData { source_name: String },

    #[error("insufficient data in {source_name}: have {bars} bars, need {minimum}")]
    InsufficientData {
        source_name: String,
        bars: usize,
        minimum: usize,
    },

    #[error("an order is already pending")]
    OrderPending,

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SupresError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SupresError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            SupresError::Io(_) | SupresError::Report { .. } => 1,
            SupresError::ConfigParse { .. }
            | SupresError::ConfigMissing { .. }
            | SupresError::ConfigInvalid { .. } => 2,
            SupresError::Data { .. } => 3,
            SupresError::InvalidInput { .. } | SupresError::OrderPending => 4,
            SupresError::NoData { .. } | SupresError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&SupresError> for std::process::ExitCode {
    fn from(err: &SupresError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message() {
        let err = SupresError::invalid("close must be positive");
        assert_eq!(err.to_string(), "invalid input: close must be positive");
    }

    #[test]
    fn insufficient_data_message() {
        let err = SupresError::InsufficientData {
            source_name: "JFC.csv".into(),
            bars: 10,
            minimum: 30,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data in JFC.csv: have 10 bars, need 30"
        );
    }

    #[test]
    fn exit_codes_by_kind() {
        let config = SupresError::ConfigMissing {
            section: "backtest".into(),
            key: "data_file".into(),
        };
        assert_eq!(config.exit_status(), 2);
        assert_eq!(SupresError::Data { reason: "x".into() }.exit_status(), 3);
        assert_eq!(SupresError::OrderPending.exit_status(), 4);
        assert_eq!(
            SupresError::NoData {
                source_name: "x".into()
            }
            .exit_status(),
            5
        );
    }
}
