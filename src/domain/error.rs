//! Domain error types.

/// Top-level error type for marketscan.
#[derive(Debug, thiserror::Error)]
pub enum MarketscanError {
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

    #[error("required index series {key} is missing")]
    MissingIndex { key: String },

    #[error("invalid series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MarketscanError> for std::process::ExitCode {
    fn from(err: &MarketscanError) -> Self {
        let code: u8 = match err {
            MarketscanError::Io(_) => 1,
            MarketscanError::ConfigParse { .. }
            | MarketscanError::ConfigMissing { .. }
            | MarketscanError::ConfigInvalid { .. }
            | MarketscanError::MissingIndex { .. } => 2,
            MarketscanError::Data { .. }
            | MarketscanError::Csv(_)
            | MarketscanError::InvalidSeries { .. } => 3,
            MarketscanError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_index_message_names_key() {
        let err = MarketscanError::MissingIndex {
            key: "TEDPIX".into(),
        };
        assert_eq!(err.to_string(), "required index series TEDPIX is missing");
    }

    #[test]
    fn insufficient_data_message() {
        let err = MarketscanError::InsufficientData {
            symbol: "FOLD".into(),
            bars: 12,
            minimum: 260,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for FOLD: have 12 bars, need 260"
        );
    }
}
