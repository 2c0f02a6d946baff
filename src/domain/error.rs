//! Domain error types.

/// Failure modes of a single return classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    #[error("invalid classifier config: {reason}")]
    InvalidConfig { reason: String },

    #[error("price data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("insufficient price history for {ticker}: have {points} usable points, need 2")]
    InsufficientHistory { ticker: String, points: usize },
}

impl ClassifyError {
    /// Per-filing data errors are skipped at the corpus layer; config errors abort the run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClassifyError::InvalidConfig { .. })
    }
}

/// Top-level error type for edgar8k.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

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

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("filing source error: {reason}")]
    Filing { reason: String },

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CorpusError> for std::process::ExitCode {
    fn from(err: &CorpusError) -> Self {
        let code: u8 = match err {
            CorpusError::Io(_) => 1,
            CorpusError::ConfigParse { .. }
            | CorpusError::ConfigMissing { .. }
            | CorpusError::ConfigInvalid { .. }
            | CorpusError::Classify(ClassifyError::InvalidConfig { .. }) => 2,
            CorpusError::Database { .. } | CorpusError::DatabaseQuery { .. } => 3,
            CorpusError::Filing { .. } => 4,
            CorpusError::NoData { .. }
            | CorpusError::Classify(ClassifyError::DataUnavailable { .. })
            | CorpusError::Classify(ClassifyError::InsufficientHistory { .. }) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_not_recoverable() {
        let err = ClassifyError::InvalidConfig {
            reason: "num_classes must be 2 or 3".into(),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn data_errors_are_recoverable() {
        let unavailable = ClassifyError::DataUnavailable {
            ticker: "AAPL".into(),
            reason: "no session".into(),
        };
        let short = ClassifyError::InsufficientHistory {
            ticker: "AAPL".into(),
            points: 1,
        };
        assert!(unavailable.is_recoverable());
        assert!(short.is_recoverable());
    }

    #[test]
    fn classify_error_messages() {
        let err = ClassifyError::InsufficientHistory {
            ticker: "MSFT".into(),
            points: 0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient price history for MSFT: have 0 usable points, need 2"
        );

        let wrapped = CorpusError::from(ClassifyError::InvalidConfig {
            reason: "timespan must be positive".into(),
        });
        assert_eq!(
            wrapped.to_string(),
            "invalid classifier config: timespan must be positive"
        );
    }

    #[test]
    fn exit_codes_by_category() {
        use std::process::ExitCode;

        let config = CorpusError::ConfigMissing {
            section: "filings".into(),
            key: "dir".into(),
        };
        assert_eq!(ExitCode::from(&config), ExitCode::from(2));

        let classifier_config = CorpusError::Classify(ClassifyError::InvalidConfig {
            reason: "bad".into(),
        });
        assert_eq!(ExitCode::from(&classifier_config), ExitCode::from(2));

        let no_data = CorpusError::NoData {
            ticker: "XYZ".into(),
        };
        assert_eq!(ExitCode::from(&no_data), ExitCode::from(5));

        let filing = CorpusError::Filing {
            reason: "unreadable".into(),
        };
        assert_eq!(ExitCode::from(&filing), ExitCode::from(4));
    }
}
