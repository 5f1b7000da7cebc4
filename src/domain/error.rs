//! Domain error types.

/// Top-level error type for tidesim.
#[derive(Debug, thiserror::Error)]
pub enum TidesimError {
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

    #[error("data error for {symbol}: {reason}")]
    Data { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TidesimError> for std::process::ExitCode {
    fn from(err: &TidesimError) -> Self {
        let code: u8 = match err {
            TidesimError::Io(_) => 1,
            TidesimError::ConfigParse { .. }
            | TidesimError::ConfigMissing { .. }
            | TidesimError::ConfigInvalid { .. } => 2,
            TidesimError::Data { .. } | TidesimError::NoData { .. } => 3,
            TidesimError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
