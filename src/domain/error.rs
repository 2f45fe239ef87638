//! Domain error types.

/// An error raised from inside a strategy callback.
///
/// Any strategy error is fatal to the run: the engine aborts immediately
/// and no partial result is returned.
#[derive(Debug, Clone, thiserror::Error)]
#[error("strategy error: {message}")]
pub struct StrategyError {
    pub message: String,
}

impl StrategyError {
    pub fn new(message: impl Into<String>) -> Self {
        StrategyError {
            message: message.into(),
        }
    }
}

/// Top-level error type for quantsim.
#[derive(Debug, thiserror::Error)]
pub enum QuantsimError {
    #[error("data source error: {reason}")]
    Data { reason: String },

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

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("no bars for {symbol} in the requested range")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantsimError> for std::process::ExitCode {
    fn from(err: &QuantsimError) -> Self {
        let code: u8 = match err {
            QuantsimError::Io(_) => 1,
            QuantsimError::ConfigParse { .. }
            | QuantsimError::ConfigMissing { .. }
            | QuantsimError::ConfigInvalid { .. } => 2,
            QuantsimError::Data { .. } | QuantsimError::NoData { .. } => 3,
            QuantsimError::UnknownStrategy { .. } => 4,
            QuantsimError::Strategy(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
