//! Domain error types.

/// Top-level error type for swarmtreasury.
#[derive(Debug, thiserror::Error)]
pub enum TreasuryError {
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

    #[error("corrupt state file {file}: {reason}")]
    StateCorrupt { file: String, reason: String },

    #[error("failed to persist {file}: {reason}")]
    Persist { file: String, reason: String },

    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: f64, reason: String },

    #[error("insufficient funds in {bucket}: have {available:.2}, need {requested:.2}")]
    InsufficientFunds {
        bucket: String,
        available: f64,
        requested: f64,
    },

    #[error("unknown agent: {name}")]
    UnknownAgent { name: String },

    #[error("market error for {agent}: {reason}")]
    Market { agent: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TreasuryError> for std::process::ExitCode {
    fn from(err: &TreasuryError) -> Self {
        let code: u8 = match err {
            TreasuryError::Io(_) | TreasuryError::Persist { .. } | TreasuryError::Market { .. } => 1,
            TreasuryError::ConfigParse { .. }
            | TreasuryError::ConfigMissing { .. }
            | TreasuryError::ConfigInvalid { .. } => 2,
            TreasuryError::StateCorrupt { .. } | TreasuryError::Json(_) => 3,
            TreasuryError::InvalidAmount { .. }
            | TreasuryError::InsufficientFunds { .. }
            | TreasuryError::UnknownAgent { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
