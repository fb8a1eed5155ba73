//! Domain error types.

/// Top-level error type for brandspend.
#[derive(Debug, thiserror::Error)]
pub enum BrandspendError {
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

    #[error("record store unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("import failed at line {line}: {reason}")]
    Import { line: u64, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BrandspendError {
    /// Collapse a store-level failure into `DataUnavailable`.
    ///
    /// Configuration errors pass through unchanged so callers can still tell
    /// a misconfigured store from an unreachable one.
    pub fn into_unavailable(self) -> Self {
        match self {
            BrandspendError::Database { reason }
            | BrandspendError::DatabaseQuery { reason }
            | BrandspendError::Import { reason, .. } => BrandspendError::DataUnavailable { reason },
            BrandspendError::Io(e) => BrandspendError::DataUnavailable {
                reason: e.to_string(),
            },
            other => other,
        }
    }
}

impl From<&BrandspendError> for std::process::ExitCode {
    fn from(err: &BrandspendError) -> Self {
        let code: u8 = match err {
            BrandspendError::Io(_) => 1,
            BrandspendError::ConfigParse { .. }
            | BrandspendError::ConfigMissing { .. }
            | BrandspendError::ConfigInvalid { .. } => 2,
            BrandspendError::Database { .. } | BrandspendError::DatabaseQuery { .. } => 3,
            BrandspendError::DataUnavailable { .. } => 4,
            BrandspendError::Import { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
