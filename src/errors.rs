use thiserror::Error;

/// Error type that captures expense store failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed record on line {line}: {message}")]
    Format { line: u64, message: String },
}

/// Caller-side validation failures. The store never raises these.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),
    #[error("Amount must be a finite number")]
    NonFiniteAmount,
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Errors raised while loading or saving the user configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}

/// Either the caller rejected the expense or the store failed to write it.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] LedgerError),
}

impl From<RecordError> for CliError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Invalid(inner) => CliError::Validation(inner),
            RecordError::Store(inner) => CliError::Ledger(inner),
        }
    }
}
