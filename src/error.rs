use thiserror::Error;

impl From<::config::ConfigError> for LedgerError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::ConfigError(format!("Configuration error: {}", err))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Decryption failed: {0}")]
    DecryptionError(String),

    #[error("Key format error: {0}")]
    KeyFormatError(String),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyTypeError(String),

    #[error("Cannot build Merkle tree from empty input")]
    EmptyInputError,

    #[error("Leaf index {index} out of range for {len} leaves")]
    IndexOutOfRangeError { index: usize, len: usize },

    #[error("Malformed digest: {0}")]
    MalformedDigest(String),

    #[error("Ledger capacity of {0} transactions reached")]
    CapacityError(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn missing_field(field: &str) -> Self {
        Self::ValidationError(format!("Missing required field: {}", field))
    }

    pub fn invalid_amount(amount: &str) -> Self {
        Self::ValidationError(format!(
            "Invalid amount: {:?} (expected a non-negative decimal)",
            amount
        ))
    }

    /// True for failures caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::NotFoundError(_)
                | Self::KeyFormatError(_)
                | Self::UnsupportedKeyTypeError(_)
                | Self::MalformedDigest(_)
        )
    }
}
