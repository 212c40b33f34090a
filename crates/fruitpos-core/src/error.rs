use thiserror::Error;

/// Reasons a candidate product cannot be stored.
///
/// Validation failures are never fatal: the operator sees
/// [`display_message`](ValidationError::display_message) and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid SKU: {reason}")]
    InvalidSku { reason: String },

    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    #[error("Price {price} outside 1-9999")]
    InvalidPrice { price: u16 },

    #[error("SKU {sku} already exists")]
    DuplicateSku { sku: String },

    #[error("Name '{name}' already exists")]
    DuplicateName { name: String },
}

impl ValidationError {
    /// Short operator-facing text shown on the master LCD.
    #[must_use]
    pub fn display_message(&self) -> &'static str {
        match self {
            ValidationError::InvalidSku { .. } => " Invalid SKU  ",
            ValidationError::InvalidName { .. } => " Invalid Name ",
            ValidationError::InvalidPrice { .. } => "Invalid  Price",
            ValidationError::DuplicateSku { .. } => " Existing SKU ",
            ValidationError::DuplicateName { .. } => "Existing  Name",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // Protocol errors
    #[error("Invalid command code: {code:#04x}")]
    InvalidCommandCode { code: u8 },

    #[error("Frame too large: {size} bytes (max {max_size})")]
    FrameTooLarge { size: usize, max_size: usize },

    #[error("Protocol desync: {message}")]
    Desync { message: String },

    #[error("Invalid message: {message}")]
    InvalidMessage { message: String },

    // Display errors
    #[error("Invalid display line {line} (max {max})")]
    InvalidLine { line: usize, max: usize },

    #[error("Invalid column {column} (max {max})")]
    InvalidColumn { column: usize, max: usize },

    #[error("Duration must be greater than zero")]
    InvalidDuration,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a desync error.
    pub fn desync(message: impl Into<String>) -> Self {
        Self::Desync {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
