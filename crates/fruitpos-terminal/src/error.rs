use fruitpos_hardware::HardwareError;
use fruitpos_link::LinkError;
use fruitpos_storage::StorageError;
use thiserror::Error;

/// Errors that end a terminal or slave session
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Keypad or display failure
    #[error("Peripheral error: {0}")]
    Hardware(#[from] HardwareError),

    /// Link exchange failure
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Product store failure on the slave
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Display buffer misuse
    #[error("Display error: {0}")]
    Display(#[from] fruitpos_core::Error),
}

impl TerminalError {
    /// Returns `true` once an input or the link has gone away for good.
    ///
    /// Session loops treat this as a normal shutdown.
    pub fn is_disconnected(&self) -> bool {
        match self {
            TerminalError::Hardware(HardwareError::Disconnected { .. }) => true,
            TerminalError::Link(err) => err.is_disconnected(),
            _ => false,
        }
    }
}

/// Specialized result type for terminal operations
pub type TerminalResult<T> = Result<T, TerminalError>;
