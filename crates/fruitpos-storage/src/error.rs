use fruitpos_core::ValidationError;
use fruitpos_hardware::HardwareError;
use thiserror::Error;

/// Storage-specific error types for the product store.
///
/// These errors represent failures of the persistent medium, records that
/// fail validation or uniqueness, and a store with no room left.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The persistent medium could not be read or written
    #[error("Medium error: {0}")]
    Medium(#[from] HardwareError),

    /// The record failed validation or duplicates an existing one
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No room for another record
    #[error("Store exhausted: {count} records, room for {max_records}")]
    Exhausted { count: u8, max_records: usize },

    /// The count byte claims more records than the medium can hold
    #[error("Corrupt store: count {count} exceeds room for {max_records} records")]
    Corrupt { count: u8, max_records: usize },
}

impl StorageError {
    /// Operator-facing text for a rejected record, if this is a validation
    /// failure.
    pub fn display_message(&self) -> Option<&'static str> {
        match self {
            StorageError::Validation(err) => Some(err.display_message()),
            _ => None,
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
