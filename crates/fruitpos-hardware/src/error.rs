//! Error types for peripheral operations.
//!
//! Every peripheral (keypad, display, link, persistent medium) reports
//! failures through [`HardwareError`]. Link stalls surface as
//! [`HardwareError::Timeout`] when the caller configured a bounded wait.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or its channel has been closed.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from or sent to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Address outside the persistent medium.
    #[error("Address {address} out of range (capacity {capacity})")]
    AddressOutOfRange { address: usize, capacity: usize },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` for errors caused by a silent peer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(feature = "hardware-serial")]
impl From<serialport::Error> for HardwareError {
    fn from(err: serialport::Error) -> Self {
        Self::InitializationFailed {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("link");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: link");
    }

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(3000);
        assert!(error.is_timeout());
        assert_eq!(error.to_string(), "Operation timeout after 3000ms");
    }

    #[test]
    fn test_communication_error() {
        let error = HardwareError::communication("Serial port closed");
        assert!(matches!(error, HardwareError::CommunicationError { .. }));
        assert!(!error.is_timeout());
        assert_eq!(error.to_string(), "Communication error: Serial port closed");
    }

    #[test]
    fn test_address_out_of_range() {
        let error = HardwareError::AddressOutOfRange {
            address: 512,
            capacity: 512,
        };
        assert_eq!(error.to_string(), "Address 512 out of range (capacity 512)");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing image");
        let error: HardwareError = io.into();
        assert!(matches!(error, HardwareError::Io(_)));
    }
}
