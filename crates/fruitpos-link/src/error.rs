use fruitpos_hardware::HardwareError;
use fruitpos_protocol::CommandCode;
use thiserror::Error;

/// Errors that can occur during a link exchange
#[derive(Debug, Error)]
pub enum LinkError {
    /// The byte link failed or timed out
    #[error("Link error: {0}")]
    Hardware(#[from] HardwareError),

    /// Framing or decoding failed
    #[error("Protocol error: {0}")]
    Protocol(#[from] fruitpos_core::Error),

    /// The peer answered a record transfer with a negative acknowledgment
    #[error("{command} rejected by peer")]
    Rejected { command: CommandCode },
}

impl LinkError {
    /// Returns `true` if the peer stayed silent past the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkError::Hardware(err) if err.is_timeout())
    }

    /// Returns `true` if the link itself is gone and retrying is pointless.
    pub fn is_disconnected(&self) -> bool {
        matches!(
            self,
            LinkError::Hardware(HardwareError::Disconnected { .. } | HardwareError::Io(_))
        )
    }
}

/// Specialized result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err: LinkError = HardwareError::timeout(500).into();
        assert!(err.is_timeout());
        assert!(!err.is_disconnected());
    }

    #[test]
    fn test_disconnected_classification() {
        let err: LinkError = HardwareError::disconnected("link-a").into();
        assert!(err.is_disconnected());
    }

    #[test]
    fn test_rejected_message() {
        let err = LinkError::Rejected {
            command: CommandCode::SaveProduct,
        };
        assert_eq!(err.to_string(), "SaveProduct rejected by peer");
    }
}
