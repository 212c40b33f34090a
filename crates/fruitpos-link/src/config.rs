use fruitpos_core::constants::DEFAULT_MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for link exchanges
///
/// # Example
///
/// ```
/// use fruitpos_link::LinkConfig;
/// use std::time::Duration;
///
/// let config = LinkConfig::default().with_timeout(Duration::from_millis(500));
/// assert_eq!(config.timeout, Some(Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Bound on every wait for a peer byte; `None` waits forever
    pub timeout: Option<Duration>,

    /// Longest payload accepted before a terminator
    pub max_frame_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl LinkConfig {
    /// Set the receive timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the payload limit
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LinkConfig::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_frame_size, 64);
    }
}
