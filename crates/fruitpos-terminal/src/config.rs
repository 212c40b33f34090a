//! Terminal and scheduler settings.

use std::time::Duration;

use fruitpos_hardware::KeyEdge;
use serde::{Deserialize, Serialize};

/// Default time a status message stays on screen.
pub const DEFAULT_MESSAGE_DELAY: Duration = Duration::from_secs(2);

/// Default keypad poll window of one main-loop iteration.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(12);

/// Master terminal behavior.
///
/// ```
/// use std::time::Duration;
/// use fruitpos_hardware::KeyEdge;
/// use fruitpos_terminal::TerminalConfig;
///
/// let config = TerminalConfig::default()
///     .with_message_delay(Duration::ZERO)
///     .with_key_edge(KeyEdge::Release);
/// assert_eq!(config.key_edge, KeyEdge::Release);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// How long results such as "Successful Save" stay visible.
    pub message_delay: Duration,

    /// Keypad edge the terminal acts on.
    pub key_edge: KeyEdge,

    /// How long one loop iteration waits for a key before repainting.
    pub poll_interval: Duration,
}

impl TerminalConfig {
    pub fn with_message_delay(mut self, delay: Duration) -> Self {
        self.message_delay = delay;
        self
    }

    pub fn with_key_edge(mut self, edge: KeyEdge) -> Self {
        self.key_edge = edge;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            message_delay: DEFAULT_MESSAGE_DELAY,
            key_edge: KeyEdge::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Periods of the render scheduler.
///
/// Defaults reproduce the master board's timers: a 12 ms tick, a repaint
/// every fourth tick and a 420 ms blink phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub tick: Duration,
    pub ticks_per_render: u8,
    pub blink: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(12),
            ticks_per_render: 4,
            blink: Duration::from_millis(420),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let terminal = TerminalConfig::default();
        assert_eq!(terminal.message_delay, Duration::from_secs(2));
        assert_eq!(terminal.key_edge, KeyEdge::Press);

        let scheduler = SchedulerConfig::default();
        assert_eq!(scheduler.tick * u32::from(scheduler.ticks_per_render), Duration::from_millis(48));
        assert_eq!(scheduler.blink, Duration::from_millis(420));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = TerminalConfig::default().with_poll_interval(Duration::from_millis(5));
        let json = serde_json::to_string(&config).unwrap();
        let back: TerminalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
