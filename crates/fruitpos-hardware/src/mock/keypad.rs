//! Mock keypad implementation for testing and development.
//!
//! This module provides a simulated 4x4 keypad that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    HardwareError, Result,
    traits::KeypadDevice,
    types::{DeviceInfo, Key, KeyEvent},
};
use tokio::sync::mpsc;

/// Mock keypad device for testing and development.
///
/// This device receives key transitions through an internal channel. Tests
/// and applications drive it through a [`MockKeypadHandle`].
///
/// # Examples
///
/// ```
/// use fruitpos_hardware::mock::MockKeypad;
/// use fruitpos_hardware::traits::KeypadDevice;
/// use fruitpos_hardware::{Key, KeyEdge};
///
/// #[tokio::main]
/// async fn main() -> fruitpos_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     tokio::spawn(async move {
///         handle.type_keys("1#").await.unwrap();
///     });
///
///     assert_eq!(keypad.read_key(KeyEdge::Press).await?, Key::Digit(1));
///     assert_eq!(keypad.read_key(KeyEdge::Press).await?, Key::Hash);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated transitions
    event_rx: mpsc::Receiver<KeyEvent>,

    /// Device name
    name: String,
}

impl MockKeypad {
    /// Create a new mock keypad with the default name.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate key strokes.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_name("Mock Keypad".to_string())
    }

    /// Create a new mock keypad with a custom name.
    pub fn with_name(name: String) -> (Self, MockKeypadHandle) {
        let (event_tx, event_rx) = mpsc::channel(64);

        let keypad = Self {
            event_rx,
            name: name.clone(),
        };

        let handle = MockKeypadHandle { event_tx, name };

        (keypad, handle)
    }
}

impl Default for MockKeypad {
    fn default() -> Self {
        Self::new().0
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_event(&mut self) -> Result<KeyEvent> {
        self.event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Keypad input channel closed"))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock 4x4 Keypad").with_firmware_version("1.0.0"))
    }
}

/// Handle for controlling a mock keypad.
///
/// This handle can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated transitions
    event_tx: mpsc::Sender<KeyEvent>,

    /// Device name
    name: String,
}

impl MockKeypadHandle {
    /// Send a raw transition to the mock keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_event(&self, event: KeyEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Press and release `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn tap(&self, key: Key) -> Result<()> {
        self.send_event(KeyEvent::press(key)).await?;
        self.send_event(KeyEvent::release(key)).await
    }

    /// Tap each key in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn tap_all(&self, keys: &[Key]) -> Result<()> {
        for &key in keys {
            self.tap(key).await?;
        }
        Ok(())
    }

    /// Tap the keys spelled by their legends, e.g. `"12A#"`.
    ///
    /// Whitespace is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a character is not on the keypad or the keypad
    /// has been dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use fruitpos_hardware::mock::MockKeypad;
    ///
    /// #[tokio::main]
    /// async fn main() -> fruitpos_hardware::Result<()> {
    ///     let (_keypad, handle) = MockKeypad::new();
    ///     handle.type_keys("2 05 D #").await?;
    ///     assert!(handle.type_keys("x").await.is_err());
    ///     Ok(())
    /// }
    /// ```
    pub async fn type_keys(&self, legends: &str) -> Result<()> {
        for c in legends.chars().filter(|c| !c.is_whitespace()) {
            let key = Key::from_char(c)
                .ok_or_else(|| HardwareError::invalid_data(format!("No key for '{c}'")))?;
            self.tap(key).await?;
        }
        Ok(())
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
