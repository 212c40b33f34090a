//! Common types shared across peripheral implementations.
//!
//! This module defines the keypad vocabulary ([`Key`], [`KeyEdge`],
//! [`KeyEvent`]) and generic device metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HardwareError, Result};

/// One key of the 4x4 matrix keypad.
///
/// ```text
/// 1 2 3 A
/// 4 5 6 B
/// 7 8 9 C
/// * 0 # D
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Numeric digit (0-9).
    Digit(u8),
    A,
    B,
    C,
    D,
    /// Star key (*).
    Star,
    /// Hash/pound key (#).
    Hash,
}

impl Key {
    /// Create a digit key.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use fruitpos_hardware::Key;
    ///
    /// assert_eq!(Key::digit(5).unwrap().as_digit(), Some(5));
    /// assert!(Key::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a keypad legend character to its key.
    ///
    /// Letters are accepted in either case.
    ///
    /// ```
    /// use fruitpos_hardware::Key;
    ///
    /// assert_eq!(Key::from_char('#'), Some(Key::Hash));
    /// assert_eq!(Key::from_char('b'), Some(Key::B));
    /// assert_eq!(Key::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            d @ '0'..='9' => Some(Self::Digit(d as u8 - b'0')),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            _ => None,
        }
    }

    /// Keypad legend character.
    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d),
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// Check if this key is a digit.
    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit key.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Which edge of a key stroke the caller acts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEdge {
    /// Key went down.
    #[default]
    Press,
    /// Key came back up.
    Release,
}

/// A key transition reported by a keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub edge: KeyEdge,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            edge: KeyEdge::Press,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            edge: KeyEdge::Release,
        }
    }
}

/// Generic device information.
///
/// Contains metadata about a peripheral such as name, model and firmware
/// version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "/dev/ttyUSB0", "Mock Keypad").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}
