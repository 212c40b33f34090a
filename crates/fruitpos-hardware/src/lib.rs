//! Peripheral abstraction layer for the fruitpos terminal nodes.
//!
//! This crate provides trait-based abstractions for the peripherals of the
//! two-node point of sale: the 4x4 keypad and character display of the
//! master, the EEPROM of the slave and the serial link between them. The
//! terminal logic is written against these traits so mock implementations
//! (for development and testing) and real devices are interchangeable.
//!
//! # Device Traits
//!
//! - [`KeypadDevice`]: key press/release transitions, with edge selection
//!   and a bounded poll that returns "no key".
//! - [`DisplayDevice`]: a rows x columns text screen.
//! - [`LinkTransport`]: blocking byte link with `send`, `receive` and
//!   `has_data`, plus an optional receive timeout.
//! - [`PersistentMedium`]: byte-addressable storage that reads `0xFF` when
//!   erased.
//!
//! # Implementations
//!
//! | Trait | Mock | Real |
//! |-------|------|------|
//! | `KeypadDevice` | [`mock::MockKeypad`] | - |
//! | `LinkTransport` | [`mock::MockLink`] | `SerialLink` (feature `hardware-serial`) |
//! | `PersistentMedium` | [`mock::MemoryEeprom`] | [`FileEeprom`] |
//!
//! Displays live in `fruitpos-terminal`, which renders them to text.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! [`KeypadDevice`]: traits::KeypadDevice
//! [`DisplayDevice`]: traits::DisplayDevice
//! [`LinkTransport`]: traits::LinkTransport
//! [`PersistentMedium`]: traits::PersistentMedium

pub mod eeprom;
pub mod error;
pub mod mock;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use eeprom::FileEeprom;
pub use error::{HardwareError, Result};
#[cfg(feature = "hardware-serial")]
pub use serial::SerialLink;
pub use traits::{DisplayDevice, KeypadDevice, LinkTransport, PersistentMedium};
pub use types::{DeviceInfo, Key, KeyEdge, KeyEvent};
