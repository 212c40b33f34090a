//! Mock device implementations for testing and development.
//!
//! This module provides simulated peripherals that can be controlled
//! programmatically without requiring physical hardware.

pub mod eeprom;
pub mod keypad;
pub mod link;

// Re-export commonly used types
pub use eeprom::MemoryEeprom;
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use link::MockLink;
