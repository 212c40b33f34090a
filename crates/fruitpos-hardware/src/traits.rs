//! Peripheral trait definitions.
//!
//! These traits are the contract between the terminal logic and the
//! hardware it runs on: a matrix keypad, a character display, a byte link
//! to the other node and a byte-addressable persistent medium. Mock and
//! real implementations are interchangeable behind them.
//!
//! Keypad and link use native `async fn` methods (Rust 1.90 + Edition 2024
//! RPITIT), eliminating the need for the `async_trait` macro. Display and
//! medium access are synchronous; they never wait on a peer.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use crate::error::{HardwareError, Result};
use crate::types::{DeviceInfo, Key, KeyEdge, KeyEvent};

/// Keypad device abstraction.
///
/// A keypad reports raw press and release transitions; the caller decides
/// which edge it acts on through [`read_key`](KeypadDevice::read_key).
///
/// # Object Safety
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use fruitpos_hardware::traits::KeypadDevice;
/// use fruitpos_hardware::{Key, KeyEdge, Result};
///
/// async fn wait_for_hash<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     while keypad.read_key(KeyEdge::Press).await? != Key::Hash {}
///     Ok(())
/// }
/// ```
pub trait KeypadDevice: Send {
    /// Read the next key transition.
    ///
    /// This method blocks asynchronously until a transition is available.
    /// It must be cancel-safe: dropping the future loses no event.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_event(&mut self) -> Result<KeyEvent>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;

    /// Read the next key reported on `edge`, skipping the opposite edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_key(&mut self, edge: KeyEdge) -> Result<Key> {
        loop {
            let event = self.read_event().await?;
            if event.edge == edge {
                return Ok(event.key);
            }
        }
    }

    /// Poll for a key on `edge`, giving up after `wait`.
    ///
    /// Returns `Ok(None)` when no key arrived, the "no key" result of a
    /// matrix scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn poll_key(&mut self, edge: KeyEdge, wait: Duration) -> Result<Option<Key>> {
        match tokio::time::timeout(wait, self.read_key(edge)).await {
            Ok(key) => key.map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// Character display abstraction.
///
/// Rows and columns are zero-based. Text that runs past the last column is
/// cut off; full lines are rewritten by writing at column 0.
pub trait DisplayDevice: Send {
    /// Number of text rows.
    fn rows(&self) -> usize;

    /// Number of characters per row.
    fn columns(&self) -> usize;

    /// Blank the whole display.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is unreachable.
    fn clear(&mut self) -> Result<()>;

    /// Write `text` starting at (`column`, `row`).
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidData` if the position is off-screen.
    fn write_at(&mut self, column: usize, row: usize, text: &str) -> Result<()>;

    /// Replace a whole row with `text`, padding with spaces.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidData` if the row is off-screen.
    fn write_line(&mut self, row: usize, text: &str) -> Result<()> {
        let width = self.columns();
        let line: String = text.chars().take(width).collect();
        self.write_at(0, row, &format!("{line:<width$}"))
    }
}

/// Point-to-point byte link between the two nodes.
///
/// The link is lossless and in-order but has no framing of its own; see
/// `fruitpos-protocol` for the byte sequences carried over it.
///
/// # Examples
///
/// ```no_run
/// use fruitpos_hardware::traits::LinkTransport;
/// use fruitpos_hardware::Result;
///
/// async fn ping<L: LinkTransport>(link: &mut L) -> Result<u8> {
///     link.send(0x00).await?;
///     link.receive().await
/// }
/// ```
pub trait LinkTransport: Send {
    /// Send one byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is down.
    async fn send(&mut self, byte: u8) -> Result<()>;

    /// Wait for the next byte. There is no built-in timeout.
    ///
    /// Implementations must be cancel-safe so a caller-supplied timeout
    /// never drops a byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is down.
    async fn receive(&mut self) -> Result<u8>;

    /// Returns `true` if a byte can be received without waiting.
    fn has_data(&mut self) -> bool;

    /// Send a byte sequence in order.
    ///
    /// # Errors
    ///
    /// Returns the first send error.
    async fn send_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.send(byte).await?;
        }
        Ok(())
    }

    /// Wait for the next byte, bounded by `timeout` when one is given.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Timeout` if the peer stayed silent.
    async fn receive_within(&mut self, timeout: Option<Duration>) -> Result<u8> {
        match timeout {
            None => self.receive().await,
            Some(limit) => tokio::time::timeout(limit, self.receive())
                .await
                .map_err(|_| HardwareError::timeout(limit.as_millis() as u64))?,
        }
    }

    /// Discard every byte already waiting on the link.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is down.
    async fn drain(&mut self) -> Result<usize> {
        let mut dropped = 0;
        while self.has_data() {
            self.receive().await?;
            dropped += 1;
        }
        Ok(dropped)
    }
}

/// Byte-addressable persistent storage, such as a 24Cxx EEPROM.
///
/// A freshly erased medium reads `0xFF` everywhere.
pub trait PersistentMedium: Send {
    /// Total number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Read the byte at `address`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::AddressOutOfRange` past the capacity.
    fn read_byte(&self, address: usize) -> Result<u8>;

    /// Write `value` at `address`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::AddressOutOfRange` past the capacity, or an
    /// I/O error from a backing file.
    fn write_byte(&mut self, address: usize, value: u8) -> Result<()>;

    /// Fill `buf` from consecutive addresses starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    fn read_bytes(&self, address: usize, buf: &mut [u8]) -> Result<()> {
        for (offset, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(address + offset)?;
        }
        Ok(())
    }

    /// Write `data` to consecutive addresses starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns the first write error; earlier bytes stay written.
    fn write_bytes(&mut self, address: usize, data: &[u8]) -> Result<()> {
        for (offset, &value) in data.iter().enumerate() {
            self.write_byte(address + offset, value)?;
        }
        Ok(())
    }

    /// Reset every byte to the erased value `0xFF`.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    fn erase(&mut self) -> Result<()> {
        for address in 0..self.capacity() {
            self.write_byte(address, 0xFF)?;
        }
        Ok(())
    }
}
