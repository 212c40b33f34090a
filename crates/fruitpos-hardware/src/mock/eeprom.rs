//! RAM-backed persistent medium.

use crate::{HardwareError, Result, traits::PersistentMedium};

/// Erased-state byte of an EEPROM cell.
pub const ERASED: u8 = 0xFF;

/// In-memory EEPROM image.
///
/// Starts erased (all `0xFF`), like a new 24Cxx part.
///
/// ```
/// use fruitpos_hardware::mock::MemoryEeprom;
/// use fruitpos_hardware::traits::PersistentMedium;
///
/// let mut eeprom = MemoryEeprom::new(512);
/// assert_eq!(eeprom.read_byte(0).unwrap(), 0xFF);
///
/// eeprom.write_byte(0, 3).unwrap();
/// assert_eq!(eeprom.read_byte(0).unwrap(), 3);
/// assert!(eeprom.read_byte(512).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEeprom {
    cells: Vec<u8>,
    writes: usize,
}

impl MemoryEeprom {
    /// Create an erased medium of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![ERASED; capacity],
            writes: 0,
        }
    }

    /// Wrap an existing image.
    pub fn from_bytes(cells: Vec<u8>) -> Self {
        Self { cells, writes: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Number of byte writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check(&self, address: usize) -> Result<()> {
        if address >= self.cells.len() {
            return Err(HardwareError::AddressOutOfRange {
                address,
                capacity: self.cells.len(),
            });
        }
        Ok(())
    }
}

impl PersistentMedium for MemoryEeprom {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        self.check(address)?;
        Ok(self.cells[address])
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        self.check(address)?;
        self.cells[address] = value;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_medium_is_erased() {
        let eeprom = MemoryEeprom::new(16);
        assert!(eeprom.as_bytes().iter().all(|&b| b == ERASED));
        assert_eq!(eeprom.capacity(), 16);
    }

    #[test]
    fn test_bulk_access() {
        let mut eeprom = MemoryEeprom::new(32);
        eeprom.write_bytes(4, b"APPLE").unwrap();

        let mut buf = [0u8; 5];
        eeprom.read_bytes(4, &mut buf).unwrap();
        assert_eq!(&buf, b"APPLE");
        assert_eq!(eeprom.write_count(), 5);
    }

    #[test]
    fn test_write_past_end_rejected() {
        let mut eeprom = MemoryEeprom::new(8);
        let err = eeprom.write_bytes(6, &[1, 2, 3]).unwrap_err();

        assert!(matches!(err, HardwareError::AddressOutOfRange { address: 8, .. }));
        // Bytes before the failing address stay written.
        assert_eq!(&eeprom.as_bytes()[6..], &[1, 2]);
    }

    #[test]
    fn test_erase() {
        let mut eeprom = MemoryEeprom::from_bytes(vec![0; 4]);
        eeprom.erase().unwrap();
        assert_eq!(eeprom.as_bytes(), &[ERASED; 4]);
    }
}
