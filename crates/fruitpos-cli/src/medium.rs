//! Store medium selected by configuration.

use fruitpos_hardware::mock::MemoryEeprom;
use fruitpos_hardware::{FileEeprom, PersistentMedium, Result};
use fruitpos_storage::StoreConfig;
use tracing::info;

/// EEPROM image file, or a volatile in-memory one when no path is set.
#[derive(Debug)]
pub enum StoreMedium {
    File(FileEeprom),
    Memory(MemoryEeprom),
}

impl StoreMedium {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        match &config.eeprom_path {
            Some(path) => Ok(Self::File(FileEeprom::open(path, config.capacity)?)),
            None => {
                info!(capacity = config.capacity, "No EEPROM image configured, store is volatile");
                Ok(Self::Memory(MemoryEeprom::new(config.capacity)))
            }
        }
    }
}

impl PersistentMedium for StoreMedium {
    fn capacity(&self) -> usize {
        match self {
            Self::File(medium) => medium.capacity(),
            Self::Memory(medium) => medium.capacity(),
        }
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        match self {
            Self::File(medium) => medium.read_byte(address),
            Self::Memory(medium) => medium.read_byte(address),
        }
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        match self {
            Self::File(medium) => medium.write_byte(address, value),
            Self::Memory(medium) => medium.write_byte(address, value),
        }
    }
}
