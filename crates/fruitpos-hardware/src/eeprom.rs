//! File-backed EEPROM image.
//!
//! The slave keeps its product store in a 24Cxx EEPROM. On a host the same
//! byte layout lives in a plain file so the catalog survives restarts and
//! can be inspected with `fruitpos dump` or a hex editor.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::mock::eeprom::ERASED;
use crate::{HardwareError, Result, traits::PersistentMedium};

/// EEPROM image stored in a file, written through on every byte.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    file: File,
    cells: Vec<u8>,
}

impl FileEeprom {
    /// Open the image at `path`, creating an erased one if it is missing.
    ///
    /// A file shorter than `capacity` is padded with erased bytes; a longer
    /// one is used up to `capacity`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, read or extended.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut cells = Vec::with_capacity(capacity);
        file.read_to_end(&mut cells)?;

        let existing = cells.len();
        cells.resize(capacity, ERASED);
        if existing < capacity {
            file.seek(SeekFrom::Start(existing as u64))?;
            file.write_all(&cells[existing..])?;
            file.flush()?;
            info!(path = %path.display(), existing, capacity, "Extended EEPROM image");
        } else {
            debug!(path = %path.display(), capacity, "Opened EEPROM image");
        }

        Ok(Self { path, file, cells })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl PersistentMedium for FileEeprom {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        self.cells
            .get(address)
            .copied()
            .ok_or(HardwareError::AddressOutOfRange {
                address,
                capacity: self.cells.len(),
            })
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        let capacity = self.cells.len();
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(HardwareError::AddressOutOfRange { address, capacity })?;
        *cell = value;
        self.file.seek(SeekFrom::Start(address as u64))?;
        self.file.write_all(&[value])?;
        Ok(())
    }
}
