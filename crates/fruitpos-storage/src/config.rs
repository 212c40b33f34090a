use fruitpos_core::constants::DEFAULT_MEDIUM_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Product store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// EEPROM image file; `None` keeps the store in memory
    pub eeprom_path: Option<PathBuf>,

    /// Medium size in bytes
    pub capacity: usize,

    /// Load the ten-fruit catalog when the medium is found erased
    pub seed_default_catalog: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            eeprom_path: None,
            capacity: DEFAULT_MEDIUM_CAPACITY,
            seed_default_catalog: false,
        }
    }
}

impl StoreConfig {
    /// Create a configuration backed by the image at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            eeprom_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the medium size in bytes
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set whether an erased medium is seeded with the default catalog
    pub fn seed_default_catalog(mut self, seed: bool) -> Self {
        self.seed_default_catalog = seed;
        self
    }
}
