//! Persistent product store for the fruitpos slave node.
//!
//! The slave keeps its catalog in an EEPROM as a count byte followed by
//! fixed 20-byte records. [`ProductStore`] owns that layout over any
//! [`PersistentMedium`](fruitpos_hardware::PersistentMedium): an in-memory
//! image for tests, or a file-backed image on a host.
//!
//! # Lifecycle
//!
//! - An erased medium (`0xFF` at address 0) is formatted to an empty store
//!   on open, and optionally seeded with [`DEFAULT_CATALOG`].
//! - Records are only ever appended; the store never shrinks and never
//!   edits a record in place.
//! - Every append re-validates the record and scans for a duplicate SKU or
//!   name.
//!
//! # Examples
//!
//! ```no_run
//! use fruitpos_hardware::FileEeprom;
//! use fruitpos_storage::{ProductStore, StoreConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::new("fruitpos.eeprom").seed_default_catalog(true);
//! let medium = FileEeprom::open("fruitpos.eeprom", config.capacity)?;
//! let store = ProductStore::open(medium, &config)?;
//!
//! for product in store.iter() {
//!     println!("{}", product?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod store;

pub use catalog::DEFAULT_CATALOG;
pub use config::StoreConfig;
pub use error::{StorageError, StorageResult};
pub use store::{ProductStore, max_records};
