//! Fixed-layout product store.
//!
//! ```text
//! address 0         record count (u8)
//! address 1 + 20*i  record i:
//!   +0  sku[6]
//!   +6  0x00
//!   +7  name[10]
//!   +17 0x00
//!   +18 price_hi
//!   +19 price_lo
//! ```
//!
//! The store reads and writes the medium directly: nothing is cached, so a
//! second store opened over the same image sees every append.

use fruitpos_core::{
    Product, ProductName, Sku, ValidationError,
    constants::{
        COUNT_ADDRESS, ERASED_BYTE, FIELD_SEPARATOR, MAX_RECORDS, NAME_LENGTH, NAME_OFFSET,
        PRICE_HI_OFFSET, PRICE_LO_OFFSET, RECORD_BASE_ADDRESS, RECORD_SIZE, SKU_LENGTH,
        SKU_OFFSET,
    },
};
use fruitpos_hardware::PersistentMedium;
use tracing::{debug, info, warn};

use crate::catalog::DEFAULT_CATALOG;
use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};

const COUNT: usize = COUNT_ADDRESS as usize;

/// Address of the first byte of record `index`.
fn record_address(index: usize) -> usize {
    RECORD_BASE_ADDRESS as usize + RECORD_SIZE as usize * index
}

/// Number of whole records a medium of `capacity` bytes can hold, capped
/// by the 8-bit count.
pub fn max_records(capacity: usize) -> usize {
    (capacity.saturating_sub(RECORD_BASE_ADDRESS as usize) / RECORD_SIZE as usize)
        .min(MAX_RECORDS)
}

/// Append-only product store over a persistent medium.
///
/// # Examples
///
/// ```
/// use fruitpos_core::Product;
/// use fruitpos_hardware::mock::MemoryEeprom;
/// use fruitpos_storage::{ProductStore, StoreConfig};
///
/// let mut store = ProductStore::open(MemoryEeprom::new(512), &StoreConfig::default()).unwrap();
/// assert_eq!(store.count().unwrap(), 0);
///
/// let kiwi = Product::new("000000", "KIWI", 70).unwrap();
/// store.append(kiwi).unwrap();
/// assert_eq!(store.read(0).unwrap(), kiwi);
///
/// // Past the end: the zeroed record, never a panic.
/// assert_eq!(store.read(1).unwrap(), Product::zeroed());
/// ```
#[derive(Debug)]
pub struct ProductStore<M> {
    medium: M,
}

impl<M: PersistentMedium> ProductStore<M> {
    /// Open a store, formatting the medium if it is erased.
    ///
    /// With `seed_default_catalog` set, a freshly formatted medium is
    /// loaded with [`DEFAULT_CATALOG`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Medium` if the medium cannot be read or
    /// written, or `StorageError::Corrupt` if the count byte is larger than
    /// the medium can hold.
    pub fn open(medium: M, config: &StoreConfig) -> StorageResult<Self> {
        let mut store = Self { medium };

        let marker = store.medium.read_byte(COUNT)?;
        if marker == ERASED_BYTE {
            info!("Erased medium found, formatting product store");
            store.format()?;
            if config.seed_default_catalog {
                store.seed_default_catalog()?;
            }
        } else if usize::from(marker) > store.max_records() {
            return Err(StorageError::Corrupt {
                count: marker,
                max_records: store.max_records(),
            });
        }

        debug!(count = store.count()?, "Product store open");
        Ok(store)
    }

    /// Format the medium whatever it holds, seeding it if configured.
    ///
    /// Unlike [`open`](Self::open) this also recovers a medium whose count
    /// byte is corrupt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Medium` if the medium cannot be written.
    pub fn reinitialize(medium: M, config: &StoreConfig) -> StorageResult<Self> {
        let mut store = Self { medium };
        store.format()?;
        if config.seed_default_catalog {
            store.seed_default_catalog()?;
        }
        info!(count = store.count()?, "Product store reinitialized");
        Ok(store)
    }

    /// Reset the count to zero. Record bytes are left in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Medium` if the count byte cannot be written.
    pub fn format(&mut self) -> StorageResult<()> {
        self.medium.write_byte(COUNT, 0)?;
        Ok(())
    }

    fn seed_default_catalog(&mut self) -> StorageResult<()> {
        for product in DEFAULT_CATALOG {
            self.append(product)?;
        }
        info!(count = DEFAULT_CATALOG.len(), "Seeded default catalog");
        Ok(())
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Medium` if the count byte cannot be read.
    pub fn count(&self) -> StorageResult<u8> {
        Ok(self.medium.read_byte(COUNT)?)
    }

    /// Largest number of records this medium can hold.
    pub fn max_records(&self) -> usize {
        max_records(self.medium.capacity())
    }

    /// Read record `index`.
    ///
    /// Returns [`Product::zeroed`] when `index` is not below the count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Medium` if the medium cannot be read.
    pub fn read(&self, index: u8) -> StorageResult<Product> {
        if index >= self.count()? {
            return Ok(Product::zeroed());
        }
        self.read_slot(usize::from(index))
    }

    fn read_slot(&self, index: usize) -> StorageResult<Product> {
        let base = record_address(index);

        let mut sku = [0u8; SKU_LENGTH];
        self.medium.read_bytes(base + SKU_OFFSET as usize, &mut sku)?;
        let mut name = [0u8; NAME_LENGTH];
        self.medium.read_bytes(base + NAME_OFFSET as usize, &mut name)?;
        let hi = self.medium.read_byte(base + PRICE_HI_OFFSET as usize)?;
        let lo = self.medium.read_byte(base + PRICE_LO_OFFSET as usize)?;

        Ok(Product {
            sku: Sku::from_bytes(sku),
            name: ProductName::from_bytes(name),
            price: u16::from_be_bytes([hi, lo]),
        })
    }

    /// Append a record and return its index.
    ///
    /// The record bytes are written before the count, so an interrupted
    /// append leaves the count unchanged.
    ///
    /// # Errors
    ///
    /// - `StorageError::Validation` if the record is invalid or its SKU or
    ///   name is already stored; the count is unchanged.
    /// - `StorageError::Exhausted` if there is no room for another record.
    /// - `StorageError::Medium` on a medium failure.
    pub fn append(&mut self, product: Product) -> StorageResult<u8> {
        product.validate()?;
        if let Some(conflict) = self.find_conflict(&product)? {
            return Err(conflict.into());
        }

        let count = self.count()?;
        if usize::from(count) >= self.max_records() {
            warn!(count, "Product store full");
            return Err(StorageError::Exhausted {
                count,
                max_records: self.max_records(),
            });
        }

        let base = record_address(usize::from(count));
        let [hi, lo] = product.price_bytes();
        self.medium
            .write_bytes(base + SKU_OFFSET as usize, product.sku.as_bytes())?;
        self.medium
            .write_byte(base + SKU_OFFSET as usize + SKU_LENGTH, FIELD_SEPARATOR)?;
        self.medium
            .write_bytes(base + NAME_OFFSET as usize, product.name.as_bytes())?;
        self.medium
            .write_byte(base + NAME_OFFSET as usize + NAME_LENGTH, FIELD_SEPARATOR)?;
        self.medium.write_byte(base + PRICE_HI_OFFSET as usize, hi)?;
        self.medium.write_byte(base + PRICE_LO_OFFSET as usize, lo)?;

        self.medium.write_byte(COUNT, count + 1)?;

        debug!(index = count, sku = %product.sku, name = %product.name, "Stored product");
        Ok(count)
    }

    /// The uniqueness error `candidate` would raise, if any.
    ///
    /// SKU clashes are reported before name clashes, scanning in store
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Medium` if a record cannot be read.
    pub fn find_conflict(&self, candidate: &Product) -> StorageResult<Option<ValidationError>> {
        for stored in self.iter() {
            let stored = stored?;
            if !stored.conflicts_with(candidate) {
                continue;
            }
            if stored.sku == candidate.sku {
                return Ok(Some(ValidationError::DuplicateSku {
                    sku: candidate.sku.to_string(),
                }));
            }
            return Ok(Some(ValidationError::DuplicateName {
                name: candidate.name.to_string(),
            }));
        }
        Ok(None)
    }

    /// Iterate over the stored records in index order.
    ///
    /// A count that cannot be read yields a single error.
    pub fn iter(&self) -> impl Iterator<Item = StorageResult<Product>> + '_ {
        let (count, head) = match self.count() {
            Ok(count) => (usize::from(count), None),
            Err(err) => (0, Some(Err(err))),
        };
        head.into_iter()
            .chain((0..count).map(move |index| self.read_slot(index)))
    }

    /// Collect every stored record.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    pub fn products(&self) -> StorageResult<Vec<Product>> {
        self.iter().collect()
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn into_inner(self) -> M {
        self.medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitpos_hardware::mock::MemoryEeprom;
    use rstest::rstest;

    fn empty_store() -> ProductStore<MemoryEeprom> {
        ProductStore::open(MemoryEeprom::new(512), &StoreConfig::default()).unwrap()
    }

    fn product(sku: &str, name: &str, price: u16) -> Product {
        Product::new(sku, name, price).unwrap()
    }

    #[test]
    fn test_erased_medium_formatted() {
        let store = empty_store();
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.medium().as_bytes()[0], 0);
    }

    #[test]
    fn test_seeded_catalog() {
        let config = StoreConfig::default().seed_default_catalog(true);
        let store = ProductStore::open(MemoryEeprom::new(512), &config).unwrap();

        assert_eq!(store.count().unwrap(), 10);
        assert_eq!(store.read(3).unwrap(), product("000003", "STRAWBERRY", 59));
        assert_eq!(store.read(9).unwrap(), product("000009", "AVOCADO", 69));
    }

    #[test]
    fn test_existing_store_not_reformatted() {
        let mut store = empty_store();
        store.append(product("000000", "APPLE", 38)).unwrap();

        let config = StoreConfig::default().seed_default_catalog(true);
        let reopened = ProductStore::open(store.into_inner(), &config).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_record_layout() {
        let mut store = empty_store();
        store.append(product("000003", "STRAWBERRY", 0x0123)).unwrap();

        let bytes = store.medium().as_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..7], b"000003");
        assert_eq!(bytes[7], 0x00);
        assert_eq!(&bytes[8..18], b"STRAWBERRY");
        assert_eq!(bytes[18], 0x00);
        assert_eq!(bytes[19], 0x01);
        assert_eq!(bytes[20], 0x23);
    }

    #[test]
    fn test_append_returns_index() {
        let mut store = empty_store();
        assert_eq!(store.append(product("000000", "APPLE", 38)).unwrap(), 0);
        assert_eq!(store.append(product("000001", "ORANGE", 19)).unwrap(), 1);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[rstest]
    #[case(product("000000", "PEAR", 10), " Existing SKU ")]
    #[case(product("000005", "APPLE", 10), "Existing  Name")]
    fn test_duplicates_rejected(#[case] candidate: Product, #[case] message: &str) {
        let mut store = empty_store();
        store.append(product("000000", "APPLE", 38)).unwrap();

        let err = store.append(candidate).unwrap_err();
        assert_eq!(err.display_message(), Some(message));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let mut store = empty_store();
        let mut candidate = product("000000", "APPLE", 1);
        candidate.price = 0;

        let err = store.append(candidate).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Validation(ValidationError::InvalidPrice { price: 0 })
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_read_past_count_is_zeroed() {
        let store = empty_store();
        assert_eq!(store.read(0).unwrap(), Product::zeroed());
        assert_eq!(store.read(255).unwrap(), Product::zeroed());
    }

    #[test]
    fn test_exhausted() {
        // Room for exactly two records.
        let mut store =
            ProductStore::open(MemoryEeprom::new(41), &StoreConfig::default()).unwrap();
        assert_eq!(store.max_records(), 2);

        store.append(product("000000", "APPLE", 38)).unwrap();
        store.append(product("000001", "ORANGE", 19)).unwrap();
        let err = store.append(product("000002", "LEMON", 42)).unwrap_err();

        assert!(matches!(err, StorageError::Exhausted { count: 2, .. }));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_max_records_capped_by_count_byte() {
        assert_eq!(max_records(512), 25);
        assert_eq!(max_records(64 * 1024), 255);
        assert_eq!(max_records(0), 0);
    }

    #[test]
    fn test_corrupt_count_rejected() {
        let mut image = vec![0u8; 41];
        image[0] = 9;
        let err = ProductStore::open(MemoryEeprom::from_bytes(image), &StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { count: 9, .. }));
    }

    #[test]
    fn test_reinitialize_recovers_corrupt_count() {
        let mut image = vec![0u8; 512];
        image[0] = 200;
        let config = StoreConfig::default().seed_default_catalog(true);

        let store = ProductStore::reinitialize(MemoryEeprom::from_bytes(image), &config).unwrap();
        assert_eq!(store.count().unwrap() as usize, DEFAULT_CATALOG.len());
        assert_eq!(store.read(0).unwrap(), DEFAULT_CATALOG[0]);
    }

    #[test]
    fn test_find_conflict_in_store_order() {
        let mut store = empty_store();
        store.append(product("000004", "RASPBERRY", 29)).unwrap();
        store.append(product("000005", "MANGO", 40)).unwrap();

        // Both fields of the first record match: the SKU is reported.
        assert!(matches!(
            store.find_conflict(&product("000004", "RASPBERRY", 1)).unwrap(),
            Some(ValidationError::DuplicateSku { .. })
        ));
        // The name matches an earlier record than the SKU does.
        assert!(matches!(
            store.find_conflict(&product("000005", "RASPBERRY", 1)).unwrap(),
            Some(ValidationError::DuplicateName { .. })
        ));
        assert!(store.find_conflict(&product("000006", "PAPAYA", 1)).unwrap().is_none());
    }

    #[test]
    fn test_products_in_order() {
        let config = StoreConfig::default().seed_default_catalog(true);
        let store = ProductStore::open(MemoryEeprom::new(512), &config).unwrap();

        let products = store.products().unwrap();
        assert_eq!(products, DEFAULT_CATALOG.to_vec());
    }
}
