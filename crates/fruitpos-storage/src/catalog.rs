//! Factory catalog loaded onto an erased store on request.

use fruitpos_core::{Product, ProductName, Sku};

const fn product(sku: &[u8; 6], name: &[u8; 10], price: u16) -> Product {
    Product {
        sku: Sku::from_bytes(*sku),
        name: ProductName::from_bytes(*name),
        price,
    }
}

/// The ten fruits the slave firmware ships with, in store order.
pub const DEFAULT_CATALOG: [Product; 10] = [
    product(b"000000", b"APPLE     ", 38),
    product(b"000001", b"ORANGE    ", 19),
    product(b"000002", b"LEMON     ", 42),
    product(b"000003", b"STRAWBERRY", 59),
    product(b"000004", b"RASPBERRY ", 29),
    product(b"000005", b"MANGO     ", 32),
    product(b"000006", b"BANANA    ", 19),
    product(b"000007", b"WATERMELON", 15),
    product(b"000008", b"MELON     ", 26),
    product(b"000009", b"AVOCADO   ", 69),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_valid_and_unique() {
        let skus: HashSet<_> = DEFAULT_CATALOG.iter().map(|p| p.sku).collect();
        let names: HashSet<_> = DEFAULT_CATALOG.iter().map(|p| p.name).collect();

        assert_eq!(skus.len(), DEFAULT_CATALOG.len());
        assert_eq!(names.len(), DEFAULT_CATALOG.len());
        assert!(DEFAULT_CATALOG.iter().all(Product::is_valid));
    }

    #[test]
    fn test_catalog_prices_frame_cleanly() {
        assert!(
            DEFAULT_CATALOG
                .iter()
                .all(|p| !p.price_collides_with_terminator())
        );
    }
}
