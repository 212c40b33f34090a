use crate::{
    constants::{
        CANCELLED_PRICE, LINE_TERMINATOR, MAX_PRICE, MIN_PRICE, NAME_LENGTH, SKU_LENGTH,
    },
    error::{Result, ValidationError},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Render raw record bytes for a text display, blanking control characters.
fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { ' ' })
        .collect()
}

/// Product SKU: six ASCII digits, zero-padded.
///
/// The bytes are kept exactly as stored or received, so a record read from
/// an uninitialized slot can still be represented. Use [`Sku::new`] or
/// [`Sku::is_valid`] when the digits matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku([u8; SKU_LENGTH]);

impl Sku {
    /// All-zero SKU used by a fresh edit session.
    pub const ZERO: Sku = Sku([b'0'; SKU_LENGTH]);

    /// Create a SKU from a string of exactly six ASCII digits.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidSku` if the length is not 6 or a
    /// character is not a digit.
    pub fn new(digits: &str) -> Result<Self> {
        let bytes: [u8; SKU_LENGTH] =
            digits
                .as_bytes()
                .try_into()
                .map_err(|_| ValidationError::InvalidSku {
                    reason: format!("expected {SKU_LENGTH} digits, got {}", digits.len()),
                })?;
        let sku = Sku(bytes);
        if !sku.is_valid() {
            return Err(ValidationError::InvalidSku {
                reason: format!("'{digits}' is not numeric"),
            }
            .into());
        }
        Ok(sku)
    }

    /// Wrap raw bytes without validation (wire and storage paths).
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SKU_LENGTH]) -> Self {
        Sku(bytes)
    }

    /// Zero-padded SKU for a numeric value (mod 1,000,000).
    ///
    /// ```
    /// use fruitpos_core::Sku;
    ///
    /// assert_eq!(Sku::from_number(42).to_string(), "000042");
    /// ```
    #[must_use]
    pub fn from_number(value: u32) -> Self {
        let mut bytes = [b'0'; SKU_LENGTH];
        let mut rest = value;
        for slot in bytes.iter_mut().rev() {
            *slot = b'0' + (rest % 10) as u8;
            rest /= 10;
        }
        Sku(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SKU_LENGTH] {
        &self.0
    }

    /// Returns `true` if every byte is an ASCII digit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(u8::is_ascii_digit)
    }

    /// Shift the digits one place left and insert `digit` at the right.
    pub fn shift_in(&mut self, digit: u8) {
        debug_assert!(digit <= 9, "digit must be 0-9");
        self.0.copy_within(1.., 0);
        self.0[SKU_LENGTH - 1] = b'0' + digit % 10;
    }

    /// Add one with carry; `999999` wraps to `000000`.
    pub fn increment(&mut self) {
        for slot in self.0.iter_mut().rev() {
            if *slot >= b'9' {
                *slot = b'0';
            } else {
                *slot += 1;
                return;
            }
        }
    }

    /// Subtract one with borrow; `000000` wraps to `999999`.
    ///
    /// The wraparound mirrors the fixed-width digit arithmetic of the
    /// deployed firmware and is kept for compatibility.
    pub fn decrement(&mut self) {
        for slot in self.0.iter_mut().rev() {
            if *slot <= b'0' {
                *slot = b'9';
            } else {
                *slot -= 1;
                return;
            }
        }
    }

    /// Reset every digit to `0`.
    pub fn clear(&mut self) {
        *self = Self::ZERO;
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", printable(&self.0))
    }
}

impl std::str::FromStr for Sku {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Sku::new(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self> {
        Sku::new(&value)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.to_string()
    }
}

/// Product name: ten printable ASCII characters, space padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName([u8; NAME_LENGTH]);

impl ProductName {
    /// Name made of spaces only, the starting point of an edit session.
    pub const BLANK: ProductName = ProductName([b' '; NAME_LENGTH]);

    /// Create a name, padding with spaces to ten characters.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidName` if the text is longer than ten
    /// characters or contains anything other than printable ASCII.
    ///
    /// ```
    /// use fruitpos_core::ProductName;
    ///
    /// let name = ProductName::new("APPLE").unwrap();
    /// assert_eq!(name.to_string(), "APPLE     ");
    /// ```
    pub fn new(text: &str) -> Result<Self> {
        if text.len() > NAME_LENGTH {
            return Err(ValidationError::InvalidName {
                reason: format!("at most {NAME_LENGTH} characters, got {}", text.len()),
            }
            .into());
        }
        let mut bytes = [b' '; NAME_LENGTH];
        bytes[..text.len()].copy_from_slice(text.as_bytes());
        let name = ProductName(bytes);
        if !name.is_valid() {
            return Err(ValidationError::InvalidName {
                reason: format!("'{text}' contains non-printable characters"),
            }
            .into());
        }
        Ok(name)
    }

    /// Wrap raw bytes without validation (wire and storage paths).
    #[must_use]
    pub const fn from_bytes(bytes: [u8; NAME_LENGTH]) -> Self {
        ProductName(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; NAME_LENGTH] {
        &self.0
    }

    /// Returns `true` if every byte is printable ASCII.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|b| (0x20..=0x7E).contains(b))
    }

    /// Character at `position`, or `None` past the end.
    #[must_use]
    pub fn char_at(&self, position: usize) -> Option<u8> {
        self.0.get(position).copied()
    }

    /// Overwrite the character at `position`; out of range is ignored.
    pub fn set_char(&mut self, position: usize, ch: u8) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = ch;
        }
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", printable(&self.0))
    }
}

impl TryFrom<String> for ProductName {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self> {
        ProductName::new(&value)
    }
}

impl From<ProductName> for String {
    fn from(name: ProductName) -> Self {
        name.to_string()
    }
}

/// One product record as stored by the slave and exchanged over the link.
///
/// The price is kept as the raw 16-bit wire value so that the zeroed record
/// returned for an out-of-range read and the [`CANCELLED_PRICE`] sentinel
/// produced by the editor are both representable. Call
/// [`validate`](Product::validate) before trusting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Product {
    pub sku: Sku,
    pub name: ProductName,
    pub price: u16,
}

impl Product {
    /// Create a validated product.
    ///
    /// # Errors
    /// Returns a validation error if any field is out of its domain.
    ///
    /// ```
    /// use fruitpos_core::Product;
    ///
    /// let apple = Product::new("000000", "APPLE", 38).unwrap();
    /// assert_eq!(apple.name.to_string(), "APPLE     ");
    /// assert!(Product::new("000000", "APPLE", 0).is_err());
    /// ```
    pub fn new(sku: &str, name: &str, price: u16) -> Result<Self> {
        let product = Product {
            sku: Sku::new(sku)?,
            name: ProductName::new(name)?,
            price,
        };
        product.validate()?;
        Ok(product)
    }

    /// The zeroed record returned for reads past the end of the store.
    #[must_use]
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Check field lengths, characters and the 1-9999 price range.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.sku.is_valid() {
            return Err(ValidationError::InvalidSku {
                reason: format!("'{}' is not numeric", self.sku),
            });
        }
        if !self.name.is_valid() {
            return Err(ValidationError::InvalidName {
                reason: "contains non-printable characters".to_string(),
            });
        }
        if !(MIN_PRICE..=MAX_PRICE).contains(&self.price) {
            return Err(ValidationError::InvalidPrice { price: self.price });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns `true` if this candidate carries the cancellation sentinel.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.price == CANCELLED_PRICE
    }

    /// Price as (high, low) bytes in wire and storage order.
    #[must_use]
    pub fn price_bytes(&self) -> [u8; 2] {
        self.price.to_be_bytes()
    }

    /// Returns `true` if a price byte equals the line terminator.
    ///
    /// Such a record cannot be framed unambiguously: the receiver stops at
    /// the first `0x0D` and the remaining bytes stay on the link.
    #[must_use]
    pub fn price_collides_with_terminator(&self) -> bool {
        self.price_bytes().contains(&LINE_TERMINATOR)
    }

    /// Returns `true` if either identifying field matches `other`.
    #[must_use]
    pub fn conflicts_with(&self, other: &Product) -> bool {
        self.sku == other.sku || self.name == other.name
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ${:04}", self.sku, self.name, self.price)
    }
}
