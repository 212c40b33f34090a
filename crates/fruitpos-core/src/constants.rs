//! Core constants for the fruitpos master/slave link and product store.
//!
//! This module centralizes every fixed value shared by the two nodes: field
//! widths of a product record, wire framing bytes, the persistent record
//! layout, and the numeric bounds enforced by the sale workflow.
//!
//! # Record Wire Format
//!
//! A product record travels over the link as:
//!
//! ```text
//! sku[6] 0x00 name[10] 0x00 price_hi price_lo 0x0D
//! ```
//!
//! There is no checksum and no length prefix. The receiver reads until the
//! first [`LINE_TERMINATOR`], so a price byte equal to `0x0D` truncates the
//! frame. Modifying these values breaks compatibility with deployed nodes.
//!
//! # Persistent Layout
//!
//! | Offset | Content |
//! |--------|---------|
//! | 0 | record count (u8) |
//! | `1 + 20*i + 0..6` | SKU digits |
//! | `1 + 20*i + 6` | `0x00` |
//! | `1 + 20*i + 7..17` | name |
//! | `1 + 20*i + 17` | `0x00` |
//! | `1 + 20*i + 18` | price high byte |
//! | `1 + 20*i + 19` | price low byte |

// ============================================================================
// Product Fields
// ============================================================================

/// Number of digits in a product SKU.
pub const SKU_LENGTH: usize = 6;

/// Number of characters in a product name (space padded).
pub const NAME_LENGTH: usize = 10;

/// Lowest price accepted for a stored product.
pub const MIN_PRICE: u16 = 1;

/// Highest price accepted for a stored product.
pub const MAX_PRICE: u16 = 9999;

/// Modulus applied by the editor's price increment/decrement.
pub const PRICE_MODULUS: u16 = 10_000;

/// Price sentinel marking an edit session that was cancelled.
///
/// Out of the valid price domain, so a cancelled candidate can never be
/// mistaken for a storable record.
pub const CANCELLED_PRICE: u16 = 0xFFFF;

// ============================================================================
// Link Framing
// ============================================================================

/// Separator written after the SKU and after the name.
pub const FIELD_SEPARATOR: u8 = 0x00;

/// Terminator closing every record and text payload (carriage return).
pub const LINE_TERMINATOR: u8 = 0x0D;

/// Byte sent by a receiver to signal it is ready for a payload.
pub const READY_BYTE: u8 = 0x01;

/// Acknowledgment byte for an accepted payload.
pub const ACK_BYTE: u8 = 0x01;

/// Acknowledgment byte for a rejected payload.
pub const NAK_BYTE: u8 = 0x00;

/// Size of a serialized record on the wire, terminator included.
pub const RECORD_FRAME_SIZE: usize = SKU_LENGTH + 1 + NAME_LENGTH + 1 + 2 + 1;

/// Default upper bound for a single payload before the receiver gives up.
///
/// The original firmware read into a 32-byte buffer; a frame this long
/// without a terminator can only come from a desynchronized stream.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64;

// ============================================================================
// Persistent Layout
// ============================================================================

/// Address of the record count byte.
pub const COUNT_ADDRESS: u16 = 0;

/// Address of the first record.
pub const RECORD_BASE_ADDRESS: u16 = 1;

/// Bytes reserved per record in the persistent medium.
pub const RECORD_SIZE: u16 = 20;

/// Offset of the SKU inside a record.
pub const SKU_OFFSET: u16 = 0;

/// Offset of the name inside a record.
pub const NAME_OFFSET: u16 = 7;

/// Offset of the price high byte inside a record.
pub const PRICE_HI_OFFSET: u16 = 18;

/// Offset of the price low byte inside a record.
pub const PRICE_LO_OFFSET: u16 = 19;

/// Value of an erased EEPROM cell.
pub const ERASED_BYTE: u8 = 0xFF;

/// Maximum number of records addressable by the 8-bit count.
pub const MAX_RECORDS: usize = u8::MAX as usize;

/// Capacity of the 24C04 EEPROM fitted to the slave board (bytes).
pub const DEFAULT_MEDIUM_CAPACITY: usize = 512;

// ============================================================================
// Sale Bounds
// ============================================================================

/// Exclusive upper bound of a sale total.
pub const MAX_TOTAL: u32 = 50_000;

/// Largest quantity the two-digit quantity entry can hold.
pub const MAX_QUANTITY: u8 = 99;

/// Threshold separating positive change from unsigned wraparound.
///
/// `paid - total` is computed in 16-bit unsigned arithmetic; a result at or
/// above this value means the customer paid less than the total.
pub const CHANGE_WRAP_THRESHOLD: u16 = 0x8000;
