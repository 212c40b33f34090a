//! Byte layout of record and text payloads.
//!
//! ```text
//! record: sku[6] 0x00 name[10] 0x00 price_hi price_lo 0x0D
//! text:   ascii...      0x00                         0x0D
//! ```
//!
//! Decoding works on a payload with the terminator already stripped (see
//! [`RecordCodec`](crate::RecordCodec)). Field boundaries are found from the
//! separators, never from fixed offsets, which is how the slave firmware
//! reads them. A payload that does not split into exactly six SKU bytes, ten
//! name bytes and two price bytes is a desync.

use fruitpos_core::{
    Error, Product, ProductName, Result, Sku,
    constants::{FIELD_SEPARATOR, LINE_TERMINATOR, NAME_LENGTH, RECORD_FRAME_SIZE, SKU_LENGTH},
};

/// Serialize a record, terminator included.
///
/// Bytes are written unchanged even when a price byte equals the terminator;
/// callers that care check [`Product::price_collides_with_terminator`].
///
/// ```
/// use fruitpos_core::Product;
/// use fruitpos_protocol::encode_record;
///
/// let lemon = Product::new("000002", "LEMON", 42).unwrap();
/// let bytes = encode_record(&lemon);
/// assert_eq!(&bytes[..7], b"000002\0");
/// assert_eq!(&bytes[18..], &[0x00, 42, 0x0D]);
/// ```
#[must_use]
pub fn encode_record(product: &Product) -> Vec<u8> {
    let mut out = Vec::with_capacity(RECORD_FRAME_SIZE);
    out.extend_from_slice(product.sku.as_bytes());
    out.push(FIELD_SEPARATOR);
    out.extend_from_slice(product.name.as_bytes());
    out.push(FIELD_SEPARATOR);
    out.extend_from_slice(&product.price_bytes());
    out.push(LINE_TERMINATOR);
    out
}

/// Parse a record payload (terminator stripped).
///
/// Field content is not validated here; that is the receiver's job once
/// the framing is known to be sound.
///
/// # Errors
/// Returns `Error::Desync` if a separator is missing or a field has the
/// wrong length.
pub fn decode_record(payload: &[u8]) -> Result<Product> {
    let (sku, rest) = split_field(payload, "SKU")?;
    let (name, price) = split_field(rest, "name")?;

    let sku: [u8; SKU_LENGTH] = sku.try_into().map_err(|_| {
        Error::desync(format!("SKU field is {} bytes, expected {SKU_LENGTH}", sku.len()))
    })?;
    let name: [u8; NAME_LENGTH] = name.try_into().map_err(|_| {
        Error::desync(format!(
            "name field is {} bytes, expected {NAME_LENGTH}",
            name.len()
        ))
    })?;
    let price: [u8; 2] = price.try_into().map_err(|_| {
        Error::desync(format!("price field is {} bytes, expected 2", price.len()))
    })?;

    Ok(Product {
        sku: Sku::from_bytes(sku),
        name: ProductName::from_bytes(name),
        price: u16::from_be_bytes(price),
    })
}

fn split_field<'a>(bytes: &'a [u8], field: &str) -> Result<(&'a [u8], &'a [u8])> {
    let end = bytes
        .iter()
        .position(|&b| b == FIELD_SEPARATOR)
        .ok_or_else(|| Error::desync(format!("missing separator after {field}")))?;
    Ok((&bytes[..end], &bytes[end + 1..]))
}

/// Serialize a display message, separator and terminator included.
///
/// # Errors
/// Returns `Error::InvalidMessage` if the text is not ASCII or contains a
/// separator or terminator byte, either of which would end the frame early.
pub fn encode_text(text: &str) -> Result<Vec<u8>> {
    if !text.is_ascii() {
        return Err(Error::InvalidMessage {
            message: "text must be ASCII".to_string(),
        });
    }
    if text
        .bytes()
        .any(|b| b == FIELD_SEPARATOR || b == LINE_TERMINATOR)
    {
        return Err(Error::InvalidMessage {
            message: "text contains a framing byte".to_string(),
        });
    }

    let mut out = Vec::with_capacity(text.len() + 2);
    out.extend_from_slice(text.as_bytes());
    out.push(FIELD_SEPARATOR);
    out.push(LINE_TERMINATOR);
    Ok(out)
}

/// Parse a display message payload (terminator stripped).
///
/// Everything from the first separator on is ignored; non-ASCII bytes are
/// replaced so a corrupted message still renders.
#[must_use]
pub fn decode_text(payload: &[u8]) -> String {
    let end = payload
        .iter()
        .position(|&b| b == FIELD_SEPARATOR)
        .unwrap_or(payload.len());
    payload[..end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}
