//! Tokio codec for terminator-delimited payloads.
//!
//! The link has no start marker, no length and no checksum: a payload is
//! everything up to the next `0x0D`. [`RecordCodec`] implements exactly that
//! framing so both nodes, and tests driving a `tokio::io::duplex`, share one
//! definition of where a frame ends.
//!
//! # Framing Limits
//!
//! A desynchronized stream can go on forever without a terminator. The
//! decoder gives up once `max_frame_size` bytes have accumulated, discards
//! them and reports [`Error::FrameTooLarge`]. The success path is identical
//! to the unbounded reader of the original firmware.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use fruitpos_core::Product;
//! use fruitpos_protocol::{RecordCodec, decode_record};
//! use futures::{SinkExt, StreamExt};
//! use tokio_util::codec::Framed;
//!
//! # async fn example() -> fruitpos_core::Result<()> {
//! let (a, b) = tokio::io::duplex(64);
//! let mut tx = Framed::new(a, RecordCodec::new());
//! let mut rx = Framed::new(b, RecordCodec::new());
//!
//! let apple = Product::new("000000", "APPLE", 38)?;
//! tx.send(&apple).await?;
//!
//! if let Some(Ok(payload)) = rx.next().await {
//!     assert_eq!(decode_record(&payload)?, apple);
//! }
//! # Ok(())
//! # }
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::record::{encode_record, encode_text};
use fruitpos_core::{
    Error, Product, Result,
    constants::{DEFAULT_MAX_FRAME_SIZE, LINE_TERMINATOR},
};

/// Codec for record and message payloads.
///
/// Decoded items are raw payloads with the terminator removed; feed them to
/// [`decode_record`](crate::decode_record) or
/// [`decode_text`](crate::decode_text) depending on the request being served.
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec {
    /// Maximum payload length, terminator excluded.
    max_frame_size: usize,
}

impl RecordCodec {
    /// Create a codec with the default 64-byte limit.
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom payload limit.
    ///
    /// ```
    /// use fruitpos_protocol::RecordCodec;
    ///
    /// let codec = RecordCodec::with_max_frame_size(32);
    /// assert_eq!(codec.max_frame_size(), 32);
    /// ```
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RecordCodec {
    type Item = Bytes;
    type Error = Error;

    /// Extract the next payload, if a terminator has arrived.
    ///
    /// # Errors
    ///
    /// Returns `Error::FrameTooLarge` when more than `max_frame_size` bytes
    /// precede the terminator (or have accumulated without one). The
    /// offending bytes are consumed so the next call starts fresh.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match src.iter().position(|&b| b == LINE_TERMINATOR) {
            Some(end) => {
                let mut frame = src.split_to(end + 1);
                frame.truncate(end);
                if end > self.max_frame_size {
                    return Err(Error::FrameTooLarge {
                        size: end,
                        max_size: self.max_frame_size,
                    });
                }
                Ok(Some(frame.freeze()))
            }
            None if src.len() > self.max_frame_size => {
                let size = src.len();
                src.clear();
                Err(Error::FrameTooLarge {
                    size,
                    max_size: self.max_frame_size,
                })
            }
            None => Ok(None),
        }
    }
}

impl Encoder<&Product> for RecordCodec {
    type Error = Error;

    fn encode(&mut self, item: &Product, dst: &mut BytesMut) -> Result<()> {
        dst.put_slice(&encode_record(item));
        Ok(())
    }
}

impl Encoder<&str> for RecordCodec {
    type Error = Error;

    /// # Errors
    ///
    /// Returns `Error::InvalidMessage` for text the link cannot carry and
    /// `Error::FrameTooLarge` for text the receiver would cut off.
    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<()> {
        let bytes = encode_text(item)?;
        // Payload = text + separator; the terminator is not counted.
        let size = bytes.len() - 1;
        if size > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size,
                max_size: self.max_frame_size,
            });
        }
        dst.put_slice(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_record, decode_text};

    #[test]
    fn test_codec_default() {
        assert_eq!(RecordCodec::default().max_frame_size(), DEFAULT_MAX_FRAME_SIZE);
    }

    #[test]
    fn test_decode_partial_frame() {
        let mut codec = RecordCodec::new();
        let mut buffer = BytesMut::from(&b"000001\0ORA"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn test_decode_complete_record() {
        let mut codec = RecordCodec::new();
        let orange = Product::new("000001", "ORANGE", 19).unwrap();

        let mut buffer = BytesMut::new();
        codec.encode(&orange, &mut buffer).unwrap();

        let payload = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(decode_record(&payload).unwrap(), orange);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_two_frames_in_buffer() {
        let mut codec = RecordCodec::new();
        let mut buffer = BytesMut::from(&b"HELLO\0\rWORLD\0\r"[..]);

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(decode_text(&first), "HELLO");
        assert_eq!(decode_text(&second), "WORLD");
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_terminator_in_price_splits_frame() {
        let mut codec = RecordCodec::new();
        let product = Product::new("000001", "LEMON", 13).unwrap();
        assert!(product.price_collides_with_terminator());

        let mut buffer = BytesMut::new();
        codec.encode(&product, &mut buffer).unwrap();

        // Frame ends at the price byte; the real terminator is left behind.
        let payload = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(decode_record(&payload).is_err());
        assert_eq!(&buffer[..], &[0x0D]);
    }

    #[test]
    fn test_decode_without_terminator_overflows() {
        let mut codec = RecordCodec::with_max_frame_size(8);
        let mut buffer = BytesMut::from(&b"0123456789"[..]);

        let err = codec.decode(&mut buffer).unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { size: 10, max_size: 8 }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_oversize_frame_with_terminator() {
        let mut codec = RecordCodec::with_max_frame_size(4);
        let mut buffer = BytesMut::from(&b"TOOLONG\rOK\r"[..]);

        assert!(codec.decode(&mut buffer).is_err());
        let next = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&next[..], b"OK");
    }

    #[test]
    fn test_encode_text_limit() {
        let mut codec = RecordCodec::with_max_frame_size(5);
        let mut buffer = BytesMut::new();

        codec.encode("ABCD", &mut buffer).unwrap();
        assert_eq!(&buffer[..], b"ABCD\0\r");

        let err = codec.encode("ABCDE", &mut buffer).unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { .. }));
    }
}
