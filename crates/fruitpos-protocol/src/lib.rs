//! Wire protocol shared by the fruitpos master and slave nodes.
//!
//! The link carries single-byte requests ([`CommandCode`]) followed, for some
//! requests, by a terminator-delimited payload. [`record`] holds the byte
//! layout of a product record and a display message; [`RecordCodec`] frames
//! those payloads for `tokio_util` streams.

pub mod codec;
pub mod commands;
pub mod record;

pub use codec::RecordCodec;
pub use commands::CommandCode;
pub use record::{decode_record, decode_text, encode_record, encode_text};
