//! Handshaked record transfer and terminator-delimited reads.
//!
//! A record always moves the same way, whichever node sends it:
//!
//! ```text
//! receiver                     sender
//!    │ ──────── 0x01 ready ──────> │
//!    │ <─── sku 0 name 0 hi lo CR ─ │
//!    │   validate                   │
//!    │ ──── 0x01 ack / 0x00 nak ──> │
//! ```
//!
//! There is no retry: a rejected record is simply dropped by both ends.

use bytes::{Bytes, BytesMut};
use fruitpos_core::{
    Product,
    constants::{ACK_BYTE, NAK_BYTE, READY_BYTE},
};
use fruitpos_hardware::LinkTransport;
use fruitpos_protocol::{RecordCodec, decode_record, encode_record};
use std::fmt::Display;
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

use crate::config::LinkConfig;
use crate::error::LinkResult;

/// Outcome of receiving a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// Record parsed, validated and acknowledged.
    Accepted(Product),

    /// Record refused; a negative acknowledgment was sent.
    Rejected { reason: String },
}

impl Received {
    pub fn accepted(self) -> Option<Product> {
        match self {
            Received::Accepted(product) => Some(product),
            Received::Rejected { .. } => None,
        }
    }
}

/// Read bytes until the line terminator and return the payload before it.
///
/// # Errors
///
/// - `LinkError::Hardware` if the link fails or the configured timeout
///   expires between two bytes.
/// - `LinkError::Protocol` with `FrameTooLarge` once more than
///   `max_frame_size` bytes arrive without a terminator. The bytes read so
///   far are discarded.
pub async fn read_frame<L: LinkTransport>(link: &mut L, config: &LinkConfig) -> LinkResult<Bytes> {
    let mut codec = RecordCodec::with_max_frame_size(config.max_frame_size);
    let mut buffer = BytesMut::with_capacity(config.max_frame_size + 1);

    loop {
        let byte = link.receive_within(config.timeout).await?;
        buffer.extend_from_slice(&[byte]);
        if let Some(payload) = codec.decode(&mut buffer)? {
            trace!(len = payload.len(), "Frame received");
            return Ok(payload);
        }
    }
}

/// Send `product` to a peer that is about to receive it.
///
/// Waits for the ready byte, writes the record and returns the peer's
/// acknowledgment.
///
/// # Errors
///
/// Returns `LinkError::Hardware` if the link fails or the peer stays silent
/// past the configured timeout.
pub async fn send_record<L: LinkTransport>(
    link: &mut L,
    product: &Product,
    config: &LinkConfig,
) -> LinkResult<bool> {
    let ready = link.receive_within(config.timeout).await?;
    if ready != READY_BYTE {
        debug!(byte = ready, "Unexpected ready byte, sending anyway");
    }

    if product.price_collides_with_terminator() {
        warn!(
            sku = %product.sku,
            price = product.price,
            "Price byte equals the line terminator; the peer will see a truncated record"
        );
    }
    link.send_all(&encode_record(product)).await?;

    let ack = link.receive_within(config.timeout).await?;
    trace!(sku = %product.sku, ack, "Record sent");
    Ok(ack == ACK_BYTE)
}

/// Receive one record from the peer.
///
/// Sends the ready byte, reads the record and acknowledges it only if it
/// parses, passes [`Product::validate`] and is accepted by `accept`. The
/// `accept` hook runs before the acknowledgment is sent, so a record the
/// caller fails to persist is reported to the peer as rejected.
///
/// # Errors
///
/// Returns `LinkError::Hardware` if the link fails or times out. Malformed
/// and refused records are not errors; they yield [`Received::Rejected`].
pub async fn receive_record<L, F, E>(
    link: &mut L,
    config: &LinkConfig,
    accept: F,
) -> LinkResult<Received>
where
    L: LinkTransport,
    F: FnOnce(&Product) -> Result<(), E>,
    E: Display,
{
    link.send(READY_BYTE).await?;

    let outcome = match read_frame(link, config).await {
        Ok(payload) => check(&payload, accept),
        Err(crate::LinkError::Protocol(err)) => Err(err.to_string()),
        Err(err) => return Err(err),
    };

    match outcome {
        Ok(product) => {
            link.send(ACK_BYTE).await?;
            trace!(sku = %product.sku, "Record accepted");
            Ok(Received::Accepted(product))
        }
        Err(reason) => {
            link.send(NAK_BYTE).await?;
            warn!(%reason, "Record rejected");
            Ok(Received::Rejected { reason })
        }
    }
}

fn check<F, E>(payload: &[u8], accept: F) -> Result<Product, String>
where
    F: FnOnce(&Product) -> Result<(), E>,
    E: Display,
{
    let product = decode_record(payload).map_err(|e| e.to_string())?;
    product.validate().map_err(|e| e.to_string())?;
    accept(&product).map_err(|e| e.to_string())?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitpos_hardware::mock::MockLink;
    use std::convert::Infallible;
    use std::time::Duration;

    fn apple() -> Product {
        Product::new("000000", "APPLE", 38).unwrap()
    }

    fn accept_all(_: &Product) -> Result<(), Infallible> {
        Ok(())
    }

    #[tokio::test]
    async fn test_record_transfer_accepted() {
        let (mut a, mut b) = MockLink::pair();
        let config = LinkConfig::default();

        let receiver =
            tokio::spawn(async move { receive_record(&mut b, &config, accept_all).await });

        assert!(send_record(&mut a, &apple(), &config).await.unwrap());
        assert_eq!(
            receiver.await.unwrap().unwrap(),
            Received::Accepted(apple())
        );
    }

    #[tokio::test]
    async fn test_record_transfer_refused_by_hook() {
        let (mut a, mut b) = MockLink::pair();
        let config = LinkConfig::default();

        let receiver = tokio::spawn(async move {
            receive_record(&mut b, &config, |_: &Product| Err("store full")).await
        });

        assert!(!send_record(&mut a, &apple(), &config).await.unwrap());
        assert_eq!(
            receiver.await.unwrap().unwrap(),
            Received::Rejected {
                reason: "store full".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_price_nak() {
        let (mut a, mut b) = MockLink::pair();
        let config = LinkConfig::default();
        let mut free = apple();
        free.price = 0;

        let receiver =
            tokio::spawn(async move { receive_record(&mut b, &config, accept_all).await });

        assert!(!send_record(&mut a, &free, &config).await.unwrap());
        assert!(receiver.await.unwrap().unwrap().accepted().is_none());
    }

    #[tokio::test]
    async fn test_zeroed_record_nak() {
        let (mut a, mut b) = MockLink::pair();
        let config = LinkConfig::default();

        let receiver =
            tokio::spawn(async move { receive_record(&mut b, &config, accept_all).await });

        assert!(!send_record(&mut a, &Product::zeroed(), &config).await.unwrap());
        let outcome = receiver.await.unwrap().unwrap();
        assert!(matches!(outcome, Received::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_read_frame_strips_terminator() {
        let (mut a, mut b) = MockLink::pair();
        a.send_all(b"Come Back Soon\0\r").await.unwrap();

        let payload = read_frame(&mut b, &LinkConfig::default()).await.unwrap();
        assert_eq!(&payload[..], b"Come Back Soon\0");
    }

    #[tokio::test]
    async fn test_read_frame_overflow() {
        let (mut a, mut b) = MockLink::pair();
        a.send_all(&[b'X'; 20]).await.unwrap();

        let config = LinkConfig::default().with_max_frame_size(16);
        let err = read_frame(&mut b, &config).await.unwrap_err();
        assert!(matches!(
            err,
            crate::LinkError::Protocol(fruitpos_core::Error::FrameTooLarge { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_times_out() {
        let (_a, mut b) = MockLink::pair();
        let config = LinkConfig::default().with_timeout(Duration::from_millis(300));

        let err = send_record(&mut b, &apple(), &config).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
