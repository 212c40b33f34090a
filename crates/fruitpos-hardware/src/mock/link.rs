//! In-memory link pair.
//!
//! [`MockLink::pair`] returns two connected ends, one per node. Bytes sent
//! on one end arrive in order on the other, like a null-modem cable.

use tokio::sync::mpsc;

use crate::{HardwareError, Result, traits::LinkTransport};

/// One end of an in-memory byte link.
///
/// # Examples
///
/// ```
/// use fruitpos_hardware::mock::MockLink;
/// use fruitpos_hardware::traits::LinkTransport;
///
/// #[tokio::main]
/// async fn main() -> fruitpos_hardware::Result<()> {
///     let (mut master, mut slave) = MockLink::pair();
///
///     master.send(0x00).await?;
///     assert!(slave.has_data());
///     assert_eq!(slave.receive().await?, 0x00);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLink {
    tx: mpsc::UnboundedSender<u8>,
    rx: mpsc::UnboundedReceiver<u8>,
    /// Byte taken off the channel by `has_data` and not yet received.
    peeked: Option<u8>,
    name: &'static str,
}

impl MockLink {
    /// Create two connected link ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                peeked: None,
                name: "link-a",
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                peeked: None,
                name: "link-b",
            },
        )
    }
}

impl LinkTransport for MockLink {
    async fn send(&mut self, byte: u8) -> Result<()> {
        self.tx
            .send(byte)
            .map_err(|_| HardwareError::disconnected(self.name))
    }

    async fn receive(&mut self) -> Result<u8> {
        if let Some(byte) = self.peeked.take() {
            return Ok(byte);
        }
        self.rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(self.name))
    }

    fn has_data(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.rx.try_recv().ok();
        }
        self.peeked.is_some()
    }
}
