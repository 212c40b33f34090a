//! Master-side view of the link.
//!
//! [`LinkClient`] turns each request of the command protocol into one
//! method call. Every call writes the request byte first and then runs the
//! payload exchange that request defines.
//!
//! # Example Usage
//!
//! ```no_run
//! use fruitpos_core::Product;
//! use fruitpos_hardware::mock::MockLink;
//! use fruitpos_link::{LinkClient, LinkConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (master_end, _slave_end) = MockLink::pair();
//! let mut client = LinkClient::new(master_end, LinkConfig::default());
//!
//! let count = client.product_count().await?;
//! for index in 0..count {
//!     let product = client.fetch_product(index).await?;
//!     println!("{product}");
//! }
//!
//! let kiwi = Product::new("000010", "KIWI", 70)?;
//! if client.save_product(&kiwi).await? {
//!     client.print_message("Successful Save").await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: a rejected or failed exchange is reported to
//!   the caller, which decides what the operator sees.
//! - **Optional timeout**: by default a silent slave stalls the caller, as
//!   on the original hardware; `LinkConfig::timeout` bounds every wait.

use fruitpos_core::Product;
use fruitpos_hardware::LinkTransport;
use fruitpos_protocol::{CommandCode, encode_text};
use std::convert::Infallible;
use tracing::{debug, trace};

use crate::config::LinkConfig;
use crate::error::{LinkError, LinkResult};
use crate::exchange::{Received, receive_record, send_record};

/// Command protocol client used by the master node.
pub struct LinkClient<L> {
    link: L,
    config: LinkConfig,
}

impl<L: LinkTransport> LinkClient<L> {
    pub fn new(link: L, config: LinkConfig) -> Self {
        Self { link, config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    async fn request(&mut self, command: CommandCode) -> LinkResult<()> {
        trace!(%command, "Sending request");
        self.link.send(command.as_byte()).await?;
        Ok(())
    }

    /// Number of records in the slave's store.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure or timeout.
    pub async fn product_count(&mut self) -> LinkResult<u8> {
        self.request(CommandCode::ProductCount).await?;
        let count = self.link.receive_within(self.config.timeout).await?;
        debug!(count, "Product count");
        Ok(count)
    }

    /// Fetch record `index` from the slave's store.
    ///
    /// # Errors
    ///
    /// - `LinkError::Rejected` if the record did not parse or validate; this
    ///   is what an index past the end of the store produces.
    /// - `LinkError::Hardware` on link failure or timeout.
    pub async fn fetch_product(&mut self, index: u8) -> LinkResult<Product> {
        self.request(CommandCode::SendProduct).await?;
        self.link.send(index).await?;

        let received =
            receive_record(&mut self.link, &self.config, |_| Ok::<(), Infallible>(())).await?;
        match received {
            Received::Accepted(product) => Ok(product),
            Received::Rejected { .. } => Err(LinkError::Rejected {
                command: CommandCode::SendProduct,
            }),
        }
    }

    /// Ask the slave to validate and store `product`.
    ///
    /// Returns the slave's acknowledgment: `false` means the record was
    /// invalid, duplicated or could not be stored.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure or timeout.
    pub async fn save_product(&mut self, product: &Product) -> LinkResult<bool> {
        self.request(CommandCode::SaveProduct).await?;
        let ack = send_record(&mut self.link, product, &self.config).await?;
        debug!(sku = %product.sku, ack, "Save product");
        Ok(ack)
    }

    /// Show `product` on the slave's display without storing it.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure or timeout.
    pub async fn show_product(&mut self, product: &Product) -> LinkResult<bool> {
        self.request(CommandCode::ReceiveProduct).await?;
        send_record(&mut self.link, product, &self.config).await
    }

    /// Render `text` on the slave's customer display. A `\n` starts the
    /// second line.
    ///
    /// # Errors
    ///
    /// - `LinkError::Protocol` if the text cannot be framed.
    /// - `LinkError::Hardware` on link failure.
    pub async fn print_message(&mut self, text: &str) -> LinkResult<()> {
        let payload = encode_text(text)?;
        self.request(CommandCode::PrintMessage).await?;
        self.link.send_all(&payload).await?;
        Ok(())
    }

    /// Blank the slave's display.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure.
    pub async fn clear_screen(&mut self) -> LinkResult<()> {
        self.request(CommandCode::ClearScreen).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitpos_core::constants::{ACK_BYTE, READY_BYTE};
    use fruitpos_hardware::mock::MockLink;
    use fruitpos_protocol::encode_record;

    #[tokio::test]
    async fn test_product_count_wire_bytes() {
        let (master, mut slave) = MockLink::pair();
        let mut client = LinkClient::new(master, LinkConfig::default());

        slave.send(7).await.unwrap();
        assert_eq!(client.product_count().await.unwrap(), 7);
        assert_eq!(slave.receive().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_product_wire_bytes() {
        let (master, mut slave) = MockLink::pair();
        let mut client = LinkClient::new(master, LinkConfig::default());
        let mango = Product::new("000005", "MANGO", 32).unwrap();

        let fake_slave = tokio::spawn(async move {
            assert_eq!(slave.receive().await.unwrap(), 1);
            assert_eq!(slave.receive().await.unwrap(), 5);
            assert_eq!(slave.receive().await.unwrap(), READY_BYTE);
            slave.send_all(&encode_record(&mango)).await.unwrap();
            slave.receive().await.unwrap()
        });

        assert_eq!(client.fetch_product(5).await.unwrap(), mango);
        assert_eq!(fake_slave.await.unwrap(), ACK_BYTE);
    }

    #[tokio::test]
    async fn test_print_message_wire_bytes() {
        let (master, mut slave) = MockLink::pair();
        let mut client = LinkClient::new(master, LinkConfig::default());

        client.print_message("Canceled").await.unwrap();
        client.clear_screen().await.unwrap();

        let mut bytes = Vec::new();
        while slave.has_data() {
            bytes.push(slave.receive().await.unwrap());
        }
        assert_eq!(bytes, b"\x04Canceled\0\r\x05");
    }

    #[tokio::test]
    async fn test_print_message_rejects_framing_bytes() {
        let (master, mut slave) = MockLink::pair();
        let mut client = LinkClient::new(master, LinkConfig::default());

        let err = client.print_message("bad\rtext").await.unwrap_err();
        assert!(matches!(err, LinkError::Protocol(_)));
        // Nothing reached the wire.
        assert!(!slave.has_data());
    }
}
