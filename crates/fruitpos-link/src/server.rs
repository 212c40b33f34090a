//! Slave-side view of the link.
//!
//! [`LinkServer`] reads request bytes and offers one primitive per reply
//! the command protocol defines. Deciding what to reply (reading the store,
//! rendering the display) is left to the slave node.

use fruitpos_core::Product;
use fruitpos_hardware::LinkTransport;
use fruitpos_protocol::{CommandCode, decode_text};
use std::fmt::Display;
use tracing::{debug, info, trace};

use crate::config::LinkConfig;
use crate::error::LinkResult;
use crate::exchange::{Received, read_frame, receive_record, send_record};

/// Command protocol server used by the slave node.
pub struct LinkServer<L> {
    link: L,
    config: LinkConfig,
}

impl<L: LinkTransport> LinkServer<L> {
    pub fn new(link: L, config: LinkConfig) -> Self {
        Self { link, config }
    }

    /// Discard bytes left on the link from before the slave started.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure.
    pub async fn drain(&mut self) -> LinkResult<usize> {
        let dropped = self.link.drain().await?;
        if dropped > 0 {
            info!(dropped, "Drained stale link bytes");
        }
        Ok(dropped)
    }

    /// Wait for the next request.
    ///
    /// Waits without a timeout: an idle master is normal. Returns
    /// `Ok(None)` for a byte that is not a request code; such bytes are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` if the link goes down.
    pub async fn next_request(&mut self) -> LinkResult<Option<CommandCode>> {
        let byte = self.link.receive().await?;
        match CommandCode::from_byte(byte) {
            Ok(command) => {
                trace!(%command, "Request received");
                Ok(Some(command))
            }
            Err(_) => {
                debug!(byte, "Ignoring unknown request byte");
                Ok(None)
            }
        }
    }

    /// Read the index byte that follows `SendProduct`.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure or timeout.
    pub async fn read_index(&mut self) -> LinkResult<u8> {
        Ok(self.link.receive_within(self.config.timeout).await?)
    }

    /// Answer `ProductCount`.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure.
    pub async fn send_count(&mut self, count: u8) -> LinkResult<()> {
        self.link.send(count).await?;
        Ok(())
    }

    /// Answer `SendProduct` with `product` and return the master's
    /// acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure or timeout.
    pub async fn send_product(&mut self, product: &Product) -> LinkResult<bool> {
        send_record(&mut self.link, product, &self.config).await
    }

    /// Receive the record that follows `ReceiveProduct` or `SaveProduct`.
    ///
    /// `accept` runs after field validation and before the acknowledgment;
    /// an error from it is sent to the master as a rejection.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Hardware` on link failure or timeout.
    pub async fn receive_product<F, E>(&mut self, accept: F) -> LinkResult<Received>
    where
        F: FnOnce(&Product) -> Result<(), E>,
        E: Display,
    {
        receive_record(&mut self.link, &self.config, accept).await
    }

    /// Read the text that follows `PrintMessage`.
    ///
    /// # Errors
    ///
    /// - `LinkError::Protocol` if the text overruns the frame limit.
    /// - `LinkError::Hardware` on link failure or timeout.
    pub async fn read_message(&mut self) -> LinkResult<String> {
        let payload = read_frame(&mut self.link, &self.config).await?;
        Ok(decode_text(&payload))
    }

    pub fn into_inner(self) -> L {
        self.link
    }
}
