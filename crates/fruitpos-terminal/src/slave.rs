//! Slave node: product store and customer display.
//!
//! [`SlaveNode`] owns the EEPROM-backed [`ProductStore`] and answers the
//! master's requests one at a time. It never initiates traffic.
//!
//! | Request | Action |
//! |---------|--------|
//! | `ProductCount` | reply with the record count |
//! | `SendProduct` | send record `index` (zeroed past the end) |
//! | `ReceiveProduct` | receive a record and display it |
//! | `SaveProduct` | receive, check uniqueness, append, display |
//! | `PrintMessage` | display the text |
//! | `ClearScreen` | blank the display |
//!
//! Bytes that are not request codes are ignored.

use std::convert::Infallible;

use fruitpos_core::Product;
use fruitpos_hardware::{DisplayDevice, LinkTransport, PersistentMedium};
use fruitpos_link::{LinkConfig, LinkServer, Received};
use fruitpos_protocol::CommandCode;
use fruitpos_storage::{ProductStore, StoreConfig};
use tracing::{debug, info, warn};

use crate::error::{TerminalError, TerminalResult};

/// The slave node.
pub struct SlaveNode<L, M, D> {
    server: LinkServer<L>,
    store: ProductStore<M>,
    display: D,
}

impl<L, M, D> SlaveNode<L, M, D>
where
    L: LinkTransport,
    M: PersistentMedium,
    D: DisplayDevice,
{
    /// Bring the node up.
    ///
    /// Drains stale link bytes, opens the store (formatting an erased
    /// medium) and shows the first product.
    ///
    /// # Errors
    ///
    /// Returns link, storage and display failures.
    pub async fn start(
        link: L,
        medium: M,
        display: D,
        link_config: LinkConfig,
        store_config: &StoreConfig,
    ) -> TerminalResult<Self> {
        let mut server = LinkServer::new(link, link_config);
        server.drain().await?;

        let store = ProductStore::open(medium, store_config)?;
        let mut node = Self {
            server,
            store,
            display,
        };

        let count = node.store.count()?;
        node.display.clear()?;
        if count > 0 {
            let first = node.store.read(0)?;
            node.show_product(&first)?;
        }
        info!(count, max_records = node.store.max_records(), "Slave node ready");
        Ok(node)
    }

    pub fn store(&self) -> &ProductStore<M> {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Serve requests until the link goes away.
    ///
    /// A request that fails on the link (a timeout, a runaway frame) is
    /// logged and the node waits for the next one.
    ///
    /// # Errors
    ///
    /// Returns storage and display failures.
    pub async fn run(&mut self) -> TerminalResult<()> {
        loop {
            match self.serve_next().await {
                Ok(_) => {}
                Err(err) if err.is_disconnected() => {
                    info!(%err, "Slave node stopped");
                    return Ok(());
                }
                Err(TerminalError::Link(err)) => warn!(%err, "Request aborted"),
                Err(err) => return Err(err),
            }
        }
    }

    /// Wait for one request and serve it.
    ///
    /// Returns the request served, or `None` for an ignored byte.
    ///
    /// # Errors
    ///
    /// Returns link, storage and display failures.
    pub async fn serve_next(&mut self) -> TerminalResult<Option<CommandCode>> {
        let Some(command) = self.server.next_request().await? else {
            return Ok(None);
        };

        match command {
            CommandCode::ProductCount => {
                let count = self.store.count()?;
                self.server.send_count(count).await?;
            }
            CommandCode::SendProduct => {
                let index = self.server.read_index().await?;
                let product = self.store.read(index)?;
                let ack = self.server.send_product(&product).await?;
                debug!(index, ack, "Product sent");
            }
            CommandCode::ReceiveProduct => {
                let received = self
                    .server
                    .receive_product(|_| Ok::<(), Infallible>(()))
                    .await?;
                if let Received::Accepted(product) = received {
                    self.show_product(&product)?;
                }
            }
            CommandCode::SaveProduct => {
                let store = &mut self.store;
                let received = self
                    .server
                    .receive_product(|product| {
                        store
                            .append(*product)
                            .map(|index| debug!(index, "Record appended"))
                    })
                    .await?;
                match received {
                    Received::Accepted(product) => {
                        info!(sku = %product.sku, name = %product.name, "Product saved");
                        self.show_product(&product)?;
                    }
                    Received::Rejected { reason } => info!(%reason, "Product not saved"),
                }
            }
            CommandCode::PrintMessage => {
                let text = self.server.read_message().await?;
                self.show_message(&text)?;
            }
            CommandCode::ClearScreen => self.display.clear()?,
        }
        Ok(Some(command))
    }

    fn show_product(&mut self, product: &Product) -> TerminalResult<()> {
        self.display.clear()?;
        self.display
            .write_line(0, &format!("{} {}", product.sku, product.name))?;
        self.display
            .write_line(1, &format!("$ {:04}", product.price))?;
        Ok(())
    }

    /// Clear and show `text`; each `\n` starts the next row.
    fn show_message(&mut self, text: &str) -> TerminalResult<()> {
        self.display.clear()?;
        let rows = self.display.rows();
        for (row, line) in text.split('\n').take(rows).enumerate() {
            self.display.write_line(row, line)?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (L, M, D) {
        (self.server.into_inner(), self.store.into_inner(), self.display)
    }
}
