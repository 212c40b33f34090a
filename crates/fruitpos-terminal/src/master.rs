//! Master node: keypad, seller display and the two workflows.
//!
//! [`MasterTerminal`] runs the main loop of the cash register. Each
//! iteration polls the keypad once, feeds the key to whatever is active
//! (menu, editor or sale) and repaints when the render scheduler raised its
//! flag. All catalog access goes through the link to the slave.
//!
//! # Example Usage
//!
//! ```no_run
//! use fruitpos_hardware::mock::{MockKeypad, MockLink};
//! use fruitpos_link::{LinkClient, LinkConfig};
//! use fruitpos_terminal::{
//!     MasterTerminal, RenderScheduler, SchedulerConfig, TerminalConfig, VirtualDisplay,
//! };
//!
//! # async fn example() -> fruitpos_terminal::TerminalResult<()> {
//! let (keypad, _keys) = MockKeypad::new();
//! let (link, _slave_end) = MockLink::pair();
//! let scheduler = RenderScheduler::spawn(&SchedulerConfig::default());
//!
//! let mut master = MasterTerminal::new(
//!     keypad,
//!     VirtualDisplay::builder().build(),
//!     LinkClient::new(link, LinkConfig::default()),
//!     scheduler.flags(),
//!     TerminalConfig::default(),
//! );
//! master.run().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use fruitpos_core::{Product, ValidationError};
use fruitpos_hardware::{DisplayDevice, Key, KeypadDevice, LinkTransport};
use fruitpos_link::{LinkClient, LinkError};
use tracing::{debug, info, warn};

use crate::config::TerminalConfig;
use crate::display::{Alignment, align_text};
use crate::editor::ProductEditor;
use crate::error::{TerminalError, TerminalResult};
use crate::menu::{MainMenu, MenuChoice};
use crate::sale::{SaleState, SaleWorkflow};
use crate::scheduler::RenderFlags;

/// Text sent to the customer display after every purchase.
pub const FAREWELL_MESSAGE: &str = "Come Back Soon";

/// Row of the progress line during the duplicate check.
const PROGRESS_ROW: usize = 1;

/// Column of the "Checking" progress line.
const PROGRESS_COLUMN: usize = 3;

/// Records between two "Checking" lines.
const PROGRESS_EVERY: u8 = 50;

/// Records between two progress dots.
const DOT_EVERY: u8 = 10;

/// Result of a new-product session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Product),
    Cancelled,
    /// Zero price or a SKU/name already in the store.
    Invalid(ValidationError),
    /// The duplicate check could not complete.
    CheckFailed,
    /// The slave refused or failed to store the record.
    SaveFailed,
}

impl SaveOutcome {
    /// Operator-facing text for the seller display.
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::Saved(_) => "Successful Save",
            SaveOutcome::Cancelled => "Cancel",
            SaveOutcome::Invalid(err) => err.display_message(),
            SaveOutcome::CheckFailed => "Check Failed",
            SaveOutcome::SaveFailed => "The Save Failed",
        }
    }
}

/// Result of a purchase session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Completed { total: u32, paid: u16, change: u16 },
    Cancelled,
}

impl PurchaseOutcome {
    fn message(&self) -> &'static [&'static str] {
        match self {
            PurchaseOutcome::Completed { .. } => &["Successful", "Transaction"],
            PurchaseOutcome::Cancelled => &["Canceled"],
        }
    }
}

/// One pass through the main menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    NewProduct(SaveOutcome),
    Purchase(PurchaseOutcome),
}

/// The master node.
pub struct MasterTerminal<K, D, L> {
    keypad: K,
    display: D,
    client: LinkClient<L>,
    flags: Arc<RenderFlags>,
    config: TerminalConfig,
}

impl<K, D, L> MasterTerminal<K, D, L>
where
    K: KeypadDevice,
    D: DisplayDevice,
    L: LinkTransport,
{
    pub fn new(
        keypad: K,
        display: D,
        client: LinkClient<L>,
        flags: Arc<RenderFlags>,
        config: TerminalConfig,
    ) -> Self {
        Self {
            keypad,
            display,
            client,
            flags,
            config,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Serve sessions until the keypad or the link goes away.
    ///
    /// # Errors
    ///
    /// Returns any failure other than a disconnection, such as a link
    /// timeout outside the duplicate check.
    pub async fn run(&mut self) -> TerminalResult<()> {
        info!("Master terminal started");
        loop {
            match self.run_once().await {
                Ok(session) => debug!(?session, "Session finished"),
                Err(err) if err.is_disconnected() => {
                    info!(%err, "Master terminal stopped");
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Show the menu and run the chosen workflow once.
    ///
    /// # Errors
    ///
    /// Returns keypad, display and link failures.
    pub async fn run_once(&mut self) -> TerminalResult<Session> {
        match self.select().await? {
            MenuChoice::NewProduct => Ok(Session::NewProduct(self.new_product().await?)),
            MenuChoice::Purchase => Ok(Session::Purchase(self.purchase().await?)),
        }
    }

    async fn next_key(&mut self) -> TerminalResult<Option<Key>> {
        let key = self
            .keypad
            .poll_key(self.config.key_edge, self.config.poll_interval)
            .await?;
        if let Some(key) = key {
            debug!(%key, "Key");
        }
        Ok(key)
    }

    async fn select(&mut self) -> TerminalResult<MenuChoice> {
        let mut menu = MainMenu::new();
        self.flags.request_render();
        loop {
            if let Some(key) = self.next_key().await?
                && let Some(choice) = menu.handle_key(key)
            {
                info!(?choice, "Menu selection");
                return Ok(choice);
            }
            if self.flags.take_render() {
                menu.render(&mut self.display)?;
            }
        }
    }

    /// Edit a new product, check it against the store and save it.
    ///
    /// # Errors
    ///
    /// Returns keypad and display failures, and link failures outside the
    /// check and save steps (the initial count query, a lost link).
    pub async fn new_product(&mut self) -> TerminalResult<SaveOutcome> {
        let count = self.client.product_count().await?;
        let mut editor = ProductEditor::new(count);
        self.flags.request_render();

        while !editor.is_finished() {
            if let Some(key) = self.next_key().await? {
                editor.handle_key(key);
            }
            if self.flags.take_render() {
                editor.render(&mut self.display, self.flags.blink())?;
            }
        }

        let candidate = editor.into_product();
        let outcome = if candidate.is_cancelled() {
            SaveOutcome::Cancelled
        } else {
            self.check_and_save(candidate).await?
        };
        info!(?outcome, "New product session finished");

        self.show_lines(&[outcome.message()])?;
        self.pause().await;
        Ok(outcome)
    }

    async fn check_and_save(&mut self, candidate: Product) -> TerminalResult<SaveOutcome> {
        match self.check_product(&candidate).await {
            Ok(Some(invalid)) => return Ok(SaveOutcome::Invalid(invalid)),
            Ok(None) => {}
            Err(TerminalError::Link(err)) if !err.is_disconnected() => {
                warn!(%err, "Product check failed");
                return Ok(SaveOutcome::CheckFailed);
            }
            Err(err) => return Err(err),
        }

        match self.client.save_product(&candidate).await {
            Ok(true) => Ok(SaveOutcome::Saved(candidate)),
            Ok(false) => Ok(SaveOutcome::SaveFailed),
            Err(err) if err.is_disconnected() => Err(err.into()),
            Err(err) => {
                warn!(%err, "Save request failed");
                Ok(SaveOutcome::SaveFailed)
            }
        }
    }

    /// Scan the store for a record sharing the candidate's SKU or name.
    ///
    /// Returns the first problem found, or `None` for a storable candidate.
    async fn check_product(&mut self, candidate: &Product) -> TerminalResult<Option<ValidationError>> {
        let count = self.client.product_count().await?;
        if let Err(invalid) = candidate.validate() {
            return Ok(Some(invalid));
        }

        let mut column = PROGRESS_COLUMN;
        for index in 0..count {
            let existing = self.client.fetch_product(index).await?;
            if existing.sku == candidate.sku {
                return Ok(Some(ValidationError::DuplicateSku {
                    sku: candidate.sku.to_string(),
                }));
            }
            if existing.name == candidate.name {
                return Ok(Some(ValidationError::DuplicateName {
                    name: candidate.name.to_string(),
                }));
            }

            if index % PROGRESS_EVERY == 0 {
                let text = "Checking ";
                self.display.clear()?;
                self.display.write_at(PROGRESS_COLUMN, PROGRESS_ROW, text)?;
                column = PROGRESS_COLUMN + text.len();
            } else if index % DOT_EVERY == 0 && column < self.display.columns() {
                self.display.write_at(column, PROGRESS_ROW, ".")?;
                column += 1;
            }
        }
        debug!(count, sku = %candidate.sku, "Candidate is unique");
        Ok(None)
    }

    /// Run one customer's sale, including payment.
    ///
    /// # Errors
    ///
    /// Returns keypad, display and link failures. A catalog record that
    /// fails to transfer is shown as an empty product instead.
    pub async fn purchase(&mut self) -> TerminalResult<PurchaseOutcome> {
        let count = self.client.product_count().await?;
        let mut sale = SaleWorkflow::new(count);
        self.flags.request_render();

        while !sale.is_finished() {
            if let Some(index) = sale.pending_fetch() {
                let product = match self.client.fetch_product(index).await {
                    Ok(product) => product,
                    Err(err @ LinkError::Rejected { .. }) => {
                        warn!(index, %err, "Catalog record unreadable");
                        Product::zeroed()
                    }
                    Err(err) => return Err(err.into()),
                };
                sale.load_product(index, product);
            }

            if let Some(key) = self.next_key().await?
                && let Some(event) = sale.handle_key(key)
            {
                debug!(?event, total = sale.total(), "Total changed");
                self.client.print_message(&event.receipt_line()).await?;
            }

            if self.flags.take_render() {
                sale.render(&mut self.display)?;
                if sale.state() == SaleState::Paying {
                    self.client.print_message(&sale.customer_message()).await?;
                }
            }
        }

        let outcome = match sale.state() {
            SaleState::Completed => PurchaseOutcome::Completed {
                total: sale.total(),
                paid: sale.paid(),
                change: sale.change(),
            },
            _ => PurchaseOutcome::Cancelled,
        };
        info!(?outcome, "Purchase finished");

        self.show_lines(outcome.message())?;
        self.client.print_message(FAREWELL_MESSAGE).await?;
        self.pause().await;
        self.client.clear_screen().await?;
        Ok(outcome)
    }

    /// Clear the screen and show `lines` centered from the second row on.
    fn show_lines(&mut self, lines: &[&str]) -> TerminalResult<()> {
        let width = self.display.columns();
        self.display.clear()?;
        for (row, text) in lines.iter().enumerate() {
            self.display
                .write_line(row + 1, &align_text(text.trim(), width, Alignment::Center))?;
        }
        Ok(())
    }

    async fn pause(&self) {
        if !self.config.message_delay.is_zero() {
            tokio::time::sleep(self.config.message_delay).await;
        }
    }

    pub fn into_parts(self) -> (K, D, LinkClient<L>) {
        (self.keypad, self.display, self.client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::VirtualDisplay;
    use fruitpos_core::constants::{ACK_BYTE, NAK_BYTE, READY_BYTE};
    use fruitpos_hardware::mock::{MockKeypad, MockKeypadHandle, MockLink};
    use fruitpos_link::LinkConfig;
    use fruitpos_protocol::{CommandCode, encode_record};
    use std::time::Duration;

    type TestTerminal = MasterTerminal<MockKeypad, VirtualDisplay, MockLink>;

    fn terminal() -> (TestTerminal, MockKeypadHandle, MockLink) {
        let (keypad, keys) = MockKeypad::new();
        let (link, slave) = MockLink::pair();
        let config = TerminalConfig::default()
            .with_message_delay(Duration::ZERO)
            .with_poll_interval(Duration::from_millis(1));
        let master = MasterTerminal::new(
            keypad,
            VirtualDisplay::builder().build(),
            LinkClient::new(link, LinkConfig::default()),
            Arc::new(RenderFlags::default()),
            config,
        );
        (master, keys, slave)
    }

    async fn expect_request(slave: &mut MockLink, command: CommandCode) {
        assert_eq!(slave.receive().await.unwrap(), command.as_byte());
    }

    /// Answer one `SendProduct` for `product`.
    async fn serve_product(slave: &mut MockLink, product: &Product) {
        expect_request(slave, CommandCode::SendProduct).await;
        slave.receive().await.unwrap();
        assert_eq!(slave.receive().await.unwrap(), READY_BYTE);
        slave.send_all(&encode_record(product)).await.unwrap();
        assert_eq!(slave.receive().await.unwrap(), ACK_BYTE);
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(SaveOutcome::Cancelled.message(), "Cancel");
        assert_eq!(
            SaveOutcome::Invalid(ValidationError::InvalidPrice { price: 0 }).message(),
            "Invalid  Price"
        );
        assert_eq!(PurchaseOutcome::Cancelled.message(), &["Canceled"]);
    }

    #[tokio::test]
    async fn test_cancelled_edit_saves_nothing() {
        let (mut master, keys, mut slave) = terminal();
        keys.type_keys("*").await.unwrap();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(3).await.unwrap();
            slave
        });

        assert_eq!(master.new_product().await.unwrap(), SaveOutcome::Cancelled);
        let mut slave = fake_slave.await.unwrap();
        assert!(!slave.has_data());
        assert_eq!(master.display().get_line(1).unwrap().trim(), "Cancel");
    }

    #[tokio::test]
    async fn test_zero_price_rejected_before_scan() {
        let (mut master, keys, mut slave) = terminal();
        keys.type_keys("##").await.unwrap();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(1).await.unwrap();
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(1).await.unwrap();
            slave
        });

        let outcome = master.new_product().await.unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Invalid(ValidationError::InvalidPrice { price: 0 })
        );
        let mut slave = fake_slave.await.unwrap();
        assert!(!slave.has_data());
    }

    #[tokio::test]
    async fn test_duplicate_name_detected() {
        let (mut master, keys, mut slave) = terminal();
        // Name "A", price 19.
        keys.type_keys("#19#").await.unwrap();
        let existing = Product::new("000000", "A", 38).unwrap();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(1).await.unwrap();
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(1).await.unwrap();
            serve_product(&mut slave, &existing).await;
        });

        let outcome = master.new_product().await.unwrap();
        fake_slave.await.unwrap();
        assert!(matches!(
            outcome,
            SaveOutcome::Invalid(ValidationError::DuplicateName { .. })
        ));
        assert_eq!(master.display().get_line(1).unwrap().trim(), "Existing  Name");
    }

    #[tokio::test]
    async fn test_unique_product_saved() {
        let (mut master, keys, mut slave) = terminal();
        keys.type_keys("#70#").await.unwrap();
        let existing = Product::new("000000", "APPLE", 38).unwrap();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(1).await.unwrap();
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(1).await.unwrap();
            serve_product(&mut slave, &existing).await;

            expect_request(&mut slave, CommandCode::SaveProduct).await;
            slave.send(READY_BYTE).await.unwrap();
            let mut record = Vec::new();
            loop {
                let byte = slave.receive().await.unwrap();
                record.push(byte);
                if byte == 0x0D {
                    break;
                }
            }
            slave.send(ACK_BYTE).await.unwrap();
            record
        });

        let outcome = master.new_product().await.unwrap();
        let record = fake_slave.await.unwrap();

        let expected = Product::new("000001", "A", 70).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(expected));
        assert_eq!(record, encode_record(&expected));
        assert_eq!(master.display().get_line(1).unwrap().trim(), "Successful Save");
    }

    #[tokio::test]
    async fn test_save_nak_reported() {
        let (mut master, keys, mut slave) = terminal();
        keys.type_keys("#5#").await.unwrap();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(0).await.unwrap();
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(0).await.unwrap();
            expect_request(&mut slave, CommandCode::SaveProduct).await;
            slave.send(READY_BYTE).await.unwrap();
            while slave.receive().await.unwrap() != 0x0D {}
            slave.send(NAK_BYTE).await.unwrap();
        });

        assert_eq!(master.new_product().await.unwrap(), SaveOutcome::SaveFailed);
        fake_slave.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_timeout_reports_check_failed() {
        let (keypad, keys) = MockKeypad::new();
        let (link, mut slave) = MockLink::pair();
        let mut master = MasterTerminal::new(
            keypad,
            VirtualDisplay::builder().build(),
            LinkClient::new(
                link,
                LinkConfig::default().with_timeout(Duration::from_millis(100)),
            ),
            Arc::new(RenderFlags::default()),
            TerminalConfig::default().with_message_delay(Duration::ZERO),
        );
        keys.type_keys("#5#").await.unwrap();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(2).await.unwrap();
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(2).await.unwrap();
            // Never answers the SendProduct that follows.
            expect_request(&mut slave, CommandCode::SendProduct).await;
            slave
        });

        assert_eq!(master.new_product().await.unwrap(), SaveOutcome::CheckFailed);
        drop(fake_slave.await.unwrap());
        assert_eq!(master.display().get_line(1).unwrap().trim(), "Check Failed");
    }

    #[tokio::test]
    async fn test_empty_store_cancels_purchase() {
        let (mut master, _keys, mut slave) = terminal();

        let fake_slave = tokio::spawn(async move {
            expect_request(&mut slave, CommandCode::ProductCount).await;
            slave.send(0).await.unwrap();
            expect_request(&mut slave, CommandCode::PrintMessage).await;
            let mut text = Vec::new();
            loop {
                let byte = slave.receive().await.unwrap();
                if byte == 0x0D {
                    break;
                }
                text.push(byte);
            }
            expect_request(&mut slave, CommandCode::ClearScreen).await;
            text
        });

        assert_eq!(master.purchase().await.unwrap(), PurchaseOutcome::Cancelled);
        assert_eq!(fake_slave.await.unwrap(), b"Come Back Soon\0");
        assert_eq!(master.display().get_line(1).unwrap().trim(), "Canceled");
    }

    #[tokio::test]
    async fn test_keypad_disconnect_stops_run() {
        let (mut master, keys, _slave) = terminal();
        drop(keys);
        master.run().await.unwrap();
    }
}
