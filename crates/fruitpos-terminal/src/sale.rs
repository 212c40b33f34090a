//! Sale workflow state machine.
//!
//! A sale has two phases. While **browsing**, the seller steps through the
//! catalog, keys a quantity and adds or removes `quantity × price` from the
//! running total. While **paying**, the seller keys the amount tendered and
//! computes the change before confirming.
//!
//! The workflow never talks to the link. The product under the cursor is
//! loaded by the caller ([`SaleWorkflow::pending_fetch`] /
//! [`SaleWorkflow::load_product`]) and receipt lines come back as
//! [`SaleEvent`]s for the caller to print on the customer display.
//!
//! # Keys
//!
//! | Key | Browsing | Paying |
//! |-----|----------|--------|
//! | `0`-`9` | quantity (two digits) | paid = paid × 10 + digit |
//! | `A` | next product | paid + 1 |
//! | `B` | previous product | paid - 1 |
//! | `C` | remove quantity × price | paid = 0 |
//! | `D` | add quantity × price | compute change |
//! | `#` | pay (or cancel if empty) | confirm once change is known |
//! | `*` | cancel | cancel |
//!
//! # Examples
//!
//! ```
//! use fruitpos_core::Product;
//! use fruitpos_hardware::Key;
//! use fruitpos_terminal::{SaleState, SaleWorkflow};
//!
//! let mut sale = SaleWorkflow::new(1);
//! assert_eq!(sale.pending_fetch(), Some(0));
//! sale.load_product(0, Product::new("000000", "APPLE", 38).unwrap());
//!
//! sale.handle_key(Key::Digit(3));
//! let event = sale.handle_key(Key::D).unwrap();
//! assert_eq!(event.receipt_line(), " 03 APPLE     \n $  114.00");
//! assert_eq!(sale.total(), 114);
//!
//! sale.handle_key(Key::Hash);
//! assert_eq!(sale.state(), SaleState::Paying);
//! ```

use std::fmt;

use fruitpos_core::{
    Product,
    constants::{CHANGE_WRAP_THRESHOLD, MAX_TOTAL},
};
use fruitpos_hardware::{DisplayDevice, Key};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TerminalResult;

/// Sale phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    Browsing,
    Paying,
    Completed,
    Cancelled,
}

impl SaleState {
    pub fn is_final(self) -> bool {
        matches!(self, SaleState::Completed | SaleState::Cancelled)
    }
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleState::Browsing => "Browsing",
            SaleState::Paying => "Paying",
            SaleState::Completed => "Completed",
            SaleState::Cancelled => "Cancelled",
        };
        write!(f, "{name}")
    }
}

/// A change to the running total, to be shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleEvent {
    Added {
        quantity: u8,
        product: Product,
        subtotal: u32,
    },
    Removed {
        quantity: u8,
        product: Product,
        subtotal: u32,
    },
}

impl SaleEvent {
    /// Two-line customer display text for this event.
    pub fn receipt_line(&self) -> String {
        match self {
            SaleEvent::Added {
                quantity,
                product,
                subtotal,
            } => format!(" {quantity:02} {}\n $  {subtotal}.00", product.name),
            SaleEvent::Removed {
                quantity,
                product,
                subtotal,
            } => format!(" -{quantity:02} {}\n -$  {subtotal}.00", product.name),
        }
    }
}

/// One customer's sale.
#[derive(Debug, Clone)]
pub struct SaleWorkflow {
    state: SaleState,
    product_count: u8,
    index: u8,
    /// Product shown on screen and the index it was fetched for.
    loaded: Option<(u8, Product)>,
    quantity: u8,
    total: u32,
    paid: u16,
    change: u16,
}

impl SaleWorkflow {
    /// Start a sale over a catalog of `product_count` records.
    ///
    /// An empty catalog has nothing to sell: the sale starts cancelled.
    pub fn new(product_count: u8) -> Self {
        let state = if product_count == 0 {
            SaleState::Cancelled
        } else {
            SaleState::Browsing
        };
        Self {
            state,
            product_count,
            index: 0,
            loaded: None,
            quantity: 0,
            total: 0,
            paid: 0,
            change: 0,
        }
    }

    pub fn state(&self) -> SaleState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_final()
    }

    /// Catalog index under the cursor.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn quantity(&self) -> u8 {
        self.quantity
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn paid(&self) -> u16 {
        self.paid
    }

    pub fn change(&self) -> u16 {
        self.change
    }

    /// Product currently loaded, if it matches the cursor.
    pub fn product(&self) -> Option<&Product> {
        match &self.loaded {
            Some((index, product)) if *index == self.index => Some(product),
            _ => None,
        }
    }

    /// Index the caller must fetch before the next render, if any.
    pub fn pending_fetch(&self) -> Option<u8> {
        if self.state == SaleState::Browsing && self.product().is_none() {
            Some(self.index)
        } else {
            None
        }
    }

    /// Store the record fetched for `index`.
    pub fn load_product(&mut self, index: u8, product: Product) {
        self.loaded = Some((index, product));
    }

    /// Apply one key, returning a receipt event when the total changed.
    pub fn handle_key(&mut self, key: Key) -> Option<SaleEvent> {
        match self.state {
            SaleState::Browsing => self.browse(key),
            SaleState::Paying => {
                self.pay(key);
                None
            }
            SaleState::Completed | SaleState::Cancelled => None,
        }
    }

    fn browse(&mut self, key: Key) -> Option<SaleEvent> {
        match key {
            Key::Digit(digit) => {
                self.quantity = if self.quantity >= 10 {
                    digit
                } else {
                    self.quantity * 10 + digit
                };
                None
            }
            Key::A => {
                self.index = ((u16::from(self.index) + 1) % u16::from(self.product_count)) as u8;
                self.quantity = 0;
                None
            }
            Key::B => {
                let count = u16::from(self.product_count);
                self.index = ((u16::from(self.index) + count - 1) % count) as u8;
                self.quantity = 0;
                None
            }
            Key::C => {
                let event = self.line_item().and_then(|(product, subtotal)| {
                    (self.total >= subtotal).then(|| {
                        self.total -= subtotal;
                        SaleEvent::Removed {
                            quantity: self.quantity,
                            product,
                            subtotal,
                        }
                    })
                });
                self.quantity = 0;
                event
            }
            Key::D => {
                let event = self.line_item().and_then(|(product, subtotal)| {
                    (self.total + subtotal < MAX_TOTAL).then(|| {
                        self.total += subtotal;
                        SaleEvent::Added {
                            quantity: self.quantity,
                            product,
                            subtotal,
                        }
                    })
                });
                if event.is_none() {
                    debug!(total = self.total, quantity = self.quantity, "Line item dropped");
                }
                self.quantity = 0;
                event
            }
            Key::Hash => {
                self.state = if self.total > 0 {
                    SaleState::Paying
                } else {
                    SaleState::Cancelled
                };
                None
            }
            Key::Star => {
                self.state = SaleState::Cancelled;
                None
            }
        }
    }

    fn line_item(&self) -> Option<(Product, u32)> {
        self.product()
            .map(|product| (*product, u32::from(product.price) * u32::from(self.quantity)))
    }

    fn pay(&mut self, key: Key) {
        match key {
            Key::Digit(digit) => {
                self.paid = self.paid.wrapping_mul(10).wrapping_add(u16::from(digit));
            }
            Key::A => self.paid = self.paid.wrapping_add(1),
            Key::B => self.paid = self.paid.wrapping_sub(1),
            Key::C => self.paid = 0,
            Key::D => {
                // Total stays below MAX_TOTAL, so it fits the 16-bit register.
                let difference = self.paid.wrapping_sub(self.total as u16);
                self.change = if difference < CHANGE_WRAP_THRESHOLD {
                    difference
                } else {
                    0
                };
            }
            Key::Hash => {
                if self.change != 0 {
                    self.state = SaleState::Completed;
                }
            }
            Key::Star => self.state = SaleState::Cancelled,
        }
    }

    /// Customer display text while paying.
    pub fn customer_message(&self) -> String {
        if self.change == 0 {
            format!("TOTAL: $ {}.00\nPAY:   $ {}.00", self.total, self.paid)
        } else {
            format!("PAY:  $ {}.00\nCHNG: $ {}.00", self.paid, self.change)
        }
    }

    /// Paint the seller's screen for the current phase.
    ///
    /// # Errors
    ///
    /// Returns the display's error if it is smaller than 4 × 20.
    pub fn render<D: DisplayDevice>(&self, display: &mut D) -> TerminalResult<()> {
        display.clear()?;
        match self.state {
            SaleState::Browsing => {
                let product = self.product().copied().unwrap_or_default();
                display.write_line(0, &format!("{}: {}", product.sku, product.name))?;
                display.write_line(1, &format!("PRICE: $ {}.00", product.price))?;
                display.write_line(2, &format!("QUANTITY: {}", self.quantity))?;
                display.write_line(3, &format!("TOTAL:  $ {}.00", self.total))?;
            }
            SaleState::Paying => {
                display.write_line(0, &format!("TOTAL:  $ {}.00", self.total))?;
                display.write_line(1, &format!("PAY:   $ {}.00", self.paid))?;
                display.write_line(2, &format!("CHANGE: $ {}.00", self.change))?;
            }
            SaleState::Completed | SaleState::Cancelled => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::VirtualDisplay;
    use rstest::rstest;

    fn apple() -> Product {
        Product::new("000000", "APPLE", 38).unwrap()
    }

    fn browsing_with(product: Product) -> SaleWorkflow {
        let mut sale = SaleWorkflow::new(10);
        sale.load_product(0, product);
        sale
    }

    fn press(sale: &mut SaleWorkflow, keys: &str) -> Vec<SaleEvent> {
        keys.chars()
            .filter_map(|c| sale.handle_key(Key::from_char(c).unwrap()))
            .collect()
    }

    #[test]
    fn test_empty_catalog_cancels() {
        let sale = SaleWorkflow::new(0);
        assert_eq!(sale.state(), SaleState::Cancelled);
        assert_eq!(sale.pending_fetch(), None);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut sale = SaleWorkflow::new(3);
        press(&mut sale, "B");
        assert_eq!(sale.index(), 2);
        press(&mut sale, "A");
        assert_eq!(sale.index(), 0);
        press(&mut sale, "AA");
        assert_eq!(sale.pending_fetch(), Some(2));
    }

    #[test]
    fn test_cursor_wraps_full_catalog() {
        let mut sale = SaleWorkflow::new(255);
        press(&mut sale, "B");
        assert_eq!(sale.index(), 254);
        press(&mut sale, "A");
        assert_eq!(sale.index(), 0);
    }

    #[test]
    fn test_moving_resets_quantity() {
        let mut sale = browsing_with(apple());
        press(&mut sale, "5A");
        assert_eq!(sale.quantity(), 0);
        assert_eq!(sale.pending_fetch(), Some(1));
    }

    #[rstest]
    #[case("7", 7)]
    #[case("12", 12)]
    #[case("123", 3)]
    #[case("1234", 34)]
    #[case("99", 99)]
    fn test_quantity_entry(#[case] keys: &str, #[case] expected: u8) {
        let mut sale = browsing_with(apple());
        press(&mut sale, keys);
        assert_eq!(sale.quantity(), expected);
    }

    #[test]
    fn test_add_and_remove() {
        let mut sale = browsing_with(apple());

        let events = press(&mut sale, "3D");
        assert_eq!(sale.total(), 114);
        assert_eq!(sale.quantity(), 0);
        assert_eq!(
            events,
            vec![SaleEvent::Added {
                quantity: 3,
                product: apple(),
                subtotal: 114
            }]
        );

        let events = press(&mut sale, "1C");
        assert_eq!(sale.total(), 76);
        assert_eq!(events[0].receipt_line(), " -01 APPLE     \n -$  38.00");
    }

    #[test]
    fn test_remove_more_than_total_is_dropped() {
        let mut sale = browsing_with(apple());
        press(&mut sale, "1D");
        let events = press(&mut sale, "2C");
        assert!(events.is_empty());
        assert_eq!(sale.total(), 38);
        assert_eq!(sale.quantity(), 0);
    }

    #[test]
    fn test_total_never_reaches_limit() {
        let expensive = Product::new("000001", "TRUFFLE", 9999).unwrap();
        let mut sale = browsing_with(expensive);

        press(&mut sale, "4D");
        assert_eq!(sale.total(), 39_996);

        // 39996 + 9999 = 49995 stays below the limit
        press(&mut sale, "1D");
        assert_eq!(sale.total(), 49_995);

        let events = press(&mut sale, "1D");
        assert!(events.is_empty());
        assert_eq!(sale.total(), 49_995);
    }

    #[test]
    fn test_add_without_product_is_ignored() {
        let mut sale = SaleWorkflow::new(2);
        assert!(press(&mut sale, "2D").is_empty());
        assert_eq!(sale.total(), 0);
    }

    #[rstest]
    #[case("#", SaleState::Cancelled)]
    #[case("*", SaleState::Cancelled)]
    #[case("1D#", SaleState::Paying)]
    #[case("1D*", SaleState::Cancelled)]
    fn test_finish_browsing(#[case] keys: &str, #[case] expected: SaleState) {
        let mut sale = browsing_with(apple());
        press(&mut sale, keys);
        assert_eq!(sale.state(), expected);
    }

    fn paying(total_keys: &str, product: Product) -> SaleWorkflow {
        let mut sale = browsing_with(product);
        press(&mut sale, total_keys);
        press(&mut sale, "#");
        assert_eq!(sale.state(), SaleState::Paying);
        sale
    }

    #[rstest]
    #[case("5000", 800)]
    #[case("3000", 0)]
    #[case("4200", 0)]
    fn test_change_computation(#[case] paid: &str, #[case] change: u16) {
        let product = Product::new("000001", "MELON", 2100).unwrap();
        let mut sale = paying("2D", product);
        assert_eq!(sale.total(), 4200);

        press(&mut sale, paid);
        press(&mut sale, "D");
        assert_eq!(sale.change(), change);
    }

    #[test]
    fn test_confirm_requires_change() {
        let mut sale = paying("1D", apple());

        press(&mut sale, "38#");
        assert_eq!(sale.state(), SaleState::Paying);

        press(&mut sale, "D#");
        assert_eq!(sale.state(), SaleState::Paying);

        press(&mut sale, "C50D#");
        assert_eq!(sale.change(), 12);
        assert_eq!(sale.state(), SaleState::Completed);
    }

    #[test]
    fn test_paid_adjust_keys() {
        let mut sale = paying("1D", apple());
        press(&mut sale, "AAA");
        assert_eq!(sale.paid(), 3);
        press(&mut sale, "B");
        assert_eq!(sale.paid(), 2);
        press(&mut sale, "C");
        assert_eq!(sale.paid(), 0);
        press(&mut sale, "B");
        assert_eq!(sale.paid(), u16::MAX);
    }

    #[test]
    fn test_paid_wraps_16_bit() {
        let mut sale = paying("1D", apple());
        press(&mut sale, "70000");
        assert_eq!(sale.paid(), 70_000u32 as u16);
    }

    #[test]
    fn test_cancel_while_paying() {
        let mut sale = paying("1D", apple());
        press(&mut sale, "*");
        assert_eq!(sale.state(), SaleState::Cancelled);
        assert!(press(&mut sale, "1D").is_empty());
    }

    #[test]
    fn test_customer_message() {
        let mut sale = paying("1D", apple());
        press(&mut sale, "50");
        assert_eq!(sale.customer_message(), "TOTAL: $ 38.00\nPAY:   $ 50.00");

        press(&mut sale, "D");
        assert_eq!(sale.customer_message(), "PAY:  $ 50.00\nCHNG: $ 12.00");
    }

    #[test]
    fn test_render_browsing() {
        let mut display = VirtualDisplay::new(4, 20);
        let mut sale = browsing_with(apple());
        press(&mut sale, "3D2");

        sale.render(&mut display).unwrap();
        assert_eq!(
            display.get_all_lines(),
            vec![
                "000000: APPLE       ",
                "PRICE: $ 38.00      ",
                "QUANTITY: 2         ",
                "TOTAL:  $ 114.00    ",
            ]
        );
    }

    #[test]
    fn test_render_paying() {
        let mut display = VirtualDisplay::new(4, 20);
        let mut sale = paying("1D", apple());
        press(&mut sale, "40D");

        sale.render(&mut display).unwrap();
        assert_eq!(display.get_line(0).unwrap().trim_end(), "TOTAL:  $ 38.00");
        assert_eq!(display.get_line(1).unwrap().trim_end(), "PAY:   $ 40.00");
        assert_eq!(display.get_line(2).unwrap().trim_end(), "CHANGE: $ 2.00");
    }
}
