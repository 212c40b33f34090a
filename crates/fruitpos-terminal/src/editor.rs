//! Product editor state machine.
//!
//! The operator builds a new product one attribute at a time with the 4x4
//! keypad. The editor owns the candidate record and a cursor; every key
//! press goes through [`ProductEditor::handle_key`] and the master repaints
//! the result on its next render pass.
//!
//! # Keys
//!
//! | Key | SKU | Name | Price |
//! |-----|-----|------|-------|
//! | `0`-`9` | shift in digit | letter = digit | shift in digit (max 4) |
//! | `A` | +1 with carry | next letter | +1 mod 10000 |
//! | `B` | -1 with borrow | previous letter | -1 mod 10000 |
//! | `C` | reset to `000000` | blank and step left | reset, back to name cursor |
//! | `D` | to name | step right (to price on the last) | commit |
//! | `#` | to name | to price | commit |
//! | `*` | cancel | cancel | cancel |
//!
//! Letters cycle `A`..`Z`, space, `A`.
//!
//! # States
//!
//! ```text
//! EditSku <-> EditName <-> EditPrice -> Done
//!    \            |            /
//!     +------> Cancelled <----+
//! ```
//!
//! # Examples
//!
//! ```
//! use fruitpos_hardware::Key;
//! use fruitpos_terminal::{EditorState, ProductEditor};
//!
//! let mut editor = ProductEditor::new(3);
//! assert_eq!(editor.state(), EditorState::EditName);
//! assert_eq!(editor.candidate().sku.to_string(), "000003");
//!
//! editor.handle_key(Key::Hash);
//! for key in [Key::Digit(4), Key::Digit(2), Key::Hash] {
//!     editor.handle_key(key);
//! }
//! assert_eq!(editor.state(), EditorState::Done);
//! assert_eq!(editor.candidate().price, 42);
//! ```

use std::fmt;

use fruitpos_core::{
    Product, ProductName, Sku,
    constants::{CANCELLED_PRICE, NAME_LENGTH, PRICE_MODULUS},
};
use fruitpos_hardware::{DisplayDevice, Key};
use serde::{Deserialize, Serialize};

use crate::error::TerminalResult;

/// Column where every field value starts on the editor screen.
const FIELD_COLUMN: usize = 7;

/// Column of the price digits, after the `$ ` prefix.
const PRICE_COLUMN: usize = 9;

/// Highest name cursor position.
const LAST_POSITION: usize = NAME_LENGTH - 1;

/// Character drawn over the name cursor during the blink phase.
const CURSOR_GLYPH: &str = "_";

/// Edit session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorState {
    EditSku,
    EditName,
    EditPrice,
    /// Candidate committed; check and save it.
    Done,
    /// Candidate carries the cancellation price and must be discarded.
    Cancelled,
}

impl EditorState {
    /// Returns `true` once the session no longer accepts keys.
    pub fn is_final(self) -> bool {
        matches!(self, EditorState::Done | EditorState::Cancelled)
    }
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorState::EditSku => "EditSku",
            EditorState::EditName => "EditName",
            EditorState::EditPrice => "EditPrice",
            EditorState::Done => "Done",
            EditorState::Cancelled => "Cancelled",
        };
        write!(f, "{name}")
    }
}

/// One product edit session.
#[derive(Debug, Clone)]
pub struct ProductEditor {
    candidate: Product,
    state: EditorState,
    /// Name cursor, `0..NAME_LENGTH`.
    position: usize,
    /// Character under the name cursor.
    letter: u8,
}

impl ProductEditor {
    /// Start a session for the next record of a store holding
    /// `product_count` records.
    ///
    /// The SKU is preset to the count, zero-padded; editing starts on the
    /// name with `A` under the cursor.
    pub fn new(product_count: u8) -> Self {
        let mut editor = Self {
            candidate: Product {
                sku: Sku::from_number(u32::from(product_count)),
                name: ProductName::BLANK,
                price: 0,
            },
            state: EditorState::EditSku,
            position: 0,
            letter: b'A',
        };
        editor.enter_name_start();
        editor
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn candidate(&self) -> &Product {
        &self.candidate
    }

    /// Name cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns `true` once the session is done or cancelled.
    pub fn is_finished(&self) -> bool {
        self.state.is_final()
    }

    /// Consume the editor, returning the candidate.
    ///
    /// A cancelled candidate carries [`CANCELLED_PRICE`].
    pub fn into_product(self) -> Product {
        self.candidate
    }

    /// Apply one key and return the resulting state.
    ///
    /// Keys after the session has finished are ignored.
    pub fn handle_key(&mut self, key: Key) -> EditorState {
        if self.state.is_final() {
            return self.state;
        }

        match key {
            Key::Star => {
                self.candidate.price = CANCELLED_PRICE;
                self.state = EditorState::Cancelled;
            }
            Key::Hash => self.next_attribute(),
            _ => match self.state {
                EditorState::EditSku => self.edit_sku(key),
                EditorState::EditName => self.edit_name(key),
                EditorState::EditPrice => self.edit_price(key),
                EditorState::Done | EditorState::Cancelled => {}
            },
        }
        self.state
    }

    fn next_attribute(&mut self) {
        match self.state {
            EditorState::EditSku => self.enter_name_start(),
            EditorState::EditName => {
                self.state = EditorState::EditPrice;
                self.position = 0;
            }
            EditorState::EditPrice => self.state = EditorState::Done,
            EditorState::Done | EditorState::Cancelled => {}
        }
    }

    fn enter_name_start(&mut self) {
        self.state = EditorState::EditName;
        self.position = 0;
        self.letter = b'A';
        self.candidate.name.set_char(self.position, self.letter);
    }

    fn edit_sku(&mut self, key: Key) {
        let sku = &mut self.candidate.sku;
        match key {
            Key::Digit(digit) => sku.shift_in(digit),
            Key::A => sku.increment(),
            Key::B => sku.decrement(),
            Key::C => sku.clear(),
            Key::D => self.enter_name_start(),
            Key::Star | Key::Hash => {}
        }
    }

    fn edit_name(&mut self, key: Key) {
        match key {
            Key::Digit(digit) => self.letter = b'0' + digit,
            Key::A => self.letter = next_letter(self.letter),
            Key::B => self.letter = previous_letter(self.letter),
            Key::C => {
                self.candidate.name.set_char(self.position, b' ');
                if self.position == 0 {
                    self.state = EditorState::EditSku;
                    return;
                }
                self.position -= 1;
                self.letter = self.candidate.name.char_at(self.position).unwrap_or(b' ');
            }
            Key::D => {
                self.position = (self.position + 1).min(LAST_POSITION);
                self.letter = b'A';
                if self.position >= LAST_POSITION {
                    self.state = EditorState::EditPrice;
                }
            }
            Key::Star | Key::Hash => {}
        }
        self.candidate.name.set_char(self.position, self.letter);
    }

    fn edit_price(&mut self, key: Key) {
        let price = &mut self.candidate.price;
        match key {
            Key::Digit(digit) => {
                if *price > 999 {
                    *price %= 1000;
                }
                *price = *price * 10 + u16::from(digit);
            }
            Key::A => *price = (*price + 1) % PRICE_MODULUS,
            Key::B => *price = (*price + PRICE_MODULUS - 1) % PRICE_MODULUS,
            // Back to the name cursor left by the way in: 0 after `#`, the
            // last position after stepping through with `D`.
            Key::C => {
                *price = 0;
                self.state = EditorState::EditName;
                self.letter = self.candidate.name.char_at(self.position).unwrap_or(b' ');
            }
            Key::D => self.state = EditorState::Done,
            Key::Star | Key::Hash => {}
        }
    }

    /// Paint the editor screen.
    ///
    /// With `blink` set, the field being edited is blanked (the name shows a
    /// cursor glyph instead of the current letter).
    ///
    /// # Errors
    ///
    /// Returns the display's error if it is smaller than 3 × 20.
    pub fn render<D: DisplayDevice>(&self, display: &mut D, blink: bool) -> TerminalResult<()> {
        let product = &self.candidate;
        display.clear()?;
        display.write_line(0, &format!("SKU:   {}", product.sku))?;
        display.write_line(1, &format!("NAME:  {} ", product.name))?;
        display.write_line(2, &format!("PRICE: $ {:04}.00", product.price))?;

        if blink {
            match self.state {
                EditorState::EditSku => display.write_at(FIELD_COLUMN, 0, "      ")?,
                EditorState::EditName => {
                    display.write_at(FIELD_COLUMN + self.position, 1, CURSOR_GLYPH)?
                }
                EditorState::EditPrice => display.write_at(PRICE_COLUMN, 2, "       ")?,
                EditorState::Done | EditorState::Cancelled => {}
            }
        }
        Ok(())
    }
}

/// `A`..`Z` then space then back to `A`. Anything else restarts at `A`.
fn next_letter(letter: u8) -> u8 {
    match letter {
        b'A'..=b'Y' => letter + 1,
        b'Z' => b' ',
        _ => b'A',
    }
}

/// Reverse of [`next_letter`]: `A` goes to space, space to `Z`.
fn previous_letter(letter: u8) -> u8 {
    match letter {
        b'B'..=b'Z' => letter - 1,
        b'A' => b' ',
        b' ' => b'Z',
        _ => b' ',
    }
}
