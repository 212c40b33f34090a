//! Main menu of the master terminal.

use fruitpos_hardware::{DisplayDevice, Key};

use crate::error::TerminalResult;

/// Splash line shown above the menu entries.
pub const TITLE: &str = " Electro-FruitStore";

/// Column of the selection arrow.
const ARROW_COLUMN: usize = 17;

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewProduct,
    Purchase,
}

impl MenuChoice {
    const ALL: [MenuChoice; 2] = [MenuChoice::NewProduct, MenuChoice::Purchase];

    fn label(self) -> &'static str {
        match self {
            MenuChoice::NewProduct => "1. New Product",
            MenuChoice::Purchase => "2. Purchase Mode",
        }
    }
}

/// Menu cursor.
///
/// `A`/`B` move the arrow, `#`/`D` pick the entry under it and `1`/`2`
/// pick an entry directly.
///
/// ```
/// use fruitpos_hardware::Key;
/// use fruitpos_terminal::{MainMenu, MenuChoice};
///
/// let mut menu = MainMenu::new();
/// assert_eq!(menu.handle_key(Key::A), None);
/// assert_eq!(menu.handle_key(Key::Hash), Some(MenuChoice::Purchase));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MainMenu {
    position: usize,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> MenuChoice {
        MenuChoice::ALL[self.position]
    }

    pub fn handle_key(&mut self, key: Key) -> Option<MenuChoice> {
        let entries = MenuChoice::ALL.len();
        match key {
            Key::A => {
                self.position = (self.position + 1) % entries;
                None
            }
            Key::B => {
                self.position = (self.position + entries - 1) % entries;
                None
            }
            Key::Hash | Key::D => Some(self.selected()),
            Key::Digit(digit) => {
                let index = usize::from(digit).checked_sub(1)?;
                let choice = MenuChoice::ALL.get(index).copied()?;
                self.position = index;
                Some(choice)
            }
            Key::C | Key::Star => None,
        }
    }

    /// Paint the menu with an arrow on the selected entry.
    ///
    /// # Errors
    ///
    /// Returns the display's error if it is smaller than 3 × 20.
    pub fn render<D: DisplayDevice>(&self, display: &mut D) -> TerminalResult<()> {
        display.clear()?;
        display.write_line(0, TITLE)?;
        for (row, choice) in MenuChoice::ALL.iter().enumerate() {
            display.write_line(row + 1, choice.label())?;
        }
        display.write_at(ARROW_COLUMN, self.position + 1, "<-")?;
        Ok(())
    }
}
