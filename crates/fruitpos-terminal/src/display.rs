//! Virtual character LCD.
//!
//! [`VirtualDisplay`] keeps a rows × columns character buffer and implements
//! [`DisplayDevice`], so the terminal logic can paint it exactly as it
//! paints a physical HD44780 module. The master uses a 4 × 20 panel, the
//! slave's customer display is 2 × 20.
//!
//! # Character Encoding - ASCII Only
//!
//! Character LCDs have no Unicode support. Anything outside printable ASCII
//! (0x20-0x7E) is written as a space, so a corrupted record still renders
//! without shifting the rest of the line.
//!
//! # Examples
//!
//! ```
//! use fruitpos_terminal::VirtualDisplay;
//!
//! let mut display = VirtualDisplay::new(2, 20);
//! display.set_line(0, "000000 APPLE").unwrap();
//! display.set_line(1, "$ 0038").unwrap();
//!
//! assert_eq!(display.get_line(1).unwrap(), "$ 0038              ");
//! ```
//!
//! ## Builder Pattern
//!
//! ```
//! use fruitpos_terminal::VirtualDisplay;
//!
//! let display = VirtualDisplay::builder()
//!     .with_size(2, 16)
//!     .build();
//!
//! assert_eq!(display.get_all_lines(), vec![" ".repeat(16); 2]);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fruitpos_core::{Error, Result};
use fruitpos_hardware::{DisplayDevice, HardwareError};

/// Rows of the master's 20x4 panel.
const DEFAULT_LINES: usize = 4;

/// Characters per row of a 20-column panel.
const DEFAULT_COLUMNS: usize = 20;

/// Text alignment options for display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Text starts at column 0, padded with spaces on the right.
    Left,
    /// Text centered with equal padding on both sides (extra space on right if odd).
    Center,
    /// Text ends at the last column, padded with spaces on the left.
    Right,
}

/// In-memory character LCD.
///
/// Every line is always exactly `columns` characters long.
///
/// # Thread Safety
///
/// This struct is not thread-safe. Wrap it in a [`SharedDisplay`] to paint
/// it from one task and observe it from another.
#[derive(Debug, Clone)]
pub struct VirtualDisplay {
    /// Number of lines in the display.
    lines: usize,

    /// Number of columns per line.
    columns: usize,

    /// Current display buffer (printable ASCII only).
    buffer: Vec<String>,
}

impl VirtualDisplay {
    /// Create a blank display with the given dimensions.
    pub fn new(lines: usize, columns: usize) -> Self {
        Self {
            lines,
            columns,
            buffer: vec![" ".repeat(columns); lines],
        }
    }

    pub fn builder() -> VirtualDisplayBuilder {
        VirtualDisplayBuilder::default()
    }

    /// Replace a whole line, left aligned.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if the line index is out of bounds.
    pub fn set_line(&mut self, line: usize, text: &str) -> Result<()> {
        self.check_line(line)?;
        self.buffer[line] = align_text(&sanitize_text(text), self.columns, Alignment::Left);
        Ok(())
    }

    /// Overwrite characters starting at (`column`, `line`).
    ///
    /// Text running past the last column is cut off, as on the hardware
    /// when auto-wrap is disabled.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` or `Error::InvalidColumn` if the start
    /// position is off-screen.
    pub fn write_text(&mut self, column: usize, line: usize, text: &str) -> Result<()> {
        self.check_line(line)?;
        if column >= self.columns {
            return Err(Error::InvalidColumn {
                column,
                max: self.columns - 1,
            });
        }

        let text = truncate_text(&sanitize_text(text), self.columns - column);
        let end = column + text.len();
        // Buffer holds printable ASCII only, so byte and char indices agree.
        self.buffer[line].replace_range(column..end, &text);
        Ok(())
    }

    /// Blank every line.
    pub fn clear(&mut self) {
        for line in &mut self.buffer {
            *line = " ".repeat(self.columns);
        }
    }

    /// Text of a line, padded to the column width.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if the line index is out of bounds.
    pub fn get_line(&self, line: usize) -> Result<&str> {
        self.check_line(line)?;
        Ok(&self.buffer[line])
    }

    pub fn get_all_lines(&self) -> Vec<&str> {
        self.buffer.iter().map(|s| s.as_str()).collect()
    }

    /// Returns `true` if nothing but spaces is shown.
    pub fn is_blank(&self) -> bool {
        self.buffer.iter().all(|line| line.trim().is_empty())
    }

    /// Draw the panel with a frame, for terminals and logs.
    ///
    /// ```
    /// use fruitpos_terminal::VirtualDisplay;
    ///
    /// let mut display = VirtualDisplay::new(1, 4);
    /// display.set_line(0, " OK").unwrap();
    /// assert_eq!(display.render(), "+----+\n| OK |\n+----+");
    /// ```
    pub fn render(&self) -> String {
        let border = format!("+{}+", "-".repeat(self.columns));
        let mut out = border.clone();
        for line in &self.buffer {
            out.push_str("\n|");
            out.push_str(line);
            out.push('|');
        }
        out.push('\n');
        out.push_str(&border);
        out
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if line >= self.lines {
            return Err(Error::InvalidLine {
                line,
                max: self.lines.saturating_sub(1),
            });
        }
        Ok(())
    }
}

impl DisplayDevice for VirtualDisplay {
    fn rows(&self) -> usize {
        self.lines
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn clear(&mut self) -> fruitpos_hardware::Result<()> {
        VirtualDisplay::clear(self);
        Ok(())
    }

    fn write_at(&mut self, column: usize, row: usize, text: &str) -> fruitpos_hardware::Result<()> {
        self.write_text(column, row, text)
            .map_err(|err| HardwareError::invalid_data(err.to_string()))
    }
}

/// Cloneable handle to a [`VirtualDisplay`].
///
/// The node paints through one clone while an observer (the console front
/// end, a test) takes snapshots through another.
///
/// ```
/// use fruitpos_hardware::DisplayDevice;
/// use fruitpos_terminal::{SharedDisplay, VirtualDisplay};
///
/// let mut display = SharedDisplay::new(VirtualDisplay::new(2, 20));
/// let observer = display.clone();
///
/// display.write_line(0, "Come Back Soon").unwrap();
/// assert_eq!(observer.snapshot().get_line(0).unwrap().trim_end(), "Come Back Soon");
/// ```
#[derive(Debug, Clone)]
pub struct SharedDisplay {
    inner: Arc<Mutex<VirtualDisplay>>,
}

impl SharedDisplay {
    pub fn new(display: VirtualDisplay) -> Self {
        Self {
            inner: Arc::new(Mutex::new(display)),
        }
    }

    /// Copy of the current panel contents.
    pub fn snapshot(&self) -> VirtualDisplay {
        self.lock().clone()
    }

    // A panic while painting leaves a consistent buffer, so poisoning is
    // ignored.
    fn lock(&self) -> MutexGuard<'_, VirtualDisplay> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplayDevice for SharedDisplay {
    fn rows(&self) -> usize {
        self.lock().lines
    }

    fn columns(&self) -> usize {
        self.lock().columns
    }

    fn clear(&mut self) -> fruitpos_hardware::Result<()> {
        self.lock().clear();
        Ok(())
    }

    fn write_at(&mut self, column: usize, row: usize, text: &str) -> fruitpos_hardware::Result<()> {
        DisplayDevice::write_at(&mut *self.lock(), column, row, text)
    }
}

/// Builder for [`VirtualDisplay`].
#[derive(Debug)]
pub struct VirtualDisplayBuilder {
    lines: usize,
    columns: usize,
}

impl VirtualDisplayBuilder {
    pub fn with_size(mut self, lines: usize, columns: usize) -> Self {
        self.lines = lines;
        self.columns = columns;
        self
    }

    pub fn build(self) -> VirtualDisplay {
        VirtualDisplay::new(self.lines, self.columns)
    }
}

impl Default for VirtualDisplayBuilder {
    fn default() -> Self {
        Self {
            lines: DEFAULT_LINES,
            columns: DEFAULT_COLUMNS,
        }
    }
}

/// Truncate ASCII text to a maximum number of characters.
///
/// ```
/// use fruitpos_terminal::truncate_text;
///
/// assert_eq!(truncate_text("STRAWBERRY", 5), "STRAW");
/// assert_eq!(truncate_text("KIWI", 10), "KIWI");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Align ASCII text within a fixed width, padding with spaces.
///
/// The result is exactly `width` characters long.
///
/// ```
/// use fruitpos_terminal::{align_text, Alignment};
///
/// assert_eq!(align_text("KIWI", 10, Alignment::Left), "KIWI      ");
/// assert_eq!(align_text("KIWI", 10, Alignment::Center), "   KIWI   ");
/// assert_eq!(align_text("KIWI", 10, Alignment::Right), "      KIWI");
/// ```
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let char_count = text.chars().count();

    if char_count >= width {
        return truncate_text(text, width);
    }

    let padding = width - char_count;

    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

/// Replace anything the panel cannot show with a space.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { ' ' })
        .collect()
}
