//! Master terminal and slave node logic.
//!
//! This crate contains everything that runs on the two boards above the
//! peripheral layer:
//!
//! - [`MasterTerminal`]: main menu, [`ProductEditor`] and [`SaleWorkflow`]
//!   driven by the keypad, painted on a 20x4 display.
//! - [`SlaveNode`]: the product store served over the link, with a customer
//!   display.
//! - [`RenderScheduler`]: the repaint and blink timers.
//! - [`VirtualDisplay`]: an in-memory character LCD for hosts without one.
//!
//! Editor and sale are plain state machines fed one key at a time, so they
//! are tested without a runtime.

pub mod config;
pub mod display;
pub mod editor;
pub mod error;
pub mod master;
pub mod menu;
pub mod sale;
pub mod scheduler;
pub mod slave;

pub use config::{SchedulerConfig, TerminalConfig};
pub use display::{
    Alignment, SharedDisplay, VirtualDisplay, VirtualDisplayBuilder, align_text, truncate_text,
};
pub use editor::{EditorState, ProductEditor};
pub use error::{TerminalError, TerminalResult};
pub use master::{FAREWELL_MESSAGE, MasterTerminal, PurchaseOutcome, SaveOutcome, Session};
pub use menu::{MainMenu, MenuChoice};
pub use sale::{SaleEvent, SaleState, SaleWorkflow};
pub use scheduler::{RenderFlags, RenderScheduler};
pub use slave::SlaveNode;
