//! Request codes sent by the master node.
//!
//! Every exchange on the link starts with exactly one request byte from the
//! master. What follows depends on the request:
//!
//! | Code | Request | Master then sends | Slave replies |
//! |------|---------|-------------------|---------------|
//! | 0 | `ProductCount` | nothing | one count byte |
//! | 1 | `SendProduct` | one index byte | one record (handshaked) |
//! | 2 | `ReceiveProduct` | one record (handshaked) | ready + ack |
//! | 3 | `SaveProduct` | one record (handshaked) | ready + ack |
//! | 4 | `PrintMessage` | text, `0x00`, `0x0D` | nothing |
//! | 5 | `ClearScreen` | nothing | nothing |
//!
//! # Examples
//!
//! ```
//! use fruitpos_protocol::CommandCode;
//!
//! let cmd = CommandCode::from_byte(3).unwrap();
//! assert_eq!(cmd, CommandCode::SaveProduct);
//! assert_eq!(cmd.as_byte(), 3);
//! assert!(CommandCode::from_byte(6).is_err());
//! ```

use fruitpos_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request codes understood by the slave node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandCode {
    /// Slave answers with the number of stored records.
    ProductCount = 0,

    /// Slave emits the record at the index byte that follows.
    SendProduct = 1,

    /// Slave receives a record and displays it without persisting.
    ReceiveProduct = 2,

    /// Slave receives a record, validates it and appends it to the store.
    SaveProduct = 3,

    /// Slave renders the text payload on its customer display.
    PrintMessage = 4,

    /// Slave clears its display.
    ClearScreen = 5,
}

impl CommandCode {
    /// All request codes in wire order.
    pub const ALL: [CommandCode; 6] = [
        CommandCode::ProductCount,
        CommandCode::SendProduct,
        CommandCode::ReceiveProduct,
        CommandCode::SaveProduct,
        CommandCode::PrintMessage,
        CommandCode::ClearScreen,
    ];

    /// Decode a request byte.
    ///
    /// # Errors
    /// Returns `Error::InvalidCommandCode` for bytes outside 0-5.
    #[inline]
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .get(byte as usize)
            .copied()
            .ok_or(Error::InvalidCommandCode { code: byte })
    }

    #[inline]
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` if a handshaked product record follows the request.
    #[must_use]
    pub fn carries_record(self) -> bool {
        matches!(
            self,
            CommandCode::ReceiveProduct | CommandCode::SaveProduct
        )
    }

    /// Returns `true` if the slave sends bytes back.
    #[must_use]
    pub fn expects_reply(self) -> bool {
        !matches!(self, CommandCode::PrintMessage | CommandCode::ClearScreen)
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandCode::ProductCount => "ProductCount",
            CommandCode::SendProduct => "SendProduct",
            CommandCode::ReceiveProduct => "ReceiveProduct",
            CommandCode::SaveProduct => "SaveProduct",
            CommandCode::PrintMessage => "PrintMessage",
            CommandCode::ClearScreen => "ClearScreen",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Self::from_byte(byte)
    }
}

impl From<CommandCode> for u8 {
    fn from(code: CommandCode) -> Self {
        code.as_byte()
    }
}
