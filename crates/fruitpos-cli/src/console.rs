//! Operator console: keypad input from stdin, displays mirrored to stdout.

use std::time::Duration;

use anyhow::Result;
use fruitpos_hardware::Key;
use fruitpos_hardware::mock::MockKeypadHandle;
use fruitpos_terminal::SharedDisplay;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Split a line of operator input into keys and characters with no key.
///
/// Whitespace separates nothing and is skipped.
pub fn parse_keys(line: &str) -> (Vec<Key>, Vec<char>) {
    let mut keys = Vec::new();
    let mut rejected = Vec::new();
    for c in line.chars().filter(|c| !c.is_whitespace()) {
        match Key::from_char(c) {
            Some(key) => keys.push(key),
            None => rejected.push(c),
        }
    }
    (keys, rejected)
}

/// Tap the keys typed on `input` until it closes.
///
/// Dropping the handle on return unplugs the keypad, which stops the
/// master.
pub async fn feed_keys<R>(input: R, keypad: MockKeypadHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let (keys, rejected) = parse_keys(&line);
        if !rejected.is_empty() {
            warn!(?rejected, "No key for these characters");
        }
        keypad.tap_all(&keys).await?;
    }
    debug!("Operator input closed");
    Ok(())
}

/// A display whose frame is printed whenever it changes.
pub struct DisplayMirror {
    label: &'static str,
    display: SharedDisplay,
    last: Option<String>,
}

impl DisplayMirror {
    pub fn new(label: &'static str, display: SharedDisplay) -> Self {
        Self {
            label,
            display,
            last: None,
        }
    }

    /// The labelled frame if it differs from the last one returned.
    pub fn changed(&mut self) -> Option<String> {
        let frame = self.display.snapshot().render();
        if self.last.as_ref() == Some(&frame) {
            return None;
        }
        let out = format!("{}\n{frame}", self.label);
        self.last = Some(frame);
        Some(out)
    }
}

/// Print changed frames every `period`, forever.
pub async fn mirror(mut displays: Vec<DisplayMirror>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        for display in &mut displays {
            if let Some(frame) = display.changed() {
                println!("{frame}");
            }
        }
    }
}
