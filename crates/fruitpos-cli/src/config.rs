//! Application configuration.
//!
//! Settings come from an optional TOML file, then from `FRUITPOS_*`
//! environment variables, and fall back to defaults for anything left
//! unset.
//!
//! ```toml
//! [link]
//! timeout_ms = 500
//! serial_port = "/dev/ttyUSB0"
//! baud_rate = 9600
//!
//! [store]
//! eeprom_path = "fruitpos.eeprom"
//! capacity = 512
//! seed_default_catalog = true
//!
//! [render]
//! tick_ms = 12
//! ticks_per_render = 4
//! blink_ms = 420
//!
//! [terminal]
//! message_delay_ms = 2000
//! key_edge = "press"
//! poll_ms = 12
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fruitpos_core::constants::DEFAULT_MEDIUM_CAPACITY;
use fruitpos_hardware::KeyEdge;
use fruitpos_link::LinkConfig;
use fruitpos_storage::StoreConfig;
use fruitpos_terminal::{SchedulerConfig, TerminalConfig};
use serde::{Deserialize, Serialize};

pub const ENV_LINK_TIMEOUT_MS: &str = "FRUITPOS_LINK_TIMEOUT_MS";
pub const ENV_EEPROM_PATH: &str = "FRUITPOS_EEPROM_PATH";
pub const ENV_SERIAL_PORT: &str = "FRUITPOS_SERIAL_PORT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub link: LinkSection,
    pub store: StoreSection,
    pub render: RenderSection,
    pub terminal: TerminalSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSection {
    /// Bound on every wait for a peer byte; unset waits forever.
    pub timeout_ms: Option<u64>,
    pub serial_port: Option<String>,
    pub baud_rate: u32,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            serial_port: None,
            baud_rate: 9600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// EEPROM image file; unset keeps the store in memory.
    pub eeprom_path: Option<PathBuf>,
    pub capacity: usize,
    pub seed_default_catalog: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            eeprom_path: None,
            capacity: DEFAULT_MEDIUM_CAPACITY,
            seed_default_catalog: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub tick_ms: u64,
    pub ticks_per_render: u8,
    pub blink_ms: u64,
}

impl Default for RenderSection {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            tick_ms: scheduler.tick.as_millis() as u64,
            ticks_per_render: scheduler.ticks_per_render,
            blink_ms: scheduler.blink.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSection {
    pub message_delay_ms: u64,
    pub key_edge: KeyEdge,
    pub poll_ms: u64,
}

impl Default for TerminalSection {
    fn default() -> Self {
        let terminal = TerminalConfig::default();
        Self {
            message_delay_ms: terminal.message_delay.as_millis() as u64,
            key_edge: terminal.key_edge,
            poll_ms: terminal.poll_interval.as_millis() as u64,
        }
    }
}

impl AppConfig {
    /// Load the file at `path` (defaults if `None`) and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or an override is
    /// malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply `FRUITPOS_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_LINK_TIMEOUT_MS) {
            let timeout = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_LINK_TIMEOUT_MS} must be milliseconds, got {value:?}"))?;
            self.link.timeout_ms = Some(timeout);
        }
        if let Some(value) = lookup(ENV_EEPROM_PATH) {
            self.store.eeprom_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_SERIAL_PORT) {
            self.link.serial_port = Some(value);
        }
        Ok(())
    }

    pub fn link_config(&self) -> LinkConfig {
        match self.link.timeout_ms {
            Some(ms) => LinkConfig::default().with_timeout(Duration::from_millis(ms)),
            None => LinkConfig::default(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            eeprom_path: self.store.eeprom_path.clone(),
            capacity: self.store.capacity,
            seed_default_catalog: self.store.seed_default_catalog,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick: Duration::from_millis(self.render.tick_ms),
            ticks_per_render: self.render.ticks_per_render,
            blink: Duration::from_millis(self.render.blink_ms),
        }
    }

    pub fn terminal_config(&self) -> TerminalConfig {
        TerminalConfig::default()
            .with_message_delay(Duration::from_millis(self.terminal.message_delay_ms))
            .with_key_edge(self.terminal.key_edge)
            .with_poll_interval(Duration::from_millis(self.terminal.poll_ms))
    }
}
