//! fruitpos - fruit store cash register
//!
//! Runs the master node (keypad, seller display, sale and product editor)
//! and the slave node (EEPROM product store, customer display), either
//! together in one process or apart over a serial port. The operator types
//! keypad legends (`0`-`9`, `A`-`D`, `*`, `#`) on stdin; both displays are
//! printed to stdout whenever they change. Logs go to stderr.

mod cli;
mod config;
mod console;
mod medium;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fruitpos_hardware::mock::{MockKeypad, MockLink};
use fruitpos_link::LinkClient;
use fruitpos_storage::ProductStore;
use fruitpos_terminal::{
    MasterTerminal, RenderScheduler, SharedDisplay, SlaveNode, VirtualDisplay,
};
use tokio::io::BufReader;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::console::DisplayMirror;
use crate::medium::StoreMedium;

/// Customer display rows; the seller display uses the builder default.
const CUSTOMER_ROWS: usize = 2;
const CUSTOMER_COLUMNS: usize = 20;

/// How often the console checks the displays for changes.
const MIRROR_PERIOD: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.eeprom {
        config.store.eeprom_path = Some(path);
    }

    match cli.command {
        Commands::Run => run_local(&config).await,
        #[cfg(feature = "hardware-serial")]
        Commands::Master { port } => serial::run_master(&config, port).await,
        #[cfg(feature = "hardware-serial")]
        Commands::Slave { port } => serial::run_slave(&config, port).await,
        Commands::Dump { pretty } => dump(&config, pretty),
        Commands::Format => format(&config),
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from info.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn seller_display() -> SharedDisplay {
    SharedDisplay::new(VirtualDisplay::builder().build())
}

fn customer_display() -> SharedDisplay {
    SharedDisplay::new(VirtualDisplay::new(CUSTOMER_ROWS, CUSTOMER_COLUMNS))
}

fn spawn_mirror(displays: Vec<DisplayMirror>) -> JoinHandle<()> {
    tokio::spawn(console::mirror(displays, MIRROR_PERIOD))
}

/// Both nodes in one process over an in-memory link.
async fn run_local(config: &AppConfig) -> Result<()> {
    let store_config = config.store_config();
    let (master_link, slave_link) = MockLink::pair();

    let customer = customer_display();
    let medium = StoreMedium::open(&store_config)?;
    let mut slave = SlaveNode::start(
        slave_link,
        medium,
        customer.clone(),
        config.link_config(),
        &store_config,
    )
    .await?;

    let seller = seller_display();
    let (keypad, keys) = MockKeypad::new();
    let scheduler = RenderScheduler::spawn(&config.scheduler_config());
    let mut master = MasterTerminal::new(
        keypad,
        seller.clone(),
        LinkClient::new(master_link, config.link_config()),
        scheduler.flags(),
        config.terminal_config(),
    );

    let mirror = spawn_mirror(vec![
        DisplayMirror::new("seller", seller),
        DisplayMirror::new("customer", customer),
    ]);
    let input = tokio::spawn(console::feed_keys(BufReader::new(tokio::io::stdin()), keys));
    info!("Type keypad legends and press enter; end input to quit");

    let result = tokio::select! {
        result = master.run() => result,
        result = slave.run() => result,
    };
    mirror.abort();
    input.abort();
    result?;
    Ok(())
}

#[cfg(feature = "hardware-serial")]
mod serial {
    use anyhow::{Context, Result};
    use fruitpos_hardware::SerialLink;
    use fruitpos_hardware::mock::MockKeypad;
    use fruitpos_link::LinkClient;
    use fruitpos_terminal::{MasterTerminal, RenderScheduler, SlaveNode};
    use tokio::io::BufReader;

    use super::{customer_display, seller_display, spawn_mirror};
    use crate::config::AppConfig;
    use crate::console::{self, DisplayMirror};
    use crate::medium::StoreMedium;

    fn open_link(config: &AppConfig, port: Option<String>) -> Result<SerialLink> {
        let port = port
            .or_else(|| config.link.serial_port.clone())
            .context("no serial port given (--port or FRUITPOS_SERIAL_PORT)")?;
        SerialLink::open(&port, config.link.baud_rate)
            .with_context(|| format!("opening serial port {port}"))
    }

    pub async fn run_master(config: &AppConfig, port: Option<String>) -> Result<()> {
        let link = open_link(config, port)?;
        let seller = seller_display();
        let (keypad, keys) = MockKeypad::new();
        let scheduler = RenderScheduler::spawn(&config.scheduler_config());
        let mut master = MasterTerminal::new(
            keypad,
            seller.clone(),
            LinkClient::new(link, config.link_config()),
            scheduler.flags(),
            config.terminal_config(),
        );

        let mirror = spawn_mirror(vec![DisplayMirror::new("seller", seller)]);
        let input = tokio::spawn(console::feed_keys(BufReader::new(tokio::io::stdin()), keys));
        let result = master.run().await;
        mirror.abort();
        input.abort();
        Ok(result?)
    }

    pub async fn run_slave(config: &AppConfig, port: Option<String>) -> Result<()> {
        let link = open_link(config, port)?;
        let store_config = config.store_config();
        let customer = customer_display();
        let mut slave = SlaveNode::start(
            link,
            StoreMedium::open(&store_config)?,
            customer.clone(),
            config.link_config(),
            &store_config,
        )
        .await?;

        let mirror = spawn_mirror(vec![DisplayMirror::new("customer", customer)]);
        let result = slave.run().await;
        mirror.abort();
        Ok(result?)
    }
}

fn dump(config: &AppConfig, pretty: bool) -> Result<()> {
    let store_config = config.store_config();
    let store = ProductStore::open(StoreMedium::open(&store_config)?, &store_config)?;
    let products = store.products()?;
    let json = if pretty {
        serde_json::to_string_pretty(&products)?
    } else {
        serde_json::to_string(&products)?
    };
    println!("{json}");
    Ok(())
}

fn format(config: &AppConfig) -> Result<()> {
    let store_config = config.store_config();
    let path = store_config
        .eeprom_path
        .as_ref()
        .context("format needs an EEPROM image (--eeprom or FRUITPOS_EEPROM_PATH)")?;
    let store = ProductStore::reinitialize(StoreMedium::open(&store_config)?, &store_config)?;
    info!(path = %path.display(), count = store.count()?, "Store formatted");
    Ok(())
}
