//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fruitpos")]
#[command(author, version, about = "Two-node fruit store cash register", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// EEPROM image file, overriding the configuration
    #[arg(long, global = true)]
    pub eeprom: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run master and slave in one process, reading keys from stdin
    Run,

    /// Run the master node over a serial port
    #[cfg(feature = "hardware-serial")]
    Master {
        /// Serial device (defaults to the configured port)
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Run the slave node over a serial port
    #[cfg(feature = "hardware-serial")]
    Slave {
        /// Serial device (defaults to the configured port)
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Print the stored products as JSON
    Dump {
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Erase the product store and initialize it again
    Format,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dump() {
        let cli = Cli::parse_from(["fruitpos", "-vv", "dump", "--pretty", "--eeprom", "store.bin"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.eeprom, Some(PathBuf::from("store.bin")));
        assert!(matches!(cli.command, Commands::Dump { pretty: true }));
    }
}
