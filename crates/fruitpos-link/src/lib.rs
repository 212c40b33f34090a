//! Link layer between the fruitpos master and slave nodes.
//!
//! This crate runs the command protocol of `fruitpos-protocol` over any
//! [`LinkTransport`](fruitpos_hardware::LinkTransport): an in-memory pair
//! in tests and the `run` command, or a serial port between two machines.
//!
//! # Components
//!
//! - [`exchange`]: the ready/ack record handshake shared by both sides
//! - [`LinkClient`]: the master's request methods
//! - [`LinkServer`]: the slave's request loop primitives
//!
//! # Example
//!
//! ```no_run
//! use fruitpos_hardware::mock::MockLink;
//! use fruitpos_link::{LinkClient, LinkConfig, LinkServer};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (master_end, slave_end) = MockLink::pair();
//! let config = LinkConfig::default().with_timeout(Duration::from_secs(2));
//!
//! let mut server = LinkServer::new(slave_end, config);
//! tokio::spawn(async move {
//!     while let Ok(request) = server.next_request().await {
//!         if request.is_some() {
//!             let _ = server.send_count(0).await;
//!         }
//!     }
//! });
//!
//! let mut client = LinkClient::new(master_end, config);
//! assert_eq!(client.product_count().await?, 0);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod exchange;
pub mod server;

pub use client::LinkClient;
pub use config::LinkConfig;
pub use error::{LinkError, LinkResult};
pub use exchange::Received;
pub use server::LinkServer;
