//! Serial port link through the `serialport` crate.
//!
//! The port is blocking, so it never runs on the async executor: a reader
//! thread pumps incoming bytes into a tokio channel and a writer thread
//! drains outgoing bytes from a channel onto the port, in send order.

use std::io::{ErrorKind, Read, Write};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{HardwareError, Result, traits::LinkTransport, types::DeviceInfo};

/// Read timeout of the pump thread; bounds how long it takes to notice the
/// link has been dropped.
const PUMP_POLL: Duration = Duration::from_millis(100);

/// 8N1 serial link to the other node.
pub struct SerialLink {
    device: String,
    baud_rate: u32,
    tx: std_mpsc::Sender<u8>,
    rx: mpsc::UnboundedReceiver<u8>,
    peeked: Option<u8>,
}

impl SerialLink {
    /// Open `device` at `baud_rate`, 8 data bits, no parity, one stop bit.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the port cannot be
    /// opened or cloned for the reader thread, or a thread cannot start.
    pub fn open(device: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(PUMP_POLL)
            .open()?;

        let reader = port.try_clone()?;
        let (pump_tx, rx) = mpsc::unbounded_channel();
        let name = device.to_string();
        thread::Builder::new()
            .name(format!("serial-pump-{device}"))
            .spawn(move || pump(reader, pump_tx, name))?;

        let (tx, outgoing) = std_mpsc::channel();
        let name = device.to_string();
        thread::Builder::new()
            .name(format!("serial-write-{device}"))
            .spawn(move || drain(port, outgoing, &name))?;

        info!(device, baud_rate, "Opened serial link");

        Ok(Self {
            device: device.to_string(),
            baud_rate,
            tx,
            rx,
            peeked: None,
        })
    }

    pub fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.device.clone(), format!("serial {} 8N1", self.baud_rate))
    }
}

fn pump(mut reader: Box<dyn SerialPort>, tx: mpsc::UnboundedSender<u8>, device: String) {
    let mut buf = [0u8; 64];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                for &byte in &buf[..n] {
                    if tx.send(byte).is_err() {
                        debug!(device, "Serial link dropped, stopping pump");
                        return;
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                if tx.is_closed() {
                    return;
                }
            }
            Err(e) => {
                warn!(device, error = %e, "Serial read failed, stopping pump");
                return;
            }
        }
    }
}

/// Write each byte from `outgoing` until the link is dropped or a write
/// fails.
///
/// A failed write ends the thread, so the next `send` reports it.
fn drain<W: Write>(mut port: W, outgoing: std_mpsc::Receiver<u8>, device: &str) {
    for byte in outgoing {
        if let Err(e) = port.write_all(&[byte]).and_then(|()| port.flush()) {
            warn!(device, error = %e, "Serial write failed, stopping writer");
            return;
        }
    }
    debug!(device, "Serial link dropped, stopping writer");
}

impl LinkTransport for SerialLink {
    async fn send(&mut self, byte: u8) -> Result<()> {
        self.tx.send(byte).map_err(|_| {
            HardwareError::communication(format!("serial writer for {} stopped", self.device))
        })
    }

    async fn receive(&mut self) -> Result<u8> {
        if let Some(byte) = self.peeked.take() {
            return Ok(byte);
        }
        self.rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(self.device.clone()))
    }

    fn has_data(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.rx.try_recv().ok();
        }
        self.peeked.is_some()
    }
}
