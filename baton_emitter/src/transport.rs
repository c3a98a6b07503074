// Batch delivery.
//
// `Transport` is the seam between translation and the network: one call,
// one destination, one batch. `TcpTransport` is the real thing. It encodes
// the batch as an OSC bundle, opens a fresh connection, writes the single
// framed packet, and closes. Encoding happens before connecting, so a batch
// that cannot be encoded never opens a socket.
//
// `RecordingTransport` keeps batches in memory instead of sending them. The
// emitter's tests use it to observe exactly what would have gone out, and
// the CLI uses it for `--dry-run`.

use std::io::{self, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

use baton_protocol::{Batch, write_packet};
use tracing::{debug, trace};

use crate::config::{Destination, EmitterConfig};
use crate::error::EmitError;

/// Delivers one batch to one destination, atomically from the caller's
/// point of view: the whole batch is handed over in a single send.
pub trait Transport {
    fn send(&self, destination: &Destination, batch: &Batch) -> Result<(), EmitError>;
}

/// OSC-over-TCP transport. A zero timeout means "no timeout".
#[derive(Clone, Debug)]
pub struct TcpTransport {
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::from_config(&EmitterConfig::default())
    }
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            write_timeout,
        }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self::new(config.connect_timeout(), config.write_timeout())
    }

    fn connect(&self, destination: &Destination) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (destination.host.as_str(), destination.port).to_socket_addrs()? {
            trace!("connecting to {} ({})", destination, addr);
            let attempt = if self.connect_timeout.is_zero() {
                TcpStream::connect(addr)
            } else {
                TcpStream::connect_timeout(&addr, self.connect_timeout)
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{destination} resolved to no addresses"),
            )
        }))
    }
}

impl Transport for TcpTransport {
    fn send(&self, destination: &Destination, batch: &Batch) -> Result<(), EmitError> {
        let packet = batch.encode()?;
        let stream = self.connect(destination)?;
        if !self.write_timeout.is_zero() {
            stream.set_write_timeout(Some(self.write_timeout))?;
        }
        let mut writer = BufWriter::new(stream);
        write_packet(&mut writer, &packet)?;
        debug!(
            "wrote {} messages ({} bytes) to {}",
            batch.len(),
            packet.len(),
            destination
        );
        Ok(())
    }
}

/// In-memory transport that records every batch it is given.
///
/// Optionally fails every send with a fixed I/O error kind, to exercise
/// transport failure paths without a network.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(Destination, Batch)>>,
    fail_with: Option<io::ErrorKind>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(kind),
        }
    }

    /// Everything sent so far, in send order.
    pub fn sent(&self) -> Vec<(Destination, Batch)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, destination: &Destination, batch: &Batch) -> Result<(), EmitError> {
        if let Some(kind) = self.fail_with {
            let err = io::Error::new(kind, format!("simulated failure sending to {destination}"));
            return Err(err.into());
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((destination.clone(), batch.clone()));
        Ok(())
    }
}
