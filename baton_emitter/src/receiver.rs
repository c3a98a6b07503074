// A minimal receiving player.
//
// Listens on localhost, accepts any number of emitter connections, and
// turns every framed OSC bundle that arrives into a typed `Batch`. Batches
// are handed to the owner of the `ReceiverHandle` over an `mpsc` channel in
// arrival order. Nothing is played; this exists to observe what an emitter
// sends (integration tests, `baton listen`).
//
// Threads:
// - **Listener thread**: non-blocking `accept()` loop that checks the
//   `keep_running` flag between polls, spawning a reader per connection.
// - **Reader threads** (one per connection): `read_packet` in a loop until
//   EOF. A packet that does not decode as a protocol batch is logged and
//   the connection is dropped; the listener keeps going.
//
// `stop()` clears the flag and joins the listener. Reader threads end on
// their own when their peer disconnects.

use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use baton_protocol::{Batch, read_packet};
use tracing::{debug, warn};

/// How long the listener sleeps between accept polls.
const ACCEPT_POLL: Duration = Duration::from_millis(20);

/// Handle to a running receiver.
pub struct ReceiverHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
    batches: Receiver<Batch>,
}

impl ReceiverHandle {
    /// Wait up to `timeout` for the next batch.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Batch> {
        self.batches.recv_timeout(timeout).ok()
    }

    /// Block until the next batch arrives or every sender is gone.
    pub fn recv(&self) -> Option<Batch> {
        self.batches.recv().ok()
    }

    /// Every batch received so far that has not been taken yet.
    pub fn drain(&self) -> Vec<Batch> {
        self.batches.try_iter().collect()
    }

    /// Stop accepting connections and wait for the listener to exit.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            join_listener(handle);
        }
    }
}

/// Start a receiver on `127.0.0.1:port`. Port 0 lets the OS choose; the
/// bound address is returned alongside the handle.
pub fn start_receiver(port: u16) -> io::Result<(ReceiverHandle, SocketAddr)> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    let keep_running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = mpsc::channel();

    let keep_running_listener = keep_running.clone();
    let thread = thread::spawn(move || accept_loop(listener, tx, keep_running_listener));
    debug!("receiver listening on {}", addr);

    Ok((
        ReceiverHandle {
            keep_running,
            thread: Some(thread),
            batches: rx,
        },
        addr,
    ))
}

/// Wait for the listener thread. Returns false (and logs) if it panicked.
fn join_listener(handle: thread::JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("receiver listener thread panicked");
            false
        }
    }
}

fn accept_loop(listener: TcpListener, tx: Sender<Batch>, keep_running: Arc<AtomicBool>) {
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("receiver accepted connection from {}", peer);
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!("dropping connection from {}: {}", peer, e);
                    continue;
                }
                let tx = tx.clone();
                thread::spawn(move || read_loop(stream, peer, tx));
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                warn!("receiver accept failed: {}", e);
                break;
            }
        }
    }
}

fn read_loop(stream: TcpStream, peer: SocketAddr, tx: Sender<Batch>) {
    let mut reader = BufReader::new(stream);
    loop {
        let packet = match read_packet(&mut reader) {
            Ok(packet) => packet,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                warn!("read from {} failed: {}", peer, e);
                break;
            }
        };
        match Batch::decode(&packet) {
            Ok(batch) => {
                debug!("received {} messages from {}", batch.len(), peer);
                if tx.send(batch).is_err() {
                    break; // Handle dropped.
                }
            }
            Err(e) => {
                warn!("malformed batch from {}: {}", peer, e);
                break;
            }
        }
    }
}
