use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, OnceLock, TryLockError};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};

use crate::status::AtomicStatus;
use crate::{LinkConfig, LinkError, Status};

/// State shared between a [`SocketLink`] and its network thread.
struct Shared {
    status: AtomicStatus,
    /// Set once, right before the link enters a terminal state.
    last_error: OnceLock<String>,
    /// Outbound queue of the current client's writer thread, if any.
    outbound: Mutex<Option<Sender<u8>>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            status: AtomicStatus::new(Status::Down),
            last_error: OnceLock::new(),
            outbound: Mutex::new(None),
        }
    }

    fn fail(&self, err: &LinkError) {
        let _ = self.last_error.set(err.to_string());
        self.status.store(err.terminal_status());
    }

    fn attach(&self, outbound: Sender<u8>) {
        *self.outbound.lock().unwrap_or_else(|p| p.into_inner()) = Some(outbound);
    }

    fn detach(&self) -> Option<Sender<u8>> {
        self.outbound.lock().unwrap_or_else(|p| p.into_inner()).take()
    }
}

/// Connection manager for one TCP port.
///
/// Binding happens synchronously in [`SocketLink::spawn`]; accepting and
/// reading run on a named background thread that lives as long as the
/// process, and each client gets its own writer thread. No method here
/// touches a socket, so all of them are safe to call from the simulation
/// thread.
pub struct SocketLink {
    port: u16,
    local_addr: Option<SocketAddr>,
    shared: Arc<Shared>,
    inbound: Receiver<u8>,
}

impl SocketLink {
    /// Bind `port` and start serving clients.
    ///
    /// Never fails: a bind or spawn failure leaves the link in a terminal
    /// [`Status`] with [`SocketLink::last_error`] describing why.
    pub fn spawn(port: u16, config: &LinkConfig) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let shared = Arc::new(Shared::new());
        let mut link = Self {
            port,
            local_addr: None,
            shared: Arc::clone(&shared),
            inbound: receiver,
        };

        let listener = match TcpListener::bind((config.bind_ip, port)) {
            Ok(listener) => listener,
            Err(source) => {
                let err = LinkError::Bind { port, source };
                warn!("UART link: {err}");
                shared.fail(&err);
                return link;
            }
        };
        link.local_addr = listener.local_addr().ok();
        info!(
            "UART link: listening on {}",
            link.local_addr
                .map_or_else(|| format!("port {port}"), |addr| addr.to_string())
        );

        let worker = LinkWorker {
            listener,
            shared,
            inbound: sender,
        };
        if let Err(e) = thread::Builder::new()
            .name(format!("tcpuart-link-{port}"))
            .spawn(move || worker.run())
        {
            let err = LinkError::Spawn(e);
            error!("UART link on port {port}: {err}");
            link.shared.fail(&err);
        }

        link
    }

    /// Configured port number.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address the listener is bound to; differs from the configured port
    /// when port 0 asked the OS to pick one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn status(&self) -> Status {
        self.shared.status.load()
    }

    pub fn status_label(&self) -> &'static str {
        self.status().label()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.shared.last_error.get().map(String::as_str)
    }

    pub fn is_connected(&self) -> bool {
        self.status() == Status::Connected
    }

    /// Pop the oldest received byte, or `None` when nothing is queued.
    pub fn try_read_byte(&self) -> Option<u8> {
        self.inbound.try_recv().ok()
    }

    /// Number of received bytes not yet popped.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Queue one byte for the connected client.
    ///
    /// The client's writer thread does the socket I/O, so this returns
    /// immediately even when the client stops reading. If the network
    /// thread is in the middle of attaching or dropping a client the write
    /// fails with [`LinkError::Busy`]. A byte accepted here is lost if the
    /// client disconnects before it is written.
    pub fn write_byte(&self, byte: u8) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        let slot = match self.shared.outbound.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poison)) => poison.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(LinkError::Busy),
        };
        let outbound = slot.as_ref().ok_or(LinkError::NotConnected)?;
        // Fails once the writer thread has given up on the socket.
        outbound.send(byte).map_err(|_| LinkError::NotConnected)
    }
}

/// Accept/read loop running on the link's own thread.
struct LinkWorker {
    listener: TcpListener,
    shared: Arc<Shared>,
    inbound: Sender<u8>,
}

impl LinkWorker {
    fn run(self) {
        loop {
            self.shared.status.store(Status::Waiting);

            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    let err = LinkError::Io(e);
                    error!("UART link: accept failed: {err}");
                    self.shared.fail(&err);
                    break;
                }
            };

            self.shared.status.store(Status::Connecting);
            info!("UART link: client {peer} connected");

            if let Err(err) = self.serve(stream) {
                error!("UART link: client {peer}: {err}");
                self.shared.fail(&err);
                break;
            }
        }
    }

    /// Serve one client until it goes away. `Ok` means the link can go back
    /// to accepting.
    fn serve(&self, stream: TcpStream) -> Result<(), LinkError> {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("UART link: cannot disable Nagle: {e}");
        }
        let (outbound, queued) = crossbeam_channel::unbounded();
        let writer = ClientWriter {
            stream: stream.try_clone()?,
            queued,
        };
        thread::Builder::new()
            .name("tcpuart-link-tx".into())
            .spawn(move || writer.run())
            .map_err(LinkError::Spawn)?;
        self.shared.attach(outbound);
        self.shared.status.store(Status::Connected);

        let outcome = self.pump(&stream);

        self.shared.status.store(Status::Disconnecting);
        drop(self.shared.detach());
        let closed = close(&stream);

        match outcome {
            Ok(count) => info!("UART link: client closed after {count} bytes"),
            Err(e) if is_disconnect(&e) => info!("UART link: client dropped: {e}"),
            Err(e) => return Err(e.into()),
        }
        closed.map_err(LinkError::from)
    }

    /// Queue every byte the client sends, in arrival order, until end of
    /// stream. Returns the byte count.
    fn pump(&self, stream: &TcpStream) -> io::Result<usize> {
        let mut count = 0usize;
        for byte in BufReader::new(stream).bytes() {
            let byte = byte?;
            if self.inbound.send(byte).is_err() {
                debug!("UART link: consumer gone, dropping client");
                break;
            }
            count += 1;
        }
        Ok(count)
    }
}

/// Writes queued outbound bytes to one client. Exits when the link drops
/// the queue or the socket fails; shutting the socket down unblocks a
/// pending write.
struct ClientWriter {
    stream: TcpStream,
    queued: Receiver<u8>,
}

impl ClientWriter {
    fn run(mut self) {
        let mut batch = Vec::new();
        while let Ok(first) = self.queued.recv() {
            batch.clear();
            batch.push(first);
            batch.extend(self.queued.try_iter());
            if let Err(e) = self.stream.write_all(&batch) {
                debug!("UART link: dropped {} outbound byte(s): {e}", batch.len());
                break;
            }
        }
    }
}

fn close(stream: &TcpStream) -> io::Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
        _ => Ok(()),
    }
}

/// Errors that mean "this client is gone", as opposed to a broken listener.
fn is_disconnect(e: &io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        e.kind(),
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::NotConnected
            | ErrorKind::TimedOut
    )
}
