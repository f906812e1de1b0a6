use std::{
    io::ErrorKind,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc, Arc,
    },
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, error, info, warn};

use crate::{
    error::result::{KmipResult, KmipResultHelper},
    ttlv::{error::TtlvError, wire::MessageFramer},
};

use super::protocol::{Disposition, ProtocolEngine};

/// TCP server for KMIP TTLV requests.
///
/// One worker thread per accepted connection; within a connection,
/// requests are strictly sequential. TLS termination belongs to a
/// fronting proxy and is not handled here.
pub struct SocketServer {
    engine: Arc<ProtocolEngine>,
}

/// A running server. [`SocketServerHandle::shutdown`] stops it
/// gracefully; dropping the handle also releases the accept loop.
pub struct SocketServerHandle {
    local_addr: SocketAddr,
    stop_sender: mpsc::Sender<()>,
    join_handle: thread::JoinHandle<()>,
}

impl SocketServerHandle {
    /// The bound address, useful when the configured port was 0.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, wait for active connections to
    /// finish their current request, then return.
    pub fn shutdown(self) -> KmipResult<()> {
        self.stop_sender
            .send(())
            .context("failed to signal the socket server to stop")?;
        self.join_handle
            .join()
            .map_err(|_e| crate::KmipError::Default("the accept loop panicked".to_owned()))
    }

    /// Block until the accept loop exits on its own.
    pub fn wait(self) -> KmipResult<()> {
        self.join_handle
            .join()
            .map_err(|_e| crate::KmipError::Default("the accept loop panicked".to_owned()))
    }
}

impl SocketServer {
    #[must_use]
    pub const fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    /// Bind the configured address and start serving on a dedicated
    /// accept thread.
    pub fn start(&self) -> KmipResult<SocketServerHandle> {
        let config = self.engine.config();
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).with_context(|| format!("failed to bind {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read the bound address")?;
        info!("socket server listening on {local_addr}");

        let (stop_sender, stop_receiver) = mpsc::channel::<()>();
        let engine = self.engine.clone();
        let join_handle = thread::spawn(move || {
            serve(&listener, &engine, stop_receiver);
        });
        Ok(SocketServerHandle {
            local_addr,
            stop_sender,
            join_handle,
        })
    }
}

fn serve(listener: &TcpListener, engine: &Arc<ProtocolEngine>, stop_receiver: mpsc::Receiver<()>) {
    let stop_requested = Arc::new(AtomicBool::new(false));
    let active_connections = Arc::new(AtomicUsize::new(0));

    spawn_stop_watcher(listener, stop_receiver, &stop_requested);

    let max_connections = engine.config().max_connections;
    for stream in listener.incoming() {
        if stop_requested.load(Ordering::SeqCst) {
            info!("socket server shutting down");
            break;
        }
        match stream {
            Ok(stream) => {
                if max_connections > 0
                    && active_connections.load(Ordering::SeqCst) >= max_connections
                {
                    warn!(
                        "connection limit ({max_connections}) reached, dropping a new connection"
                    );
                    drop(stream);
                    continue;
                }
                let engine = engine.clone();
                let stop_flag = stop_requested.clone();
                let guard = ConnectionGuard::enter(&active_connections);
                thread::spawn(move || {
                    let _guard = guard;
                    if let Err(e) = handle_connection(&engine, stream, &stop_flag) {
                        debug!("connection ended with an error: {e}");
                    }
                });
            }
            Err(e) => warn!("failed to accept a connection: {e}"),
        }
    }

    // give active workers a chance to finish their current request
    let grace = engine.config().request_timeout() + Duration::from_secs(1);
    let waited_from = Instant::now();
    while active_connections.load(Ordering::SeqCst) > 0 && waited_from.elapsed() < grace {
        thread::sleep(Duration::from_millis(50));
    }
}

/// Waits for the stop signal; on arrival, flags the accept loop and
/// connects to the listener once so `incoming()` wakes up.
fn spawn_stop_watcher(
    listener: &TcpListener,
    stop_receiver: mpsc::Receiver<()>,
    stop_requested: &Arc<AtomicBool>,
) {
    let Ok(local_addr) = listener.local_addr() else {
        error!("failed to read the listener address for the stop watcher");
        return;
    };
    let stop_requested = stop_requested.clone();
    thread::spawn(move || {
        // a sender drop also releases the accept loop
        let _signal = stop_receiver.recv();
        stop_requested.store(true, Ordering::SeqCst);
        let connect_addr = unspecified_to_loopback(local_addr);
        match TcpStream::connect_timeout(&connect_addr, Duration::from_secs(5)) {
            Ok(_wakeup) => debug!("accept loop woken for shutdown"),
            Err(e) => error!("failed to wake the accept loop: {e}"),
        }
    });
}

/// An unspecified listen address (0.0.0.0 or ::) is not connectable;
/// substitute the loopback of the same family.
fn unspecified_to_loopback(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        std::net::IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(
            std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            addr.port(),
        ),
        std::net::IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(
            std::net::IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
            addr.port(),
        ),
        _ => addr,
    }
}

/// Serve one connection: frame a request, run it through the engine,
/// write the response, repeat until the peer disconnects or the engine
/// asks for the connection to close.
fn handle_connection(
    engine: &Arc<ProtocolEngine>,
    mut stream: TcpStream,
    stop_flag: &Arc<AtomicBool>,
) -> KmipResult<()> {
    let peer = stream
        .peer_addr()
        .map_or_else(|_e| "[N/A]".to_owned(), |addr| addr.to_string());
    debug!("client connected from {peer}");

    // the read timeout doubles as the wake-up interval for shutdown
    stream
        .set_read_timeout(Some(engine.config().request_timeout()))
        .context("failed to set the read timeout")?;

    let framer = MessageFramer::new(engine.config().max_message_size);
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            debug!("closing {peer} for shutdown");
            break;
        }
        let request = match framer.read_message(&mut stream) {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!("client {peer} disconnected");
                break;
            }
            // idle timeout while waiting for the next request
            Err(TtlvError::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                continue;
            }
            Err(e @ TtlvError::MessageTooLarge { .. }) => {
                warn!("resetting {peer}: {e}");
                break;
            }
            Err(e) => {
                warn!("closing {peer}: {e}");
                break;
            }
        };
        match engine.handle_request_bytes(&peer, &request) {
            Disposition::Respond(response) => {
                framer
                    .write_message(&mut stream, &response)
                    .with_context(|| format!("failed to send a response to {peer}"))?;
            }
            Disposition::RespondAndClose(response) => {
                if let Err(e) = framer.write_message(&mut stream, &response) {
                    debug!("failed to send the final response to {peer}: {e}");
                }
                break;
            }
            Disposition::CloseSilently => break,
        }
    }
    Ok(())
}

/// Holds the live-connection count up while a worker runs.
struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn enter(active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self {
            active: active.clone(),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
