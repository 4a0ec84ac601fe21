use crate::dispatch::{Dispatcher, RouteMatch};
use crate::head::{HeadError, read_request_head};
use crate::log::tag;
use crate::response::Response;
use crate::router::ContentRouter;
use crate::uri;
use crate::util::escape_and_elide;
use fixed_buffer::FixedBuf;
use permit::Permit;
use socket2::{Domain, Protocol, Socket, Type};
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;

#[must_use]
pub fn socket_addr_127_0_0_1_any_port() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
}

#[must_use]
pub fn socket_addr_127_0_0_1(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[must_use]
pub fn socket_addr_all_interfaces(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServeError {
    /// Failed to bind or listen on the worker's address.
    Listen(ErrorKind, String),
    /// The accept call failed while the worker was serving.
    Accept(ErrorKind, String),
}
impl ServeError {
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            ServeError::Listen(kind, s) => format!("ServeError::Listen: {kind:?}: {s}"),
            ServeError::Accept(kind, s) => format!("ServeError::Accept: {kind:?}: {s}"),
        }
    }
}
impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.description())
    }
}
impl std::error::Error for ServeError {}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub enum WorkerState {
    Idle,
    Starting,
    Listening,
    Stopping,
    Stopped,
    /// Absorbing state: the worker hit a bind or accept error without a stop
    /// request.  There is no automatic restart.
    Failed,
}

struct WorkerShared {
    router: Arc<RwLock<ContentRouter>>,
    dispatcher: Arc<dyn Dispatcher>,
    listener: Mutex<Option<Socket>>,
    conn: Mutex<Option<TcpStream>>,
    local_addr: Mutex<Option<SocketAddr>>,
    state: Mutex<WorkerState>,
    last_error: Mutex<Option<ServeError>>,
    num_requests: AtomicU64,
}
impl WorkerShared {
    fn set_state(&self, state: WorkerState) {
        *self.state.lock().unwrap() = state;
    }
}

/// One bound TCP listener and its accept/serve loop on a dedicated thread.
///
/// The worker's thread serves one connection at a time: it reads requests off
/// the connection until the client closes it or a protocol error occurs, then
/// accepts the next connection.  All I/O is blocking; [`ListenerWorker::stop`]
/// unblocks in-progress accept and read calls by shutting the sockets down.
pub struct ListenerWorker {
    addr: SocketAddr,
    shared: Arc<WorkerShared>,
    opt_permit: Option<Permit>,
    opt_join_handle: Option<JoinHandle<()>>,
}
impl ListenerWorker {
    #[must_use]
    pub fn new(
        addr: SocketAddr,
        router: Arc<RwLock<ContentRouter>>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            addr,
            shared: Arc::new(WorkerShared {
                router,
                dispatcher,
                listener: Mutex::new(None),
                conn: Mutex::new(None),
                local_addr: Mutex::new(None),
                state: Mutex::new(WorkerState::Idle),
                last_error: Mutex::new(None),
                num_requests: AtomicU64::new(0),
            }),
            opt_permit: None,
            opt_join_handle: None,
        }
    }

    /// Spawns the worker's thread and blocks until it is listening.
    ///
    /// Calling `start` again after it succeeded is a no-op.
    ///
    /// # Errors
    /// Returns [`ServeError::Listen`] when the thread fails to bind or listen
    /// on the worker's address.  The thread has already exited when this
    /// returns an error.
    pub fn start(&mut self) -> Result<(), ServeError> {
        if self.opt_join_handle.is_some() {
            return Ok(());
        }
        self.shared.set_state(WorkerState::Starting);
        let permit = Permit::new();
        let thread_permit = permit.new_sub();
        let shared = Arc::clone(&self.shared);
        let addr = self.addr;
        // Rendezvous channel: the spawning thread waits here until the worker
        // thread has either bound the listener or failed to.
        let (sender, receiver) = sync_channel::<Result<(), ServeError>>(0);
        let join_handle = std::thread::spawn(move || {
            let listener = match bind_listener(addr) {
                Ok(listener) => listener,
                Err(e) => {
                    *shared.last_error.lock().unwrap() = Some(e.clone());
                    shared.set_state(WorkerState::Failed);
                    let _ignored = sender.send(Err(e));
                    return;
                }
            };
            *shared.local_addr.lock().unwrap() =
                listener.local_addr().ok().and_then(|a| a.as_socket());
            if let Ok(clone) = listener.try_clone() {
                *shared.listener.lock().unwrap() = Some(clone);
            }
            shared.set_state(WorkerState::Listening);
            crate::log::debug("listener running", tag("addr", addr.to_string()));
            let _ignored = sender.send(Ok(()));
            accept_loop(&thread_permit, &listener, &shared);
            crate::log::debug("listener exiting", tag("addr", addr.to_string()));
        });
        self.opt_permit = Some(permit);
        self.opt_join_handle = Some(join_handle);
        match receiver.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.opt_permit = None;
                self.join();
                Err(e)
            }
            Err(..) => {
                self.opt_permit = None;
                self.join();
                Err(ServeError::Listen(
                    ErrorKind::Other,
                    "listener thread exited before binding".to_string(),
                ))
            }
        }
    }

    /// Asks the worker to stop and unblocks its thread by shutting down the
    /// active connection socket (if any) and the listening socket.
    ///
    /// Does not wait for the thread; call [`ListenerWorker::join`] for that.
    /// Safe to call on a worker that never started or already terminated.
    pub fn stop(&mut self) {
        // Dropping the root permit revokes the thread's sub-permit, which is
        // how the thread tells a stop-triggered error from a real one.
        self.opt_permit.take();
        {
            let mut state = self.shared.state.lock().unwrap();
            if matches!(*state, WorkerState::Starting | WorkerState::Listening) {
                *state = WorkerState::Stopping;
            }
        }
        if let Some(conn) = self.shared.conn.lock().unwrap().as_ref() {
            let _ignored = conn.shutdown(Shutdown::Both);
        }
        if let Some(listener) = self.shared.listener.lock().unwrap().as_ref() {
            let _ignored = listener.shutdown(Shutdown::Both);
        }
    }

    /// Waits for the worker's thread to exit.  Idempotent.
    pub fn join(&mut self) {
        if let Some(join_handle) = self.opt_join_handle.take() {
            let _ignored = join_handle.join();
        }
    }

    /// The address the worker was created with.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The address the listener actually bound, once the worker has started.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.shared.local_addr.lock().unwrap()
    }

    #[must_use]
    pub fn state(&self) -> WorkerState {
        *self.shared.state.lock().unwrap()
    }

    /// The error that terminated the worker's loop, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ServeError> {
        self.shared.last_error.lock().unwrap().clone()
    }

    /// Number of requests this worker has read, across all connections.
    #[must_use]
    pub fn num_requests(&self) -> u64 {
        self.shared.num_requests.load(Ordering::Relaxed)
    }
}

fn bind_listener(addr: SocketAddr) -> Result<Socket, ServeError> {
    let listen_err = |e: std::io::Error| ServeError::Listen(e.kind(), e.to_string());
    let socket =
        Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP)).map_err(listen_err)?;
    socket.set_reuse_address(true).map_err(listen_err)?;
    // Lets every worker in a pool bind the same address.
    #[cfg(unix)]
    socket.set_reuse_port(true).map_err(listen_err)?;
    socket.bind(&addr.into()).map_err(listen_err)?;
    socket.listen(128).map_err(listen_err)?;
    Ok(socket)
}

fn accept_loop(permit: &Permit, listener: &Socket, shared: &WorkerShared) {
    loop {
        match listener.accept() {
            Ok((socket, peer)) => {
                let stream = TcpStream::from(socket);
                if let Ok(clone) = stream.try_clone() {
                    *shared.conn.lock().unwrap() = Some(clone);
                }
                serve_conn(permit, stream, peer.as_socket(), shared);
                *shared.conn.lock().unwrap() = None;
                if permit.is_revoked() {
                    shared.set_state(WorkerState::Stopped);
                    return;
                }
            }
            Err(e) => {
                if permit.is_revoked() {
                    // stop() shut the listener down; clean termination.
                    shared.set_state(WorkerState::Stopped);
                } else {
                    let err = ServeError::Accept(e.kind(), e.to_string());
                    crate::log::error("error accepting connection", tag("err", err.description()));
                    *shared.last_error.lock().unwrap() = Some(err);
                    shared.set_state(WorkerState::Failed);
                }
                return;
            }
        }
    }
}

/// Serves requests off one connection until the client closes it, a protocol
/// error occurs, or a stop request shuts the socket down.
fn serve_conn(
    permit: &Permit,
    mut stream: TcpStream,
    opt_peer: Option<SocketAddr>,
    shared: &WorkerShared,
) {
    let peer = opt_peer.map_or_else(|| "unknown".to_string(), |peer| peer.to_string());
    let mut buf: FixedBuf<8192> = FixedBuf::new();
    while !permit.is_revoked() {
        let head = match read_request_head(&mut buf, &mut stream) {
            Ok(head) => head,
            Err(HeadError::Disconnected) => return,
            Err(e) => {
                // Request-level errors end the connection, not the worker.
                if !permit.is_revoked() {
                    crate::log::info(
                        "error reading request",
                        (
                            tag("peer", peer.as_str()),
                            tag("err", e.description()),
                            tag("request", escape_and_elide(buf.readable(), 100)),
                        ),
                    );
                    let _ignored = Response::bad_request_400().write_to(&mut stream);
                }
                return;
            }
        };
        shared.num_requests.fetch_add(1, Ordering::Relaxed);
        let (path, canonical_query) = uri::split_target(&head.target);
        let route = {
            let router = shared.router.read().unwrap();
            router.find(path).map(|(source, remainder)| RouteMatch {
                source: source.clone(),
                path: path.to_string(),
                remainder: remainder.to_string(),
                canonical_query: canonical_query.clone(),
            })
        };
        let response = shared.dispatcher.dispatch(&head, route);
        if let Err(e) = response.write_to(&mut stream) {
            if !permit.is_revoked() {
                crate::log::info(
                    "error writing response",
                    (tag("peer", peer.as_str()), tag("err", e.to_string())),
                );
            }
            return;
        }
        if head.connection_close() {
            let _ignored = stream.shutdown(Shutdown::Both);
            return;
        }
    }
}
