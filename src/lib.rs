//! Portico
//! =======
//! An embeddable HTTP front-end library in Rust.
//!
//! Portico maps URL paths to content sources (static filesystem roots, or
//! dynamic content fetched from a fallback server and optionally cached) and
//! serves them from a fixed pool of listener threads.  It is a front-end, not
//! a framework: no macros, no async runtime, no global configuration.
//!
//! # Features
//! - `forbid(unsafe_code)`
//! - Path-based routing: the closest mapped ancestor of a request path wins,
//!   so one mount can cover a subtree while nested mounts override narrower
//!   subpaths
//! - Canonical (order-independent) query strings, usable as cache keys
//! - One blocking OS thread per listener, fixed pool size, keep-alive
//!   connections served sequentially per thread
//! - All-or-nothing pool startup with rollback, two-phase shutdown
//! - Opaque server handles for embedding in a host application
//! - Pluggable [`Dispatcher`] for custom content handling
//!
//! # Limitations
//! - HTTP/1.1 only; no TLS, no HTTP/2, no request bodies at this layer
//! - No read or idle timeouts: a worker blocks until a peer acts or the
//!   server is stopped
//! - One fallback address per dynamic route; no load balancing
//!
//! # Example
//! ```rust
//! use portico::{ServerConfig, add_static_directory, start_server, stop_server};
//!
//! let handle = start_server(ServerConfig::new("127.0.0.1").port(0)).unwrap();
//! add_static_directory(handle, "/assets", "/var/www/assets").unwrap();
//! // ... serve ...
//! stop_server(handle).unwrap();
//! ```
#![forbid(unsafe_code)]
mod cache;
mod dispatch;
mod head;
mod response;
mod router;
mod supervisor;
mod uri;
mod util;
mod worker;

pub mod log;

pub use crate::dispatch::{ContentDispatcher, Dispatcher, RouteMatch};
pub use crate::head::{HeadError, Header, RequestHead, read_request_head};
pub use crate::response::Response;
pub use crate::router::{ContentRouter, ContentSource, PathError};
pub use crate::supervisor::ServerSupervisor;
pub use crate::uri::split_target;
pub use crate::worker::{
    ListenerWorker, ServeError, WorkerState, socket_addr_127_0_0_1,
    socket_addr_127_0_0_1_any_port, socket_addr_all_interfaces,
};

/// This part of the library is not covered by the semver guarantees.
/// If you use these in your program, a minor version upgrade could break your build.
pub mod internal {
    pub use crate::cache::*;
    pub use crate::head::*;
    pub use crate::util::*;
}

use crate::util::next_insecure_rand_u64;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Settings for [`start_server`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    bind_ip: String,
    port: u16,
    num_workers: usize,
}
impl ServerConfig {
    /// Makes a new config that binds `bind_ip` on port 80 with one worker.
    #[must_use]
    pub fn new(bind_ip: impl Into<String>) -> Self {
        Self {
            bind_ip: bind_ip.into(),
            port: 80,
            num_workers: 1,
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the number of listener threads.
    ///
    /// # Panics
    /// Panics when `n` is zero.
    #[must_use]
    pub fn num_workers(mut self, n: usize) -> Self {
        assert!(n > 0, "refusing to set num_workers to zero");
        self.num_workers = n;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostError {
    /// The path's final node already has a source attached.
    DuplicateMapping,
    /// The config's `bind_ip` is not a valid IP address.
    InvalidBindAddr(String),
    /// The path is empty or has no segment besides the root.
    InvalidPath,
    /// A worker failed to bind or listen.
    Listen(ErrorKind, String),
    /// The handle does not name a running server.
    UnknownHandle,
}
impl HostError {
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            HostError::DuplicateMapping => "HostError::DuplicateMapping".to_string(),
            HostError::InvalidBindAddr(s) => format!("HostError::InvalidBindAddr: {s:?}"),
            HostError::InvalidPath => "HostError::InvalidPath".to_string(),
            HostError::Listen(kind, s) => format!("HostError::Listen: {kind:?}: {s}"),
            HostError::UnknownHandle => "HostError::UnknownHandle".to_string(),
        }
    }
}
impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.description())
    }
}
impl std::error::Error for HostError {}
impl From<PathError> for HostError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::InvalidPath => HostError::InvalidPath,
            PathError::DuplicateMapping => HostError::DuplicateMapping,
        }
    }
}
impl From<ServeError> for HostError {
    fn from(e: ServeError) -> Self {
        match e {
            ServeError::Listen(kind, s) | ServeError::Accept(kind, s) => {
                HostError::Listen(kind, s)
            }
        }
    }
}

/// An opaque token naming a running server.
///
/// The host cannot dereference it; it is an identifier into a registry owned
/// by this crate, minted from random bits so stale or forged values are
/// rejected rather than misrouted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ServerHandle(u64);

static SERVERS: once_cell::sync::Lazy<Mutex<HashMap<u64, ServerSupervisor>>> =
    once_cell::sync::Lazy::new(|| Mutex::new(HashMap::new()));

/// Builds a router and supervisor from `config`, starts the worker pool, and
/// registers the running server.
///
/// Startup is all-or-nothing: on error no worker is left running.
///
/// # Errors
/// Returns an error when `bind_ip` does not parse or a worker fails to bind.
pub fn start_server(config: ServerConfig) -> Result<ServerHandle, HostError> {
    let ip: IpAddr = config
        .bind_ip
        .parse()
        .map_err(|_| HostError::InvalidBindAddr(config.bind_ip.clone()))?;
    let addr = SocketAddr::new(ip, config.port);
    let mut supervisor =
        ServerSupervisor::new(addr, config.num_workers, Arc::new(ContentDispatcher {}));
    supervisor.start()?;
    let mut servers = SERVERS.lock().unwrap();
    let id = loop {
        let id = next_insecure_rand_u64();
        if id != 0 && !servers.contains_key(&id) {
            break id;
        }
    };
    servers.insert(id, supervisor);
    Ok(ServerHandle(id))
}

/// Stops the server's worker pool (two-phase: stop every worker, then join
/// every worker) and releases everything it owns.  The handle is dead
/// afterwards.
///
/// # Errors
/// Returns [`HostError::UnknownHandle`] when `handle` does not name a running
/// server.
pub fn stop_server(handle: ServerHandle) -> Result<(), HostError> {
    let mut supervisor = SERVERS
        .lock()
        .unwrap()
        .remove(&handle.0)
        .ok_or(HostError::UnknownHandle)?;
    supervisor.stop();
    Ok(())
}

/// Maps `path` to a static filesystem root on the server named by `handle`.
///
/// # Errors
/// Returns an error when the handle is unknown or the path is invalid or
/// already mapped.
pub fn add_static_directory(
    handle: ServerHandle,
    path: &str,
    filesystem_root: impl Into<PathBuf>,
) -> Result<(), HostError> {
    let servers = SERVERS.lock().unwrap();
    let supervisor = servers.get(&handle.0).ok_or(HostError::UnknownHandle)?;
    supervisor.add_static(path, filesystem_root)?;
    Ok(())
}

/// Maps `path` to dynamic content fetched from `fallback`, optionally cached
/// under `cache_root`, on the server named by `handle`.
///
/// # Errors
/// Returns an error when the handle is unknown or the path is invalid or
/// already mapped.
pub fn add_dynamic_directory(
    handle: ServerHandle,
    path: &str,
    cache_root: Option<PathBuf>,
    fallback: SocketAddr,
) -> Result<(), HostError> {
    let servers = SERVERS.lock().unwrap();
    let supervisor = servers.get(&handle.0).ok_or(HostError::UnknownHandle)?;
    supervisor.add_dynamic(path, cache_root, fallback)?;
    Ok(())
}

/// The addresses the server's workers actually bound.
/// Useful when the config asked for port 0.
///
/// # Errors
/// Returns [`HostError::UnknownHandle`] when `handle` does not name a running
/// server.
pub fn server_addrs(handle: ServerHandle) -> Result<Vec<SocketAddr>, HostError> {
    let servers = SERVERS.lock().unwrap();
    let supervisor = servers.get(&handle.0).ok_or(HostError::UnknownHandle)?;
    Ok(supervisor.local_addrs())
}
