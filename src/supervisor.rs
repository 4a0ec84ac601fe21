use crate::dispatch::Dispatcher;
use crate::router::{ContentRouter, ContentSource, PathError};
use crate::worker::{ListenerWorker, ServeError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Coordinates a fixed pool of [`ListenerWorker`]s sharing one
/// [`ContentRouter`].
///
/// The pool size is fixed at construction.  Route mappings go through the
/// supervisor and are meant to be added before serving starts or between
/// serving windows; the router sits behind a read-write lock, so adding a
/// mapping while workers are serving blocks only for the duration of the
/// insert.
pub struct ServerSupervisor {
    router: Arc<RwLock<ContentRouter>>,
    workers: Vec<ListenerWorker>,
}
impl ServerSupervisor {
    /// Makes a supervisor with `num_workers` workers all binding `addr`.
    /// Workers set `SO_REUSEPORT`, so a pool can share one address.
    /// A zero `num_workers` is treated as one.
    #[must_use]
    pub fn new(addr: SocketAddr, num_workers: usize, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_addrs(vec![addr; num_workers.max(1)], dispatcher)
    }

    /// Makes a supervisor with one worker per address.
    #[must_use]
    pub fn with_addrs(addrs: Vec<SocketAddr>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        let router = Arc::new(RwLock::new(ContentRouter::new()));
        let workers = addrs
            .into_iter()
            .map(|addr| ListenerWorker::new(addr, Arc::clone(&router), Arc::clone(&dispatcher)))
            .collect();
        Self { router, workers }
    }

    /// Starts every worker, in order.  All-or-nothing: when a worker fails to
    /// start, every previously started worker is stopped and joined before
    /// the error is returned, so a partially-running pool is never observable.
    ///
    /// # Errors
    /// Returns the failing worker's [`ServeError::Listen`].
    pub fn start(&mut self) -> Result<(), ServeError> {
        for n in 0..self.workers.len() {
            if let Err(e) = self.workers[n].start() {
                for worker in &mut self.workers[..n] {
                    worker.stop();
                }
                for worker in &mut self.workers[..n] {
                    worker.join();
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stops the pool in two phases: first every worker gets a stop request,
    /// then every worker is joined.  Stopping first keeps one worker's
    /// shutdown from blocking behind another's in-flight accept call.
    ///
    /// Safe to call more than once, and safe after a worker has already
    /// terminated on its own.
    pub fn stop(&mut self) {
        for worker in &mut self.workers {
            worker.stop();
        }
        for worker in &mut self.workers {
            worker.join();
        }
    }

    /// Maps `path` to a static filesystem root.
    ///
    /// # Errors
    /// Returns an error when `path` is empty, names only the root, or is
    /// already mapped.
    pub fn add_static(&self, path: &str, root: impl Into<PathBuf>) -> Result<(), PathError> {
        self.router
            .write()
            .unwrap()
            .add(path, ContentSource::Static { root: root.into() })
    }

    /// Maps `path` to dynamic content generated by the server at `fallback`,
    /// optionally cached under `cache_root`.
    ///
    /// # Errors
    /// Returns an error when `path` is empty, names only the root, or is
    /// already mapped.
    pub fn add_dynamic(
        &self,
        path: &str,
        cache_root: Option<PathBuf>,
        fallback: SocketAddr,
    ) -> Result<(), PathError> {
        self.router.write().unwrap().add(
            path,
            ContentSource::Dynamic {
                cache_root,
                fallback,
            },
        )
    }

    /// The addresses the workers actually bound.  Useful when binding port 0.
    #[must_use]
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.workers
            .iter()
            .filter_map(ListenerWorker::local_addr)
            .collect()
    }

    #[must_use]
    pub fn workers(&self) -> &[ListenerWorker] {
        &self.workers
    }
}
