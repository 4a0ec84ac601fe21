
use portico::{
    ContentDispatcher, ContentRouter, ContentSource, Dispatcher, ListenerWorker, ServeError,
    WorkerState, socket_addr_127_0_0_1, socket_addr_127_0_0_1_any_port,
};
use std::io::ErrorKind;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use temp_dir::TempDir;
use test_util::{assert_starts_with, check_elapsed, exchange};

fn new_worker() -> ListenerWorker {
    let router = Arc::new(RwLock::new(ContentRouter::new()));
    ListenerWorker::new(
        socket_addr_127_0_0_1_any_port(),
        router,
        Arc::new(ContentDispatcher {}),
    )
}

#[test]
fn starts_and_stops() {
    let mut worker = new_worker();
    assert_eq!(WorkerState::Idle, worker.state());
    assert_eq!(None, worker.local_addr());
    worker.start().unwrap();
    assert_eq!(WorkerState::Listening, worker.state());
    let addr = worker.local_addr().unwrap();
    assert_ne!(0, addr.port());
    worker.stop();
    worker.join();
    assert_eq!(WorkerState::Stopped, worker.state());
    assert_eq!(None, worker.last_error());
}

#[test]
fn start_twice_is_noop() {
    let mut worker = new_worker();
    worker.start().unwrap();
    let addr = worker.local_addr();
    worker.start().unwrap();
    assert_eq!(addr, worker.local_addr());
    worker.stop();
    worker.join();
}

#[test]
fn stop_and_join_are_idempotent() {
    let mut worker = new_worker();
    worker.start().unwrap();
    worker.stop();
    worker.stop();
    worker.join();
    worker.join();
    assert_eq!(WorkerState::Stopped, worker.state());
}

#[test]
fn stop_before_start_is_safe() {
    let mut worker = new_worker();
    worker.stop();
    worker.join();
    assert_eq!(WorkerState::Idle, worker.state());
}

#[test]
fn bind_error() {
    let occupier = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupier.local_addr().unwrap().port();
    let router = Arc::new(RwLock::new(ContentRouter::new()));
    let mut worker = ListenerWorker::new(
        socket_addr_127_0_0_1(port),
        router,
        Arc::new(ContentDispatcher {}),
    );
    match worker.start() {
        Err(ServeError::Listen(ErrorKind::AddrInUse, ..)) => {}
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(WorkerState::Failed, worker.state());
    assert!(worker.last_error().is_some());
    // The thread already exited; cleanup calls are still safe.
    worker.stop();
    worker.join();
}

#[test]
fn stop_unblocks_accept() {
    let mut worker = new_worker();
    worker.start().unwrap();
    let before = Instant::now();
    worker.stop();
    worker.join();
    check_elapsed(before, 0..1_000).unwrap();
    assert_eq!(WorkerState::Stopped, worker.state());
}

#[test]
fn serves_requests_and_counts_them() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("file.txt"), b"contents").unwrap();
    let router = Arc::new(RwLock::new(ContentRouter::new()));
    router
        .write()
        .unwrap()
        .add(
            "/files",
            ContentSource::Static {
                root: dir.path().to_path_buf(),
            },
        )
        .unwrap();
    let mut worker = ListenerWorker::new(
        socket_addr_127_0_0_1_any_port(),
        router,
        Arc::new(ContentDispatcher {}),
    );
    worker.start().unwrap();
    let addr = worker.local_addr().unwrap();
    assert_eq!(0, worker.num_requests());

    let response = exchange(addr, "GET /files/file.txt HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK\r\n");
    assert!(response.ends_with("contents"), "unexpected {response:?}");

    let response = exchange(addr, "GET /elsewhere HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 404 Not Found\r\n");

    assert_eq!(2, worker.num_requests());
    worker.stop();
    worker.join();
}

#[test]
fn custom_dispatcher() {
    struct Teapot;
    impl Dispatcher for Teapot {
        fn dispatch(
            &self,
            _head: &portico::RequestHead,
            _route: Option<portico::RouteMatch>,
        ) -> portico::Response {
            portico::Response::text(418, "short and stout")
        }
    }
    let router = Arc::new(RwLock::new(ContentRouter::new()));
    let mut worker =
        ListenerWorker::new(socket_addr_127_0_0_1_any_port(), router, Arc::new(Teapot));
    worker.start().unwrap();
    let addr = worker.local_addr().unwrap();
    let response = exchange(addr, "GET / HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 418 ");
    assert!(response.ends_with("short and stout"), "unexpected {response:?}");
    worker.stop();
    worker.join();
}
