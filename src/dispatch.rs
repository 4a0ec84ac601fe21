use crate::cache;
use crate::head::RequestHead;
use crate::log::tag;
use crate::response::Response;
use crate::router::ContentSource;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;

/// One resolved route: the matched source plus the cache-key inputs.
///
/// Owns its data so the router lock can be released before the dispatcher
/// starts doing I/O.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteMatch {
    pub source: ContentSource,
    /// The request path, before the query separator.
    pub path: String,
    /// The part of the path below the matched node.  May be empty.
    pub remainder: String,
    /// Order-independent form of the query string.  Empty or `&`-prefixed.
    pub canonical_query: String,
}

/// Produces a response for one resolved request.
///
/// The listener workers call this once per request, on the worker's thread.
/// Implementations must not assume which thread calls them.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, head: &RequestHead, route: Option<RouteMatch>) -> Response;
}

/// The built-in dispatcher.
///
/// Serves files below the mounted root for static routes.  For dynamic
/// routes, answers from the route's cache when possible, otherwise fetches
/// from the fallback address and relays the raw response, caching successful
/// GET responses.
pub struct ContentDispatcher {}
impl Dispatcher for ContentDispatcher {
    fn dispatch(&self, head: &RequestHead, route: Option<RouteMatch>) -> Response {
        let Some(route) = route else {
            return Response::not_found_404();
        };
        match &route.source {
            ContentSource::Static { root } => serve_static(head, root, &route.remainder),
            ContentSource::Dynamic {
                cache_root,
                fallback,
            } => serve_dynamic(head, &route, cache_root.as_deref(), *fallback),
        }
    }
}

fn serve_static(head: &RequestHead, root: &Path, remainder: &str) -> Response {
    if head.method != "GET" {
        return Response::method_not_allowed_405();
    }
    // A `..` segment could escape the mounted root.
    if remainder.split('/').any(|segment| segment == "..") {
        return Response::not_found_404();
    }
    if remainder.is_empty() {
        return Response::not_found_404();
    }
    match std::fs::read(root.join(remainder)) {
        Ok(body) => Response::bytes(200, "application/octet-stream", body),
        Err(e) => {
            crate::log::debug(
                "static file not readable",
                (tag("path", remainder), tag("err", e.to_string())),
            );
            Response::not_found_404()
        }
    }
}

fn serve_dynamic(
    head: &RequestHead,
    route: &RouteMatch,
    cache_root: Option<&Path>,
    fallback: SocketAddr,
) -> Response {
    // A `..` segment could address cache records outside the cache root.
    if route.path.split('/').any(|segment| segment == "..") {
        return Response::not_found_404();
    }
    let key = cache::cache_key(&route.path, &route.canonical_query);
    // Records hold GET responses, so only GET requests may answer from cache.
    if head.method == "GET" {
        if let Some(cache_root) = cache_root {
            let file_path = cache::cache_file_path(cache_root, &key);
            match cache::load_record(&file_path, &key) {
                Ok(Some(bytes)) => return Response::raw(bytes),
                Ok(None) => {}
                Err(e) => crate::log::error(
                    "error reading cache file",
                    (tag("key", key.as_str()), tag("err", e.to_string())),
                ),
            }
        }
    }
    let bytes = match fetch_from_fallback(head, route, fallback) {
        Ok(bytes) => bytes,
        Err(e) => {
            crate::log::error(
                "error fetching from fallback",
                (
                    tag("fallback", fallback.to_string()),
                    tag("path", route.path.as_str()),
                    tag("err", e.to_string()),
                ),
            );
            return Response::bad_gateway_502();
        }
    };
    // Only successful GET responses become cache records.
    if head.method == "GET" && bytes.starts_with(b"HTTP/1.1 200") {
        if let Some(cache_root) = cache_root {
            let file_path = cache::cache_file_path(cache_root, &key);
            if let Err(e) = cache::store_record(&file_path, &key, &bytes) {
                crate::log::error(
                    "error writing cache file",
                    (tag("key", key.as_str()), tag("err", e.to_string())),
                );
            }
        }
    }
    Response::raw(bytes)
}

/// Sends a one-shot `Connection: close` request to the fallback server and
/// reads the whole response.
fn fetch_from_fallback(
    head: &RequestHead,
    route: &RouteMatch,
    fallback: SocketAddr,
) -> Result<Vec<u8>, std::io::Error> {
    let target = if route.canonical_query.is_empty() {
        route.path.clone()
    } else {
        format!("{}?{}", route.path, &route.canonical_query[1..])
    };
    let mut stream = TcpStream::connect(fallback)?;
    // One write_all: an origin that responds after a partial read may close
    // the socket, and a fragmented request would then fail with BrokenPipe.
    let request = format!(
        "{} {} HTTP/1.1\r\nhost: {}\r\nconnection: close\r\n\r\n",
        head.method, target, fallback
    );
    stream.write_all(request.as_bytes())?;
    stream.flush()?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    if bytes.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "fallback closed the connection without responding",
        ));
    }
    Ok(bytes)
}
