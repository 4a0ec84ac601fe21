//! An ordered trie over `/`-delimited path segments.
//!
//! Each node may carry one content source.  Lookup returns the source on the
//! deepest matched ancestor, which lets one mount cover a whole subtree while
//! nested mounts override narrower subpaths.

use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The descriptor attached to a routed path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContentSource {
    /// Files under `root` on the local filesystem.
    Static { root: PathBuf },
    /// Content produced by the server at `fallback`,
    /// optionally cached as files under `cache_root`.
    Dynamic {
        cache_root: Option<PathBuf>,
        fallback: SocketAddr,
    },
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub enum PathError {
    /// The path is empty or has no segment besides the root.
    InvalidPath,
    /// The path's final node already has a source attached.
    DuplicateMapping,
}
impl PathError {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            PathError::InvalidPath => "PathError::InvalidPath",
            PathError::DuplicateMapping => "PathError::DuplicateMapping",
        }
    }
}
impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.description())
    }
}
impl std::error::Error for PathError {}

struct Node {
    name: String,
    children: Vec<Node>,
    source: Option<ContentSource>,
}
impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            source: None,
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }
}
impl Drop for Node {
    // Teardown walks a worklist instead of recursing so a deep trie
    // cannot exhaust the stack.
    fn drop(&mut self) {
        let mut worklist: Vec<Node> = std::mem::take(&mut self.children);
        while let Some(mut node) = worklist.pop() {
            worklist.append(&mut node.children);
        }
    }
}

/// Maps URL paths to content sources.
///
/// The root node represents the path `"/"` and never carries a source.
/// Among the children of any node, segment names are unique, and children
/// keep their insertion order.
pub struct ContentRouter {
    root: Node,
}
impl ContentRouter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new(""),
        }
    }

    /// Attaches `source` to `path`, creating intermediate nodes as needed.
    /// Created intermediate nodes carry no source.
    ///
    /// A single trailing `/` is ignored, so `"/a/b"` and `"/a/b/"` name the
    /// same node.
    ///
    /// # Errors
    /// - [`PathError::InvalidPath`] when `path` is empty or names only the root.
    /// - [`PathError::DuplicateMapping`] when the final node already has a
    ///   source.  The trie is left unchanged: the final node exists, so every
    ///   node on the way to it already existed too.
    pub fn add(&mut self, path: &str, source: ContentSource) -> Result<(), PathError> {
        let rel = relative_path(path);
        if rel.is_empty() {
            return Err(PathError::InvalidPath);
        }
        let mut node = &mut self.root;
        for segment in rel.split('/') {
            let index = match node.children.iter().position(|child| child.name == segment) {
                Some(index) => index,
                None => {
                    node.children.push(Node::new(segment));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
        if node.source.is_some() {
            return Err(PathError::DuplicateMapping);
        }
        node.source = Some(source);
        Ok(())
    }

    /// Finds the source mapped closest above `path`.
    ///
    /// Walks the trie segment by segment until a segment has no matching
    /// child or the input is consumed, then returns the source of the deepest
    /// node along the matched prefix that has one, together with the part of
    /// `path` after that node.  Returns `None` when no node along the matched
    /// prefix carries a source, even when the walk matched every segment.
    #[must_use]
    pub fn find<'s, 'p>(&'s self, path: &'p str) -> Option<(&'s ContentSource, &'p str)> {
        let rel = relative_path(path);
        let mut node = &self.root;
        let mut best: Option<(&ContentSource, usize)> = None;
        let mut offset = 0;
        for segment in rel.split('/') {
            match node.child(segment) {
                Some(child) => {
                    node = child;
                    offset += segment.len();
                    if let Some(source) = &node.source {
                        best = Some((source, offset));
                    }
                    offset += 1; // the '/' after this segment
                }
                None => break,
            }
        }
        best.map(|(source, end)| {
            let remainder = rel.get((end + 1)..).unwrap_or("");
            (source, remainder)
        })
    }
}
impl Default for ContentRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips a single trailing `/` and the leading `/` that matches the root
/// node.  `""` and `"/"` both reduce to `""`.
fn relative_path(path: &str) -> &str {
    let path = path.strip_suffix('/').unwrap_or(path);
    path.strip_prefix('/').unwrap_or(path)
}
