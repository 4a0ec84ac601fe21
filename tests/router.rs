use portico::{ContentRouter, ContentSource, PathError};
use std::path::PathBuf;

fn src(name: &str) -> ContentSource {
    ContentSource::Static {
        root: PathBuf::from(name),
    }
}

#[test]
fn invalid_path() {
    let mut router = ContentRouter::new();
    assert_eq!(Err(PathError::InvalidPath), router.add("", src("a")));
    assert_eq!(Err(PathError::InvalidPath), router.add("/", src("a")));
}

#[test]
fn duplicate_mapping() {
    let mut router = ContentRouter::new();
    router.add("/a/b", src("first")).unwrap();
    assert_eq!(
        Err(PathError::DuplicateMapping),
        router.add("/a/b", src("second"))
    );
    // A trailing slash names the same node.
    assert_eq!(
        Err(PathError::DuplicateMapping),
        router.add("/a/b/", src("second"))
    );
    // The original mapping survives.
    assert_eq!(Some((&src("first"), "")), router.find("/a/b"));
    // Prefixes and extensions are distinct nodes.
    router.add("/a", src("prefix")).unwrap();
    router.add("/a/b/c", src("extension")).unwrap();
}

#[test]
fn trailing_slash_names_same_node() {
    let mut router = ContentRouter::new();
    router.add("/a/b/", src("s")).unwrap();
    assert_eq!(Some((&src("s"), "")), router.find("/a/b"));
    assert_eq!(Some((&src("s"), "")), router.find("/a/b/"));
}

#[test]
fn deepest_mapped_ancestor_wins() {
    let mut router = ContentRouter::new();
    router.add("/hello", src("hello")).unwrap();
    router.add("/hello/world", src("world")).unwrap();
    router.add("/hello/kitty", src("kitty")).unwrap();
    assert_eq!(Some((&src("hello"), "")), router.find("/hello"));
    assert_eq!(Some((&src("world"), "")), router.find("/hello/world"));
    assert_eq!(
        Some((&src("world"), "chicken")),
        router.find("/hello/world/chicken")
    );
    assert_eq!(
        Some((&src("kitty"), "something/else/index")),
        router.find("/hello/kitty/something/else/index")
    );
    // An unmatched segment falls back to the deepest mapped ancestor.
    assert_eq!(Some((&src("hello"), "other")), router.find("/hello/other"));
}

#[test]
fn no_match() {
    let mut router = ContentRouter::new();
    router.add("/hello", src("hello")).unwrap();
    assert_eq!(None, router.find("/"));
    assert_eq!(None, router.find(""));
    assert_eq!(None, router.find("/helloo"));
    assert_eq!(None, router.find("/other/hello"));
}

#[test]
fn matched_prefix_without_source() {
    let mut router = ContentRouter::new();
    router.add("/a/b", src("b")).unwrap();
    // The walk matches "a", but no node along the way carries a source.
    assert_eq!(None, router.find("/a"));
    assert_eq!(None, router.find("/a/c"));
    assert_eq!(None, router.find("/a/c/d"));
    assert_eq!(Some((&src("b"), "c")), router.find("/a/b/c"));
}

#[test]
fn intermediate_node_mapped_later() {
    let mut router = ContentRouter::new();
    router.add("/a/b", src("b")).unwrap();
    router.add("/a", src("a")).unwrap();
    assert_eq!(Some((&src("a"), "x")), router.find("/a/x"));
    assert_eq!(Some((&src("b"), "")), router.find("/a/b"));
}

#[test]
fn empty_segments_are_nodes() {
    let mut router = ContentRouter::new();
    router.add("/a//b", src("s")).unwrap();
    assert_eq!(None, router.find("/a/b"));
    assert_eq!(Some((&src("s"), "x")), router.find("/a//b/x"));
}

#[test]
fn deep_trie_drops_without_overflowing() {
    let mut router = ContentRouter::new();
    let path = "/a".repeat(50_000);
    router.add(&path, src("deep")).unwrap();
    assert_eq!(Some((&src("deep"), "")), router.find(&path));
    drop(router);
}
