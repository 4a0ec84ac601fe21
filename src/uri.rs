//! Splits request targets into a path and an order-independent query string.
//!
//! Two targets whose queries differ only in parameter order canonicalize to
//! the same string, so the canonical query is usable as part of a cache key.

/// Splits `target` into its path and the canonical form of its query string.
///
/// Only the first `?` acts as the separator.  When `target` has no `?`, the
/// whole input is the path and the canonical query is empty.  Otherwise the
/// substring after the `?` is split on `&`, the parameter tokens are sorted
/// byte-lexicographically, and each token is rejoined with a leading `&`, so
/// a non-empty canonical query always begins with `&`.
///
/// Deterministic, does no I/O, and accepts any input.
///
/// # Example
/// ```
/// use portico::split_target;
/// assert_eq!(split_target("/hello"), ("/hello", String::new()));
/// assert_eq!(
///     split_target("/hello?x=456&b=8&a=123"),
///     ("/hello", "&a=123&b=8&x=456".to_string()),
/// );
/// ```
#[must_use]
pub fn split_target(target: &str) -> (&str, String) {
    let Some((path, query)) = target.split_once('?') else {
        return (target, String::new());
    };
    let mut params: Vec<&str> = query.split('&').collect();
    params.sort_unstable();
    let mut canonical = String::with_capacity(query.len() + params.len());
    for param in params {
        canonical.push('&');
        canonical.push_str(param);
    }
    (path, canonical)
}
