//! Path composition for route groups
//!
//! Group prefixes and route paths are joined lexically: redundant slashes are
//! collapsed, `.` and `..` segments are resolved, and the trailing slash is
//! dropped unless the whole path is `/`.
//!
//! # Examples
//!
//! ```
//! use geneva_core::join_paths;
//!
//! assert_eq!(join_paths("", "/hello/:name"), "/hello/:name");
//! assert_eq!(join_paths("/v1", "/hello"), "/v1/hello");
//! assert_eq!(join_paths("/v1/", "//hello/"), "/v1/hello");
//! ```

/// Join a parent prefix with a relative path and normalize the result.
///
/// Empty inputs are skipped. When both are empty the result is the empty
/// string, which is the prefix of the root group.
pub fn join_paths(absolute: &str, relative: &str) -> String {
    let parts: Vec<&str> = [absolute, relative]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    clean_path(&parts.join("/"))
}

/// Return the shortest lexically equivalent form of `path`.
///
/// - multiple slashes are replaced by a single one
/// - `.` segments are removed
/// - `..` removes the preceding segment; at the root it is dropped
/// - the empty path becomes `.`
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_root_group() {
        assert_eq!(join_paths("", "/hello/:name"), "/hello/:name");
        assert_eq!(join_paths("", "/"), "/");
        assert_eq!(join_paths("", ""), "");
    }

    #[test]
    fn test_join_nested_prefix() {
        assert_eq!(join_paths("/v1", "/hello"), "/v1/hello");
        assert_eq!(join_paths("/group", "/handle"), "/group/handle");
        assert_eq!(join_paths("/v1", ""), "/v1");
        assert_eq!(join_paths("/v1", "/"), "/v1");
    }

    #[test]
    fn test_join_collapses_slashes() {
        assert_eq!(join_paths("/v1/", "/hello"), "/v1/hello");
        assert_eq!(join_paths("//v1//", "//hello//"), "/v1/hello");
        assert_eq!(join_paths("/", "/"), "/");
    }

    #[test]
    fn test_clean_dot_segments() {
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/a/../b"), "/b");
        assert_eq!(clean_path("/../a"), "/a");
        assert_eq!(clean_path("a/../.."), "..");
        assert_eq!(clean_path(""), ".");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_join_keeps_pattern_segments() {
        assert_eq!(
            join_paths("/users/:user_id", "/posts/*rest"),
            "/users/:user_id/posts/*rest"
        );
    }
}
