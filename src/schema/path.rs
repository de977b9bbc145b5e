//! Helpers over dotted column paths. The root path is `.`.

/// Splits a dotted path into its segments; the root path has none.
pub fn split(path: &str) -> Vec<&str> {
    if path == "." || path.is_empty() {
        vec![]
    } else {
        path.split('.').collect()
    }
}

/// Joins `base` and `name` into a dotted path.
pub fn concat(base: &str, name: &str) -> String {
    if base == "." || base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

/// Returns whether `path` equals `prefix` or sits below it.
pub fn starts_with(path: &str, prefix: &str) -> bool {
    if prefix == "." || prefix.is_empty() || path == prefix {
        return true;
    }
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'.'
}

/// Returns `path` relative to `base`: `.` when they coincide, the remaining
/// dotted segments when `path` sits below `base`, `None` otherwise.
pub fn relative<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if base == "." || base.is_empty() {
        return Some(path);
    }
    if path == base {
        return Some(".");
    }
    if starts_with(path, base) {
        Some(&path[base.len() + 1..])
    } else {
        None
    }
}
