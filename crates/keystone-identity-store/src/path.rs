//! Absolute node path validation and navigation.
//!
//! A well-formed path starts with `/`, has no trailing `/` (except the root
//! itself), and has no empty, `.` or `..` components.

use crate::{StoreError, StoreResult};

/// The root node path.
pub const ROOT: &str = "/";

/// Check that `path` is a well-formed absolute node path.
pub fn validate(path: &str) -> StoreResult<()> {
    if path == ROOT {
        return Ok(());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(StoreError::invalid_path(path, "must start with '/'"));
    };
    for component in rest.split('/') {
        match component {
            "" => return Err(StoreError::invalid_path(path, "empty path component")),
            "." | ".." => {
                return Err(StoreError::invalid_path(path, "relative path component"));
            },
            _ => {},
        }
    }
    Ok(())
}

/// Parent of a validated, non-root path.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Prefix shared by every descendant of `path`.
pub fn descendant_prefix(path: &str) -> String {
    if path == ROOT { ROOT.to_string() } else { format!("{}/", path) }
}

/// All proper ancestors of a validated path, nearest-to-root first, excluding
/// the root itself.
pub fn ancestors(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut current = parent(path);
    while let Some(p) = current {
        if p == ROOT {
            break;
        }
        out.push(p);
        current = parent(p);
    }
    out.reverse();
    out
}
