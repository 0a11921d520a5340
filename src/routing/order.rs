//! Mount ordering and index-name collision checks.
//!
//! # Responsibilities
//! - Reject malformed path-names
//! - Order path-names so deeper names mount before shallower ones
//! - Reject `P/index` when `P` is also registered
//!
//! # Ordering
//! 1. More `/`-separated segments first
//! 2. At equal depth, a name whose last segment is `index` goes last
//! 3. Otherwise ascending lexicographic order

use std::cmp::Ordering;

use crate::error::RouteError;
use crate::routing::registry::ControllerMap;

const INDEX: &str = "index";

/// Number of `/`-separated segments in `path_name`.
pub fn depth(path_name: &str) -> usize {
    path_name.split('/').count()
}

/// True if the last segment of `path_name` is `index`.
pub fn is_index_name(path_name: &str) -> bool {
    path_name.rsplit('/').next() == Some(INDEX)
}

/// The prefix a controller is mounted under: `path_name` minus a trailing `index` segment.
pub fn mount_point(path_name: &str) -> &str {
    if path_name == INDEX {
        ""
    } else {
        path_name.strip_suffix("/index").unwrap_or(path_name)
    }
}

/// Total order deciding mount sequence.
pub fn compare_path_names(a: &str, b: &str) -> Ordering {
    depth(b).cmp(&depth(a)).then_with(|| {
        match (is_index_name(a), is_index_name(b)) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.cmp(b),
        }
    })
}

/// Reject names that cannot be turned into a route prefix.
pub fn validate_path_name(path_name: &str) -> Result<(), RouteError> {
    let invalid_segment = |segment: &str| {
        segment.is_empty()
            || segment.starts_with(':')
            || segment.starts_with('*')
            || segment.contains(['{', '}', '?', '#'])
    };

    if path_name.split('/').any(invalid_segment) {
        return Err(RouteError::InvalidPathName(path_name.to_string()));
    }
    Ok(())
}

/// Fail if any `P/index` is registered alongside `P`.
///
/// `names` are checked in the given order so the reported pair is deterministic.
pub fn validate_index_names(names: &[&str], controllers: &ControllerMap) -> Result<(), RouteError> {
    for name in names.iter().filter(|n| **n != INDEX && is_index_name(n)) {
        let base = mount_point(name);
        if let (Some(first), Some(second)) = (controllers.get(base), controllers.get(name)) {
            return Err(RouteError::NamingCollision {
                first: first.name(),
                second: second.name(),
            });
        }
    }
    Ok(())
}

/// Validate every registered path-name and return them in mount order.
pub fn mount_order(controllers: &ControllerMap) -> Result<Vec<String>, RouteError> {
    let mut names: Vec<&str> = controllers.path_names().collect();
    for name in &names {
        validate_path_name(name)?;
    }

    names.sort_by(|a, b| compare_path_names(a, b));
    validate_index_names(&names, controllers)?;

    Ok(names.into_iter().map(str::to_string).collect())
}
