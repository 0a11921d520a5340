//! Controller naming conventions.
//!
//! A path-name `nested/sibling` belongs to `NestedSiblingController`, and
//! that controller's views live under `nested/sibling/`.

/// Convert a path-name (optionally with a file extension) to its controller name.
pub fn controllerize(path_name: &str) -> String {
    let stem = path_name.split('.').next().unwrap_or_default();
    let mut name: String = stem.split('/').map(uc_first).collect();
    name.push_str("Controller");
    name
}

/// Convert a controller name back to its route string.
pub fn routify(controller_name: &str) -> String {
    let base = controller_name
        .strip_suffix("Controller")
        .unwrap_or(controller_name);

    let mut route = String::with_capacity(base.len() + 4);
    for (i, ch) in base.char_indices() {
        if ch.is_uppercase() && i > 0 {
            route.push('/');
        }
        route.extend(ch.to_lowercase());
    }
    route
}

/// Uppercase the first character of `word`.
pub fn uc_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
