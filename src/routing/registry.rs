//! Registered controllers keyed by path-name.

use std::collections::HashMap;

use crate::controller::ControllerHandle;

/// Mapping from path-name (`"nested/sibling"`) to controller type.
///
/// Insertion order is irrelevant: the mount order is recomputed from the
/// names when the route table is built.
#[derive(Clone, Default)]
pub struct ControllerMap {
    entries: HashMap<String, ControllerHandle>,
}

impl ControllerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `controller` under `path_name`, returning any controller it replaced.
    pub fn insert(
        &mut self,
        path_name: impl Into<String>,
        controller: ControllerHandle,
    ) -> Option<ControllerHandle> {
        self.entries.insert(path_name.into(), controller)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, path_name: impl Into<String>, controller: ControllerHandle) -> Self {
        self.insert(path_name, controller);
        self
    }

    pub fn get(&self, path_name: &str) -> Option<&ControllerHandle> {
        self.entries.get(path_name)
    }

    pub fn contains(&self, path_name: &str) -> bool {
        self.entries.contains_key(path_name)
    }

    pub fn path_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ControllerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}

impl<S: Into<String>> FromIterator<(S, ControllerHandle)> for ControllerMap {
    fn from_iter<I: IntoIterator<Item = (S, ControllerHandle)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path_name, controller) in iter {
            map.insert(path_name, controller);
        }
        map
    }
}
