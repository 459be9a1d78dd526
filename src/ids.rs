//! Collision-free ids for cloned nodes.

use std::collections::HashSet;

use crate::dom::Document;

/// Every `id` in use in one document.
///
/// Scoped to a single injection; never shared across files.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry(HashSet<String>);

impl IdRegistry {
    pub fn new() -> Self {
        IdRegistry(HashSet::new())
    }

    pub fn from_document(doc: &Document) -> Self {
        IdRegistry(doc.ids().map(str::to_string).collect())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: String) -> bool {
        self.0.insert(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reserve an id derived from `base_id` for `language`.
    ///
    /// Tries `{base}-{language}`, then `{base}-{language}-1`, `-2`, ...
    /// The returned id is already recorded. A node without an id gets none.
    pub fn allocate(&mut self, base_id: Option<&str>, language: &str) -> Option<String> {
        let base = base_id?;
        let candidate = format!("{base}-{language}");
        let id = if !self.contains(&candidate) {
            candidate
        } else {
            (1..)
                .map(|counter| format!("{candidate}-{counter}"))
                .find(|id| !self.contains(id))?
        };
        self.insert(id.clone());
        Some(id)
    }
}
