//! String-id interning for tasks and resources.
//!
//! The service layer addresses tasks and resources by string ids; the core
//! addresses them by dense arena handles. The interner bridges the two with
//! fast hash lookups one way and an index-aligned name table the other.

use rustc_hash::FxHashMap;

/// Two-way map between external string ids and arena handles.
///
/// Handles are allocated by the arena and registered here in allocation
/// order, so the name table stays aligned with handle indices.
#[derive(Debug, Clone)]
pub struct IdInterner<H: Copy> {
    to_handle: FxHashMap<String, H>,
    names: Vec<String>,
}

impl<H: Copy> IdInterner<H> {
    /// Create an interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_handle: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Register a new id for the next allocated handle. Returns false (and
    /// registers nothing) when the id is already taken.
    pub fn register(&mut self, id: &str, handle: H) -> bool {
        if self.to_handle.contains_key(id) {
            return false;
        }
        self.to_handle.insert(id.to_string(), handle);
        self.names.push(id.to_string());
        true
    }

    /// Handle for a string id, if registered.
    #[inline]
    pub fn get(&self, id: &str) -> Option<H> {
        self.to_handle.get(id).copied()
    }

    /// String id at a handle's allocation index.
    #[inline]
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<H: Copy> Default for IdInterner<H> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut interner: IdInterner<u32> = IdInterner::with_capacity(4);

        assert!(interner.register("grind", 0));
        assert!(interner.register("polish", 1));
        assert!(!interner.register("grind", 2)); // duplicate

        assert_eq!(interner.get("grind"), Some(0));
        assert_eq!(interner.get("polish"), Some(1));
        assert_eq!(interner.get("missing"), None);

        assert_eq!(interner.name_at(0), Some("grind"));
        assert_eq!(interner.name_at(1), Some("polish"));
        assert_eq!(interner.name_at(2), None);
        assert_eq!(interner.len(), 2);
    }
}
