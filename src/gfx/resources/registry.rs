//! Id-indexed resource registry shared by the shader and texture managers.
//!
//! Two id spaces live side by side. Built-ins are stored under their stable
//! ordinal (0, 1, 2, ...). Resources registered by name, or added anonymously,
//! get sequential ids starting at [`DYNAMIC_ID_BASE`], so the two never collide.
//! Entries are never removed.

use std::collections::{BTreeMap, HashMap};

/// First id handed out to named or anonymous entries
pub const DYNAMIC_ID_BASE: u32 = 1000;

#[derive(Debug)]
pub struct Registry<T> {
    entries: BTreeMap<u32, T>,
    names: HashMap<String, u32>,
    next_dynamic: u32,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            names: HashMap::new(),
            next_dynamic: DYNAMIC_ID_BASE,
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a built-in under its ordinal, creating it only on first insertion
    pub fn insert_builtin(&mut self, ordinal: u32, create: impl FnOnce() -> T) -> u32 {
        debug_assert!(ordinal < DYNAMIC_ID_BASE, "built-in ordinal out of range");
        self.entries.entry(ordinal).or_insert_with(create);
        ordinal
    }

    /// Registers a resource under `name`.
    ///
    /// If the name is already known its existing id is returned and `create`
    /// is not called, so no second instance is ever built.
    pub fn register(&mut self, name: &str, create: impl FnOnce() -> T) -> u32 {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = self.insert_anonymous(create());
        self.names.insert(name.to_string(), id);
        id
    }

    /// Stores a resource without a name
    pub fn insert_anonymous(&mut self, value: T) -> u32 {
        let id = self.next_dynamic;
        self.next_dynamic += 1;
        self.entries.insert(id, value);
        id
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.entries.iter_mut().map(|(id, value)| (*id, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_registration_is_stable() {
        let mut registry = Registry::new();
        let mut built = 0;
        let first = registry.register("glow", || {
            built += 1;
            "glow"
        });
        let second = registry.register("glow", || {
            built += 1;
            "glow again"
        });
        assert_eq!(first, second);
        assert_eq!(built, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(first), Some(&"glow"));
    }

    #[test]
    fn test_id_spaces_do_not_collide() {
        let mut registry = Registry::new();
        assert_eq!(registry.insert_builtin(0, || 'a'), 0);
        assert_eq!(registry.insert_builtin(3, || 'b'), 3);
        assert_eq!(registry.register("c", || 'c'), DYNAMIC_ID_BASE);
        assert_eq!(registry.insert_anonymous('d'), DYNAMIC_ID_BASE + 1);
        assert_eq!(registry.insert_builtin(0, || 'z'), 0);
        assert_eq!(registry.get(0), Some(&'a'));
        assert_eq!(registry.id_of("c"), Some(DYNAMIC_ID_BASE));
        assert_eq!(registry.id_of("missing"), None);
    }
}
