#![forbid(unsafe_code)]

//! Handle table backing the DOM surface.
//!
//! # Invariants
//!
//! 1. A live handle resolves to the value it was issued for.
//! 2. Removed handles are reissued before the table grows, so transient
//!    elements (click ripples) do not grow it for the life of the page.

use folio_core::ElementId;

/// Slot table mapping [`ElementId`]s to values.
#[derive(Debug, Clone)]
pub struct HandleTable<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store `value`, reusing a freed slot when one exists.
    pub fn insert(&mut self, value: T) -> ElementId {
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            *slot = Some(value);
            return ElementId(index);
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Some(value));
        ElementId(index)
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&T> {
        self.slots.get(id.get() as usize)?.as_ref()
    }

    /// Take the value out and free its slot. Unknown handles return `None`.
    pub fn remove(&mut self, id: ElementId) -> Option<T> {
        let value = self.slots.get_mut(id.get() as usize)?.take()?;
        self.free.push(id.get());
        Some(value)
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots allocated so far, live or free.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn handles_resolve_until_removed() {
        let mut t = HandleTable::new();
        let a = t.insert("nav");
        let b = t.insert("hero");
        assert_eq!(t.get(a), Some(&"nav"));
        assert_eq!(t.remove(b), Some("hero"));
        assert_eq!(t.get(b), None);
        assert_eq!(t.remove(b), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn repeated_transient_children_reuse_one_slot() {
        let mut t = HandleTable::new();
        let button = t.insert("button".to_owned());
        for click in 0..1000 {
            let ripple = t.insert(format!("ripple {click}"));
            assert_ne!(ripple, button);
            assert!(t.remove(ripple).is_some());
        }
        assert_eq!(t.capacity(), 2);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(button).map(String::as_str), Some("button"));
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut t: HandleTable<u8> = HandleTable::default();
        assert!(t.is_empty());
        assert_eq!(t.get(ElementId(7)), None);
        assert_eq!(t.remove(ElementId(7)), None);
    }
}
