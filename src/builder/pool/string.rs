use crate::{
    builder::{
        refs::{BuilderString, BuilderStringRc},
        slots::IndexSlot,
    },
    Result,
};

use super::InternTable;

/// Pool of `string_id_item`s
#[derive(Debug)]
pub struct StringPool {
    table: InternTable<String, BuilderString, IndexSlot>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        StringPool {
            table: InternTable::new(),
        }
    }

    /// Intern a string, returning its canonical reference
    pub fn intern(&self, value: &str) -> BuilderStringRc {
        if let Some(existing) = self.table.get(value) {
            return existing;
        }

        self.table.insert_with(value.to_string(), |slot| BuilderString {
            value: value.to_string(),
            slot,
        })
    }

    /// Intern an optional string
    pub fn intern_nullable(&self, value: Option<&str>) -> Option<BuilderStringRc> {
        value.map(|v| self.intern(v))
    }

    /// Look up a string without interning it
    #[must_use]
    pub fn get(&self, value: &str) -> Option<BuilderStringRc> {
        self.table.get(value)
    }

    /// Number of distinct strings
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no string was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All strings in `string_ids` order
    #[must_use]
    pub fn sorted(&self) -> Vec<BuilderStringRc> {
        self.table.sorted()
    }

    /// Index assigned by the writer
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn index_of(&self, item: &BuilderString) -> Result<u32> {
        self.table.slot(item.slot, IndexSlot::Index)
    }

    /// Record the index of a string
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_index(&self, item: &BuilderString, index: u32) -> Result<()> {
        self.table.set_slot(item.slot, IndexSlot::Index, index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let pool = StringPool::new();
        let a = pool.intern("hello");
        let b = pool.intern("hello");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
        assert!(pool.intern_nullable(None).is_none());
    }

    #[test]
    fn sorted_uses_utf16_order() {
        let pool = StringPool::new();
        // U+FFFD sorts after a surrogate pair in UTF-16, before it in UTF-8
        pool.intern("\u{fffd}");
        pool.intern("\u{10000}");
        pool.intern("a");

        let sorted: Vec<String> = pool.sorted().iter().map(|s| s.to_string()).collect();
        assert_eq!(sorted, vec!["a", "\u{10000}", "\u{fffd}"]);
    }

    #[test]
    fn index_slots() {
        let pool = StringPool::new();
        let s = pool.intern("x");
        assert!(pool.index_of(&s).is_err());
        pool.set_index(&s, 3).unwrap();
        assert_eq!(pool.index_of(&s).unwrap(), 3);
        assert!(pool.set_index(&s, 4).is_err());
    }
}
