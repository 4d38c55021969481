//! Write-once index and offset slots.
//!
//! Builder references are immutable. The numbers a binary writer assigns to them later (item
//! indices, file offsets of data items) live in a side table owned by the pool that created the
//! reference. Each reference carries the [`SlotId`] of its row; the columns of a row are the
//! slot kinds of that pool.
//!
//! A slot moves from unassigned to assigned exactly once. A second assignment fails with
//! [`crate::Error::IndexAlreadyAssigned`], reading an unassigned slot with
//! [`crate::Error::IndexNotAssigned`].

use std::{marker::PhantomData, sync::OnceLock};

use strum::EnumCount;

use crate::{Error, Result};

/// A column of a [`SlotTable`]
pub trait SlotKind: Copy + EnumCount {
    /// Column position of this kind, in `0..Self::COUNT`
    fn position(self) -> usize;
}

/// Row handle into a [`SlotTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    /// Row number
    #[must_use]
    pub fn row(self) -> usize {
        self.0
    }
}

/// The index slot of items that are referenced by index (`*_id_item`s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount)]
pub enum IndexSlot {
    /// Position of the item in its id section
    Index,
}

impl SlotKind for IndexSlot {
    fn position(self) -> usize {
        self as usize
    }
}

/// The offset slot of items that are referenced by file offset (data items)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount)]
pub enum OffsetSlot {
    /// File offset of the item
    Offset,
}

impl SlotKind for OffsetSlot {
    fn position(self) -> usize {
        self as usize
    }
}

/// Append-only table of write-once `u32` slots
#[derive(Debug)]
pub struct SlotTable<K: SlotKind> {
    rows: boxcar::Vec<Box<[OnceLock<u32>]>>,
    _kind: PhantomData<K>,
}

impl<K: SlotKind> Default for SlotTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlotKind> SlotTable<K> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        SlotTable {
            rows: boxcar::Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Append a row of unassigned slots and return its handle
    pub fn allocate(&self) -> SlotId {
        let row: Box<[OnceLock<u32>]> = (0..K::COUNT).map(|_| OnceLock::new()).collect();
        SlotId(self.rows.push(row))
    }

    fn cell(&self, id: SlotId, kind: K) -> Result<&OnceLock<u32>> {
        self.rows
            .get(id.0)
            .and_then(|row| row.get(kind.position()))
            .ok_or_else(|| invalid_argument!("Slot row {} does not belong to this table", id.0))
    }

    /// Assign a slot.
    ///
    /// # Errors
    /// Returns [`Error::IndexAlreadyAssigned`] if the slot already holds a value.
    pub fn set(&self, id: SlotId, kind: K, value: u32) -> Result<()> {
        self.cell(id, kind)?
            .set(value)
            .map_err(|_| Error::IndexAlreadyAssigned)
    }

    /// Read a slot.
    ///
    /// # Errors
    /// Returns [`Error::IndexNotAssigned`] if the slot was never assigned.
    pub fn get(&self, id: SlotId, kind: K) -> Result<u32> {
        self.cell(id, kind)?
            .get()
            .copied()
            .ok_or(Error::IndexNotAssigned)
    }

    /// Read a slot, `None` if unassigned
    #[must_use]
    pub fn try_get(&self, id: SlotId, kind: K) -> Option<u32> {
        self.cell(id, kind).ok().and_then(|cell| cell.get().copied())
    }

    /// Number of allocated rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.count()
    }

    /// Returns `true` if no row was allocated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCount)]
    enum TwoSlots {
        First,
        Second,
    }

    impl SlotKind for TwoSlots {
        fn position(self) -> usize {
            self as usize
        }
    }

    #[test]
    fn write_once() {
        let table = SlotTable::<TwoSlots>::new();
        let id = table.allocate();

        assert!(matches!(table.get(id, TwoSlots::First), Err(Error::IndexNotAssigned)));
        table.set(id, TwoSlots::First, 7).unwrap();
        assert_eq!(table.get(id, TwoSlots::First).unwrap(), 7);
        assert!(matches!(
            table.set(id, TwoSlots::First, 8),
            Err(Error::IndexAlreadyAssigned)
        ));
        assert_eq!(table.get(id, TwoSlots::First).unwrap(), 7);
        assert_eq!(table.try_get(id, TwoSlots::Second), None);
    }

    #[test]
    fn concurrent_allocation() {
        let table = Arc::new(SlotTable::<IndexSlot>::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || (0..100).map(|_| table.allocate()).collect::<Vec<_>>())
            })
            .collect();

        let mut rows: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .map(SlotId::row)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        assert_eq!(rows.len(), 800);
        assert_eq!(table.len(), 800);
    }
}
