//! The class pool.
//!
//! Classes are keyed by their type and kept in a `SkipMap` ordered like `type_ids`, so the
//! sorted view the writer needs is an in-order walk.
//!
//! # Sealing
//!
//! The sorted view is materialized once, on the first call to [`ClassPool::sorted`], and the
//! pool is sealed at the same moment: every later attempt to add a class fails with
//! [`Error::PoolSealed`]. Insertions hold a read guard on the seal flag and sealing takes the
//! write guard, so a class is either part of the view or rejected, never lost.

use std::sync::{Arc, OnceLock, RwLock};

use crossbeam_skiplist::SkipMap;
use strum::EnumCount;

use crate::{
    builder::{
        class::{BuilderClassDef, BuilderClassDefRc, BuilderMethod},
        refs::BuilderTypeRc,
        slots::{SlotId, SlotKind, SlotTable},
    },
    Error, Result,
};

/// Write-once slots of a class definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount)]
pub enum ClassSlot {
    /// Position in `class_defs`
    Index,
    /// Offset of the `annotations_directory_item`
    AnnotationDirectoryOffset,
    /// Offset of the `static_values` encoded array
    StaticValuesOffset,
    /// Offset of the `class_data_item`
    ClassDataOffset,
}

impl SlotKind for ClassSlot {
    fn position(self) -> usize {
        self as usize
    }
}

/// Write-once slots of a method definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount)]
pub enum MethodSlot {
    /// Offset of the `code_item`
    CodeItemOffset,
    /// Offset of the parameter `annotation_set_ref_list`
    ParameterAnnotationsOffset,
}

impl SlotKind for MethodSlot {
    fn position(self) -> usize {
        self as usize
    }
}

/// Pool of `class_def_item`s
#[derive(Debug)]
pub struct ClassPool {
    classes: SkipMap<BuilderTypeRc, BuilderClassDefRc>,
    slots: SlotTable<ClassSlot>,
    method_slots: SlotTable<MethodSlot>,
    sealed: RwLock<bool>,
    sorted: OnceLock<Vec<BuilderClassDefRc>>,
}

impl Default for ClassPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassPool {
    /// Create an empty, open pool
    #[must_use]
    pub fn new() -> Self {
        ClassPool {
            classes: SkipMap::new(),
            slots: SlotTable::new(),
            method_slots: SlotTable::new(),
            sealed: RwLock::new(false),
            sorted: OnceLock::new(),
        }
    }

    pub(crate) fn allocate_slot(&self) -> SlotId {
        self.slots.allocate()
    }

    pub(crate) fn allocate_method_slot(&self) -> SlotId {
        self.method_slots.allocate()
    }

    /// Fail early if `ty` can not be added anymore.
    ///
    /// # Errors
    /// Returns [`Error::PoolSealed`] or [`Error::DuplicateDefinition`], and
    /// [`Error::LockError`] if the seal lock was poisoned.
    pub(crate) fn check_available(&self, ty: &BuilderTypeRc) -> Result<()> {
        if *self.sealed.read().map_err(|_| Error::LockError)? {
            return Err(Error::PoolSealed);
        }
        if self.classes.contains_key(ty) {
            return Err(duplicate_definition!("Class {} has already been interned", ty));
        }
        Ok(())
    }

    /// Add a fully built class.
    ///
    /// # Errors
    /// Returns [`Error::PoolSealed`] after the sorted view was read, and
    /// [`Error::DuplicateDefinition`] if the class type is already present, including when
    /// another thread added it concurrently. Returns [`Error::LockError`] if the seal lock was
    /// poisoned.
    pub(crate) fn insert(&self, class: BuilderClassDef) -> Result<BuilderClassDefRc> {
        let sealed = self.sealed.read().map_err(|_| Error::LockError)?;
        if *sealed {
            return Err(Error::PoolSealed);
        }

        let class = Arc::new(class);
        let entry = self
            .classes
            .get_or_insert(Arc::clone(&class.ty), Arc::clone(&class));
        if !Arc::ptr_eq(entry.value(), &class) {
            return Err(duplicate_definition!(
                "Class {} has already been interned",
                class.ty
            ));
        }
        Ok(class)
    }

    /// Look up a class by type
    #[must_use]
    pub fn get(&self, ty: &BuilderTypeRc) -> Option<BuilderClassDefRc> {
        self.classes.get(ty).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no class was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns `true` once the sorted view was materialized
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        *read_lock!(self.sealed)
    }

    /// All classes ordered by type. Seals the pool on first use.
    pub fn sorted(&self) -> &[BuilderClassDefRc] {
        self.sorted.get_or_init(|| {
            let mut sealed = write_lock!(self.sealed);
            *sealed = true;

            let classes: Vec<BuilderClassDefRc> = self
                .classes
                .iter()
                .map(|entry| Arc::clone(entry.value()))
                .collect();
            log::debug!("Class pool sealed with {} classes", classes.len());
            classes
        })
    }

    /// Read a class slot
    ///
    /// # Errors
    /// Returns [`Error::IndexNotAssigned`] before assignment.
    pub fn slot(&self, class: &BuilderClassDef, kind: ClassSlot) -> Result<u32> {
        self.slots.get(class.slot, kind)
    }

    /// Assign a class slot
    ///
    /// # Errors
    /// Returns [`Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_slot(&self, class: &BuilderClassDef, kind: ClassSlot, value: u32) -> Result<()> {
        self.slots.set(class.slot, kind, value)
    }

    /// Read a method slot
    ///
    /// # Errors
    /// Returns [`Error::IndexNotAssigned`] before assignment.
    pub fn method_slot(&self, method: &BuilderMethod, kind: MethodSlot) -> Result<u32> {
        self.method_slots.get(method.slot, kind)
    }

    /// Assign a method slot
    ///
    /// # Errors
    /// Returns [`Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_method_slot(
        &self,
        method: &BuilderMethod,
        kind: MethodSlot,
        value: u32,
    ) -> Result<()> {
        self.method_slots.set(method.slot, kind, value)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::DexBuilder;

    #[test]
    fn poisoned_seal_reports_lock_error() {
        let builder = DexBuilder::new();
        let ty = builder.intern_type("LA;").unwrap();
        let pool = Arc::new(ClassPool::new());

        let poisoner = Arc::clone(&pool);
        let _ = thread::spawn(move || {
            let _guard = poisoner.sealed.write().unwrap();
            panic!("poison the seal");
        })
        .join();

        assert!(matches!(pool.check_available(&ty), Err(Error::LockError)));
    }
}
