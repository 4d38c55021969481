use crate::{
    builder::{
        pool::{InternTable, StringPool, TypePool},
        refs::{BuilderFieldRef, BuilderFieldRefRc},
        slots::IndexSlot,
    },
    model::{check_type_descriptor, FieldReference},
    Result,
};

/// Pool of `field_id_item`s
#[derive(Debug)]
pub struct FieldPool {
    table: InternTable<FieldReference, BuilderFieldRef, IndexSlot>,
}

impl Default for FieldPool {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        FieldPool {
            table: InternTable::new(),
        }
    }

    /// Intern a field reference.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for an empty name, a `void` field type or a
    /// malformed descriptor.
    pub fn intern(
        &self,
        strings: &StringPool,
        types: &TypePool,
        field: &FieldReference,
    ) -> Result<BuilderFieldRefRc> {
        if let Some(existing) = self.table.get(field) {
            return Ok(existing);
        }

        if field.name.is_empty() {
            return Err(invalid_argument!("Field {} has an empty name", field));
        }
        check_type_descriptor(&field.ty, false)?;

        let defining_class = types.intern(strings, &field.defining_class)?;
        let name = strings.intern(&field.name);
        let ty = types.intern(strings, &field.ty)?;

        Ok(self.table.insert_with(field.clone(), |slot| BuilderFieldRef {
            defining_class,
            name,
            ty,
            slot,
        }))
    }

    /// Number of distinct field references
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no field was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All field references in `field_ids` order
    #[must_use]
    pub fn sorted(&self) -> Vec<BuilderFieldRefRc> {
        self.table.sorted()
    }

    /// Index assigned by the writer
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn index_of(&self, item: &BuilderFieldRef) -> Result<u32> {
        self.table.slot(item.slot, IndexSlot::Index)
    }

    /// Record the index of a field reference
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_index(&self, item: &BuilderFieldRef, index: u32) -> Result<()> {
        self.table.set_slot(item.slot, IndexSlot::Index, index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn same_key_same_reference() {
        let strings = StringPool::new();
        let types = TypePool::new();
        let fields = FieldPool::new();

        let key = FieldReference::new("LA;", "count", "I");
        let a = fields.intern(&strings, &types, &key).unwrap();
        let b = fields.intern(&strings, &types, &key).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(fields.len(), 1);
        assert_eq!(a.to_immutable(), key);
        assert!(Arc::ptr_eq(a.defining_class(), &types.get("LA;").unwrap()));
    }

    #[test]
    fn invalid_fields_rejected() {
        let strings = StringPool::new();
        let types = TypePool::new();
        let fields = FieldPool::new();

        assert!(fields
            .intern(&strings, &types, &FieldReference::new("LA;", "", "I"))
            .is_err());
        assert!(fields
            .intern(&strings, &types, &FieldReference::new("LA;", "v", "V"))
            .is_err());
        assert!(fields.is_empty());
    }
}
