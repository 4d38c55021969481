use crate::{
    builder::{
        pool::{InternTable, ProtoPool, StringPool, TypeListPool, TypePool},
        refs::{BuilderMethodRef, BuilderMethodRefRc},
        slots::IndexSlot,
    },
    model::MethodReference,
    Result,
};

/// Pool of `method_id_item`s
#[derive(Debug)]
pub struct MethodPool {
    table: InternTable<MethodReference, BuilderMethodRef, IndexSlot>,
}

impl Default for MethodPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        MethodPool {
            table: InternTable::new(),
        }
    }

    /// Intern a method reference and its prototype.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for an empty name or malformed descriptors.
    pub fn intern(
        &self,
        strings: &StringPool,
        types: &TypePool,
        type_lists: &TypeListPool,
        protos: &ProtoPool,
        method: &MethodReference,
    ) -> Result<BuilderMethodRefRc> {
        if let Some(existing) = self.table.get(method) {
            return Ok(existing);
        }

        if method.name.is_empty() {
            return Err(invalid_argument!("Method {} has an empty name", method));
        }

        let defining_class = types.intern(strings, &method.defining_class)?;
        let name = strings.intern(&method.name);
        let proto = protos.intern(strings, types, type_lists, &method.proto())?;

        Ok(self.table.insert_with(method.clone(), |slot| BuilderMethodRef {
            defining_class,
            name,
            proto,
            slot,
        }))
    }

    /// Number of distinct method references
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no method was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All method references in `method_ids` order
    #[must_use]
    pub fn sorted(&self) -> Vec<BuilderMethodRefRc> {
        self.table.sorted()
    }

    /// Index assigned by the writer
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn index_of(&self, item: &BuilderMethodRef) -> Result<u32> {
        self.table.slot(item.slot, IndexSlot::Index)
    }

    /// Record the index of a method reference
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_index(&self, item: &BuilderMethodRef, index: u32) -> Result<()> {
        self.table.set_slot(item.slot, IndexSlot::Index, index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn methods_share_protos() {
        let strings = StringPool::new();
        let types = TypePool::new();
        let lists = TypeListPool::new();
        let protos = ProtoPool::new();
        let methods = MethodPool::new();

        let run = MethodReference::new("LA;", "run", vec!["I".into()], "V");
        let walk = MethodReference::new("LB;", "walk", vec!["I".into()], "V");
        let a = methods.intern(&strings, &types, &lists, &protos, &run).unwrap();
        let b = methods.intern(&strings, &types, &lists, &protos, &walk).unwrap();

        assert!(Arc::ptr_eq(a.proto(), b.proto()));
        assert_eq!(protos.len(), 1);
        assert_eq!(a.to_immutable(), run);
    }

    #[test]
    fn sorted_by_class_name_proto() {
        let strings = StringPool::new();
        let types = TypePool::new();
        let lists = TypeListPool::new();
        let protos = ProtoPool::new();
        let methods = MethodPool::new();

        for reference in [
            MethodReference::new("LB;", "a", vec![], "V"),
            MethodReference::new("LA;", "b", vec![], "V"),
            MethodReference::new("LA;", "a", vec![], "V"),
            MethodReference::new("LA;", "a", vec![], "I"),
        ] {
            methods
                .intern(&strings, &types, &lists, &protos, &reference)
                .unwrap();
        }

        let sorted: Vec<String> = methods.sorted().iter().map(|m| m.to_string()).collect();
        assert_eq!(sorted, vec!["LA;->a()I", "LA;->a()V", "LA;->b()V", "LB;->a()V"]);
    }
}
