use crate::{
    builder::{
        pool::{InternTable, StringPool, TypeListPool, TypePool},
        refs::{BuilderProto, BuilderProtoRc},
        slots::IndexSlot,
    },
    model::{check_type_descriptor, shorty_for, MethodProtoReference},
    Result,
};

/// Pool of `proto_id_item`s
#[derive(Debug)]
pub struct ProtoPool {
    table: InternTable<MethodProtoReference, BuilderProto, IndexSlot>,
}

impl Default for ProtoPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtoPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        ProtoPool {
            table: InternTable::new(),
        }
    }

    /// Intern a prototype together with its shorty, parameter list and return type.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for malformed descriptors, including `V` as
    /// a parameter type.
    pub fn intern(
        &self,
        strings: &StringPool,
        types: &TypePool,
        type_lists: &TypeListPool,
        proto: &MethodProtoReference,
    ) -> Result<BuilderProtoRc> {
        if let Some(existing) = self.table.get(proto) {
            return Ok(existing);
        }

        for parameter in &proto.parameter_types {
            check_type_descriptor(parameter, false)?;
        }
        let shorty = strings.intern(&shorty_for(&proto.parameter_types, &proto.return_type)?);
        let parameters = type_lists.intern(strings, types, &proto.parameter_types)?;
        let return_type = types.intern(strings, &proto.return_type)?;

        Ok(self.table.insert_with(proto.clone(), |slot| BuilderProto {
            shorty,
            parameters,
            return_type,
            slot,
        }))
    }

    /// Number of distinct prototypes
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no prototype was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All prototypes in `proto_ids` order
    #[must_use]
    pub fn sorted(&self) -> Vec<BuilderProtoRc> {
        self.table.sorted()
    }

    /// Index assigned by the writer
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn index_of(&self, item: &BuilderProto) -> Result<u32> {
        self.table.slot(item.slot, IndexSlot::Index)
    }

    /// Record the index of a prototype
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_index(&self, item: &BuilderProto, index: u32) -> Result<()> {
        self.table.set_slot(item.slot, IndexSlot::Index, index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    type Pools = (StringPool, TypePool, TypeListPool, ProtoPool);

    fn pools() -> Pools {
        (
            StringPool::new(),
            TypePool::new(),
            TypeListPool::new(),
            ProtoPool::new(),
        )
    }

    fn intern(pools: &Pools, params: &[&str], ret: &str) -> Result<BuilderProtoRc> {
        let proto = MethodProtoReference::new(params.iter().map(|p| p.to_string()).collect(), ret);
        pools.3.intern(&pools.0, &pools.1, &pools.2, &proto)
    }

    #[test]
    fn shorty_is_derived() {
        let pools = pools();
        let proto = intern(&pools, &["I", "[J", "Ljava/lang/String;"], "Z").unwrap();
        assert_eq!(proto.shorty().as_str(), "ZILL");
        assert!(Arc::ptr_eq(proto.shorty(), &pools.0.intern("ZILL")));
    }

    #[test]
    fn dedup_and_order() {
        let pools = pools();
        let a = intern(&pools, &["I"], "V").unwrap();
        let b = intern(&pools, &["I"], "V").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        intern(&pools, &[], "V").unwrap();
        intern(&pools, &["J"], "I").unwrap();

        let sorted: Vec<String> = pools.3.sorted().iter().map(|p| p.to_string()).collect();
        assert_eq!(sorted, vec!["(J)I", "()V", "(I)V"]);
    }

    #[test]
    fn void_parameter_rejected() {
        let pools = pools();
        assert!(intern(&pools, &["V"], "V").is_err());
        assert!(pools.3.is_empty());
    }
}
