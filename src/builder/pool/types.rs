use crate::{
    builder::{
        pool::{InternTable, StringPool},
        refs::{BuilderType, BuilderTypeList, BuilderTypeListRc, BuilderTypeRc},
        slots::{IndexSlot, OffsetSlot},
    },
    model::check_type_descriptor,
    Result,
};

/// Pool of `type_id_item`s
#[derive(Debug)]
pub struct TypePool {
    table: InternTable<String, BuilderType, IndexSlot>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        TypePool {
            table: InternTable::new(),
        }
    }

    /// Intern a type descriptor (and its descriptor string).
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for malformed descriptors.
    pub fn intern(&self, strings: &StringPool, descriptor: &str) -> Result<BuilderTypeRc> {
        if let Some(existing) = self.table.get(descriptor) {
            return Ok(existing);
        }

        check_type_descriptor(descriptor, true)?;
        let string = strings.intern(descriptor);
        Ok(self
            .table
            .insert_with(descriptor.to_string(), |slot| BuilderType {
                descriptor: string,
                slot,
            }))
    }

    /// Intern an optional type descriptor
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for malformed descriptors.
    pub fn intern_nullable(
        &self,
        strings: &StringPool,
        descriptor: Option<&str>,
    ) -> Result<Option<BuilderTypeRc>> {
        descriptor.map(|d| self.intern(strings, d)).transpose()
    }

    /// Look up a type without interning it
    #[must_use]
    pub fn get(&self, descriptor: &str) -> Option<BuilderTypeRc> {
        self.table.get(descriptor)
    }

    /// Number of distinct types
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no type was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All types in `type_ids` order
    #[must_use]
    pub fn sorted(&self) -> Vec<BuilderTypeRc> {
        self.table.sorted()
    }

    /// Index assigned by the writer
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn index_of(&self, item: &BuilderType) -> Result<u32> {
        self.table.slot(item.slot, IndexSlot::Index)
    }

    /// Record the index of a type
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_index(&self, item: &BuilderType, index: u32) -> Result<()> {
        self.table.set_slot(item.slot, IndexSlot::Index, index)
    }
}

/// Pool of `type_list`s (interface lists and parameter lists)
#[derive(Debug)]
pub struct TypeListPool {
    table: InternTable<Vec<String>, BuilderTypeList, OffsetSlot>,
}

impl Default for TypeListPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeListPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        TypeListPool {
            table: InternTable::new(),
        }
    }

    /// Intern an ordered list of type descriptors.
    ///
    /// The empty list is interned like any other; writers skip it and encode offset `0`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if a descriptor is malformed.
    pub fn intern<S: AsRef<str>>(
        &self,
        strings: &StringPool,
        types: &TypePool,
        descriptors: &[S],
    ) -> Result<BuilderTypeListRc> {
        let key: Vec<String> = descriptors.iter().map(|d| d.as_ref().to_string()).collect();
        if let Some(existing) = self.table.get(&key) {
            return Ok(existing);
        }

        let resolved = key
            .iter()
            .map(|descriptor| types.intern(strings, descriptor))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.table.insert_with(key, |slot| BuilderTypeList {
            types: resolved,
            slot,
        }))
    }

    /// Number of distinct lists, including the empty list
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no list was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All non-empty lists, sorted
    #[must_use]
    pub fn sorted(&self) -> Vec<BuilderTypeListRc> {
        let mut lists = self.table.sorted();
        lists.retain(|list| !list.is_empty());
        lists
    }

    /// File offset of a list; the empty list is always at offset `0`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn offset_of(&self, item: &BuilderTypeList) -> Result<u32> {
        if item.is_empty() {
            return Ok(0);
        }
        self.table.slot(item.slot, OffsetSlot::Offset)
    }

    /// Record the file offset of a list
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment and
    /// [`crate::Error::InvalidArgument`] for the empty list.
    pub fn set_offset(&self, item: &BuilderTypeList, offset: u32) -> Result<()> {
        if item.is_empty() {
            return Err(invalid_argument!("The empty type list has no offset"));
        }
        self.table.set_slot(item.slot, OffsetSlot::Offset, offset)
    }
}
