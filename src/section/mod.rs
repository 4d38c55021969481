//! Read contracts for the binary writer.
//!
//! Once construction is complete, a writer walks the pools through the traits in this module:
//! it iterates every section in its required order, reads the per-item data it encodes, and
//! records the index or file offset it assigned to each item. Those assignments are the only
//! mutation the pools accept after construction. Each slot is written exactly once and read
//! any number of times afterwards.
//!
//! # Key Components
//!
//! - [`IndexSection`] - Sections addressed by index (`string_ids`, `type_ids`, `proto_ids`,
//!   `field_ids`, `method_ids`)
//! - [`OffsetSection`] - Sections addressed by file offset (type lists, annotations, annotation
//!   sets)
//! - [`ClassSection`] - `class_defs` together with the member data of each class
//! - [`DebugWriter`] / [`write_debug_item`] - Dispatch of debug items to per-kind emitters
//!
//! # Examples
//!
//! ```rust
//! use dexbuilder::{section::IndexSection, DexBuilder};
//!
//! let builder = DexBuilder::new();
//! builder.intern_type("Ljava/lang/String;")?;
//! builder.intern_type("I")?;
//!
//! let types = builder.types();
//! for (index, ty) in types.sorted_items().iter().enumerate() {
//!     types.set_item_index(ty, index as u32)?;
//! }
//!
//! let int = builder.intern_type("I")?;
//! assert_eq!(types.item_index(&int)?, 0);
//! # Ok::<(), dexbuilder::Error>(())
//! ```

mod class;
mod debug;

pub use class::ClassSection;
pub use debug::{write_debug_item, DebugWriter};

use std::sync::Arc;

use crate::{
    builder::{
        pool::{
            AnnotationPool, AnnotationSetPool, FieldPool, MethodPool, ProtoPool, StringPool,
            TypeListPool, TypePool,
        },
        BuilderAnnotation, BuilderAnnotationSet, BuilderFieldRef, BuilderMethodRef, BuilderProto,
        BuilderString, BuilderType, BuilderTypeList,
    },
    Result,
};

/// A section whose items are referenced by their position in a sorted id table
pub trait IndexSection {
    /// Item stored in the section
    type Item;

    /// All items in id order
    fn sorted_items(&self) -> Vec<Arc<Self::Item>>;

    /// Index assigned to `item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before [`IndexSection::set_item_index`] was
    /// called for the item.
    fn item_index(&self, item: &Self::Item) -> Result<u32>;

    /// Record the index assigned to `item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_item_index(&self, item: &Self::Item, index: u32) -> Result<()>;
}

/// A section whose items are referenced by their file offset
pub trait OffsetSection {
    /// Item stored in the section
    type Item;

    /// All items that need to be written. Empty type lists and annotation sets are omitted;
    /// their offset reads as 0.
    fn items(&self) -> Vec<Arc<Self::Item>>;

    /// Offset assigned to `item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before the offset was recorded.
    fn item_offset(&self, item: &Self::Item) -> Result<u32>;

    /// Record the offset of `item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_item_offset(&self, item: &Self::Item, offset: u32) -> Result<()>;
}

macro_rules! index_section {
    ($pool:ty, $item:ty) => {
        impl IndexSection for $pool {
            type Item = $item;

            fn sorted_items(&self) -> Vec<Arc<$item>> {
                self.sorted()
            }

            fn item_index(&self, item: &$item) -> Result<u32> {
                self.index_of(item)
            }

            fn set_item_index(&self, item: &$item, index: u32) -> Result<()> {
                self.set_index(item, index)
            }
        }
    };
}

macro_rules! offset_section {
    ($pool:ty, $item:ty, $items:ident) => {
        impl OffsetSection for $pool {
            type Item = $item;

            fn items(&self) -> Vec<Arc<$item>> {
                self.$items()
            }

            fn item_offset(&self, item: &$item) -> Result<u32> {
                self.offset_of(item)
            }

            fn set_item_offset(&self, item: &$item, offset: u32) -> Result<()> {
                self.set_offset(item, offset)
            }
        }
    };
}

index_section!(StringPool, BuilderString);
index_section!(TypePool, BuilderType);
index_section!(ProtoPool, BuilderProto);
index_section!(FieldPool, BuilderFieldRef);
index_section!(MethodPool, BuilderMethodRef);

offset_section!(TypeListPool, BuilderTypeList, sorted);
offset_section!(AnnotationPool, BuilderAnnotation, items);
offset_section!(AnnotationSetPool, BuilderAnnotationSet, items);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DexBuilder, Error};

    #[test]
    fn index_written_once() {
        let builder = DexBuilder::new();
        let hello = builder.intern_string("hello");
        let strings = builder.strings();

        assert!(matches!(
            strings.item_index(&hello),
            Err(Error::IndexNotAssigned)
        ));
        strings.set_item_index(&hello, 4).unwrap();
        assert_eq!(strings.item_index(&hello).unwrap(), 4);
        assert!(matches!(
            strings.set_item_index(&hello, 5),
            Err(Error::IndexAlreadyAssigned)
        ));
    }

    #[test]
    fn empty_type_list_omitted() {
        let builder = DexBuilder::new();
        let empty = builder.intern_type_list::<&str>(&[]).unwrap();
        let list = builder.intern_type_list(&["I", "J"]).unwrap();

        let lists = builder.type_lists();
        let items = OffsetSection::items(lists);
        assert_eq!(items.len(), 1);
        assert!(Arc::ptr_eq(&items[0], &list));
        assert_eq!(lists.item_offset(&empty).unwrap(), 0);

        lists.set_item_offset(&list, 0x70).unwrap();
        assert_eq!(lists.item_offset(&list).unwrap(), 0x70);
    }

    #[test]
    fn sorted_in_utf16_order() {
        let builder = DexBuilder::new();
        builder.intern_string("\u{10000}");
        builder.intern_string("\u{ffff}");
        builder.intern_string("a");

        let sorted: Vec<String> = builder
            .strings()
            .sorted_items()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        assert_eq!(sorted, vec!["a", "\u{10000}", "\u{ffff}"]);
    }
}
