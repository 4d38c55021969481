use std::{collections::HashSet, sync::Arc};

use crate::{
    builder::{
        pool::InternTable,
        refs::BuilderTypeRc,
        slots::{OffsetSlot, SlotId},
        value::BuilderAnnotationElement,
    },
    model::{Annotation, AnnotationSet, AnnotationVisibility},
    Result,
};

/// Reference counted [`BuilderAnnotation`]
pub type BuilderAnnotationRc = Arc<BuilderAnnotation>;
/// Reference counted [`BuilderAnnotationSet`]
pub type BuilderAnnotationSetRc = Arc<BuilderAnnotationSet>;

/// An interned `annotation_item`
#[derive(Debug)]
pub struct BuilderAnnotation {
    visibility: AnnotationVisibility,
    ty: BuilderTypeRc,
    elements: Vec<BuilderAnnotationElement>,
    slot: SlotId,
}

impl BuilderAnnotation {
    /// Visibility byte
    #[must_use]
    pub fn visibility(&self) -> AnnotationVisibility {
        self.visibility
    }

    /// Annotation type
    #[must_use]
    pub fn ty(&self) -> &BuilderTypeRc {
        &self.ty
    }

    /// Elements, ordered by name
    #[must_use]
    pub fn elements(&self) -> &[BuilderAnnotationElement] {
        &self.elements
    }

    /// Convert back to the model annotation
    #[must_use]
    pub fn to_immutable(&self) -> Annotation {
        Annotation {
            visibility: self.visibility,
            ty: self.ty.as_str().to_string(),
            elements: self
                .elements
                .iter()
                .map(BuilderAnnotationElement::to_immutable)
                .collect(),
        }
    }
}

/// Pool of `annotation_item`s
#[derive(Debug)]
pub struct AnnotationPool {
    table: InternTable<Annotation, BuilderAnnotation, OffsetSlot>,
}

impl Default for AnnotationPool {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        AnnotationPool {
            table: InternTable::new(),
        }
    }

    /// Intern an annotation.
    ///
    /// `build` interns the annotation type and element values; it only runs when `annotation`
    /// has not been seen before.
    ///
    /// # Errors
    /// Propagates the error returned by `build`.
    pub fn intern_with<F>(&self, annotation: &Annotation, build: F) -> Result<BuilderAnnotationRc>
    where
        F: FnOnce() -> Result<(BuilderTypeRc, Vec<BuilderAnnotationElement>)>,
    {
        if let Some(existing) = self.table.get(annotation) {
            return Ok(existing);
        }

        let (ty, elements) = build()?;
        Ok(self.table.insert_with(annotation.clone(), |slot| BuilderAnnotation {
            visibility: annotation.visibility,
            ty,
            elements,
            slot,
        }))
    }

    /// Number of distinct annotations
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no annotation was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All annotations, in no particular order
    #[must_use]
    pub fn items(&self) -> Vec<BuilderAnnotationRc> {
        self.table.values()
    }

    /// File offset assigned by the writer
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn offset_of(&self, item: &BuilderAnnotation) -> Result<u32> {
        self.table.slot(item.slot, OffsetSlot::Offset)
    }

    /// Record the file offset of an annotation
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    pub fn set_offset(&self, item: &BuilderAnnotation, offset: u32) -> Result<()> {
        self.table.set_slot(item.slot, OffsetSlot::Offset, offset)
    }
}

/// An interned `annotation_set_item`
#[derive(Debug)]
pub struct BuilderAnnotationSet {
    annotations: Vec<BuilderAnnotationRc>,
    slot: SlotId,
}

impl BuilderAnnotationSet {
    /// Annotations ordered by type
    #[must_use]
    pub fn annotations(&self) -> &[BuilderAnnotationRc] {
        &self.annotations
    }

    /// Returns `true` for the empty set, which writers treat as absent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Convert back to the model set
    #[must_use]
    pub fn to_immutable(&self) -> AnnotationSet {
        self.annotations
            .iter()
            .map(|annotation| annotation.to_immutable())
            .collect()
    }
}

/// Pool of `annotation_set_item`s
#[derive(Debug)]
pub struct AnnotationSetPool {
    table: InternTable<AnnotationSet, BuilderAnnotationSet, OffsetSlot>,
}

impl Default for AnnotationSetPool {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationSetPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        AnnotationSetPool {
            table: InternTable::new(),
        }
    }

    /// Intern an annotation set.
    ///
    /// `intern_annotation` is called for each member, in type order, when the set is new.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if two annotations of the set share a type,
    /// and propagates the error returned by `intern_annotation`.
    pub fn intern_with<F>(
        &self,
        set: &AnnotationSet,
        mut intern_annotation: F,
    ) -> Result<BuilderAnnotationSetRc>
    where
        F: FnMut(&Annotation) -> Result<BuilderAnnotationRc>,
    {
        if let Some(existing) = self.table.get(set) {
            return Ok(existing);
        }

        let mut seen = HashSet::new();
        for annotation in set {
            if !seen.insert(annotation.ty.as_str()) {
                return Err(invalid_argument!(
                    "Annotation set contains {} more than once",
                    annotation.ty
                ));
            }
        }

        let annotations = set
            .iter()
            .map(&mut intern_annotation)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.table.insert_with(set.clone(), |slot| BuilderAnnotationSet {
            annotations,
            slot,
        }))
    }

    /// Number of distinct sets, including the empty set
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no set was interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All non-empty sets, in no particular order
    #[must_use]
    pub fn items(&self) -> Vec<BuilderAnnotationSetRc> {
        let mut sets = self.table.values();
        sets.retain(|set| !set.is_empty());
        sets
    }

    /// File offset assigned by the writer; the empty set is always at offset `0`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    pub fn offset_of(&self, item: &BuilderAnnotationSet) -> Result<u32> {
        if item.is_empty() {
            return Ok(0);
        }
        self.table.slot(item.slot, OffsetSlot::Offset)
    }

    /// Record the file offset of a set
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment and
    /// [`crate::Error::InvalidArgument`] for the empty set.
    pub fn set_offset(&self, item: &BuilderAnnotationSet, offset: u32) -> Result<()> {
        if item.is_empty() {
            return Err(invalid_argument!("The empty annotation set is never written"));
        }
        self.table.set_slot(item.slot, OffsetSlot::Offset, offset)
    }
}
