//! Annotations and annotation elements.
//!
//! # Key Types
//! - [`Annotation`]: a visibility-tagged annotation attached to a class, field, method or
//!   parameter
//! - [`EncodedAnnotation`]: an annotation nested inside an encoded value (no visibility)
//! - [`AnnotationElement`]: a `name = value` pair
//! - [`AnnotationSet`]: the ordered set form used throughout the model

use std::{cmp::Ordering, collections::BTreeSet};

use crate::{
    model::{flags::AnnotationVisibility, types::utf16_cmp, value::EncodedValue},
    Result,
};

/// The set of annotations attached to a single item
pub type AnnotationSet = BTreeSet<Annotation>;

/// A single `name = value` element of an annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationElement {
    /// Element name
    pub name: String,
    /// Element value
    pub value: EncodedValue,
}

impl AnnotationElement {
    /// Create a new annotation element
    pub fn new(name: impl Into<String>, value: EncodedValue) -> Self {
        AnnotationElement {
            name: name.into(),
            value,
        }
    }
}

impl Ord for AnnotationElement {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.name, &other.name).then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for AnnotationElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Collect elements into a set, rejecting repeated element names
fn collect_elements(
    ty: &str,
    elements: impl IntoIterator<Item = AnnotationElement>,
) -> Result<BTreeSet<AnnotationElement>> {
    let mut set = BTreeSet::new();
    for element in elements {
        if set.iter().any(|e: &AnnotationElement| e.name == element.name) {
            return Err(invalid_argument!(
                "Annotation {} has more than one element named '{}'",
                ty,
                element.name
            ));
        }
        set.insert(element);
    }
    Ok(set)
}

/// An annotation nested in an encoded value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedAnnotation {
    /// Annotation type descriptor
    pub ty: String,
    /// Elements, ordered by name
    pub elements: BTreeSet<AnnotationElement>,
}

impl EncodedAnnotation {
    /// Create a new encoded annotation.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if two elements share a name.
    pub fn new(
        ty: impl Into<String>,
        elements: impl IntoIterator<Item = AnnotationElement>,
    ) -> Result<Self> {
        let ty = ty.into();
        let elements = collect_elements(&ty, elements)?;
        Ok(EncodedAnnotation { ty, elements })
    }
}

impl Ord for EncodedAnnotation {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.ty, &other.ty).then_with(|| self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for EncodedAnnotation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An annotation attached to a class, member or parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    /// When the annotation is visible
    pub visibility: AnnotationVisibility,
    /// Annotation type descriptor
    pub ty: String,
    /// Elements, ordered by name
    pub elements: BTreeSet<AnnotationElement>,
}

impl Annotation {
    /// Create a new annotation.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if two elements share a name.
    pub fn new(
        visibility: AnnotationVisibility,
        ty: impl Into<String>,
        elements: impl IntoIterator<Item = AnnotationElement>,
    ) -> Result<Self> {
        let ty = ty.into();
        let elements = collect_elements(&ty, elements)?;
        Ok(Annotation {
            visibility,
            ty,
            elements,
        })
    }
}

impl Ord for Annotation {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.ty, &other.ty)
            .then_with(|| self.visibility.cmp(&other.visibility))
            .then_with(|| self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Annotation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_element_names_rejected() {
        let result = Annotation::new(
            AnnotationVisibility::Runtime,
            "LAnno;",
            [
                AnnotationElement::new("value", EncodedValue::Int(1)),
                AnnotationElement::new("value", EncodedValue::Int(2)),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn elements_sorted_by_name() {
        let annotation = EncodedAnnotation::new(
            "LAnno;",
            [
                AnnotationElement::new("b", EncodedValue::Int(1)),
                AnnotationElement::new("a", EncodedValue::Null),
            ],
        )
        .unwrap();
        let names: Vec<_> = annotation.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn set_orders_by_type() {
        let mut set = AnnotationSet::new();
        set.insert(Annotation::new(AnnotationVisibility::Build, "LZ;", []).unwrap());
        set.insert(Annotation::new(AnnotationVisibility::System, "LA;", []).unwrap());
        let types: Vec<_> = set.iter().map(|a| a.ty.as_str()).collect();
        assert_eq!(types, vec!["LA;", "LZ;"]);
    }
}
