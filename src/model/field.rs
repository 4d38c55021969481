//! Field definitions.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use crate::model::{
    annotation::AnnotationSet, flags::AccessFlags, reference::FieldReference, types::utf16_cmp,
    value::EncodedValue,
};

/// A field declared by a class.
///
/// Equality, hashing and ordering only look at the descriptor (defining class, name, type), the
/// identity a field has inside a DEX file. Two fields of one class never share a descriptor.
#[derive(Debug, Clone)]
pub struct Field {
    /// Descriptor of the declaring class
    pub defining_class: String,
    /// Field name
    pub name: String,
    /// Field type descriptor
    pub ty: String,
    /// Raw `access_flags`
    pub access_flags: u32,
    /// Static initial value, if any
    pub initial_value: Option<EncodedValue>,
    /// Annotations attached to the field
    pub annotations: AnnotationSet,
}

impl Field {
    /// Create a new field
    pub fn new(
        defining_class: impl Into<String>,
        name: impl Into<String>,
        ty: impl Into<String>,
        access_flags: u32,
        initial_value: Option<EncodedValue>,
        annotations: AnnotationSet,
    ) -> Self {
        Field {
            defining_class: defining_class.into(),
            name: name.into(),
            ty: ty.into(),
            access_flags,
            initial_value,
            annotations,
        }
    }

    /// Typed view of `access_flags`
    #[must_use]
    pub fn flags(&self) -> AccessFlags {
        AccessFlags::from_bits_retain(self.access_flags)
    }

    /// Returns `true` for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags().contains(AccessFlags::STATIC)
    }

    /// The reference identifying this field
    #[must_use]
    pub fn reference(&self) -> FieldReference {
        FieldReference::new(&self.defining_class, &self.name, &self.ty)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.defining_class == other.defining_class
            && self.name == other.name
            && self.ty == other.ty
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defining_class.hash(state);
        self.name.hash(state);
        self.ty.hash(state);
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.defining_class, &other.defining_class)
            .then_with(|| utf16_cmp(&self.name, &other.name))
            .then_with(|| utf16_cmp(&self.ty, &other.ty))
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_name_then_type() {
        let a = Field::new("LA;", "a", "J", 0, None, AnnotationSet::new());
        let b_int = Field::new("LA;", "b", "I", 0, None, AnnotationSet::new());
        let b_obj = Field::new("LA;", "b", "Ljava/lang/Object;", 0, None, AnnotationSet::new());

        let mut fields = vec![b_obj.clone(), a.clone(), b_int.clone()];
        fields.sort();
        assert_eq!(fields, vec![a, b_int, b_obj]);
    }

    #[test]
    fn equality_ignores_attributes() {
        let plain = Field::new("LA;", "x", "I", 0, None, AnnotationSet::new());
        let flagged = Field::new(
            "LA;",
            "x",
            "I",
            AccessFlags::STATIC.bits(),
            Some(EncodedValue::Int(3)),
            AnnotationSet::new(),
        );
        assert_eq!(plain, flagged);
        assert_eq!(plain.cmp(&flagged), Ordering::Equal);
        assert!(flagged.is_static());
    }
}
