//! Encoded values.
//!
//! An `encoded_value` is any constant DEX can store outside of code: static field
//! initializers, annotation element values and the entries of encoded arrays.
//!
//! # Key Types
//! - [`EncodedValue`]: tagged union over all value kinds
//! - [`ValueType`]: the `value_type` tag written in front of each value
//!
//! # Ordering
//!
//! Values are totally ordered: first by their [`ValueType`] tag, then by payload.
//! Floating point payloads are compared by [`f32::total_cmp`]/[`f64::total_cmp`] and tested
//! for equality by raw bits, so the order is consistent with `Eq` and `Hash` and values can
//! live in ordered sets.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use strum::{Display, EnumIter};

use crate::{
    model::{
        annotation::EncodedAnnotation,
        reference::{FieldReference, MethodReference},
        types::utf16_cmp,
    },
    Result,
};

/// The `value_type` tag of an encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum ValueType {
    /// Signed one-byte integer
    Byte = 0x00,
    /// Signed two-byte integer
    Short = 0x02,
    /// Unsigned two-byte integer
    Char = 0x03,
    /// Signed four-byte integer
    Int = 0x04,
    /// Signed eight-byte integer
    Long = 0x06,
    /// IEEE754 32-bit float
    Float = 0x10,
    /// IEEE754 64-bit float
    Double = 0x11,
    /// Index into `string_ids`
    String = 0x17,
    /// Index into `type_ids`
    Type = 0x18,
    /// Index into `field_ids`
    Field = 0x19,
    /// Index into `method_ids`
    Method = 0x1a,
    /// Index into `field_ids` naming an enum constant
    Enum = 0x1b,
    /// Nested `encoded_array`
    Array = 0x1c,
    /// Nested `encoded_annotation`
    Annotation = 0x1d,
    /// The `null` reference
    Null = 0x1e,
    /// One-bit boolean
    Boolean = 0x1f,
}

impl ValueType {
    /// Raw tag value
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// A constant value as stored in an `encoded_value`
#[derive(Debug, Clone)]
pub enum EncodedValue {
    /// Signed byte
    Byte(i8),
    /// Signed short
    Short(i16),
    /// UTF-16 code unit
    Char(u16),
    /// Signed int
    Int(i32),
    /// Signed long
    Long(i64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// String constant
    String(String),
    /// Type descriptor
    Type(String),
    /// Field reference
    Field(FieldReference),
    /// Method reference
    Method(MethodReference),
    /// Enum constant (field of the enum class)
    Enum(FieldReference),
    /// Array of values
    Array(Vec<EncodedValue>),
    /// Sub-annotation
    Annotation(EncodedAnnotation),
    /// `null`
    Null,
    /// Boolean
    Boolean(bool),
}

impl EncodedValue {
    /// The `value_type` tag of this value
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            EncodedValue::Byte(_) => ValueType::Byte,
            EncodedValue::Short(_) => ValueType::Short,
            EncodedValue::Char(_) => ValueType::Char,
            EncodedValue::Int(_) => ValueType::Int,
            EncodedValue::Long(_) => ValueType::Long,
            EncodedValue::Float(_) => ValueType::Float,
            EncodedValue::Double(_) => ValueType::Double,
            EncodedValue::String(_) => ValueType::String,
            EncodedValue::Type(_) => ValueType::Type,
            EncodedValue::Field(_) => ValueType::Field,
            EncodedValue::Method(_) => ValueType::Method,
            EncodedValue::Enum(_) => ValueType::Enum,
            EncodedValue::Array(_) => ValueType::Array,
            EncodedValue::Annotation(_) => ValueType::Annotation,
            EncodedValue::Null => ValueType::Null,
            EncodedValue::Boolean(_) => ValueType::Boolean,
        }
    }

    /// The value a field of the given type holds when it has no explicit initializer.
    ///
    /// Primitives default to zero / `false`, reference and array types to `null`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for `V` and malformed descriptors.
    pub fn default_for_type(descriptor: &str) -> Result<EncodedValue> {
        match descriptor.as_bytes().first() {
            Some(b'Z') => Ok(EncodedValue::Boolean(false)),
            Some(b'B') => Ok(EncodedValue::Byte(0)),
            Some(b'S') => Ok(EncodedValue::Short(0)),
            Some(b'C') => Ok(EncodedValue::Char(0)),
            Some(b'I') => Ok(EncodedValue::Int(0)),
            Some(b'J') => Ok(EncodedValue::Long(0)),
            Some(b'F') => Ok(EncodedValue::Float(0.0)),
            Some(b'D') => Ok(EncodedValue::Double(0.0)),
            Some(b'L' | b'[') => Ok(EncodedValue::Null),
            _ => Err(invalid_argument!(
                "Type '{}' has no default value",
                descriptor
            )),
        }
    }

    /// Returns `true` if this value equals the default value of its kind.
    ///
    /// Floating point values are only default when all bits are zero, so `-0.0` is an
    /// explicit initializer.
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            EncodedValue::Byte(v) => *v == 0,
            EncodedValue::Short(v) => *v == 0,
            EncodedValue::Char(v) => *v == 0,
            EncodedValue::Int(v) => *v == 0,
            EncodedValue::Long(v) => *v == 0,
            EncodedValue::Float(v) => v.to_bits() == 0,
            EncodedValue::Double(v) => v.to_bits() == 0,
            EncodedValue::Boolean(v) => !*v,
            EncodedValue::Null => true,
            EncodedValue::String(_)
            | EncodedValue::Type(_)
            | EncodedValue::Field(_)
            | EncodedValue::Method(_)
            | EncodedValue::Enum(_)
            | EncodedValue::Array(_)
            | EncodedValue::Annotation(_) => false,
        }
    }
}

impl PartialEq for EncodedValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EncodedValue {}

impl Ord for EncodedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (EncodedValue::Byte(l), EncodedValue::Byte(r)) => l.cmp(r),
            (EncodedValue::Short(l), EncodedValue::Short(r)) => l.cmp(r),
            (EncodedValue::Char(l), EncodedValue::Char(r)) => l.cmp(r),
            (EncodedValue::Int(l), EncodedValue::Int(r)) => l.cmp(r),
            (EncodedValue::Long(l), EncodedValue::Long(r)) => l.cmp(r),
            (EncodedValue::Float(l), EncodedValue::Float(r)) => l.total_cmp(r),
            (EncodedValue::Double(l), EncodedValue::Double(r)) => l.total_cmp(r),
            (EncodedValue::String(l), EncodedValue::String(r))
            | (EncodedValue::Type(l), EncodedValue::Type(r)) => utf16_cmp(l, r),
            (EncodedValue::Field(l), EncodedValue::Field(r))
            | (EncodedValue::Enum(l), EncodedValue::Enum(r)) => l.cmp(r),
            (EncodedValue::Method(l), EncodedValue::Method(r)) => l.cmp(r),
            (EncodedValue::Array(l), EncodedValue::Array(r)) => l.cmp(r),
            (EncodedValue::Annotation(l), EncodedValue::Annotation(r)) => l.cmp(r),
            (EncodedValue::Null, EncodedValue::Null) => Ordering::Equal,
            (EncodedValue::Boolean(l), EncodedValue::Boolean(r)) => l.cmp(r),
            _ => self.value_type().cmp(&other.value_type()),
        }
    }
}

impl PartialOrd for EncodedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for EncodedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type().hash(state);
        match self {
            EncodedValue::Byte(v) => v.hash(state),
            EncodedValue::Short(v) => v.hash(state),
            EncodedValue::Char(v) => v.hash(state),
            EncodedValue::Int(v) => v.hash(state),
            EncodedValue::Long(v) => v.hash(state),
            EncodedValue::Float(v) => v.to_bits().hash(state),
            EncodedValue::Double(v) => v.to_bits().hash(state),
            EncodedValue::String(v) | EncodedValue::Type(v) => v.hash(state),
            EncodedValue::Field(v) | EncodedValue::Enum(v) => v.hash(state),
            EncodedValue::Method(v) => v.hash(state),
            EncodedValue::Array(v) => v.hash(state),
            EncodedValue::Annotation(v) => v.hash(state),
            EncodedValue::Null => {}
            EncodedValue::Boolean(v) => v.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn defaults_per_type() {
        assert_eq!(
            EncodedValue::default_for_type("Z").unwrap(),
            EncodedValue::Boolean(false)
        );
        assert_eq!(
            EncodedValue::default_for_type("J").unwrap(),
            EncodedValue::Long(0)
        );
        assert_eq!(
            EncodedValue::default_for_type("[I").unwrap(),
            EncodedValue::Null
        );
        assert_eq!(
            EncodedValue::default_for_type("Ljava/lang/String;").unwrap(),
            EncodedValue::Null
        );
        assert!(EncodedValue::default_for_type("V").is_err());
        assert!(EncodedValue::default_for_type("").is_err());
    }

    #[test]
    fn default_detection() {
        assert!(EncodedValue::Int(0).is_default());
        assert!(!EncodedValue::Int(1).is_default());
        assert!(EncodedValue::Float(0.0).is_default());
        assert!(!EncodedValue::Float(-0.0).is_default());
        assert!(!EncodedValue::String(String::new()).is_default());
        assert!(!EncodedValue::Array(vec![]).is_default());
        assert!(EncodedValue::Null.is_default());
    }

    #[test]
    fn float_equality_uses_bits() {
        assert_ne!(EncodedValue::Double(0.0), EncodedValue::Double(-0.0));
        assert_eq!(
            EncodedValue::Float(f32::NAN),
            EncodedValue::Float(f32::NAN)
        );
    }

    #[test]
    fn order_by_tag_then_payload() {
        let values: BTreeSet<EncodedValue> = [
            EncodedValue::Boolean(true),
            EncodedValue::Int(5),
            EncodedValue::Byte(7),
            EncodedValue::Int(-1),
            EncodedValue::Null,
        ]
        .into_iter()
        .collect();

        let ordered: Vec<_> = values.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                EncodedValue::Byte(7),
                EncodedValue::Int(-1),
                EncodedValue::Int(5),
                EncodedValue::Null,
                EncodedValue::Boolean(true),
            ]
        );
    }
}
