//! Encoded values whose references point into the session pools.

use crate::{
    builder::refs::{BuilderFieldRefRc, BuilderMethodRefRc, BuilderStringRc, BuilderTypeRc},
    model::{AnnotationElement, EncodedAnnotation, EncodedValue, ValueType},
    Result,
};

/// A `name = value` element with an interned name
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderAnnotationElement {
    /// Element name
    pub name: BuilderStringRc,
    /// Element value
    pub value: BuilderEncodedValue,
}

impl BuilderAnnotationElement {
    /// Convert back to the model element
    #[must_use]
    pub fn to_immutable(&self) -> AnnotationElement {
        AnnotationElement::new(self.name.as_str(), self.value.to_immutable())
    }
}

/// An annotation nested inside an encoded value
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderEncodedAnnotation {
    /// Annotation type
    pub ty: BuilderTypeRc,
    /// Elements, ordered by name
    pub elements: Vec<BuilderAnnotationElement>,
}

impl BuilderEncodedAnnotation {
    /// Convert back to the model annotation
    #[must_use]
    pub fn to_immutable(&self) -> EncodedAnnotation {
        EncodedAnnotation {
            ty: self.ty.as_str().to_string(),
            elements: self
                .elements
                .iter()
                .map(BuilderAnnotationElement::to_immutable)
                .collect(),
        }
    }
}

/// An encoded value holding canonical pool references
#[derive(Debug, Clone)]
pub enum BuilderEncodedValue {
    /// `VALUE_BYTE`
    Byte(i8),
    /// `VALUE_SHORT`
    Short(i16),
    /// `VALUE_CHAR`
    Char(u16),
    /// `VALUE_INT`
    Int(i32),
    /// `VALUE_LONG`
    Long(i64),
    /// `VALUE_FLOAT`
    Float(f32),
    /// `VALUE_DOUBLE`
    Double(f64),
    /// `VALUE_STRING`
    String(BuilderStringRc),
    /// `VALUE_TYPE`
    Type(BuilderTypeRc),
    /// `VALUE_FIELD`
    Field(BuilderFieldRefRc),
    /// `VALUE_METHOD`
    Method(BuilderMethodRefRc),
    /// `VALUE_ENUM`
    Enum(BuilderFieldRefRc),
    /// `VALUE_ARRAY`
    Array(Vec<BuilderEncodedValue>),
    /// `VALUE_ANNOTATION`
    Annotation(BuilderEncodedAnnotation),
    /// `VALUE_NULL`
    Null,
    /// `VALUE_BOOLEAN`
    Boolean(bool),
}

impl BuilderEncodedValue {
    /// The `value_type` tag of this value
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            BuilderEncodedValue::Byte(_) => ValueType::Byte,
            BuilderEncodedValue::Short(_) => ValueType::Short,
            BuilderEncodedValue::Char(_) => ValueType::Char,
            BuilderEncodedValue::Int(_) => ValueType::Int,
            BuilderEncodedValue::Long(_) => ValueType::Long,
            BuilderEncodedValue::Float(_) => ValueType::Float,
            BuilderEncodedValue::Double(_) => ValueType::Double,
            BuilderEncodedValue::String(_) => ValueType::String,
            BuilderEncodedValue::Type(_) => ValueType::Type,
            BuilderEncodedValue::Field(_) => ValueType::Field,
            BuilderEncodedValue::Method(_) => ValueType::Method,
            BuilderEncodedValue::Enum(_) => ValueType::Enum,
            BuilderEncodedValue::Array(_) => ValueType::Array,
            BuilderEncodedValue::Annotation(_) => ValueType::Annotation,
            BuilderEncodedValue::Null => ValueType::Null,
            BuilderEncodedValue::Boolean(_) => ValueType::Boolean,
        }
    }

    /// Default value of a field type, see [`EncodedValue::default_for_type`]
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for `V` and malformed descriptors.
    pub fn default_for_type(descriptor: &str) -> Result<BuilderEncodedValue> {
        Ok(match EncodedValue::default_for_type(descriptor)? {
            EncodedValue::Boolean(v) => BuilderEncodedValue::Boolean(v),
            EncodedValue::Byte(v) => BuilderEncodedValue::Byte(v),
            EncodedValue::Short(v) => BuilderEncodedValue::Short(v),
            EncodedValue::Char(v) => BuilderEncodedValue::Char(v),
            EncodedValue::Int(v) => BuilderEncodedValue::Int(v),
            EncodedValue::Long(v) => BuilderEncodedValue::Long(v),
            EncodedValue::Float(v) => BuilderEncodedValue::Float(v),
            EncodedValue::Double(v) => BuilderEncodedValue::Double(v),
            _ => BuilderEncodedValue::Null,
        })
    }

    /// Returns `true` if this is the default value of its kind (bitwise zero for floats)
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            BuilderEncodedValue::Byte(v) => *v == 0,
            BuilderEncodedValue::Short(v) => *v == 0,
            BuilderEncodedValue::Char(v) => *v == 0,
            BuilderEncodedValue::Int(v) => *v == 0,
            BuilderEncodedValue::Long(v) => *v == 0,
            BuilderEncodedValue::Float(v) => v.to_bits() == 0,
            BuilderEncodedValue::Double(v) => v.to_bits() == 0,
            BuilderEncodedValue::Boolean(v) => !*v,
            BuilderEncodedValue::Null => true,
            BuilderEncodedValue::String(_)
            | BuilderEncodedValue::Type(_)
            | BuilderEncodedValue::Field(_)
            | BuilderEncodedValue::Method(_)
            | BuilderEncodedValue::Enum(_)
            | BuilderEncodedValue::Array(_)
            | BuilderEncodedValue::Annotation(_) => false,
        }
    }

    /// Convert back to the model value
    #[must_use]
    pub fn to_immutable(&self) -> EncodedValue {
        match self {
            BuilderEncodedValue::Byte(v) => EncodedValue::Byte(*v),
            BuilderEncodedValue::Short(v) => EncodedValue::Short(*v),
            BuilderEncodedValue::Char(v) => EncodedValue::Char(*v),
            BuilderEncodedValue::Int(v) => EncodedValue::Int(*v),
            BuilderEncodedValue::Long(v) => EncodedValue::Long(*v),
            BuilderEncodedValue::Float(v) => EncodedValue::Float(*v),
            BuilderEncodedValue::Double(v) => EncodedValue::Double(*v),
            BuilderEncodedValue::String(s) => EncodedValue::String(s.as_str().to_string()),
            BuilderEncodedValue::Type(t) => EncodedValue::Type(t.as_str().to_string()),
            BuilderEncodedValue::Field(f) => EncodedValue::Field(f.to_immutable()),
            BuilderEncodedValue::Method(m) => EncodedValue::Method(m.to_immutable()),
            BuilderEncodedValue::Enum(f) => EncodedValue::Enum(f.to_immutable()),
            BuilderEncodedValue::Array(values) => {
                EncodedValue::Array(values.iter().map(Self::to_immutable).collect())
            }
            BuilderEncodedValue::Annotation(a) => EncodedValue::Annotation(a.to_immutable()),
            BuilderEncodedValue::Null => EncodedValue::Null,
            BuilderEncodedValue::Boolean(v) => EncodedValue::Boolean(*v),
        }
    }
}

impl PartialEq for BuilderEncodedValue {
    fn eq(&self, other: &Self) -> bool {
        self.to_immutable() == other.to_immutable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert!(BuilderEncodedValue::default_for_type("J").unwrap().is_default());
        assert!(matches!(
            BuilderEncodedValue::default_for_type("[I").unwrap(),
            BuilderEncodedValue::Null
        ));
        assert!(!BuilderEncodedValue::Double(-0.0).is_default());
        assert!(!BuilderEncodedValue::Boolean(true).is_default());
        assert!(BuilderEncodedValue::default_for_type("V").is_err());
    }

    #[test]
    fn composite_values_are_never_default() {
        let builder = crate::DexBuilder::new();
        assert!(!BuilderEncodedValue::String(builder.intern_string("")).is_default());
        assert!(!BuilderEncodedValue::Array(vec![]).is_default());
        assert!(!BuilderEncodedValue::Type(builder.intern_type("I").unwrap()).is_default());
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(
            BuilderEncodedValue::Float(f32::NAN),
            BuilderEncodedValue::Float(f32::NAN)
        );
    }
}
