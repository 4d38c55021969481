//! References to constant pool items.
//!
//! Instructions, encoded values and debug items point at strings, types, fields, methods and
//! prototypes. In the immutable model a reference carries its full textual key; a construction
//! session later replaces it by the canonical pool entry (see [`crate::builder::BuilderReference`]).
//!
//! # Key Types
//! - [`Reference`]: tagged union of all reference kinds an instruction may carry
//! - [`ReferenceKind`]: the kind discriminant, also used by the opcode table
//! - [`FieldReference`], [`MethodReference`], [`MethodProtoReference`]
//! - [`MethodHandleReference`], [`CallSiteReference`]: DEX 038 constants, modelled but not
//!   internable

use std::{cmp::Ordering, fmt};

use strum::{Display, EnumCount, EnumIter};

use crate::model::{types::utf16_cmp, value::EncodedValue};

/// Lexicographic order over two descriptor lists using the DEX string order
pub(crate) fn cmp_type_lists<S: AsRef<str>>(left: &[S], right: &[S]) -> Ordering {
    for (l, r) in left.iter().zip(right.iter()) {
        match utf16_cmp(l.as_ref(), r.as_ref()) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    left.len().cmp(&right.len())
}

/// Kind of an item referenced by an instruction or value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum ReferenceKind {
    /// `string_id_item`
    String,
    /// `type_id_item`
    Type,
    /// `field_id_item`
    Field,
    /// `method_id_item`
    Method,
    /// `proto_id_item`
    MethodProto,
    /// `method_handle_item`
    MethodHandle,
    /// `call_site_id_item`
    CallSite,
}

/// A field identified by defining class, name and type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldReference {
    /// Descriptor of the class declaring the field
    pub defining_class: String,
    /// Simple name of the field
    pub name: String,
    /// Type descriptor of the field
    pub ty: String,
}

impl FieldReference {
    /// Create a new field reference
    pub fn new(
        defining_class: impl Into<String>,
        name: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        FieldReference {
            defining_class: defining_class.into(),
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl Ord for FieldReference {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.defining_class, &other.defining_class)
            .then_with(|| utf16_cmp(&self.name, &other.name))
            .then_with(|| utf16_cmp(&self.ty, &other.ty))
    }
}

impl PartialOrd for FieldReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.defining_class, self.name, self.ty)
    }
}

/// A method prototype: parameter types and return type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodProtoReference {
    /// Parameter type descriptors, in declaration order
    pub parameter_types: Vec<String>,
    /// Return type descriptor
    pub return_type: String,
}

impl MethodProtoReference {
    /// Create a new prototype reference
    pub fn new(parameter_types: Vec<String>, return_type: impl Into<String>) -> Self {
        MethodProtoReference {
            parameter_types,
            return_type: return_type.into(),
        }
    }
}

impl Ord for MethodProtoReference {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.return_type, &other.return_type)
            .then_with(|| cmp_type_lists(&self.parameter_types, &other.parameter_types))
    }
}

impl PartialOrd for MethodProtoReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MethodProtoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}){}",
            self.parameter_types.concat(),
            self.return_type
        )
    }
}

/// A method identified by defining class, name and prototype
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodReference {
    /// Descriptor of the class declaring the method
    pub defining_class: String,
    /// Simple name of the method
    pub name: String,
    /// Parameter type descriptors, in declaration order
    pub parameter_types: Vec<String>,
    /// Return type descriptor
    pub return_type: String,
}

impl MethodReference {
    /// Create a new method reference
    pub fn new(
        defining_class: impl Into<String>,
        name: impl Into<String>,
        parameter_types: Vec<String>,
        return_type: impl Into<String>,
    ) -> Self {
        MethodReference {
            defining_class: defining_class.into(),
            name: name.into(),
            parameter_types,
            return_type: return_type.into(),
        }
    }

    /// The prototype part of this reference
    #[must_use]
    pub fn proto(&self) -> MethodProtoReference {
        MethodProtoReference::new(self.parameter_types.clone(), self.return_type.clone())
    }
}

impl Ord for MethodReference {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.defining_class, &other.defining_class)
            .then_with(|| utf16_cmp(&self.name, &other.name))
            .then_with(|| utf16_cmp(&self.return_type, &other.return_type))
            .then_with(|| cmp_type_lists(&self.parameter_types, &other.parameter_types))
    }
}

impl PartialOrd for MethodReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}({}){}",
            self.defining_class,
            self.name,
            self.parameter_types.concat(),
            self.return_type
        )
    }
}

/// Kind of a method handle (`method_handle_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum MethodHandleKind {
    /// Static field setter
    StaticPut = 0x00,
    /// Static field getter
    StaticGet = 0x01,
    /// Instance field setter
    InstancePut = 0x02,
    /// Instance field getter
    InstanceGet = 0x03,
    /// Static method invoker
    InvokeStatic = 0x04,
    /// Instance method invoker
    InvokeInstance = 0x05,
    /// Constructor invoker
    InvokeConstructor = 0x06,
    /// Direct method invoker
    InvokeDirect = 0x07,
    /// Interface method invoker
    InvokeInterface = 0x08,
}

/// Target of a method handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodHandleMember {
    /// Field accessor target
    Field(FieldReference),
    /// Method invoker target
    Method(MethodReference),
}

/// A `method_handle_item`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodHandleReference {
    /// Handle kind
    pub kind: MethodHandleKind,
    /// Field or method the handle operates on
    pub member: MethodHandleMember,
}

/// A `call_site_id_item`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSiteReference {
    /// Unique name of the call site
    pub name: String,
    /// Bootstrap linker method handle
    pub method_handle: MethodHandleReference,
    /// Name of the method to link
    pub method_name: String,
    /// Prototype of the method to link
    pub method_proto: MethodProtoReference,
    /// Additional bootstrap arguments
    pub extra_arguments: Vec<EncodedValue>,
}

/// Any item an instruction can reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    /// A string constant
    String(String),
    /// A type descriptor
    Type(String),
    /// A field
    Field(FieldReference),
    /// A method
    Method(MethodReference),
    /// A method prototype
    MethodProto(MethodProtoReference),
    /// A method handle
    MethodHandle(MethodHandleReference),
    /// A call site
    CallSite(CallSiteReference),
}

impl Reference {
    /// The kind of this reference
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Reference::String(_) => ReferenceKind::String,
            Reference::Type(_) => ReferenceKind::Type,
            Reference::Field(_) => ReferenceKind::Field,
            Reference::Method(_) => ReferenceKind::Method,
            Reference::MethodProto(_) => ReferenceKind::MethodProto,
            Reference::MethodHandle(_) => ReferenceKind::MethodHandle,
            Reference::CallSite(_) => ReferenceKind::CallSite,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::String(value) => write!(f, "{value:?}"),
            Reference::Type(value) => write!(f, "{value}"),
            Reference::Field(field) => write!(f, "{field}"),
            Reference::Method(method) => write!(f, "{method}"),
            Reference::MethodProto(proto) => write!(f, "{proto}"),
            Reference::MethodHandle(handle) => write!(f, "method-handle {}", handle.kind),
            Reference::CallSite(site) => write!(f, "call-site {}", site.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_is_class_name_type() {
        let a = FieldReference::new("LA;", "x", "I");
        let b = FieldReference::new("LA;", "x", "J");
        let c = FieldReference::new("LA;", "y", "B");
        let d = FieldReference::new("LB;", "a", "B");
        let mut fields = vec![d.clone(), c.clone(), b.clone(), a.clone()];
        fields.sort();
        assert_eq!(fields, vec![a, b, c, d]);
    }

    #[test]
    fn method_order_follows_proto_order() {
        let short = MethodReference::new("LA;", "m", vec!["I".into()], "Z");
        let long = MethodReference::new("LA;", "m", vec!["I".into(), "I".into()], "B");
        assert!(long < short);

        let same_return = MethodReference::new("LA;", "m", vec!["I".into(), "I".into()], "Z");
        assert!(short < same_return);
        assert_eq!(
            short.cmp(&same_return),
            short.proto().cmp(&same_return.proto())
        );
    }

    #[test]
    fn proto_order_compares_return_first() {
        let a = MethodProtoReference::new(vec!["Z".into()], "I");
        let b = MethodProtoReference::new(vec![], "J");
        assert!(a < b);
    }

    #[test]
    fn display_forms() {
        let method = MethodReference::new("LA;", "m", vec!["I".into(), "J".into()], "V");
        assert_eq!(method.to_string(), "LA;->m(IJ)V");
        assert_eq!(
            Reference::Field(FieldReference::new("LA;", "f", "I")).to_string(),
            "LA;->f:I"
        );
        assert_eq!(Reference::String("x".into()).kind(), ReferenceKind::String);
    }
}
