//! Builder references.
//!
//! A builder reference is the canonical, session-scoped stand-in for one interned value. Pools
//! hand out `Arc`s to these structs; two equal keys interned through the same
//! [`crate::DexBuilder`] always yield the same allocation, so identity can be checked with
//! [`Arc::ptr_eq`].
//!
//! Equality, hashing and ordering only look at the semantic key. The ordering is the one the
//! DEX format mandates for the corresponding id section:
//!
//! | Reference | Order |
//! |-----------|-------|
//! | string    | UTF-16 code units |
//! | type      | descriptor string |
//! | proto     | return type, then parameter list |
//! | field     | defining class, name, type |
//! | method    | defining class, name, proto |
//!
//! Assigned indices and offsets are not stored here; see [`crate::builder::slots`].

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    builder::slots::SlotId,
    model::{
        cmp_type_lists, utf16_cmp, FieldReference, MethodProtoReference, MethodReference,
        Reference, ReferenceKind, ReferenceKindOf,
    },
};

/// Reference counted [`BuilderString`]
pub type BuilderStringRc = Arc<BuilderString>;
/// Reference counted [`BuilderType`]
pub type BuilderTypeRc = Arc<BuilderType>;
/// Reference counted [`BuilderTypeList`]
pub type BuilderTypeListRc = Arc<BuilderTypeList>;
/// Reference counted [`BuilderProto`]
pub type BuilderProtoRc = Arc<BuilderProto>;
/// Reference counted [`BuilderFieldRef`]
pub type BuilderFieldRefRc = Arc<BuilderFieldRef>;
/// Reference counted [`BuilderMethodRef`]
pub type BuilderMethodRefRc = Arc<BuilderMethodRef>;

macro_rules! keyed_by {
    ($ty:ty, |$a:ident, $b:ident| $cmp:expr, |$h:ident, $state:ident| $hash:expr) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }

        impl Eq for $ty {}

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                let $a = self;
                let $b = other;
                $cmp
            }
        }

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, $state: &mut H) {
                let $h = self;
                $hash
            }
        }
    };
}

/// An interned string (`string_id_item`)
#[derive(Debug)]
pub struct BuilderString {
    pub(crate) value: String,
    pub(crate) slot: SlotId,
}

impl BuilderString {
    /// The string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

keyed_by!(BuilderString, |a, b| utf16_cmp(&a.value, &b.value), |s, state| s.value.hash(state));

impl fmt::Display for BuilderString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// An interned type (`type_id_item`)
#[derive(Debug)]
pub struct BuilderType {
    pub(crate) descriptor: BuilderStringRc,
    pub(crate) slot: SlotId,
}

impl BuilderType {
    /// The descriptor string reference
    #[must_use]
    pub fn descriptor(&self) -> &BuilderStringRc {
        &self.descriptor
    }

    /// The descriptor as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.descriptor.as_str()
    }
}

keyed_by!(BuilderType, |a, b| a.descriptor.cmp(&b.descriptor), |t, state| t
    .descriptor
    .hash(state));

impl fmt::Display for BuilderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interned ordered list of types (`type_list`)
#[derive(Debug)]
pub struct BuilderTypeList {
    pub(crate) types: Vec<BuilderTypeRc>,
    pub(crate) slot: SlotId,
}

impl BuilderTypeList {
    /// Types in list order
    #[must_use]
    pub fn types(&self) -> &[BuilderTypeRc] {
        &self.types
    }

    /// Returns `true` for the empty list, which is never written to the file
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptors in list order
    #[must_use]
    pub fn descriptors(&self) -> Vec<String> {
        self.types.iter().map(|t| t.as_str().to_string()).collect()
    }
}

keyed_by!(
    BuilderTypeList,
    |a, b| cmp_type_lists(
        &a.types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        &b.types.iter().map(|t| t.as_str()).collect::<Vec<_>>()
    ),
    |l, state| l.types.hash(state)
);

/// An interned method prototype (`proto_id_item`)
#[derive(Debug)]
pub struct BuilderProto {
    pub(crate) shorty: BuilderStringRc,
    pub(crate) parameters: BuilderTypeListRc,
    pub(crate) return_type: BuilderTypeRc,
    pub(crate) slot: SlotId,
}

impl BuilderProto {
    /// Short-form descriptor
    #[must_use]
    pub fn shorty(&self) -> &BuilderStringRc {
        &self.shorty
    }

    /// Parameter type list
    #[must_use]
    pub fn parameters(&self) -> &BuilderTypeListRc {
        &self.parameters
    }

    /// Return type
    #[must_use]
    pub fn return_type(&self) -> &BuilderTypeRc {
        &self.return_type
    }

    /// Convert back to the model reference
    #[must_use]
    pub fn to_immutable(&self) -> MethodProtoReference {
        MethodProtoReference::new(self.parameters.descriptors(), self.return_type.as_str())
    }
}

keyed_by!(
    BuilderProto,
    |a, b| a
        .return_type
        .cmp(&b.return_type)
        .then_with(|| a.parameters.cmp(&b.parameters)),
    |p, state| {
        p.return_type.hash(state);
        p.parameters.hash(state);
    }
);

impl fmt::Display for BuilderProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_immutable())
    }
}

/// An interned field reference (`field_id_item`)
#[derive(Debug)]
pub struct BuilderFieldRef {
    pub(crate) defining_class: BuilderTypeRc,
    pub(crate) name: BuilderStringRc,
    pub(crate) ty: BuilderTypeRc,
    pub(crate) slot: SlotId,
}

impl BuilderFieldRef {
    /// Declaring class
    #[must_use]
    pub fn defining_class(&self) -> &BuilderTypeRc {
        &self.defining_class
    }

    /// Field name
    #[must_use]
    pub fn name(&self) -> &BuilderStringRc {
        &self.name
    }

    /// Field type
    #[must_use]
    pub fn ty(&self) -> &BuilderTypeRc {
        &self.ty
    }

    /// Convert back to the model reference
    #[must_use]
    pub fn to_immutable(&self) -> FieldReference {
        FieldReference::new(
            self.defining_class.as_str(),
            self.name.as_str(),
            self.ty.as_str(),
        )
    }
}

keyed_by!(
    BuilderFieldRef,
    |a, b| a
        .defining_class
        .cmp(&b.defining_class)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.ty.cmp(&b.ty)),
    |r, state| {
        r.defining_class.hash(state);
        r.name.hash(state);
        r.ty.hash(state);
    }
);

impl fmt::Display for BuilderFieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.defining_class, self.name, self.ty)
    }
}

/// An interned method reference (`method_id_item`)
#[derive(Debug)]
pub struct BuilderMethodRef {
    pub(crate) defining_class: BuilderTypeRc,
    pub(crate) name: BuilderStringRc,
    pub(crate) proto: BuilderProtoRc,
    pub(crate) slot: SlotId,
}

impl BuilderMethodRef {
    /// Declaring class
    #[must_use]
    pub fn defining_class(&self) -> &BuilderTypeRc {
        &self.defining_class
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &BuilderStringRc {
        &self.name
    }

    /// Prototype
    #[must_use]
    pub fn proto(&self) -> &BuilderProtoRc {
        &self.proto
    }

    /// Convert back to the model reference
    #[must_use]
    pub fn to_immutable(&self) -> MethodReference {
        MethodReference::new(
            self.defining_class.as_str(),
            self.name.as_str(),
            self.proto.parameters.descriptors(),
            self.proto.return_type.as_str(),
        )
    }
}

keyed_by!(
    BuilderMethodRef,
    |a, b| a
        .defining_class
        .cmp(&b.defining_class)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.proto.cmp(&b.proto)),
    |r, state| {
        r.defining_class.hash(state);
        r.name.hash(state);
        r.proto.hash(state);
    }
);

impl fmt::Display for BuilderMethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_immutable())
    }
}

/// An operand of a resolved instruction, pointing at a canonical pool entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuilderReference {
    /// A string
    String(BuilderStringRc),
    /// A type
    Type(BuilderTypeRc),
    /// A field
    Field(BuilderFieldRefRc),
    /// A method
    Method(BuilderMethodRefRc),
    /// A method prototype
    MethodProto(BuilderProtoRc),
}

impl BuilderReference {
    /// Convert back to the model reference
    #[must_use]
    pub fn to_immutable(&self) -> Reference {
        match self {
            BuilderReference::String(s) => Reference::String(s.as_str().to_string()),
            BuilderReference::Type(t) => Reference::Type(t.as_str().to_string()),
            BuilderReference::Field(f) => Reference::Field(f.to_immutable()),
            BuilderReference::Method(m) => Reference::Method(m.to_immutable()),
            BuilderReference::MethodProto(p) => Reference::MethodProto(p.to_immutable()),
        }
    }

    /// Returns `true` if both references point at the same pool entry
    #[must_use]
    pub fn ptr_eq(&self, other: &BuilderReference) -> bool {
        match (self, other) {
            (BuilderReference::String(a), BuilderReference::String(b)) => Arc::ptr_eq(a, b),
            (BuilderReference::Type(a), BuilderReference::Type(b)) => Arc::ptr_eq(a, b),
            (BuilderReference::Field(a), BuilderReference::Field(b)) => Arc::ptr_eq(a, b),
            (BuilderReference::Method(a), BuilderReference::Method(b)) => Arc::ptr_eq(a, b),
            (BuilderReference::MethodProto(a), BuilderReference::MethodProto(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl ReferenceKindOf for BuilderReference {
    fn reference_kind(&self) -> ReferenceKind {
        match self {
            BuilderReference::String(_) => ReferenceKind::String,
            BuilderReference::Type(_) => ReferenceKind::Type,
            BuilderReference::Field(_) => ReferenceKind::Field,
            BuilderReference::Method(_) => ReferenceKind::Method,
            BuilderReference::MethodProto(_) => ReferenceKind::MethodProto,
        }
    }
}
