//! Class definitions.
//!
//! [`ClassDef`] is the root of the immutable model. Its constructor normalizes loose input
//! into the four member lists a `class_data_item` needs (static fields, instance fields,
//! direct methods, virtual methods), each sorted by the member's natural order, and rejects
//! classes that declare the same member descriptor twice.

use std::{
    cmp::Ordering,
    collections::HashSet,
    hash::{Hash, Hasher},
};

use crate::{
    model::{
        annotation::AnnotationSet, field::Field, flags::AccessFlags, method::Method,
        types::utf16_cmp,
    },
    Result,
};

/// An immutable class definition
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Class type descriptor
    pub ty: String,
    /// Raw `access_flags`
    pub access_flags: u32,
    /// Superclass descriptor, absent only for `java.lang.Object`
    pub superclass: Option<String>,
    /// Implemented interfaces, duplicates removed, first occurrence kept
    pub interfaces: Vec<String>,
    /// Source file name
    pub source_file: Option<String>,
    /// Class annotations
    pub annotations: AnnotationSet,
    /// Static fields, sorted
    pub static_fields: Vec<Field>,
    /// Instance fields, sorted
    pub instance_fields: Vec<Field>,
    /// Static, private and constructor methods, sorted
    pub direct_methods: Vec<Method>,
    /// All other methods, sorted
    pub virtual_methods: Vec<Method>,
}

/// Remove repeated entries, keeping the first occurrence of each
pub(crate) fn dedup_interfaces<S: AsRef<str>>(interfaces: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    interfaces
        .iter()
        .map(AsRef::as_ref)
        .filter(|iface| seen.insert(*iface))
        .map(str::to_string)
        .collect()
}

impl ClassDef {
    /// Build a class definition from its parts.
    ///
    /// Fields are split on [`AccessFlags::STATIC`], methods on
    /// [`AccessFlags::is_direct_method`]. Collections can be passed in any order.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateDefinition`] if two fields or two methods share a
    /// descriptor, and [`crate::Error::InvalidArgument`] if a member belongs to another class.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ty: impl Into<String>,
        access_flags: u32,
        superclass: Option<String>,
        interfaces: &[String],
        source_file: Option<String>,
        annotations: AnnotationSet,
        fields: impl IntoIterator<Item = Field>,
        methods: impl IntoIterator<Item = Method>,
    ) -> Result<Self> {
        let ty = ty.into();

        let (mut static_fields, mut instance_fields): (Vec<Field>, Vec<Field>) =
            fields.into_iter().partition(Field::is_static);
        let (mut direct_methods, mut virtual_methods): (Vec<Method>, Vec<Method>) =
            methods.into_iter().partition(Method::is_direct);

        for field in static_fields.iter().chain(&instance_fields) {
            if field.defining_class != ty {
                return Err(invalid_argument!(
                    "Field {} is not declared by {}",
                    field.reference(),
                    ty
                ));
            }
        }
        for method in direct_methods.iter().chain(&virtual_methods) {
            if method.defining_class != ty {
                return Err(invalid_argument!(
                    "Method {} is not declared by {}",
                    method.reference(),
                    ty
                ));
            }
        }

        // A static and an instance field with one descriptor still collide
        let mut field_keys = HashSet::new();
        for field in static_fields.iter().chain(&instance_fields) {
            if !field_keys.insert((field.name.as_str(), field.ty.as_str())) {
                return Err(duplicate_definition!(
                    "Field {} is declared twice in {}",
                    field.reference(),
                    ty
                ));
            }
        }
        let mut method_keys = HashSet::new();
        for method in direct_methods.iter().chain(&virtual_methods) {
            if !method_keys.insert(method.reference()) {
                return Err(duplicate_definition!(
                    "Method {} is declared twice in {}",
                    method.reference(),
                    ty
                ));
            }
        }

        static_fields.sort();
        instance_fields.sort();
        direct_methods.sort();
        virtual_methods.sort();

        Ok(ClassDef {
            static_fields,
            instance_fields,
            direct_methods,
            virtual_methods,
            interfaces: dedup_interfaces(interfaces),
            ty,
            access_flags,
            superclass,
            source_file,
            annotations,
        })
    }

    /// Typed view of `access_flags`
    #[must_use]
    pub fn flags(&self) -> AccessFlags {
        AccessFlags::from_bits_retain(self.access_flags)
    }

    /// Static then instance fields
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.static_fields.iter().chain(&self.instance_fields)
    }

    /// Direct then virtual methods
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.direct_methods.iter().chain(&self.virtual_methods)
    }
}

impl PartialEq for ClassDef {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

impl Eq for ClassDef {}

impl Hash for ClassDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
    }
}

impl Ord for ClassDef {
    fn cmp(&self, other: &Self) -> Ordering {
        utf16_cmp(&self.ty, &other.ty)
    }
}

impl PartialOrd for ClassDef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::method::MethodParameter, Error};

    fn field(name: &str, ty: &str, flags: AccessFlags) -> Field {
        Field::new("LA;", name, ty, flags.bits(), None, AnnotationSet::new())
    }

    fn method(name: &str, flags: AccessFlags) -> Method {
        Method::new(
            "LA;",
            name,
            vec![MethodParameter::new("I")],
            "V",
            flags.bits(),
            AnnotationSet::new(),
            None,
        )
    }

    #[test]
    fn members_are_split_and_sorted() {
        let class = ClassDef::new(
            "LA;",
            AccessFlags::PUBLIC.bits(),
            Some("Ljava/lang/Object;".into()),
            &[],
            None,
            AnnotationSet::new(),
            vec![
                field("z", "I", AccessFlags::STATIC),
                field("b", "I", AccessFlags::empty()),
                field("a", "I", AccessFlags::STATIC),
            ],
            vec![
                method("run", AccessFlags::PUBLIC),
                method("<init>", AccessFlags::CONSTRUCTOR),
                method("helper", AccessFlags::PRIVATE),
            ],
        )
        .unwrap();

        let statics: Vec<&str> = class.static_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(statics, vec!["a", "z"]);
        assert_eq!(class.instance_fields.len(), 1);

        let direct: Vec<&str> = class.direct_methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(direct, vec!["<init>", "helper"]);
        assert_eq!(class.virtual_methods[0].name, "run");
        assert_eq!(class.fields().count(), 3);
        assert_eq!(class.methods().count(), 3);
    }

    #[test]
    fn interfaces_keep_first_occurrence() {
        let class = ClassDef::new(
            "LA;",
            0,
            None,
            &["LFoo;".into(), "LBar;".into(), "LFoo;".into()],
            None,
            AnnotationSet::new(),
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(class.interfaces, vec!["LFoo;", "LBar;"]);
    }

    #[test]
    fn duplicate_members_rejected() {
        let fields = ClassDef::new(
            "LA;",
            0,
            None,
            &[],
            None,
            AnnotationSet::new(),
            vec![
                field("x", "I", AccessFlags::STATIC),
                field("x", "I", AccessFlags::empty()),
            ],
            vec![],
        );
        assert!(matches!(fields, Err(Error::DuplicateDefinition(_))));

        let methods = ClassDef::new(
            "LA;",
            0,
            None,
            &[],
            None,
            AnnotationSet::new(),
            vec![],
            vec![method("m", AccessFlags::PUBLIC), method("m", AccessFlags::PUBLIC)],
        );
        assert!(matches!(methods, Err(Error::DuplicateDefinition(_))));
    }

    #[test]
    fn foreign_member_rejected() {
        let stray = Field::new("LB;", "x", "I", 0, None, AnnotationSet::new());
        let result = ClassDef::new("LA;", 0, None, &[], None, AnnotationSet::new(), vec![stray], vec![]);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }
}
