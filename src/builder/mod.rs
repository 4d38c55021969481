//! Construction sessions.
//!
//! A [`DexBuilder`] owns one pool per kind of DEX item and turns immutable model values into
//! canonical, deduplicated builder references. Everything interned through the same builder
//! shares references: the string `"I"` exists exactly once, whether it came from a field type,
//! a method prototype or an encoded value.
//!
//! # Architecture
//!
//! Interning happens bottom-up: strings, then types, then type lists and prototypes, then
//! field and method references, then annotations, and finally classes. All operations take
//! `&self` and may be called from many threads at once; the pools use sharded
//! insert-if-absent maps rather than one global lock.
//!
//! # Key Components
//!
//! - [`DexBuilder`] - The construction session facade
//! - [`BuilderConfig`] - Strict/lenient mode and target API level
//! - [`Diagnostics`] - Items skipped in lenient mode
//! - [`ResolveReferences`] - Phase 1 to phase 2 resolution of code and debug info
//! - [`pool`] - The individual interning pools
//! - [`slots`] - Write-once index and offset side tables
//!
//! # Examples
//!
//! ```rust
//! use dexbuilder::{
//!     model::{AccessFlags, AnnotationSet, ClassDef, EncodedValue, Field},
//!     DexBuilder,
//! };
//!
//! let builder = DexBuilder::new();
//! let class = ClassDef::new(
//!     "LConfig;",
//!     AccessFlags::PUBLIC.bits(),
//!     Some("Ljava/lang/Object;".to_string()),
//!     &[],
//!     None,
//!     AnnotationSet::new(),
//!     vec![Field::new(
//!         "LConfig;",
//!         "VERSION",
//!         "I",
//!         (AccessFlags::STATIC | AccessFlags::FINAL).bits(),
//!         Some(EncodedValue::Int(3)),
//!         AnnotationSet::new(),
//!     )],
//!     vec![],
//! )?;
//!
//! let interned = builder.intern_class_def(&class)?;
//! assert_eq!(interned.static_fields().len(), 1);
//! assert_eq!(interned.to_immutable().ty, "LConfig;");
//! # Ok::<(), dexbuilder::Error>(())
//! ```

mod class;
mod config;
mod diagnostics;
pub mod pool;
mod refs;
mod resolve;
pub mod slots;
mod value;

pub use class::{
    BuilderClassDef, BuilderClassDefRc, BuilderDebugItem, BuilderExceptionHandler, BuilderField,
    BuilderInstruction, BuilderMethod, BuilderMethodImplementation, BuilderMethodParameter,
    BuilderTryBlock,
};
pub use config::BuilderConfig;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};
pub use pool::{BuilderAnnotation, BuilderAnnotationRc, BuilderAnnotationSet, BuilderAnnotationSetRc};
pub use refs::{
    BuilderFieldRef, BuilderFieldRefRc, BuilderMethodRef, BuilderMethodRefRc, BuilderProto,
    BuilderProtoRc, BuilderReference, BuilderString, BuilderStringRc, BuilderType,
    BuilderTypeList, BuilderTypeListRc, BuilderTypeRc,
};
pub use resolve::ResolveReferences;
pub use value::{BuilderAnnotationElement, BuilderEncodedAnnotation, BuilderEncodedValue};

use std::{
    collections::{BTreeSet, HashSet},
    fmt::Display,
    sync::Arc,
};

use rayon::prelude::*;

use crate::{
    builder::pool::{
        AnnotationPool, AnnotationSetPool, ClassPool, FieldPool, MethodPool, ProtoPool,
        StringPool, TypeListPool, TypePool,
    },
    model::{
        dedup_interfaces, AccessFlags, Annotation, AnnotationElement, AnnotationSet, ClassDef,
        EncodedValue, FieldReference, MethodImplementation, MethodParameter,
        MethodProtoReference, MethodReference, Reference,
    },
    Error, Result,
};

/// A DEX construction session.
///
/// Owns all pools of one output file. Builder references handed out by one session must not be
/// mixed with those of another; model values can be interned into any number of sessions.
///
/// `DexBuilder` is [`Send`] and [`Sync`]; every operation takes `&self`.
#[derive(Debug, Default)]
pub struct DexBuilder {
    config: BuilderConfig,
    strings: StringPool,
    types: TypePool,
    type_lists: TypeListPool,
    protos: ProtoPool,
    fields: FieldPool,
    methods: MethodPool,
    annotations: AnnotationPool,
    annotation_sets: AnnotationSetPool,
    classes: ClassPool,
    diagnostics: Diagnostics,
}

impl DexBuilder {
    /// Create a strict session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the given configuration
    #[must_use]
    pub fn with_config(config: BuilderConfig) -> Self {
        DexBuilder {
            config,
            ..Self::default()
        }
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Items skipped in lenient mode
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The string pool
    #[must_use]
    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    /// The type pool
    #[must_use]
    pub fn types(&self) -> &TypePool {
        &self.types
    }

    /// The type list pool
    #[must_use]
    pub fn type_lists(&self) -> &TypeListPool {
        &self.type_lists
    }

    /// The prototype pool
    #[must_use]
    pub fn protos(&self) -> &ProtoPool {
        &self.protos
    }

    /// The field reference pool
    #[must_use]
    pub fn fields(&self) -> &FieldPool {
        &self.fields
    }

    /// The method reference pool
    #[must_use]
    pub fn methods(&self) -> &MethodPool {
        &self.methods
    }

    /// The annotation pool
    #[must_use]
    pub fn annotations(&self) -> &AnnotationPool {
        &self.annotations
    }

    /// The annotation set pool
    #[must_use]
    pub fn annotation_sets(&self) -> &AnnotationSetPool {
        &self.annotation_sets
    }

    /// The class pool
    #[must_use]
    pub fn classes(&self) -> &ClassPool {
        &self.classes
    }

    /// Look up an interned class by descriptor
    #[must_use]
    pub fn class(&self, descriptor: &str) -> Option<BuilderClassDefRc> {
        self.types
            .get(descriptor)
            .and_then(|ty| self.classes.get(&ty))
    }

    /// All classes ordered by type.
    ///
    /// The first call seals the class pool: afterwards every class interning call fails with
    /// [`Error::PoolSealed`]. The other pools stay open.
    pub fn sorted_classes(&self) -> &[BuilderClassDefRc] {
        self.classes.sorted()
    }

    /// Intern a string
    pub fn intern_string(&self, value: &str) -> BuilderStringRc {
        self.strings.intern(value)
    }

    /// Intern an optional string
    pub fn intern_nullable_string(&self, value: Option<&str>) -> Option<BuilderStringRc> {
        self.strings.intern_nullable(value)
    }

    /// Intern a type descriptor
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for malformed descriptors.
    pub fn intern_type(&self, descriptor: &str) -> Result<BuilderTypeRc> {
        self.types.intern(&self.strings, descriptor)
    }

    /// Intern an optional type descriptor
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for malformed descriptors.
    pub fn intern_nullable_type(&self, descriptor: Option<&str>) -> Result<Option<BuilderTypeRc>> {
        self.types.intern_nullable(&self.strings, descriptor)
    }

    /// Intern an ordered list of type descriptors
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for malformed descriptors.
    pub fn intern_type_list<S: AsRef<str>>(&self, descriptors: &[S]) -> Result<BuilderTypeListRc> {
        self.type_lists
            .intern(&self.strings, &self.types, descriptors)
    }

    /// Intern a field reference
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an empty name or malformed descriptors.
    pub fn intern_field_reference(&self, field: &FieldReference) -> Result<BuilderFieldRefRc> {
        self.fields.intern(&self.strings, &self.types, field)
    }

    /// Intern a method reference
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an empty name or malformed descriptors.
    pub fn intern_method_reference(&self, method: &MethodReference) -> Result<BuilderMethodRefRc> {
        self.methods.intern(
            &self.strings,
            &self.types,
            &self.type_lists,
            &self.protos,
            method,
        )
    }

    /// Intern a method prototype
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for malformed descriptors.
    pub fn intern_method_proto_reference(
        &self,
        proto: &MethodProtoReference,
    ) -> Result<BuilderProtoRc> {
        self.protos
            .intern(&self.strings, &self.types, &self.type_lists, proto)
    }

    /// Intern any supported reference.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedReferenceKind`] for method handles and call sites, and
    /// propagates the errors of the specific interning operation.
    pub fn intern_reference(&self, reference: &Reference) -> Result<BuilderReference> {
        match reference {
            Reference::String(s) => Ok(BuilderReference::String(self.intern_string(s))),
            Reference::Type(t) => Ok(BuilderReference::Type(self.intern_type(t)?)),
            Reference::Field(f) => Ok(BuilderReference::Field(self.intern_field_reference(f)?)),
            Reference::Method(m) => {
                Ok(BuilderReference::Method(self.intern_method_reference(m)?))
            }
            Reference::MethodProto(p) => Ok(BuilderReference::MethodProto(
                self.intern_method_proto_reference(p)?,
            )),
            Reference::MethodHandle(_) | Reference::CallSite(_) => Err(
                Error::UnsupportedReferenceKind(reference.kind().to_string()),
            ),
        }
    }

    fn intern_elements(
        &self,
        elements: &BTreeSet<AnnotationElement>,
    ) -> Result<Vec<BuilderAnnotationElement>> {
        elements
            .iter()
            .map(|element| {
                Ok(BuilderAnnotationElement {
                    name: self.intern_string(&element.name),
                    value: self.intern_encoded_value(&element.value)?,
                })
            })
            .collect()
    }

    /// Intern an encoded value tree.
    ///
    /// Strings, types, fields, methods and enum constants nested at any depth are replaced by
    /// their canonical pool entries.
    ///
    /// # Errors
    /// Propagates the errors of the nested interning operations.
    pub fn intern_encoded_value(&self, value: &EncodedValue) -> Result<BuilderEncodedValue> {
        Ok(match value {
            EncodedValue::Byte(v) => BuilderEncodedValue::Byte(*v),
            EncodedValue::Short(v) => BuilderEncodedValue::Short(*v),
            EncodedValue::Char(v) => BuilderEncodedValue::Char(*v),
            EncodedValue::Int(v) => BuilderEncodedValue::Int(*v),
            EncodedValue::Long(v) => BuilderEncodedValue::Long(*v),
            EncodedValue::Float(v) => BuilderEncodedValue::Float(*v),
            EncodedValue::Double(v) => BuilderEncodedValue::Double(*v),
            EncodedValue::String(s) => BuilderEncodedValue::String(self.intern_string(s)),
            EncodedValue::Type(t) => BuilderEncodedValue::Type(self.intern_type(t)?),
            EncodedValue::Field(f) => BuilderEncodedValue::Field(self.intern_field_reference(f)?),
            EncodedValue::Method(m) => {
                BuilderEncodedValue::Method(self.intern_method_reference(m)?)
            }
            EncodedValue::Enum(f) => BuilderEncodedValue::Enum(self.intern_field_reference(f)?),
            EncodedValue::Array(values) => BuilderEncodedValue::Array(
                values
                    .iter()
                    .map(|v| self.intern_encoded_value(v))
                    .collect::<Result<Vec<_>>>()?,
            ),
            EncodedValue::Annotation(annotation) => {
                BuilderEncodedValue::Annotation(BuilderEncodedAnnotation {
                    ty: self.intern_type(&annotation.ty)?,
                    elements: self.intern_elements(&annotation.elements)?,
                })
            }
            EncodedValue::Null => BuilderEncodedValue::Null,
            EncodedValue::Boolean(v) => BuilderEncodedValue::Boolean(*v),
        })
    }

    /// Intern a single annotation
    ///
    /// # Errors
    /// Propagates the errors of interning its type and element values.
    pub fn intern_annotation(&self, annotation: &Annotation) -> Result<BuilderAnnotationRc> {
        self.annotations.intern_with(annotation, || {
            Ok((
                self.intern_type(&annotation.ty)?,
                self.intern_elements(&annotation.elements)?,
            ))
        })
    }

    /// Intern an annotation set. The empty set is interned too; writers treat it as absent.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if two annotations share a type and propagates the
    /// errors of interning the annotations.
    pub fn intern_annotation_set(&self, set: &AnnotationSet) -> Result<BuilderAnnotationSetRc> {
        self.annotation_sets
            .intern_with(set, |annotation| self.intern_annotation(annotation))
    }

    /// Intern a field definition.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an empty name, a `void` or malformed type, and
    /// propagates errors from interning the initial value or annotations.
    pub fn intern_field(
        &self,
        defining_class: &str,
        name: &str,
        ty: &str,
        access_flags: u32,
        initial_value: Option<&EncodedValue>,
        annotations: &AnnotationSet,
    ) -> Result<BuilderField> {
        let reference =
            self.intern_field_reference(&FieldReference::new(defining_class, name, ty))?;

        Ok(BuilderField {
            reference,
            access_flags,
            initial_value: initial_value
                .map(|value| self.intern_encoded_value(value))
                .transpose()?,
            annotations: self.intern_annotation_set(annotations)?,
        })
    }

    /// Validate and resolve a method body.
    ///
    /// Every instruction is validated against the opcode table and the configured API level,
    /// then instructions, try blocks and debug items are resolved against this session.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for invalid instructions and propagates resolution
    /// errors.
    pub fn intern_method_implementation(
        &self,
        implementation: &MethodImplementation,
    ) -> Result<BuilderMethodImplementation> {
        for instruction in &implementation.instructions {
            instruction.validate()?;
            let opcode = instruction.opcode();
            if opcode.min_api() > self.config.api_level {
                return Err(invalid_argument!(
                    "{} requires API level {}, target is {}",
                    opcode,
                    opcode.min_api(),
                    self.config.api_level
                ));
            }
        }

        Ok(BuilderMethodImplementation {
            register_count: implementation.register_count,
            instructions: implementation
                .instructions
                .iter()
                .map(|insn| insn.resolve_references(self))
                .collect::<Result<Vec<_>>>()?,
            try_blocks: implementation
                .try_blocks
                .iter()
                .map(|block| block.resolve_references(self))
                .collect::<Result<Vec<_>>>()?,
            debug_items: implementation
                .debug_items
                .iter()
                .map(|item| item.resolve_references(self))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Intern a method definition.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for malformed signatures, abstract or native methods
    /// with a body and invalid instructions, and propagates annotation errors.
    pub fn intern_method(
        &self,
        defining_class: &str,
        name: &str,
        parameters: &[MethodParameter],
        return_type: &str,
        access_flags: u32,
        annotations: &AnnotationSet,
        implementation: Option<&MethodImplementation>,
    ) -> Result<BuilderMethod> {
        let reference = self.intern_method_reference(&MethodReference::new(
            defining_class,
            name,
            parameters.iter().map(|p| p.ty.clone()).collect(),
            return_type,
        ))?;

        let flags = AccessFlags::from_bits_retain(access_flags);
        if implementation.is_some() && flags.intersects(AccessFlags::ABSTRACT | AccessFlags::NATIVE)
        {
            return Err(invalid_argument!(
                "Abstract or native method {} can not have an implementation",
                reference
            ));
        }

        let parameters = parameters
            .iter()
            .map(|parameter| {
                Ok(BuilderMethodParameter {
                    ty: self.intern_type(&parameter.ty)?,
                    name: self.intern_nullable_string(parameter.name.as_deref()),
                    annotations: self.intern_annotation_set(&parameter.annotations)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BuilderMethod {
            reference,
            parameters,
            access_flags,
            annotations: self.intern_annotation_set(annotations)?,
            implementation: implementation
                .map(|body| self.intern_method_implementation(body))
                .transpose()?,
            slot: self.classes.allocate_method_slot(),
        })
    }

    /// Intern a class from already interned members.
    ///
    /// Interfaces are deduplicated keeping the first occurrence. Fields are split on
    /// [`AccessFlags::STATIC`] and methods on [`AccessFlags::is_direct_method`]; each list is
    /// sorted in id order.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateDefinition`] if the class type was interned before or two
    /// members share a descriptor, [`Error::PoolSealed`] after
    /// [`DexBuilder::sorted_classes`] was called, and [`Error::InvalidArgument`] for malformed
    /// class data or members declared by another class.
    pub fn intern_class_def_parts(
        &self,
        ty: &str,
        access_flags: u32,
        superclass: Option<&str>,
        interfaces: &[String],
        source_file: Option<&str>,
        annotations: &AnnotationSet,
        fields: Vec<BuilderField>,
        methods: Vec<BuilderMethod>,
    ) -> Result<BuilderClassDefRc> {
        if !ty.starts_with('L') {
            return Err(invalid_argument!("Class type {} is not a class descriptor", ty));
        }
        let class_type = self.intern_type(ty)?;
        self.classes.check_available(&class_type)?;

        let mut seen_fields = HashSet::new();
        for field in &fields {
            if !Arc::ptr_eq(field.reference.defining_class(), &class_type) {
                return Err(invalid_argument!(
                    "Field {} is not declared by {}",
                    field.reference,
                    ty
                ));
            }
            if !seen_fields.insert((field.reference.name().as_str(), field.reference.ty().as_str())) {
                return Err(duplicate_definition!(
                    "Field {} is declared twice",
                    field.reference
                ));
            }
        }
        let mut seen_methods = HashSet::new();
        for method in &methods {
            if !Arc::ptr_eq(method.reference.defining_class(), &class_type) {
                return Err(invalid_argument!(
                    "Method {} is not declared by {}",
                    method.reference,
                    ty
                ));
            }
            if !seen_methods.insert(Arc::as_ptr(&method.reference)) {
                return Err(duplicate_definition!(
                    "Method {} is declared twice",
                    method.reference
                ));
            }
        }

        let (mut static_fields, mut instance_fields): (Vec<_>, Vec<_>) =
            fields.into_iter().partition(BuilderField::is_static);
        let (mut direct_methods, mut virtual_methods): (Vec<_>, Vec<_>) =
            methods.into_iter().partition(BuilderMethod::is_direct);
        static_fields.sort_by(|a, b| a.reference.cmp(&b.reference));
        instance_fields.sort_by(|a, b| a.reference.cmp(&b.reference));
        direct_methods.sort_by(|a, b| a.reference.cmp(&b.reference));
        virtual_methods.sort_by(|a, b| a.reference.cmp(&b.reference));

        let class = BuilderClassDef {
            access_flags,
            superclass: self.intern_nullable_type(superclass)?,
            interfaces: self.intern_type_list(&dedup_interfaces(interfaces))?,
            source_file: self.intern_nullable_string(source_file),
            annotations: self.intern_annotation_set(annotations)?,
            static_fields,
            instance_fields,
            direct_methods,
            virtual_methods,
            slot: self.classes.allocate_slot(),
            ty: class_type,
        };
        self.classes.insert(class)
    }

    /// Keep successfully interned members, or fail on the first error in strict mode
    fn collect_members<T, D: Display>(
        &self,
        class: &str,
        category: DiagnosticCategory,
        results: Vec<(D, Result<T>)>,
    ) -> Result<Vec<T>> {
        let mut members = Vec::with_capacity(results.len());
        for (member, result) in results {
            match result {
                Ok(value) => members.push(value),
                Err(error) if self.config.lenient => {
                    log::warn!("Skipping {} {} of {}: {}", category, member, class, error);
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            category,
                            format!("Skipped {member}: {error}"),
                        )
                        .with_class(class),
                    );
                }
                Err(error) => return Err(error),
            }
        }
        Ok(members)
    }

    /// Intern a complete class definition, re-interning every member, annotation, encoded
    /// value, instruction, try block and debug item through this session.
    ///
    /// In lenient mode, fields and methods that fail to intern are skipped and reported in
    /// [`DexBuilder::diagnostics`]; the class is built from the remaining members.
    ///
    /// # Errors
    /// Class-level errors always propagate: [`Error::DuplicateDefinition`] for a class type
    /// interned before, [`Error::PoolSealed`] and malformed class data. In strict mode, the
    /// first member error propagates too.
    pub fn intern_class_def(&self, class: &ClassDef) -> Result<BuilderClassDefRc> {
        self.classes.check_available(&self.intern_type(&class.ty)?)?;

        let fields: Vec<_> = class
            .fields()
            .map(|field| {
                let result = self.intern_field(
                    &field.defining_class,
                    &field.name,
                    &field.ty,
                    field.access_flags,
                    field.initial_value.as_ref(),
                    &field.annotations,
                );
                (field.reference(), result)
            })
            .collect();
        let fields = self.collect_members(&class.ty, DiagnosticCategory::Field, fields)?;

        let methods: Vec<_> = class
            .methods()
            .map(|method| {
                let result = self.intern_method(
                    &method.defining_class,
                    &method.name,
                    &method.parameters,
                    &method.return_type,
                    method.access_flags,
                    &method.annotations,
                    method.implementation.as_ref(),
                );
                (method.reference(), result)
            })
            .collect();
        let methods = self.collect_members(&class.ty, DiagnosticCategory::Method, methods)?;

        self.intern_class_def_parts(
            &class.ty,
            class.access_flags,
            class.superclass.as_deref(),
            &class.interfaces,
            class.source_file.as_deref(),
            &class.annotations,
            fields,
            methods,
        )
    }

    /// Intern many classes in parallel.
    ///
    /// The returned references are in input order.
    ///
    /// # Errors
    /// Fails if any class fails; which error is reported when several classes fail is
    /// unspecified.
    pub fn intern_class_defs(&self, classes: &[ClassDef]) -> Result<Vec<BuilderClassDefRc>> {
        classes
            .par_iter()
            .map(|class| self.intern_class_def(class))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnnotationVisibility, CallSiteReference, DebugItem, EncodedAnnotation, Instruction,
        MethodHandleKind, MethodHandleMember, MethodHandleReference, Opcode,
    };

    fn flags(f: AccessFlags) -> u32 {
        f.bits()
    }

    #[test]
    fn field_interning_is_canonical() {
        let builder = DexBuilder::new();
        let a = builder
            .intern_field("LA;", "x", "I", 0, None, &AnnotationSet::new())
            .unwrap();
        let b = builder
            .intern_field("LA;", "x", "I", 0, None, &AnnotationSet::new())
            .unwrap();
        assert!(Arc::ptr_eq(a.reference(), b.reference()));
        assert_eq!(builder.fields().len(), 1);
    }

    #[test]
    fn encoded_values_share_pool_entries() {
        let builder = DexBuilder::new();
        let value = EncodedValue::Array(vec![
            EncodedValue::String("hello".into()),
            EncodedValue::Annotation(
                EncodedAnnotation::new(
                    "LAnno;",
                    [AnnotationElement::new("value", EncodedValue::String("hello".into()))],
                )
                .unwrap(),
            ),
        ]);

        let interned = builder.intern_encoded_value(&value).unwrap();
        let BuilderEncodedValue::Array(items) = &interned else {
            panic!("expected array");
        };
        let (BuilderEncodedValue::String(outer), BuilderEncodedValue::Annotation(nested)) =
            (&items[0], &items[1])
        else {
            panic!("unexpected shape");
        };
        let BuilderEncodedValue::String(inner) = &nested.elements[0].value else {
            panic!("expected string");
        };
        assert!(Arc::ptr_eq(outer, inner));
        assert_eq!(interned.to_immutable(), value);
    }

    #[test]
    fn unsupported_references() {
        let builder = DexBuilder::new();
        let handle = MethodHandleReference {
            kind: MethodHandleKind::InvokeStatic,
            member: MethodHandleMember::Method(MethodReference::new("LA;", "m", vec![], "V")),
        };
        assert!(matches!(
            builder.intern_reference(&Reference::MethodHandle(handle.clone())),
            Err(Error::UnsupportedReferenceKind(_))
        ));

        let call_site = CallSiteReference {
            name: "site0".into(),
            method_handle: handle,
            method_name: "apply".into(),
            method_proto: MethodProtoReference::new(vec![], "V"),
            extra_arguments: vec![],
        };
        assert!(matches!(
            builder.intern_reference(&Reference::CallSite(call_site)),
            Err(Error::UnsupportedReferenceKind(_))
        ));
    }

    #[test]
    fn annotation_sets_dedup() {
        let builder = DexBuilder::new();
        let mut set = AnnotationSet::new();
        set.insert(
            Annotation::new(AnnotationVisibility::Runtime, "LAnno;", []).unwrap(),
        );

        let a = builder.intern_annotation_set(&set).unwrap();
        let b = builder.intern_annotation_set(&set.clone()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builder.annotations().len(), 1);
        assert_eq!(a.to_immutable(), set);

        let empty = builder.intern_annotation_set(&AnnotationSet::new()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(builder.annotation_sets().items().len(), 1);
    }

    #[test]
    fn annotation_set_rejects_repeated_type() {
        let builder = DexBuilder::new();
        let mut set = AnnotationSet::new();
        set.insert(Annotation::new(AnnotationVisibility::Runtime, "LAnno;", []).unwrap());
        set.insert(Annotation::new(AnnotationVisibility::Build, "LAnno;", []).unwrap());
        assert!(builder.intern_annotation_set(&set).is_err());
    }

    #[test]
    fn api_level_enforced() {
        let body = MethodImplementation::new(
            1,
            vec![
                Instruction::Format21c {
                    opcode: Opcode::ConstMethodType,
                    register_a: 0,
                    reference: Reference::MethodProto(MethodProtoReference::new(vec![], "V")),
                },
                Instruction::Format10x {
                    opcode: Opcode::ReturnVoid,
                },
            ],
            vec![],
            vec![],
        );

        let old = DexBuilder::with_config(BuilderConfig {
            api_level: 26,
            ..BuilderConfig::strict()
        });
        assert!(old.intern_method_implementation(&body).is_err());

        let current = DexBuilder::new();
        assert!(current.intern_method_implementation(&body).is_ok());
    }

    #[test]
    fn abstract_method_with_body_rejected() {
        let builder = DexBuilder::new();
        let result = builder.intern_method(
            "LA;",
            "m",
            &[],
            "V",
            flags(AccessFlags::PUBLIC | AccessFlags::ABSTRACT),
            &AnnotationSet::new(),
            Some(&MethodImplementation::default()),
        );
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn parts_reject_foreign_and_duplicate_members() {
        let builder = DexBuilder::new();
        let foreign = builder
            .intern_field("LB;", "x", "I", 0, None, &AnnotationSet::new())
            .unwrap();
        let result = builder.intern_class_def_parts(
            "LA;",
            0,
            None,
            &[],
            None,
            &AnnotationSet::new(),
            vec![foreign],
            vec![],
        );
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        let m = builder
            .intern_method("LA;", "m", &[], "V", 0, &AnnotationSet::new(), None)
            .unwrap();
        let result = builder.intern_class_def_parts(
            "LA;",
            0,
            None,
            &[],
            None,
            &AnnotationSet::new(),
            vec![],
            vec![m.clone(), m],
        );
        assert!(matches!(result, Err(Error::DuplicateDefinition(_))));
        assert!(builder.class("LA;").is_none());
    }

    #[test]
    fn sealed_after_sorted_read() {
        let builder = DexBuilder::new();
        builder
            .intern_class_def_parts("LB;", 0, None, &[], None, &AnnotationSet::new(), vec![], vec![])
            .unwrap();
        builder
            .intern_class_def_parts("LA;", 0, None, &[], None, &AnnotationSet::new(), vec![], vec![])
            .unwrap();

        let sorted: Vec<&str> = builder
            .sorted_classes()
            .iter()
            .map(|c| c.ty().as_str())
            .collect();
        assert_eq!(sorted, vec!["LA;", "LB;"]);
        assert!(builder.classes().is_sealed());

        let late = builder.intern_class_def_parts(
            "LC;",
            0,
            None,
            &[],
            None,
            &AnnotationSet::new(),
            vec![],
            vec![],
        );
        assert!(matches!(late, Err(Error::PoolSealed)));
        // writers may still intern synthesized strings
        builder.intern_string("synthetic");
    }

    #[test]
    fn method_body_debug_items_resolved() {
        let builder = DexBuilder::new();
        let body = MethodImplementation::new(
            1,
            vec![Instruction::Format10x {
                opcode: Opcode::ReturnVoid,
            }],
            vec![],
            vec![
                DebugItem::PrologueEnd { code_address: 0 },
                DebugItem::LineNumber {
                    code_address: 0,
                    line_number: 12,
                },
            ],
        );
        let method = builder
            .intern_method(
                "LA;",
                "run",
                &[MethodParameter::new("I").with_name("times")],
                "V",
                flags(AccessFlags::PUBLIC),
                &AnnotationSet::new(),
                Some(&body),
            )
            .unwrap();

        assert_eq!(method.to_immutable().implementation.unwrap(), body);
        assert_eq!(method.parameters()[0].name.as_ref().unwrap().as_str(), "times");
        assert!(method.parameter_annotations().is_none());
    }
}
