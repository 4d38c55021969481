//! Member and class definitions built from interned references.
//!
//! These are the values a construction session produces. Fields and methods are owned by the
//! class they are interned into; only the class itself is pooled.

use std::{convert::Infallible, sync::Arc};

use crate::{
    builder::{
        pool::BuilderAnnotationSetRc,
        refs::{
            BuilderFieldRefRc, BuilderMethodRefRc, BuilderReference, BuilderStringRc,
            BuilderTypeListRc, BuilderTypeRc,
        },
        slots::SlotId,
        value::BuilderEncodedValue,
    },
    model::{
        AccessFlags, ClassDef, DebugItem, ExceptionHandler, Field, Instruction, Method,
        MethodImplementation, MethodParameter, TryBlock,
    },
    Result,
};

/// Reference counted [`BuilderClassDef`]
pub type BuilderClassDefRc = Arc<BuilderClassDef>;

/// An instruction whose reference operands point at pool entries
pub type BuilderInstruction = Instruction<BuilderReference>;
/// A try block catching interned types
pub type BuilderTryBlock = TryBlock<BuilderTypeRc>;
/// An exception handler catching an interned type
pub type BuilderExceptionHandler = ExceptionHandler<BuilderTypeRc>;
/// A debug item with interned names, types and signatures
pub type BuilderDebugItem = DebugItem<BuilderStringRc, BuilderTypeRc>;

/// A field definition (`encoded_field`)
#[derive(Debug, Clone)]
pub struct BuilderField {
    pub(crate) reference: BuilderFieldRefRc,
    pub(crate) access_flags: u32,
    pub(crate) initial_value: Option<BuilderEncodedValue>,
    pub(crate) annotations: BuilderAnnotationSetRc,
}

impl BuilderField {
    /// The interned field reference
    #[must_use]
    pub fn reference(&self) -> &BuilderFieldRefRc {
        &self.reference
    }

    /// Raw `access_flags`
    #[must_use]
    pub fn access_flags(&self) -> u32 {
        self.access_flags
    }

    /// Returns `true` for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        AccessFlags::from_bits_retain(self.access_flags).contains(AccessFlags::STATIC)
    }

    /// Static initial value
    #[must_use]
    pub fn initial_value(&self) -> Option<&BuilderEncodedValue> {
        self.initial_value.as_ref()
    }

    /// Field annotations, possibly the empty set
    #[must_use]
    pub fn annotations(&self) -> &BuilderAnnotationSetRc {
        &self.annotations
    }

    /// Convert back to the model field
    #[must_use]
    pub fn to_immutable(&self) -> Field {
        Field::new(
            self.reference.defining_class().as_str(),
            self.reference.name().as_str(),
            self.reference.ty().as_str(),
            self.access_flags,
            self.initial_value.as_ref().map(BuilderEncodedValue::to_immutable),
            self.annotations.to_immutable(),
        )
    }
}

/// A declared parameter with interned type, name and annotations
#[derive(Debug, Clone)]
pub struct BuilderMethodParameter {
    /// Parameter type
    pub ty: BuilderTypeRc,
    /// Debug name
    pub name: Option<BuilderStringRc>,
    /// Parameter annotations, possibly the empty set
    pub annotations: BuilderAnnotationSetRc,
}

impl BuilderMethodParameter {
    /// Convert back to the model parameter
    #[must_use]
    pub fn to_immutable(&self) -> MethodParameter {
        MethodParameter {
            ty: self.ty.as_str().to_string(),
            name: self.name.as_ref().map(|n| n.as_str().to_string()),
            annotations: self.annotations.to_immutable(),
        }
    }
}

/// A method body whose references are all resolved
#[derive(Debug, Clone)]
pub struct BuilderMethodImplementation {
    /// Number of registers used by the method
    pub register_count: u16,
    /// Resolved instructions
    pub instructions: Vec<BuilderInstruction>,
    /// Try blocks with interned exception types
    pub try_blocks: Vec<BuilderTryBlock>,
    /// Resolved debug items
    pub debug_items: Vec<BuilderDebugItem>,
}

impl BuilderMethodImplementation {
    /// Convert back to the model implementation
    #[must_use]
    pub fn to_immutable(&self) -> MethodImplementation {
        let as_string = |s: &BuilderStringRc| Ok(s.as_str().to_string());
        let as_type = |t: &BuilderTypeRc| Ok(t.as_str().to_string());

        MethodImplementation {
            register_count: self.register_count,
            instructions: self
                .instructions
                .iter()
                .map(|insn| infallible(insn.map_references(|r| Ok(r.to_immutable()))))
                .collect(),
            try_blocks: self
                .try_blocks
                .iter()
                .map(|block| infallible(block.map_types(as_type)))
                .collect(),
            debug_items: self
                .debug_items
                .iter()
                .map(|item| infallible(item.map_references(as_string, as_type)))
                .collect(),
        }
    }

    /// Size of the instruction stream in code units
    #[must_use]
    pub fn code_units(&self) -> usize {
        self.instructions.iter().map(Instruction::code_units).sum()
    }
}

fn infallible<T>(result: std::result::Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// A method definition (`encoded_method`)
#[derive(Debug, Clone)]
pub struct BuilderMethod {
    pub(crate) reference: BuilderMethodRefRc,
    pub(crate) parameters: Vec<BuilderMethodParameter>,
    pub(crate) access_flags: u32,
    pub(crate) annotations: BuilderAnnotationSetRc,
    pub(crate) implementation: Option<BuilderMethodImplementation>,
    pub(crate) slot: SlotId,
}

impl BuilderMethod {
    /// The interned method reference
    #[must_use]
    pub fn reference(&self) -> &BuilderMethodRefRc {
        &self.reference
    }

    /// Parameters in declaration order
    #[must_use]
    pub fn parameters(&self) -> &[BuilderMethodParameter] {
        &self.parameters
    }

    /// Raw `access_flags`
    #[must_use]
    pub fn access_flags(&self) -> u32 {
        self.access_flags
    }

    /// Returns `true` if the method goes into `direct_methods`
    #[must_use]
    pub fn is_direct(&self) -> bool {
        AccessFlags::from_bits_retain(self.access_flags).is_direct_method()
    }

    /// Method annotations, possibly the empty set
    #[must_use]
    pub fn annotations(&self) -> &BuilderAnnotationSetRc {
        &self.annotations
    }

    /// Method body
    #[must_use]
    pub fn implementation(&self) -> Option<&BuilderMethodImplementation> {
        self.implementation.as_ref()
    }

    /// Per-parameter annotation sets, `None` when no parameter carries an annotation
    #[must_use]
    pub fn parameter_annotations(&self) -> Option<Vec<BuilderAnnotationSetRc>> {
        if self.parameters.iter().all(|p| p.annotations.is_empty()) {
            return None;
        }
        Some(
            self.parameters
                .iter()
                .map(|p| Arc::clone(&p.annotations))
                .collect(),
        )
    }

    /// Convert back to the model method
    #[must_use]
    pub fn to_immutable(&self) -> Method {
        Method::new(
            self.reference.defining_class().as_str(),
            self.reference.name().as_str(),
            self.parameters
                .iter()
                .map(BuilderMethodParameter::to_immutable)
                .collect(),
            self.reference.proto().return_type().as_str(),
            self.access_flags,
            self.annotations.to_immutable(),
            self.implementation
                .as_ref()
                .map(BuilderMethodImplementation::to_immutable),
        )
    }
}

/// An interned class definition (`class_def_item`)
#[derive(Debug)]
pub struct BuilderClassDef {
    pub(crate) ty: BuilderTypeRc,
    pub(crate) access_flags: u32,
    pub(crate) superclass: Option<BuilderTypeRc>,
    pub(crate) interfaces: BuilderTypeListRc,
    pub(crate) source_file: Option<BuilderStringRc>,
    pub(crate) annotations: BuilderAnnotationSetRc,
    pub(crate) static_fields: Vec<BuilderField>,
    pub(crate) instance_fields: Vec<BuilderField>,
    pub(crate) direct_methods: Vec<BuilderMethod>,
    pub(crate) virtual_methods: Vec<BuilderMethod>,
    pub(crate) slot: SlotId,
}

impl BuilderClassDef {
    /// Class type
    #[must_use]
    pub fn ty(&self) -> &BuilderTypeRc {
        &self.ty
    }

    /// Raw `access_flags`
    #[must_use]
    pub fn access_flags(&self) -> u32 {
        self.access_flags
    }

    /// Superclass
    #[must_use]
    pub fn superclass(&self) -> Option<&BuilderTypeRc> {
        self.superclass.as_ref()
    }

    /// Interface list, possibly empty
    #[must_use]
    pub fn interfaces(&self) -> &BuilderTypeListRc {
        &self.interfaces
    }

    /// Source file
    #[must_use]
    pub fn source_file(&self) -> Option<&BuilderStringRc> {
        self.source_file.as_ref()
    }

    /// Class annotations, possibly the empty set
    #[must_use]
    pub fn annotations(&self) -> &BuilderAnnotationSetRc {
        &self.annotations
    }

    /// Static fields in `field_ids` order
    #[must_use]
    pub fn static_fields(&self) -> &[BuilderField] {
        &self.static_fields
    }

    /// Instance fields in `field_ids` order
    #[must_use]
    pub fn instance_fields(&self) -> &[BuilderField] {
        &self.instance_fields
    }

    /// Direct methods in `method_ids` order
    #[must_use]
    pub fn direct_methods(&self) -> &[BuilderMethod] {
        &self.direct_methods
    }

    /// Virtual methods in `method_ids` order
    #[must_use]
    pub fn virtual_methods(&self) -> &[BuilderMethod] {
        &self.virtual_methods
    }

    /// Static then instance fields
    pub fn fields(&self) -> impl Iterator<Item = &BuilderField> {
        self.static_fields.iter().chain(&self.instance_fields)
    }

    /// Direct then virtual methods
    pub fn methods(&self) -> impl Iterator<Item = &BuilderMethod> {
        self.direct_methods.iter().chain(&self.virtual_methods)
    }

    /// Returns `true` if the class declares no member at all (no `class_data_item`)
    #[must_use]
    pub fn has_no_members(&self) -> bool {
        self.fields().next().is_none() && self.methods().next().is_none()
    }

    /// The `static_values` array of this class.
    ///
    /// The array covers the static fields up to and including the last one whose initial
    /// value is present and not the default of its type. Fields inside that prefix without an
    /// explicit value get their type's default. `None` if no static field needs a value.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if a field type has no default value.
    pub fn static_initializers(&self) -> Result<Option<Vec<BuilderEncodedValue>>> {
        let last = self.static_fields.iter().rposition(|field| {
            field
                .initial_value
                .as_ref()
                .is_some_and(|value| !value.is_default())
        });
        let Some(last) = last else {
            return Ok(None);
        };

        self.static_fields[..=last]
            .iter()
            .map(|field| match &field.initial_value {
                Some(value) => Ok(value.clone()),
                None => BuilderEncodedValue::default_for_type(field.reference.ty().as_str()),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Convert back to the model class
    #[must_use]
    pub fn to_immutable(&self) -> ClassDef {
        let mut static_fields: Vec<Field> =
            self.static_fields.iter().map(BuilderField::to_immutable).collect();
        let mut instance_fields: Vec<Field> = self
            .instance_fields
            .iter()
            .map(BuilderField::to_immutable)
            .collect();
        let mut direct_methods: Vec<Method> = self
            .direct_methods
            .iter()
            .map(BuilderMethod::to_immutable)
            .collect();
        let mut virtual_methods: Vec<Method> = self
            .virtual_methods
            .iter()
            .map(BuilderMethod::to_immutable)
            .collect();
        static_fields.sort();
        instance_fields.sort();
        direct_methods.sort();
        virtual_methods.sort();

        ClassDef {
            ty: self.ty.as_str().to_string(),
            access_flags: self.access_flags,
            superclass: self.superclass.as_ref().map(|s| s.as_str().to_string()),
            interfaces: self.interfaces.descriptors(),
            source_file: self.source_file.as_ref().map(|s| s.as_str().to_string()),
            annotations: self.annotations.to_immutable(),
            static_fields,
            instance_fields,
            direct_methods,
            virtual_methods,
        }
    }
}

impl PartialEq for BuilderClassDef {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

impl Eq for BuilderClassDef {}

impl PartialOrd for BuilderClassDef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BuilderClassDef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ty.cmp(&other.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Opcode, Reference},
        DexBuilder,
    };

    #[test]
    fn implementation_reads_back_every_item() {
        let body = MethodImplementation::new(
            1,
            vec![
                Instruction::Format21c {
                    opcode: Opcode::ConstString,
                    register_a: 0,
                    reference: Reference::String("hi".to_string()),
                },
                Instruction::Format10x {
                    opcode: Opcode::ReturnVoid,
                },
            ],
            vec![TryBlock::new(
                0,
                2,
                vec![
                    ExceptionHandler::new("Ljava/lang/Exception;".to_string(), 2),
                    ExceptionHandler::catch_all(2),
                ],
            )],
            vec![
                DebugItem::StartLocal {
                    code_address: 0,
                    register: 0,
                    name: Some("s".to_string()),
                    ty: Some("Ljava/lang/String;".to_string()),
                    signature: None,
                },
                DebugItem::SetSourceFile {
                    code_address: 2,
                    source_file: Some("A.java".to_string()),
                },
                DebugItem::LineNumber {
                    code_address: 2,
                    line_number: 7,
                },
            ],
        );

        let builder = DexBuilder::new();
        let interned = builder.intern_method_implementation(&body).unwrap();
        assert_eq!(interned.code_units(), 3);
        assert_eq!(interned.to_immutable(), body);
    }
}
