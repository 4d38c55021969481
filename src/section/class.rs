//! The `class_defs` section.

use crate::{
    builder::{
        pool::{ClassPool, ClassSlot, MethodSlot},
        BuilderAnnotationSetRc, BuilderClassDef, BuilderClassDefRc, BuilderDebugItem,
        BuilderEncodedValue, BuilderExceptionHandler, BuilderField, BuilderMethod,
        BuilderMethodImplementation, BuilderStringRc, BuilderTypeListRc, BuilderTypeRc,
    },
    Result,
};

/// Everything the writer reads from classes and their members.
///
/// Optional data is reported as `None` when the writer must omit it: an empty interface list,
/// an empty annotation set, parameter annotations when no parameter is annotated, and static
/// values when no static field needs a value.
pub trait ClassSection {
    /// All classes in `type_ids` order. Reading this seals the class pool.
    fn sorted_classes(&self) -> &[BuilderClassDefRc];

    /// Superclass, `None` for `java.lang.Object`-like roots
    fn superclass<'a>(&self, class: &'a BuilderClassDef) -> Option<&'a BuilderTypeRc>;

    /// Implemented interfaces, `None` when there are none
    fn interfaces<'a>(&self, class: &'a BuilderClassDef) -> Option<&'a BuilderTypeListRc>;

    /// Source file name
    fn source_file<'a>(&self, class: &'a BuilderClassDef) -> Option<&'a BuilderStringRc>;

    /// The `static_values` array
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if a field type has no default value.
    fn static_initializers(
        &self,
        class: &BuilderClassDef,
    ) -> Result<Option<Vec<BuilderEncodedValue>>>;

    /// Static fields in `field_ids` order
    fn sorted_static_fields<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderField];

    /// Instance fields in `field_ids` order
    fn sorted_instance_fields<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderField];

    /// Direct methods in `method_ids` order
    fn sorted_direct_methods<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderMethod];

    /// Virtual methods in `method_ids` order
    fn sorted_virtual_methods<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderMethod];

    /// Returns `true` if the class needs a `class_data_item`
    fn has_class_data(&self, class: &BuilderClassDef) -> bool;

    /// Raw access flags of a field
    fn field_access_flags(&self, field: &BuilderField) -> u32;

    /// Raw access flags of a method
    fn method_access_flags(&self, method: &BuilderMethod) -> u32;

    /// Class annotations, `None` when empty
    fn class_annotations<'a>(&self, class: &'a BuilderClassDef)
        -> Option<&'a BuilderAnnotationSetRc>;

    /// Field annotations, `None` when empty
    fn field_annotations<'a>(&self, field: &'a BuilderField) -> Option<&'a BuilderAnnotationSetRc>;

    /// Method annotations, `None` when empty
    fn method_annotations<'a>(
        &self,
        method: &'a BuilderMethod,
    ) -> Option<&'a BuilderAnnotationSetRc>;

    /// Per-parameter annotation sets, `None` when no parameter is annotated
    fn parameter_annotations(&self, method: &BuilderMethod) -> Option<Vec<BuilderAnnotationSetRc>>;

    /// Returns `true` if the class or any member carries annotations, i.e. the class needs an
    /// `annotations_directory_item`
    fn has_annotations(&self, class: &BuilderClassDef) -> bool;

    /// Parameter debug names in declaration order
    fn parameter_names<'a>(&self, method: &'a BuilderMethod) -> Vec<Option<&'a BuilderStringRc>>;

    /// Method body, `None` for abstract and native methods
    fn code_item<'a>(&self, method: &'a BuilderMethod) -> Option<&'a BuilderMethodImplementation>;

    /// Debug items of a method, empty without a body
    fn debug_items<'a>(&self, method: &'a BuilderMethod) -> &'a [BuilderDebugItem];

    /// Caught type of a handler, `None` for catch-all
    fn exception_type<'a>(&self, handler: &'a BuilderExceptionHandler)
        -> Option<&'a BuilderTypeRc>;

    /// Position in `class_defs`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    fn class_index(&self, class: &BuilderClassDef) -> Result<u32>;

    /// Record the position in `class_defs`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_class_index(&self, class: &BuilderClassDef, index: u32) -> Result<()>;

    /// Offset of the `annotations_directory_item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    fn annotation_directory_offset(&self, class: &BuilderClassDef) -> Result<u32>;

    /// Record the offset of the `annotations_directory_item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_annotation_directory_offset(&self, class: &BuilderClassDef, offset: u32) -> Result<()>;

    /// Offset of the `static_values` array
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    fn static_values_offset(&self, class: &BuilderClassDef) -> Result<u32>;

    /// Record the offset of the `static_values` array
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_static_values_offset(&self, class: &BuilderClassDef, offset: u32) -> Result<()>;

    /// Offset of the `class_data_item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    fn class_data_offset(&self, class: &BuilderClassDef) -> Result<u32>;

    /// Record the offset of the `class_data_item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_class_data_offset(&self, class: &BuilderClassDef, offset: u32) -> Result<()>;

    /// Offset of the `code_item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    fn code_item_offset(&self, method: &BuilderMethod) -> Result<u32>;

    /// Record the offset of the `code_item`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_code_item_offset(&self, method: &BuilderMethod, offset: u32) -> Result<()>;

    /// Offset of the parameter `annotation_set_ref_list`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexNotAssigned`] before assignment.
    fn parameter_annotations_offset(&self, method: &BuilderMethod) -> Result<u32>;

    /// Record the offset of the parameter `annotation_set_ref_list`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexAlreadyAssigned`] on a second assignment.
    fn set_parameter_annotations_offset(&self, method: &BuilderMethod, offset: u32) -> Result<()>;
}

fn non_empty(set: &BuilderAnnotationSetRc) -> Option<&BuilderAnnotationSetRc> {
    (!set.is_empty()).then_some(set)
}

impl ClassSection for ClassPool {
    fn sorted_classes(&self) -> &[BuilderClassDefRc] {
        self.sorted()
    }

    fn superclass<'a>(&self, class: &'a BuilderClassDef) -> Option<&'a BuilderTypeRc> {
        class.superclass()
    }

    fn interfaces<'a>(&self, class: &'a BuilderClassDef) -> Option<&'a BuilderTypeListRc> {
        let interfaces = class.interfaces();
        (!interfaces.is_empty()).then_some(interfaces)
    }

    fn source_file<'a>(&self, class: &'a BuilderClassDef) -> Option<&'a BuilderStringRc> {
        class.source_file()
    }

    fn static_initializers(
        &self,
        class: &BuilderClassDef,
    ) -> Result<Option<Vec<BuilderEncodedValue>>> {
        class.static_initializers()
    }

    fn sorted_static_fields<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderField] {
        class.static_fields()
    }

    fn sorted_instance_fields<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderField] {
        class.instance_fields()
    }

    fn sorted_direct_methods<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderMethod] {
        class.direct_methods()
    }

    fn sorted_virtual_methods<'a>(&self, class: &'a BuilderClassDef) -> &'a [BuilderMethod] {
        class.virtual_methods()
    }

    fn has_class_data(&self, class: &BuilderClassDef) -> bool {
        !class.has_no_members()
    }

    fn field_access_flags(&self, field: &BuilderField) -> u32 {
        field.access_flags()
    }

    fn method_access_flags(&self, method: &BuilderMethod) -> u32 {
        method.access_flags()
    }

    fn class_annotations<'a>(
        &self,
        class: &'a BuilderClassDef,
    ) -> Option<&'a BuilderAnnotationSetRc> {
        non_empty(class.annotations())
    }

    fn field_annotations<'a>(&self, field: &'a BuilderField) -> Option<&'a BuilderAnnotationSetRc> {
        non_empty(field.annotations())
    }

    fn method_annotations<'a>(
        &self,
        method: &'a BuilderMethod,
    ) -> Option<&'a BuilderAnnotationSetRc> {
        non_empty(method.annotations())
    }

    fn parameter_annotations(&self, method: &BuilderMethod) -> Option<Vec<BuilderAnnotationSetRc>> {
        method.parameter_annotations()
    }

    fn has_annotations(&self, class: &BuilderClassDef) -> bool {
        !class.annotations().is_empty()
            || class.fields().any(|f| !f.annotations().is_empty())
            || class.methods().any(|m| {
                !m.annotations().is_empty() || m.parameter_annotations().is_some()
            })
    }

    fn parameter_names<'a>(&self, method: &'a BuilderMethod) -> Vec<Option<&'a BuilderStringRc>> {
        method.parameters().iter().map(|p| p.name.as_ref()).collect()
    }

    fn code_item<'a>(&self, method: &'a BuilderMethod) -> Option<&'a BuilderMethodImplementation> {
        method.implementation()
    }

    fn debug_items<'a>(&self, method: &'a BuilderMethod) -> &'a [BuilderDebugItem] {
        method
            .implementation()
            .map(|body| body.debug_items.as_slice())
            .unwrap_or_default()
    }

    fn exception_type<'a>(
        &self,
        handler: &'a BuilderExceptionHandler,
    ) -> Option<&'a BuilderTypeRc> {
        handler.exception_type.as_ref()
    }

    fn class_index(&self, class: &BuilderClassDef) -> Result<u32> {
        self.slot(class, ClassSlot::Index)
    }

    fn set_class_index(&self, class: &BuilderClassDef, index: u32) -> Result<()> {
        self.set_slot(class, ClassSlot::Index, index)
    }

    fn annotation_directory_offset(&self, class: &BuilderClassDef) -> Result<u32> {
        self.slot(class, ClassSlot::AnnotationDirectoryOffset)
    }

    fn set_annotation_directory_offset(&self, class: &BuilderClassDef, offset: u32) -> Result<()> {
        self.set_slot(class, ClassSlot::AnnotationDirectoryOffset, offset)
    }

    fn static_values_offset(&self, class: &BuilderClassDef) -> Result<u32> {
        self.slot(class, ClassSlot::StaticValuesOffset)
    }

    fn set_static_values_offset(&self, class: &BuilderClassDef, offset: u32) -> Result<()> {
        self.set_slot(class, ClassSlot::StaticValuesOffset, offset)
    }

    fn class_data_offset(&self, class: &BuilderClassDef) -> Result<u32> {
        self.slot(class, ClassSlot::ClassDataOffset)
    }

    fn set_class_data_offset(&self, class: &BuilderClassDef, offset: u32) -> Result<()> {
        self.set_slot(class, ClassSlot::ClassDataOffset, offset)
    }

    fn code_item_offset(&self, method: &BuilderMethod) -> Result<u32> {
        self.method_slot(method, MethodSlot::CodeItemOffset)
    }

    fn set_code_item_offset(&self, method: &BuilderMethod, offset: u32) -> Result<()> {
        self.set_method_slot(method, MethodSlot::CodeItemOffset, offset)
    }

    fn parameter_annotations_offset(&self, method: &BuilderMethod) -> Result<u32> {
        self.method_slot(method, MethodSlot::ParameterAnnotationsOffset)
    }

    fn set_parameter_annotations_offset(&self, method: &BuilderMethod, offset: u32) -> Result<()> {
        self.set_method_slot(method, MethodSlot::ParameterAnnotationsOffset, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            AccessFlags, Annotation, AnnotationSet, AnnotationVisibility, ClassDef, EncodedValue,
            Field, Method, MethodParameter,
        },
        DexBuilder, Error,
    };

    fn annotated() -> AnnotationSet {
        let mut set = AnnotationSet::new();
        set.insert(Annotation::new(AnnotationVisibility::Runtime, "LNonNull;", []).unwrap());
        set
    }

    #[test]
    fn optional_data_omitted() {
        let builder = DexBuilder::new();
        let class = ClassDef::new(
            "LPlain;",
            0,
            Some("Ljava/lang/Object;".into()),
            &[],
            None,
            AnnotationSet::new(),
            vec![],
            vec![Method::new(
                "LPlain;",
                "m",
                vec![MethodParameter::new("I")],
                "V",
                AccessFlags::ABSTRACT.bits(),
                AnnotationSet::new(),
                None,
            )],
        )
        .unwrap();
        let class = builder.intern_class_def(&class).unwrap();
        let section = builder.classes();

        assert!(section.interfaces(&class).is_none());
        assert!(section.class_annotations(&class).is_none());
        assert!(!section.has_annotations(&class));
        assert!(section.has_class_data(&class));
        assert!(section.static_initializers(&class).unwrap().is_none());

        let method = &section.sorted_virtual_methods(&class)[0];
        assert!(section.parameter_annotations(method).is_none());
        assert!(section.code_item(method).is_none());
        assert!(section.debug_items(method).is_empty());
    }

    #[test]
    fn parameter_annotations_present_if_any_parameter_annotated() {
        let builder = DexBuilder::new();
        let method = Method::new(
            "LA;",
            "m",
            vec![
                MethodParameter::new("I"),
                MethodParameter::new("Ljava/lang/String;").with_annotations(annotated()),
            ],
            "V",
            AccessFlags::ABSTRACT.bits(),
            AnnotationSet::new(),
            None,
        );
        let class = ClassDef::new("LA;", 0, None, &[], None, AnnotationSet::new(), vec![], vec![method])
            .unwrap();
        let class = builder.intern_class_def(&class).unwrap();
        let section = builder.classes();

        let method = &section.sorted_virtual_methods(&class)[0];
        let sets = section.parameter_annotations(method).unwrap();
        assert_eq!(sets.len(), 2);
        assert!(sets[0].is_empty());
        assert!(!sets[1].is_empty());
        assert!(section.has_annotations(&class));
    }

    #[test]
    fn class_slots_write_once() {
        let builder = DexBuilder::new();
        let field = Field::new(
            "LA;",
            "f",
            "I",
            AccessFlags::STATIC.bits(),
            Some(EncodedValue::Int(1)),
            annotated(),
        );
        let class = ClassDef::new("LA;", 0, None, &[], None, AnnotationSet::new(), vec![field], vec![])
            .unwrap();
        builder.intern_class_def(&class).unwrap();

        let section = builder.classes();
        let class = &section.sorted_classes()[0];
        assert!(matches!(
            section.static_values_offset(class),
            Err(Error::IndexNotAssigned)
        ));
        section.set_class_index(class, 0).unwrap();
        section.set_static_values_offset(class, 0x200).unwrap();
        section.set_annotation_directory_offset(class, 0x300).unwrap();
        assert_eq!(section.class_index(class).unwrap(), 0);
        assert_eq!(section.static_values_offset(class).unwrap(), 0x200);
        assert_eq!(section.annotation_directory_offset(class).unwrap(), 0x300);
        assert!(matches!(
            section.set_static_values_offset(class, 0x204),
            Err(Error::IndexAlreadyAssigned)
        ));

        let field = &section.sorted_static_fields(class)[0];
        assert!(section.field_annotations(field).is_some());
        assert_eq!(section.field_access_flags(field), AccessFlags::STATIC.bits());
    }
}
