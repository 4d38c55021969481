//! Method definitions, parameters and implementations.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use crate::model::{
    annotation::AnnotationSet,
    debug::DebugItem,
    exceptions::TryBlock,
    flags::AccessFlags,
    instructions::Instruction,
    reference::{cmp_type_lists, MethodReference},
    types::utf16_cmp,
};

/// A declared method parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodParameter {
    /// Parameter type descriptor
    pub ty: String,
    /// Debug name, if known
    pub name: Option<String>,
    /// Annotations attached to the parameter
    pub annotations: AnnotationSet,
}

impl MethodParameter {
    /// Create a parameter with no name and no annotations
    pub fn new(ty: impl Into<String>) -> Self {
        MethodParameter {
            ty: ty.into(),
            name: None,
            annotations: AnnotationSet::new(),
        }
    }

    /// Set the debug name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the annotations
    #[must_use]
    pub fn with_annotations(mut self, annotations: AnnotationSet) -> Self {
        self.annotations = annotations;
        self
    }
}

/// The body of a concrete method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodImplementation {
    /// Number of registers used by the method
    pub register_count: u16,
    /// Instructions in code order
    pub instructions: Vec<Instruction>,
    /// Try blocks in address order
    pub try_blocks: Vec<TryBlock>,
    /// Debug items in address order
    pub debug_items: Vec<DebugItem>,
}

impl MethodImplementation {
    /// Create a new implementation
    pub fn new(
        register_count: u16,
        instructions: Vec<Instruction>,
        try_blocks: Vec<TryBlock>,
        debug_items: Vec<DebugItem>,
    ) -> Self {
        MethodImplementation {
            register_count,
            instructions,
            try_blocks,
            debug_items,
        }
    }

    /// Size of the instruction stream in code units
    #[must_use]
    pub fn code_units(&self) -> usize {
        self.instructions.iter().map(Instruction::code_units).sum()
    }
}

/// A method declared by a class.
///
/// Like [`crate::model::Field`], identity is the descriptor: defining class, name, parameter
/// types and return type.
#[derive(Debug, Clone)]
pub struct Method {
    /// Descriptor of the declaring class
    pub defining_class: String,
    /// Method name
    pub name: String,
    /// Parameters in declaration order
    pub parameters: Vec<MethodParameter>,
    /// Return type descriptor
    pub return_type: String,
    /// Raw `access_flags`
    pub access_flags: u32,
    /// Annotations attached to the method
    pub annotations: AnnotationSet,
    /// Body, absent for abstract and native methods
    pub implementation: Option<MethodImplementation>,
}

impl Method {
    /// Create a new method
    pub fn new(
        defining_class: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<MethodParameter>,
        return_type: impl Into<String>,
        access_flags: u32,
        annotations: AnnotationSet,
        implementation: Option<MethodImplementation>,
    ) -> Self {
        Method {
            defining_class: defining_class.into(),
            name: name.into(),
            parameters,
            return_type: return_type.into(),
            access_flags,
            annotations,
            implementation,
        }
    }

    /// Typed view of `access_flags`
    #[must_use]
    pub fn flags(&self) -> AccessFlags {
        AccessFlags::from_bits_retain(self.access_flags)
    }

    /// Returns `true` if the method goes into `direct_methods`
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.flags().is_direct_method()
    }

    /// Parameter type descriptors
    pub fn parameter_types(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.ty.as_str())
    }

    /// The reference identifying this method
    #[must_use]
    pub fn reference(&self) -> MethodReference {
        MethodReference::new(
            &self.defining_class,
            &self.name,
            self.parameter_types().map(str::to_string).collect(),
            &self.return_type,
        )
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defining_class.hash(state);
        self.name.hash(state);
        for ty in self.parameter_types() {
            ty.hash(state);
        }
        self.return_type.hash(state);
    }
}

impl Ord for Method {
    fn cmp(&self, other: &Self) -> Ordering {
        let left: Vec<&str> = self.parameter_types().collect();
        let right: Vec<&str> = other.parameter_types().collect();

        utf16_cmp(&self.defining_class, &other.defining_class)
            .then_with(|| utf16_cmp(&self.name, &other.name))
            .then_with(|| utf16_cmp(&self.return_type, &other.return_type))
            .then_with(|| cmp_type_lists(&left, &right))
    }
}

impl PartialOrd for Method {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::instructions::Opcode;

    fn method(name: &str, params: &[&str], ret: &str) -> Method {
        Method::new(
            "LA;",
            name,
            params.iter().map(|p| MethodParameter::new(*p)).collect(),
            ret,
            0,
            AnnotationSet::new(),
            None,
        )
    }

    #[test]
    fn order_is_name_then_signature() {
        let mut methods = vec![
            method("b", &[], "V"),
            method("a", &["J"], "V"),
            method("a", &["I"], "V"),
            method("a", &["I"], "I"),
            method("a", &[], "V"),
        ];
        methods.sort();

        let rendered: Vec<String> = methods.iter().map(|m| m.reference().to_string()).collect();
        assert_eq!(
            rendered,
            vec!["LA;->a(I)I", "LA;->a()V", "LA;->a(I)V", "LA;->a(J)V", "LA;->b()V"]
        );
    }

    #[test]
    fn parameter_names_do_not_affect_identity() {
        let named = Method::new(
            "LA;",
            "m",
            vec![MethodParameter::new("I").with_name("count")],
            "V",
            0,
            AnnotationSet::new(),
            None,
        );
        assert_eq!(named, method("m", &["I"], "V"));
    }

    #[test]
    fn implementation_code_units() {
        let body = MethodImplementation::new(
            1,
            vec![
                Instruction::Format11n {
                    opcode: Opcode::Const4,
                    register_a: 0,
                    literal: 1,
                },
                Instruction::Format10x {
                    opcode: Opcode::ReturnVoid,
                },
            ],
            vec![],
            vec![],
        );
        assert_eq!(body.code_units(), 2);
    }
}
