//! # dexbuilder Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dexbuilder library. Import this module to get quick access to the model types,
//! the construction session and the section contracts.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dexbuilder operations
pub use crate::Error;

/// The result type used throughout dexbuilder
pub use crate::Result;

// ================================================================================================
// Construction Session
// ================================================================================================

/// The construction session and its configuration
pub use crate::builder::{BuilderConfig, DexBuilder};

/// Lenient mode reporting
pub use crate::builder::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};

/// Phase 1 to phase 2 resolution of code and debug info
pub use crate::builder::ResolveReferences;

/// Canonical builder references
pub use crate::builder::{
    BuilderClassDef, BuilderClassDefRc, BuilderField, BuilderFieldRefRc, BuilderMethod,
    BuilderMethodRefRc, BuilderProtoRc, BuilderReference, BuilderStringRc, BuilderTypeListRc,
    BuilderTypeRc,
};

// ================================================================================================
// Immutable Model
// ================================================================================================

/// Flags and visibilities
pub use crate::model::{AccessFlags, AnnotationVisibility};

/// Definitions
pub use crate::model::{ClassDef, Field, Method, MethodImplementation, MethodParameter};

/// Annotations and encoded values
pub use crate::model::{
    Annotation, AnnotationElement, AnnotationSet, EncodedAnnotation, EncodedValue,
};

/// References
pub use crate::model::{
    FieldReference, MethodProtoReference, MethodReference, Reference, ReferenceKind,
};

/// Code
pub use crate::model::{DebugItem, ExceptionHandler, Format, Instruction, Opcode, TryBlock};

// ================================================================================================
// Section Contracts
// ================================================================================================

/// Traits the binary writer reads the pools through
pub use crate::section::{
    write_debug_item, ClassSection, DebugWriter, IndexSection, OffsetSection,
};
