//! Immutable entity model of a DEX file.
//!
//! The types in this module are plain values: they carry no identity and no session state, and
//! can be cloned and shared freely between threads and construction sessions. They are the
//! input of [`crate::DexBuilder`] (hand-built or produced by a DEX reader) and the output of
//! its read-back operations.
//!
//! # Architecture
//!
//! - [`ClassDef`] owns its [`Field`]s and [`Method`]s, already split into the four member
//!   lists of a `class_data_item` and sorted
//! - [`Method`] optionally owns a [`MethodImplementation`] made of [`Instruction`]s,
//!   [`TryBlock`]s and [`DebugItem`]s
//! - Constant data is expressed as [`EncodedValue`] trees, annotations as [`Annotation`]s
//! - Items referenced from code are described by [`Reference`]
//!
//! Every type with a natural order in the DEX format implements [`Ord`] with that order:
//! strings and type descriptors compare by UTF-16 code units, members by descriptor.
//!
//! # Examples
//!
//! ```rust
//! use dexbuilder::model::{AccessFlags, AnnotationSet, ClassDef, Field};
//!
//! let counter = Field::new("LCounter;", "count", "I", AccessFlags::STATIC.bits(), None, AnnotationSet::new());
//! let class = ClassDef::new(
//!     "LCounter;",
//!     AccessFlags::PUBLIC.bits(),
//!     Some("Ljava/lang/Object;".to_string()),
//!     &[],
//!     Some("Counter.java".to_string()),
//!     AnnotationSet::new(),
//!     vec![counter],
//!     vec![],
//! )?;
//! assert_eq!(class.static_fields.len(), 1);
//! # Ok::<(), dexbuilder::Error>(())
//! ```

mod annotation;
mod class;
mod debug;
mod exceptions;
mod field;
mod flags;
mod instructions;
mod method;
mod reference;
mod types;
mod value;

pub use annotation::{Annotation, AnnotationElement, AnnotationSet, EncodedAnnotation};
pub use class::ClassDef;
pub(crate) use class::dedup_interfaces;
pub use debug::DebugItem;
pub use exceptions::{ExceptionHandler, TryBlock};
pub use field::Field;
pub use flags::{AccessFlags, AnnotationVisibility};
pub use instructions::{Format, Instruction, Opcode, ReferenceKindOf, SwitchElement};
pub use method::{Method, MethodImplementation, MethodParameter};
pub(crate) use reference::cmp_type_lists;
pub use reference::{
    CallSiteReference, FieldReference, MethodHandleKind, MethodHandleMember,
    MethodHandleReference, MethodProtoReference, MethodReference, Reference, ReferenceKind,
};
pub use types::{check_type_descriptor, is_primitive, shorty_char, shorty_for, utf16_cmp};
pub use value::{EncodedValue, ValueType};
