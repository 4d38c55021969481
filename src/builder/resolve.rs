//! Two-phase reference resolution.
//!
//! Instructions, debug items and try blocks exist in two phases. Phase 1 values hold raw
//! strings and [`Reference`]s; they are what a DEX reader produces or what a caller writes by
//! hand, before any session exists. Phase 2 values hold canonical pool entries of one
//! [`DexBuilder`]. [`ResolveReferences`] is the pass from phase 1 to phase 2.
//!
//! Resolution never mutates its input. Resolving the same value twice against the same
//! builder yields the same pool entries and adds nothing to the pools; resolving a phase 2
//! value again rebinds it to the given builder.

use crate::{
    builder::{
        class::{BuilderDebugItem, BuilderInstruction, BuilderTryBlock},
        DexBuilder,
    },
    model::{DebugItem, Instruction, Reference, TryBlock},
    Result,
};

/// Resolve the references a value holds against the pools of a [`DexBuilder`]
pub trait ResolveReferences {
    /// The value with every reference replaced by a canonical pool entry
    type Resolved;

    /// Intern every reference held by `self` and return the resolved value.
    ///
    /// # Errors
    /// Propagates interning errors, such as malformed descriptors or
    /// [`crate::Error::UnsupportedReferenceKind`].
    fn resolve_references(&self, builder: &DexBuilder) -> Result<Self::Resolved>;
}

impl ResolveReferences for DebugItem {
    type Resolved = BuilderDebugItem;

    fn resolve_references(&self, builder: &DexBuilder) -> Result<BuilderDebugItem> {
        self.map_references(|s| Ok(builder.intern_string(s)), |t| builder.intern_type(t))
    }
}

impl ResolveReferences for BuilderDebugItem {
    type Resolved = BuilderDebugItem;

    fn resolve_references(&self, builder: &DexBuilder) -> Result<BuilderDebugItem> {
        self.map_references(
            |s| Ok(builder.intern_string(s.as_str())),
            |t| builder.intern_type(t.as_str()),
        )
    }
}

impl ResolveReferences for Instruction<Reference> {
    type Resolved = BuilderInstruction;

    fn resolve_references(&self, builder: &DexBuilder) -> Result<BuilderInstruction> {
        self.map_references(|r| builder.intern_reference(r))
    }
}

impl ResolveReferences for BuilderInstruction {
    type Resolved = BuilderInstruction;

    fn resolve_references(&self, builder: &DexBuilder) -> Result<BuilderInstruction> {
        self.map_references(|r| builder.intern_reference(&r.to_immutable()))
    }
}

impl ResolveReferences for TryBlock {
    type Resolved = BuilderTryBlock;

    fn resolve_references(&self, builder: &DexBuilder) -> Result<BuilderTryBlock> {
        self.map_types(|t| builder.intern_type(t))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        builder::refs::BuilderReference,
        model::{ExceptionHandler, MethodReference, Opcode},
    };

    #[test]
    fn debug_item_resolution_is_idempotent() {
        let builder = DexBuilder::new();
        let raw: DebugItem = DebugItem::StartLocal {
            code_address: 0,
            register: 2,
            name: Some("it".into()),
            ty: Some("Ljava/util/Iterator;".into()),
            signature: Some("Ljava/util/Iterator<TT;>;".into()),
        };

        let first = raw.resolve_references(&builder).unwrap();
        let strings = builder.strings().len();
        let types = builder.types().len();
        let second = raw.resolve_references(&builder).unwrap();
        let again = first.resolve_references(&builder).unwrap();

        for resolved in [&second, &again] {
            match (&first, resolved) {
                (
                    DebugItem::StartLocal { name: a, ty: ta, .. },
                    DebugItem::StartLocal { name: b, ty: tb, .. },
                ) => {
                    assert!(Arc::ptr_eq(a.as_ref().unwrap(), b.as_ref().unwrap()));
                    assert!(Arc::ptr_eq(ta.as_ref().unwrap(), tb.as_ref().unwrap()));
                }
                _ => panic!("variant changed during resolution"),
            }
        }
        assert_eq!(builder.strings().len(), strings);
        assert_eq!(builder.types().len(), types);
    }

    #[test]
    fn set_source_file_resolves_to_pool_string() {
        let builder = DexBuilder::new();
        let raw: DebugItem = DebugItem::SetSourceFile {
            code_address: 6,
            source_file: Some("Gen.java".into()),
        };

        match raw.resolve_references(&builder).unwrap() {
            DebugItem::SetSourceFile {
                code_address,
                source_file,
            } => {
                assert_eq!(code_address, 6);
                assert!(Arc::ptr_eq(
                    &source_file.unwrap(),
                    &builder.intern_string("Gen.java")
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn instruction_resolution_shares_method_ref() {
        let builder = DexBuilder::new();
        let target = MethodReference::new("Ljava/io/PrintStream;", "println", vec!["I".into()], "V");
        let raw: Instruction = Instruction::Format35c {
            opcode: Opcode::InvokeVirtual,
            registers: vec![0, 1],
            reference: Reference::Method(target.clone()),
        };

        let resolved = raw.resolve_references(&builder).unwrap();
        let expected = builder.intern_method_reference(&target).unwrap();
        match resolved.reference() {
            Some(BuilderReference::Method(m)) => assert!(Arc::ptr_eq(m, &expected)),
            other => panic!("unexpected {other:?}"),
        }

        let methods = builder.methods().len();
        let again = resolved.resolve_references(&builder).unwrap();
        assert!(again.reference().unwrap().ptr_eq(resolved.reference().unwrap()));
        assert_eq!(builder.methods().len(), methods);
    }

    #[test]
    fn try_block_catch_all_survives() {
        let builder = DexBuilder::new();
        let block = TryBlock::new(
            0,
            4,
            vec![
                ExceptionHandler::new("Ljava/lang/Exception;".to_string(), 8),
                ExceptionHandler::catch_all(12),
            ],
        );

        let resolved = block.resolve_references(&builder).unwrap();
        assert_eq!(
            resolved.handlers[0].exception_type.as_ref().unwrap().as_str(),
            "Ljava/lang/Exception;"
        );
        assert!(resolved.handlers[1].exception_type.is_none());
    }
}
