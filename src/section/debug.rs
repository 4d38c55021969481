//! Debug item dispatch.

use crate::{
    builder::{BuilderDebugItem, BuilderStringRc, BuilderTypeRc},
    model::DebugItem,
    Result,
};

/// Per-kind emitter for the `debug_info_item` state machine.
///
/// Each method receives the absolute code address of the item; turning addresses into
/// `DBG_ADVANCE_PC` deltas is the writer's job.
pub trait DebugWriter {
    /// `DBG_START_LOCAL` or `DBG_START_LOCAL_EXTENDED` when a signature is present
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_start_local(
        &mut self,
        code_address: u32,
        register: u32,
        name: Option<&BuilderStringRc>,
        ty: Option<&BuilderTypeRc>,
        signature: Option<&BuilderStringRc>,
    ) -> Result<()>;

    /// `DBG_END_LOCAL`
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_end_local(&mut self, code_address: u32, register: u32) -> Result<()>;

    /// `DBG_RESTART_LOCAL`
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_restart_local(&mut self, code_address: u32, register: u32) -> Result<()>;

    /// `DBG_SET_PROLOGUE_END`
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_prologue_end(&mut self, code_address: u32) -> Result<()>;

    /// `DBG_SET_EPILOGUE_BEGIN`
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_epilogue_begin(&mut self, code_address: u32) -> Result<()>;

    /// `DBG_SET_FILE`
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_set_source_file(
        &mut self,
        code_address: u32,
        source_file: Option<&BuilderStringRc>,
    ) -> Result<()>;

    /// A special opcode or `DBG_ADVANCE_LINE` sequence
    ///
    /// # Errors
    /// Propagates writer failures.
    fn write_line_number(&mut self, code_address: u32, line_number: u32) -> Result<()>;
}

/// Forward one debug item to the matching [`DebugWriter`] method.
///
/// # Errors
/// Propagates the error of the writer method.
pub fn write_debug_item<W: DebugWriter + ?Sized>(
    writer: &mut W,
    item: &BuilderDebugItem,
) -> Result<()> {
    match item {
        DebugItem::StartLocal {
            code_address,
            register,
            name,
            ty,
            signature,
        } => writer.write_start_local(
            *code_address,
            *register,
            name.as_ref(),
            ty.as_ref(),
            signature.as_ref(),
        ),
        DebugItem::EndLocal {
            code_address,
            register,
        } => writer.write_end_local(*code_address, *register),
        DebugItem::RestartLocal {
            code_address,
            register,
        } => writer.write_restart_local(*code_address, *register),
        DebugItem::PrologueEnd { code_address } => writer.write_prologue_end(*code_address),
        DebugItem::EpilogueBegin { code_address } => writer.write_epilogue_begin(*code_address),
        DebugItem::SetSourceFile {
            code_address,
            source_file,
        } => writer.write_set_source_file(*code_address, source_file.as_ref()),
        DebugItem::LineNumber {
            code_address,
            line_number,
        } => writer.write_line_number(*code_address, *line_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::ResolveReferences, DexBuilder};

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl DebugWriter for Trace {
        fn write_start_local(
            &mut self,
            code_address: u32,
            register: u32,
            name: Option<&BuilderStringRc>,
            ty: Option<&BuilderTypeRc>,
            _signature: Option<&BuilderStringRc>,
        ) -> Result<()> {
            self.0.push(format!(
                "start {code_address} v{register} {} {}",
                name.map_or("-", |n| n.as_str()),
                ty.map_or("-", |t| t.as_str())
            ));
            Ok(())
        }

        fn write_end_local(&mut self, code_address: u32, register: u32) -> Result<()> {
            self.0.push(format!("end {code_address} v{register}"));
            Ok(())
        }

        fn write_restart_local(&mut self, code_address: u32, register: u32) -> Result<()> {
            self.0.push(format!("restart {code_address} v{register}"));
            Ok(())
        }

        fn write_prologue_end(&mut self, code_address: u32) -> Result<()> {
            self.0.push(format!("prologue {code_address}"));
            Ok(())
        }

        fn write_epilogue_begin(&mut self, code_address: u32) -> Result<()> {
            self.0.push(format!("epilogue {code_address}"));
            Ok(())
        }

        fn write_set_source_file(
            &mut self,
            code_address: u32,
            source_file: Option<&BuilderStringRc>,
        ) -> Result<()> {
            self.0.push(format!(
                "file {code_address} {}",
                source_file.map_or("-", |s| s.as_str())
            ));
            Ok(())
        }

        fn write_line_number(&mut self, code_address: u32, line_number: u32) -> Result<()> {
            self.0.push(format!("line {code_address} {line_number}"));
            Ok(())
        }
    }

    #[test]
    fn dispatch_by_kind() {
        let builder = DexBuilder::new();
        let items: Vec<DebugItem> = vec![
            DebugItem::PrologueEnd { code_address: 0 },
            DebugItem::LineNumber {
                code_address: 0,
                line_number: 7,
            },
            DebugItem::StartLocal {
                code_address: 2,
                register: 1,
                name: Some("count".into()),
                ty: Some("I".into()),
                signature: None,
            },
            DebugItem::EndLocal {
                code_address: 4,
                register: 1,
            },
            DebugItem::RestartLocal {
                code_address: 5,
                register: 1,
            },
            DebugItem::SetSourceFile {
                code_address: 6,
                source_file: None,
            },
            DebugItem::EpilogueBegin { code_address: 8 },
        ];

        let mut trace = Trace::default();
        for item in &items {
            let resolved = item.resolve_references(&builder).unwrap();
            write_debug_item(&mut trace, &resolved).unwrap();
        }

        assert_eq!(
            trace.0,
            vec![
                "prologue 0",
                "line 0 7",
                "start 2 v1 count I",
                "end 4 v1",
                "restart 5 v1",
                "file 6 -",
                "epilogue 8",
            ]
        );
    }
}
