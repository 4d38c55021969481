//! Debug items.
//!
//! [`DebugItem`] is generic over the string (`S`) and type (`T`) payloads of `start-local`
//! and `set-source-file`. Items read from an existing file or authored by hand carry raw
//! `String`s; resolving them against a [`crate::DexBuilder`] produces the same item holding
//! canonical pool references. Resolution is a pure mapping, so it can run any number of times.

/// A debug-info item, stamped with the code address it applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DebugItem<S = String, T = String> {
    /// A local variable comes into scope
    StartLocal {
        /// Code address
        code_address: u32,
        /// Register holding the local
        register: u32,
        /// Variable name
        name: Option<S>,
        /// Variable type
        ty: Option<T>,
        /// Generic signature
        signature: Option<S>,
    },
    /// A local variable goes out of scope
    EndLocal {
        /// Code address
        code_address: u32,
        /// Register holding the local
        register: u32,
    },
    /// A previously ended local is back in scope
    RestartLocal {
        /// Code address
        code_address: u32,
        /// Register holding the local
        register: u32,
    },
    /// End of the method prologue
    PrologueEnd {
        /// Code address
        code_address: u32,
    },
    /// Start of the method epilogue
    EpilogueBegin {
        /// Code address
        code_address: u32,
    },
    /// Following code originates from another source file
    SetSourceFile {
        /// Code address
        code_address: u32,
        /// Source file name, `None` clears it
        source_file: Option<S>,
    },
    /// A line number entry
    LineNumber {
        /// Code address
        code_address: u32,
        /// Source line
        line_number: u32,
    },
}

impl<S, T> DebugItem<S, T> {
    /// Code address this item applies to
    #[must_use]
    pub fn code_address(&self) -> u32 {
        match self {
            DebugItem::StartLocal { code_address, .. }
            | DebugItem::EndLocal { code_address, .. }
            | DebugItem::RestartLocal { code_address, .. }
            | DebugItem::PrologueEnd { code_address }
            | DebugItem::EpilogueBegin { code_address }
            | DebugItem::SetSourceFile { code_address, .. }
            | DebugItem::LineNumber { code_address, .. } => *code_address,
        }
    }

    /// Rebuild the item with string payloads mapped through `strings` and type payloads
    /// mapped through `types`
    ///
    /// # Errors
    /// Propagates the first error returned by either mapping.
    pub fn map_references<S2, T2, E, FS, FT>(
        &self,
        mut strings: FS,
        mut types: FT,
    ) -> Result<DebugItem<S2, T2>, E>
    where
        FS: FnMut(&S) -> Result<S2, E>,
        FT: FnMut(&T) -> Result<T2, E>,
    {
        Ok(match self {
            DebugItem::StartLocal {
                code_address,
                register,
                name,
                ty,
                signature,
            } => DebugItem::StartLocal {
                code_address: *code_address,
                register: *register,
                name: name.as_ref().map(&mut strings).transpose()?,
                ty: ty.as_ref().map(&mut types).transpose()?,
                signature: signature.as_ref().map(&mut strings).transpose()?,
            },
            DebugItem::EndLocal {
                code_address,
                register,
            } => DebugItem::EndLocal {
                code_address: *code_address,
                register: *register,
            },
            DebugItem::RestartLocal {
                code_address,
                register,
            } => DebugItem::RestartLocal {
                code_address: *code_address,
                register: *register,
            },
            DebugItem::PrologueEnd { code_address } => DebugItem::PrologueEnd {
                code_address: *code_address,
            },
            DebugItem::EpilogueBegin { code_address } => DebugItem::EpilogueBegin {
                code_address: *code_address,
            },
            DebugItem::SetSourceFile {
                code_address,
                source_file,
            } => DebugItem::SetSourceFile {
                code_address: *code_address,
                source_file: source_file.as_ref().map(&mut strings).transpose()?,
            },
            DebugItem::LineNumber {
                code_address,
                line_number,
            } => DebugItem::LineNumber {
                code_address: *code_address,
                line_number: *line_number,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_references_touches_only_payloads() {
        let item: DebugItem = DebugItem::StartLocal {
            code_address: 4,
            register: 1,
            name: Some("count".into()),
            ty: Some("I".into()),
            signature: None,
        };
        let mapped: DebugItem<usize, char> = item
            .map_references(
                |s| Ok::<_, crate::Error>(s.len()),
                |t| Ok(t.chars().next().unwrap_or('?')),
            )
            .unwrap();

        assert_eq!(
            mapped,
            DebugItem::StartLocal {
                code_address: 4,
                register: 1,
                name: Some(5),
                ty: Some('I'),
                signature: None,
            }
        );
        assert_eq!(mapped.code_address(), 4);
    }
}
