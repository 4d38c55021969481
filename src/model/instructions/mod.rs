//! Dalvik instructions.
//!
//! [`Instruction`] is a tagged union over the instruction formats. Each variant carries the
//! opcode plus exactly the operands its format encodes. The enum is generic over the type of
//! the referenced item: the immutable model uses [`Reference`] (full textual keys), while a
//! construction session maps the same instruction onto canonical pool entries with
//! [`Instruction::map_references`].
//!
//! # Key Components
//!
//! - [`Instruction`] - The instruction union
//! - [`Opcode`] - Opcode table with formats, reference kinds and API levels
//! - [`Format`] - Encoding formats and their code-unit sizes
//! - [`SwitchElement`] - One `key -> target` entry of a sparse switch payload
//!
//! # Examples
//!
//! ```rust
//! use dexbuilder::model::{Instruction, Opcode, Reference};
//!
//! let insn: Instruction = Instruction::Format21c {
//!     opcode: Opcode::ConstString,
//!     register_a: 0,
//!     reference: Reference::String("hello".to_string()),
//! };
//! insn.validate()?;
//! assert_eq!(insn.code_units(), 2);
//! # Ok::<(), dexbuilder::Error>(())
//! ```

mod format;
mod opcode;

pub use format::Format;
pub use opcode::Opcode;

use crate::{
    model::reference::{Reference, ReferenceKind},
    Result,
};

/// Access to the kind of a reference operand, used to validate it against the opcode table
pub trait ReferenceKindOf {
    /// Kind of the referenced item
    fn reference_kind(&self) -> ReferenceKind;
}

impl ReferenceKindOf for Reference {
    fn reference_kind(&self) -> ReferenceKind {
        self.kind()
    }
}

/// One entry of a sparse switch payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchElement {
    /// Matched key
    pub key: i32,
    /// Branch target, relative to the switch instruction
    pub offset: i32,
}

/// A Dalvik instruction, generic over its reference operand type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction<R = Reference> {
    /// `op +AA`
    Format10t {
        /// Opcode
        opcode: Opcode,
        /// Signed branch offset in code units
        code_offset: i32,
    },
    /// `op`
    Format10x {
        /// Opcode
        opcode: Opcode,
    },
    /// `op vA, #+B`
    Format11n {
        /// Opcode
        opcode: Opcode,
        /// Destination register (4 bit)
        register_a: u8,
        /// Signed 4-bit literal
        literal: i32,
    },
    /// `op vAA`
    Format11x {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
    },
    /// `op vA, vB`
    Format12x {
        /// Opcode
        opcode: Opcode,
        /// First register (4 bit)
        register_a: u8,
        /// Second register (4 bit)
        register_b: u8,
    },
    /// `op AA, kind@BBBB`
    Format20bc {
        /// Opcode
        opcode: Opcode,
        /// Verification error kind
        verification_error: u8,
        /// Item the verification error refers to
        reference: R,
    },
    /// `op +AAAA`
    Format20t {
        /// Opcode
        opcode: Opcode,
        /// Signed branch offset in code units
        code_offset: i32,
    },
    /// `op vAA, kind@BBBB`
    Format21c {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// Referenced item
        reference: R,
    },
    /// `op vAA, #+BBBB0000`
    Format21ih {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// Literal with the low 16 bits clear
        literal: i32,
    },
    /// `op vAA, #+BBBB000000000000`
    Format21lh {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// Literal with the low 48 bits clear
        literal: i64,
    },
    /// `op vAA, #+BBBB`
    Format21s {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// Signed 16-bit literal
        literal: i32,
    },
    /// `op vAA, +BBBB`
    Format21t {
        /// Opcode
        opcode: Opcode,
        /// Tested register (8 bit)
        register_a: u8,
        /// Signed 16-bit branch offset
        code_offset: i32,
    },
    /// `op vAA, vBB, #+CC`
    Format22b {
        /// Opcode
        opcode: Opcode,
        /// Destination register (8 bit)
        register_a: u8,
        /// Source register (8 bit)
        register_b: u8,
        /// Signed 8-bit literal
        literal: i32,
    },
    /// `op vA, vB, kind@CCCC`
    Format22c {
        /// Opcode
        opcode: Opcode,
        /// First register (4 bit)
        register_a: u8,
        /// Second register (4 bit)
        register_b: u8,
        /// Referenced item
        reference: R,
    },
    /// `op vA, vB, fieldoff@CCCC`
    Format22cs {
        /// Opcode
        opcode: Opcode,
        /// First register (4 bit)
        register_a: u8,
        /// Second register (4 bit)
        register_b: u8,
        /// Resolved field byte offset
        field_offset: u16,
    },
    /// `op vA, vB, #+CCCC`
    Format22s {
        /// Opcode
        opcode: Opcode,
        /// Destination register (4 bit)
        register_a: u8,
        /// Source register (4 bit)
        register_b: u8,
        /// Signed 16-bit literal
        literal: i32,
    },
    /// `op vA, vB, +CCCC`
    Format22t {
        /// Opcode
        opcode: Opcode,
        /// First register (4 bit)
        register_a: u8,
        /// Second register (4 bit)
        register_b: u8,
        /// Signed 16-bit branch offset
        code_offset: i32,
    },
    /// `op vAA, vBBBB`
    Format22x {
        /// Opcode
        opcode: Opcode,
        /// Destination register (8 bit)
        register_a: u8,
        /// Source register (16 bit)
        register_b: u16,
    },
    /// `op vAA, vBB, vCC`
    Format23x {
        /// Opcode
        opcode: Opcode,
        /// Destination register (8 bit)
        register_a: u8,
        /// First source register (8 bit)
        register_b: u8,
        /// Second source register (8 bit)
        register_c: u8,
    },
    /// `op +AAAAAAAA`
    Format30t {
        /// Opcode
        opcode: Opcode,
        /// Signed 32-bit branch offset
        code_offset: i32,
    },
    /// `op vAA, string@BBBBBBBB`
    Format31c {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// Referenced item
        reference: R,
    },
    /// `op vAA, #+BBBBBBBB`
    Format31i {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// 32-bit literal
        literal: i32,
    },
    /// `op vAA, +BBBBBBBB`
    Format31t {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// Signed offset to the payload
        code_offset: i32,
    },
    /// `op vAAAA, vBBBB`
    Format32x {
        /// Opcode
        opcode: Opcode,
        /// Destination register (16 bit)
        register_a: u16,
        /// Source register (16 bit)
        register_b: u16,
    },
    /// `op {vC, vD, vE, vF, vG}, kind@BBBB`
    Format35c {
        /// Opcode
        opcode: Opcode,
        /// Up to five 4-bit argument registers
        registers: Vec<u8>,
        /// Referenced item
        reference: R,
    },
    /// `op {vC, vD, vE, vF, vG}, inline@BBBB`
    Format35mi {
        /// Opcode
        opcode: Opcode,
        /// Up to five 4-bit argument registers
        registers: Vec<u8>,
        /// Inline method table index
        inline_index: u16,
    },
    /// `op {vC, vD, vE, vF, vG}, vtaboff@BBBB`
    Format35ms {
        /// Opcode
        opcode: Opcode,
        /// Up to five 4-bit argument registers
        registers: Vec<u8>,
        /// Virtual table index
        vtable_index: u16,
    },
    /// `op {vCCCC .. vNNNN}, kind@BBBB`
    Format3rc {
        /// Opcode
        opcode: Opcode,
        /// First register of the range
        start_register: u16,
        /// Number of registers in the range
        register_count: u8,
        /// Referenced item
        reference: R,
    },
    /// `op {vCCCC .. vNNNN}, inline@BBBB`
    Format3rmi {
        /// Opcode
        opcode: Opcode,
        /// First register of the range
        start_register: u16,
        /// Number of registers in the range
        register_count: u8,
        /// Inline method table index
        inline_index: u16,
    },
    /// `op {vCCCC .. vNNNN}, vtaboff@BBBB`
    Format3rms {
        /// Opcode
        opcode: Opcode,
        /// First register of the range
        start_register: u16,
        /// Number of registers in the range
        register_count: u8,
        /// Virtual table index
        vtable_index: u16,
    },
    /// `op {vC, vD, vE, vF, vG}, meth@BBBB, proto@HHHH`
    Format45cc {
        /// Opcode
        opcode: Opcode,
        /// Up to five 4-bit argument registers
        registers: Vec<u8>,
        /// Referenced method
        reference: R,
        /// Referenced prototype
        reference2: R,
    },
    /// `op {vCCCC .. vNNNN}, meth@BBBB, proto@HHHH`
    Format4rcc {
        /// Opcode
        opcode: Opcode,
        /// First register of the range
        start_register: u16,
        /// Number of registers in the range
        register_count: u8,
        /// Referenced method
        reference: R,
        /// Referenced prototype
        reference2: R,
    },
    /// `op vAA, #+BBBBBBBBBBBBBBBB`
    Format51l {
        /// Opcode
        opcode: Opcode,
        /// Register (8 bit)
        register_a: u8,
        /// 64-bit literal
        literal: i64,
    },
    /// `packed-switch-payload`
    PackedSwitchPayload {
        /// Key of the first target
        first_key: i32,
        /// Branch targets for consecutive keys
        targets: Vec<i32>,
    },
    /// `sparse-switch-payload`
    SparseSwitchPayload {
        /// Key/target pairs, sorted by key
        elements: Vec<SwitchElement>,
    },
    /// `fill-array-data-payload`
    ArrayPayload {
        /// Width of a single element in bytes (1, 2, 4 or 8)
        element_width: u8,
        /// Element values, sign-extended to 64 bits
        elements: Vec<i64>,
    },
}

impl<R> Instruction<R> {
    /// Opcode of this instruction
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Format10t { opcode, .. }
            | Instruction::Format10x { opcode }
            | Instruction::Format11n { opcode, .. }
            | Instruction::Format11x { opcode, .. }
            | Instruction::Format12x { opcode, .. }
            | Instruction::Format20bc { opcode, .. }
            | Instruction::Format20t { opcode, .. }
            | Instruction::Format21c { opcode, .. }
            | Instruction::Format21ih { opcode, .. }
            | Instruction::Format21lh { opcode, .. }
            | Instruction::Format21s { opcode, .. }
            | Instruction::Format21t { opcode, .. }
            | Instruction::Format22b { opcode, .. }
            | Instruction::Format22c { opcode, .. }
            | Instruction::Format22cs { opcode, .. }
            | Instruction::Format22s { opcode, .. }
            | Instruction::Format22t { opcode, .. }
            | Instruction::Format22x { opcode, .. }
            | Instruction::Format23x { opcode, .. }
            | Instruction::Format30t { opcode, .. }
            | Instruction::Format31c { opcode, .. }
            | Instruction::Format31i { opcode, .. }
            | Instruction::Format31t { opcode, .. }
            | Instruction::Format32x { opcode, .. }
            | Instruction::Format35c { opcode, .. }
            | Instruction::Format35mi { opcode, .. }
            | Instruction::Format35ms { opcode, .. }
            | Instruction::Format3rc { opcode, .. }
            | Instruction::Format3rmi { opcode, .. }
            | Instruction::Format3rms { opcode, .. }
            | Instruction::Format45cc { opcode, .. }
            | Instruction::Format4rcc { opcode, .. }
            | Instruction::Format51l { opcode, .. } => *opcode,
            Instruction::PackedSwitchPayload { .. } => Opcode::PackedSwitchPayload,
            Instruction::SparseSwitchPayload { .. } => Opcode::SparseSwitchPayload,
            Instruction::ArrayPayload { .. } => Opcode::ArrayPayload,
        }
    }

    /// The format this variant encodes
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Instruction::Format10t { .. } => Format::Format10t,
            Instruction::Format10x { .. } => Format::Format10x,
            Instruction::Format11n { .. } => Format::Format11n,
            Instruction::Format11x { .. } => Format::Format11x,
            Instruction::Format12x { .. } => Format::Format12x,
            Instruction::Format20bc { .. } => Format::Format20bc,
            Instruction::Format20t { .. } => Format::Format20t,
            Instruction::Format21c { .. } => Format::Format21c,
            Instruction::Format21ih { .. } => Format::Format21ih,
            Instruction::Format21lh { .. } => Format::Format21lh,
            Instruction::Format21s { .. } => Format::Format21s,
            Instruction::Format21t { .. } => Format::Format21t,
            Instruction::Format22b { .. } => Format::Format22b,
            Instruction::Format22c { .. } => Format::Format22c,
            Instruction::Format22cs { .. } => Format::Format22cs,
            Instruction::Format22s { .. } => Format::Format22s,
            Instruction::Format22t { .. } => Format::Format22t,
            Instruction::Format22x { .. } => Format::Format22x,
            Instruction::Format23x { .. } => Format::Format23x,
            Instruction::Format30t { .. } => Format::Format30t,
            Instruction::Format31c { .. } => Format::Format31c,
            Instruction::Format31i { .. } => Format::Format31i,
            Instruction::Format31t { .. } => Format::Format31t,
            Instruction::Format32x { .. } => Format::Format32x,
            Instruction::Format35c { .. } => Format::Format35c,
            Instruction::Format35mi { .. } => Format::Format35mi,
            Instruction::Format35ms { .. } => Format::Format35ms,
            Instruction::Format3rc { .. } => Format::Format3rc,
            Instruction::Format3rmi { .. } => Format::Format3rmi,
            Instruction::Format3rms { .. } => Format::Format3rms,
            Instruction::Format45cc { .. } => Format::Format45cc,
            Instruction::Format4rcc { .. } => Format::Format4rcc,
            Instruction::Format51l { .. } => Format::Format51l,
            Instruction::PackedSwitchPayload { .. } => Format::PackedSwitchPayload,
            Instruction::SparseSwitchPayload { .. } => Format::SparseSwitchPayload,
            Instruction::ArrayPayload { .. } => Format::ArrayPayload,
        }
    }

    /// Size of this instruction in 16-bit code units.
    ///
    /// Fixed formats take their size from [`Format::size`]. Payloads are variable:
    /// packed switch = `4 + 2 * targets`, sparse switch = `2 + 4 * entries`, array data =
    /// `4 + (element_width * count + 1) / 2`.
    #[must_use]
    pub fn code_units(&self) -> usize {
        match self {
            Instruction::PackedSwitchPayload { targets, .. } => 4 + targets.len() * 2,
            Instruction::SparseSwitchPayload { elements } => 2 + elements.len() * 4,
            Instruction::ArrayPayload {
                element_width,
                elements,
            } => 4 + (usize::from(*element_width) * elements.len() + 1) / 2,
            other => other.format().size().unwrap_or(0),
        }
    }

    /// The (first) referenced item, if this is a reference instruction
    #[must_use]
    pub fn reference(&self) -> Option<&R> {
        match self {
            Instruction::Format20bc { reference, .. }
            | Instruction::Format21c { reference, .. }
            | Instruction::Format22c { reference, .. }
            | Instruction::Format31c { reference, .. }
            | Instruction::Format35c { reference, .. }
            | Instruction::Format3rc { reference, .. }
            | Instruction::Format45cc { reference, .. }
            | Instruction::Format4rcc { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// The second referenced item (`45cc`/`4rcc` prototype)
    #[must_use]
    pub fn reference2(&self) -> Option<&R> {
        match self {
            Instruction::Format45cc { reference2, .. }
            | Instruction::Format4rcc { reference2, .. } => Some(reference2),
            _ => None,
        }
    }

    /// Rebuild this instruction with every reference operand replaced by `f(reference)`.
    ///
    /// All non-reference operands are copied unchanged. This is the resolution step that turns
    /// a raw instruction into one pointing at canonical pool entries.
    ///
    /// # Errors
    /// Propagates the first error returned by `f`.
    pub fn map_references<R2, E, F>(&self, mut f: F) -> std::result::Result<Instruction<R2>, E>
    where
        F: FnMut(&R) -> std::result::Result<R2, E>,
    {
        Ok(match self {
            Instruction::Format10t {
                opcode,
                code_offset,
            } => Instruction::Format10t {
                opcode: *opcode,
                code_offset: *code_offset,
            },
            Instruction::Format10x { opcode } => Instruction::Format10x { opcode: *opcode },
            Instruction::Format11n {
                opcode,
                register_a,
                literal,
            } => Instruction::Format11n {
                opcode: *opcode,
                register_a: *register_a,
                literal: *literal,
            },
            Instruction::Format11x { opcode, register_a } => Instruction::Format11x {
                opcode: *opcode,
                register_a: *register_a,
            },
            Instruction::Format12x {
                opcode,
                register_a,
                register_b,
            } => Instruction::Format12x {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
            },
            Instruction::Format20bc {
                opcode,
                verification_error,
                reference,
            } => Instruction::Format20bc {
                opcode: *opcode,
                verification_error: *verification_error,
                reference: f(reference)?,
            },
            Instruction::Format20t {
                opcode,
                code_offset,
            } => Instruction::Format20t {
                opcode: *opcode,
                code_offset: *code_offset,
            },
            Instruction::Format21c {
                opcode,
                register_a,
                reference,
            } => Instruction::Format21c {
                opcode: *opcode,
                register_a: *register_a,
                reference: f(reference)?,
            },
            Instruction::Format21ih {
                opcode,
                register_a,
                literal,
            } => Instruction::Format21ih {
                opcode: *opcode,
                register_a: *register_a,
                literal: *literal,
            },
            Instruction::Format21lh {
                opcode,
                register_a,
                literal,
            } => Instruction::Format21lh {
                opcode: *opcode,
                register_a: *register_a,
                literal: *literal,
            },
            Instruction::Format21s {
                opcode,
                register_a,
                literal,
            } => Instruction::Format21s {
                opcode: *opcode,
                register_a: *register_a,
                literal: *literal,
            },
            Instruction::Format21t {
                opcode,
                register_a,
                code_offset,
            } => Instruction::Format21t {
                opcode: *opcode,
                register_a: *register_a,
                code_offset: *code_offset,
            },
            Instruction::Format22b {
                opcode,
                register_a,
                register_b,
                literal,
            } => Instruction::Format22b {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
                literal: *literal,
            },
            Instruction::Format22c {
                opcode,
                register_a,
                register_b,
                reference,
            } => Instruction::Format22c {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
                reference: f(reference)?,
            },
            Instruction::Format22cs {
                opcode,
                register_a,
                register_b,
                field_offset,
            } => Instruction::Format22cs {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
                field_offset: *field_offset,
            },
            Instruction::Format22s {
                opcode,
                register_a,
                register_b,
                literal,
            } => Instruction::Format22s {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
                literal: *literal,
            },
            Instruction::Format22t {
                opcode,
                register_a,
                register_b,
                code_offset,
            } => Instruction::Format22t {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
                code_offset: *code_offset,
            },
            Instruction::Format22x {
                opcode,
                register_a,
                register_b,
            } => Instruction::Format22x {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
            },
            Instruction::Format23x {
                opcode,
                register_a,
                register_b,
                register_c,
            } => Instruction::Format23x {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
                register_c: *register_c,
            },
            Instruction::Format30t {
                opcode,
                code_offset,
            } => Instruction::Format30t {
                opcode: *opcode,
                code_offset: *code_offset,
            },
            Instruction::Format31c {
                opcode,
                register_a,
                reference,
            } => Instruction::Format31c {
                opcode: *opcode,
                register_a: *register_a,
                reference: f(reference)?,
            },
            Instruction::Format31i {
                opcode,
                register_a,
                literal,
            } => Instruction::Format31i {
                opcode: *opcode,
                register_a: *register_a,
                literal: *literal,
            },
            Instruction::Format31t {
                opcode,
                register_a,
                code_offset,
            } => Instruction::Format31t {
                opcode: *opcode,
                register_a: *register_a,
                code_offset: *code_offset,
            },
            Instruction::Format32x {
                opcode,
                register_a,
                register_b,
            } => Instruction::Format32x {
                opcode: *opcode,
                register_a: *register_a,
                register_b: *register_b,
            },
            Instruction::Format35c {
                opcode,
                registers,
                reference,
            } => Instruction::Format35c {
                opcode: *opcode,
                registers: registers.clone(),
                reference: f(reference)?,
            },
            Instruction::Format35mi {
                opcode,
                registers,
                inline_index,
            } => Instruction::Format35mi {
                opcode: *opcode,
                registers: registers.clone(),
                inline_index: *inline_index,
            },
            Instruction::Format35ms {
                opcode,
                registers,
                vtable_index,
            } => Instruction::Format35ms {
                opcode: *opcode,
                registers: registers.clone(),
                vtable_index: *vtable_index,
            },
            Instruction::Format3rc {
                opcode,
                start_register,
                register_count,
                reference,
            } => Instruction::Format3rc {
                opcode: *opcode,
                start_register: *start_register,
                register_count: *register_count,
                reference: f(reference)?,
            },
            Instruction::Format3rmi {
                opcode,
                start_register,
                register_count,
                inline_index,
            } => Instruction::Format3rmi {
                opcode: *opcode,
                start_register: *start_register,
                register_count: *register_count,
                inline_index: *inline_index,
            },
            Instruction::Format3rms {
                opcode,
                start_register,
                register_count,
                vtable_index,
            } => Instruction::Format3rms {
                opcode: *opcode,
                start_register: *start_register,
                register_count: *register_count,
                vtable_index: *vtable_index,
            },
            Instruction::Format45cc {
                opcode,
                registers,
                reference,
                reference2,
            } => Instruction::Format45cc {
                opcode: *opcode,
                registers: registers.clone(),
                reference: f(reference)?,
                reference2: f(reference2)?,
            },
            Instruction::Format4rcc {
                opcode,
                start_register,
                register_count,
                reference,
                reference2,
            } => Instruction::Format4rcc {
                opcode: *opcode,
                start_register: *start_register,
                register_count: *register_count,
                reference: f(reference)?,
                reference2: f(reference2)?,
            },
            Instruction::Format51l {
                opcode,
                register_a,
                literal,
            } => Instruction::Format51l {
                opcode: *opcode,
                register_a: *register_a,
                literal: *literal,
            },
            Instruction::PackedSwitchPayload { first_key, targets } => {
                Instruction::PackedSwitchPayload {
                    first_key: *first_key,
                    targets: targets.clone(),
                }
            }
            Instruction::SparseSwitchPayload { elements } => Instruction::SparseSwitchPayload {
                elements: elements.clone(),
            },
            Instruction::ArrayPayload {
                element_width,
                elements,
            } => Instruction::ArrayPayload {
                element_width: *element_width,
                elements: elements.clone(),
            },
        })
    }
}

fn check_nibble(opcode: Opcode, name: &str, value: u8) -> Result<()> {
    if value > 0x0f {
        return Err(invalid_argument!(
            "{}: register {} = {} does not fit in 4 bits",
            opcode,
            name,
            value
        ));
    }
    Ok(())
}

fn check_range(opcode: Opcode, name: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(invalid_argument!(
            "{}: {} = {} is outside of [{}, {}]",
            opcode,
            name,
            value,
            min,
            max
        ));
    }
    Ok(())
}

fn check_register_list(opcode: Opcode, registers: &[u8]) -> Result<()> {
    if registers.len() > 5 {
        return Err(invalid_argument!(
            "{}: {} registers given, at most 5 allowed",
            opcode,
            registers.len()
        ));
    }
    for register in registers {
        check_nibble(opcode, "list", *register)?;
    }
    Ok(())
}

fn check_register_range(opcode: Opcode, start_register: u16, register_count: u8) -> Result<()> {
    if u32::from(start_register) + u32::from(register_count) > 0x1_0000 {
        return Err(invalid_argument!(
            "{}: register range v{}..+{} exceeds 65535",
            opcode,
            start_register,
            register_count
        ));
    }
    Ok(())
}

fn check_reference<R: ReferenceKindOf>(
    opcode: Opcode,
    expected: Option<ReferenceKind>,
    reference: &R,
) -> Result<()> {
    let actual = reference.reference_kind();
    match expected {
        Some(kind) if kind == actual => Ok(()),
        // 20bc references whatever failed verification
        None if opcode == Opcode::ThrowVerificationError => Ok(()),
        _ => Err(invalid_argument!(
            "{}: expected a {} reference but got a {} reference",
            opcode,
            expected.map_or_else(|| "no".to_string(), |k| k.to_string()),
            actual
        )),
    }
}

impl<R: ReferenceKindOf> Instruction<R> {
    /// Validate operands against the opcode table.
    ///
    /// Checks that the opcode belongs to this variant's format, that 4-bit registers and
    /// literals fit, that register lists hold at most five registers, that branch offsets and
    /// high-order literals are representable, that payload element widths are valid and that
    /// reference operands have the kind the opcode expects.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let opcode = self.opcode();
        if opcode.format() != self.format() {
            return Err(invalid_argument!(
                "Opcode {} uses format {}, not {}",
                opcode,
                opcode.format(),
                self.format()
            ));
        }

        match self {
            Instruction::Format10t { code_offset, .. } => {
                check_range(opcode, "offset", i64::from(*code_offset), -128, 127)
            }
            Instruction::Format20t { code_offset, .. }
            | Instruction::Format21t { code_offset, .. }
            | Instruction::Format22t { code_offset, .. } => {
                if let Instruction::Format22t {
                    register_a,
                    register_b,
                    ..
                } = self
                {
                    check_nibble(opcode, "A", *register_a)?;
                    check_nibble(opcode, "B", *register_b)?;
                }
                check_range(opcode, "offset", i64::from(*code_offset), -32768, 32767)
            }
            Instruction::Format10x { .. }
            | Instruction::Format11x { .. }
            | Instruction::Format22x { .. }
            | Instruction::Format23x { .. }
            | Instruction::Format30t { .. }
            | Instruction::Format31i { .. }
            | Instruction::Format31t { .. }
            | Instruction::Format32x { .. }
            | Instruction::Format51l { .. } => Ok(()),
            Instruction::Format11n {
                register_a,
                literal,
                ..
            } => {
                check_nibble(opcode, "A", *register_a)?;
                check_range(opcode, "literal", i64::from(*literal), -8, 7)
            }
            Instruction::Format12x {
                register_a,
                register_b,
                ..
            }
            | Instruction::Format22cs {
                register_a,
                register_b,
                ..
            } => {
                check_nibble(opcode, "A", *register_a)?;
                check_nibble(opcode, "B", *register_b)
            }
            Instruction::Format20bc { reference, .. } => {
                check_reference(opcode, opcode.reference_kind(), reference)
            }
            Instruction::Format21c { reference, .. } | Instruction::Format31c { reference, .. } => {
                check_reference(opcode, opcode.reference_kind(), reference)
            }
            Instruction::Format21ih { literal, .. } => {
                if literal & 0xffff != 0 {
                    return Err(invalid_argument!(
                        "{}: literal 0x{:08x} has non-zero low 16 bits",
                        opcode,
                        literal
                    ));
                }
                Ok(())
            }
            Instruction::Format21lh { literal, .. } => {
                if literal & 0xffff_ffff_ffff != 0 {
                    return Err(invalid_argument!(
                        "{}: literal 0x{:016x} has non-zero low 48 bits",
                        opcode,
                        literal
                    ));
                }
                Ok(())
            }
            Instruction::Format21s { literal, .. } => {
                check_range(opcode, "literal", i64::from(*literal), -32768, 32767)
            }
            Instruction::Format22b { literal, .. } => {
                check_range(opcode, "literal", i64::from(*literal), -128, 127)
            }
            Instruction::Format22c {
                register_a,
                register_b,
                reference,
                ..
            } => {
                check_nibble(opcode, "A", *register_a)?;
                check_nibble(opcode, "B", *register_b)?;
                check_reference(opcode, opcode.reference_kind(), reference)
            }
            Instruction::Format22s {
                register_a,
                register_b,
                literal,
                ..
            } => {
                check_nibble(opcode, "A", *register_a)?;
                check_nibble(opcode, "B", *register_b)?;
                check_range(opcode, "literal", i64::from(*literal), -32768, 32767)
            }
            Instruction::Format35c {
                registers,
                reference,
                ..
            } => {
                check_register_list(opcode, registers)?;
                check_reference(opcode, opcode.reference_kind(), reference)
            }
            Instruction::Format35mi { registers, .. } | Instruction::Format35ms { registers, .. } => {
                check_register_list(opcode, registers)
            }
            Instruction::Format3rc {
                start_register,
                register_count,
                reference,
                ..
            } => {
                check_register_range(opcode, *start_register, *register_count)?;
                check_reference(opcode, opcode.reference_kind(), reference)
            }
            Instruction::Format3rmi {
                start_register,
                register_count,
                ..
            }
            | Instruction::Format3rms {
                start_register,
                register_count,
                ..
            } => check_register_range(opcode, *start_register, *register_count),
            Instruction::Format45cc {
                registers,
                reference,
                reference2,
                ..
            } => {
                check_register_list(opcode, registers)?;
                check_reference(opcode, opcode.reference_kind(), reference)?;
                check_reference(opcode, opcode.reference_kind2(), reference2)
            }
            Instruction::Format4rcc {
                start_register,
                register_count,
                reference,
                reference2,
                ..
            } => {
                check_register_range(opcode, *start_register, *register_count)?;
                check_reference(opcode, opcode.reference_kind(), reference)?;
                check_reference(opcode, opcode.reference_kind2(), reference2)
            }
            Instruction::PackedSwitchPayload { .. } => Ok(()),
            Instruction::SparseSwitchPayload { elements } => {
                if elements.windows(2).any(|pair| pair[0].key >= pair[1].key) {
                    return Err(invalid_argument!(
                        "sparse-switch-payload keys must be strictly ascending"
                    ));
                }
                Ok(())
            }
            Instruction::ArrayPayload {
                element_width,
                elements,
            } => {
                let (min, max) = match element_width {
                    1 => (i64::from(i8::MIN), i64::from(u8::MAX)),
                    2 => (i64::from(i16::MIN), i64::from(u16::MAX)),
                    4 => (i64::from(i32::MIN), i64::from(u32::MAX)),
                    8 => (i64::MIN, i64::MAX),
                    _ => {
                        return Err(invalid_argument!(
                            "array-payload: invalid element width {}",
                            element_width
                        ))
                    }
                };
                for element in elements {
                    check_range(opcode, "element", *element, min, max)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reference::{FieldReference, MethodProtoReference, MethodReference};

    #[test]
    fn payload_sizes() {
        let packed: Instruction = Instruction::PackedSwitchPayload {
            first_key: 0,
            targets: vec![1, 2, 3],
        };
        assert_eq!(packed.code_units(), 10);

        let sparse: Instruction = Instruction::SparseSwitchPayload {
            elements: vec![
                SwitchElement { key: 1, offset: 4 },
                SwitchElement { key: 9, offset: 8 },
            ],
        };
        assert_eq!(sparse.code_units(), 10);

        let array: Instruction = Instruction::ArrayPayload {
            element_width: 1,
            elements: vec![1, 2, 3],
        };
        assert_eq!(array.code_units(), 6);
        assert_eq!(array.opcode(), Opcode::ArrayPayload);
    }

    #[test]
    fn fixed_sizes() {
        let ret: Instruction = Instruction::Format10x {
            opcode: Opcode::ReturnVoid,
        };
        assert_eq!(ret.code_units(), 1);

        let wide: Instruction = Instruction::Format51l {
            opcode: Opcode::ConstWide,
            register_a: 0,
            literal: i64::MAX,
        };
        assert_eq!(wide.code_units(), 5);
    }

    #[test]
    fn validate_rejects_format_mismatch() {
        let insn: Instruction = Instruction::Format10x {
            opcode: Opcode::Move,
        };
        assert!(insn.validate().is_err());
    }

    #[test]
    fn validate_operand_ranges() {
        let ok: Instruction = Instruction::Format11n {
            opcode: Opcode::Const4,
            register_a: 15,
            literal: -8,
        };
        assert!(ok.validate().is_ok());

        let bad_literal: Instruction = Instruction::Format11n {
            opcode: Opcode::Const4,
            register_a: 0,
            literal: 8,
        };
        assert!(bad_literal.validate().is_err());

        let bad_register: Instruction = Instruction::Format12x {
            opcode: Opcode::Move,
            register_a: 16,
            register_b: 0,
        };
        assert!(bad_register.validate().is_err());

        let hat: Instruction = Instruction::Format21ih {
            opcode: Opcode::ConstHigh16,
            register_a: 0,
            literal: 0x1234,
        };
        assert!(hat.validate().is_err());
    }

    #[test]
    fn validate_reference_kinds() {
        let ok: Instruction = Instruction::Format22c {
            opcode: Opcode::Iget,
            register_a: 1,
            register_b: 2,
            reference: Reference::Field(FieldReference::new("LA;", "f", "I")),
        };
        assert!(ok.validate().is_ok());

        let wrong: Instruction = Instruction::Format21c {
            opcode: Opcode::ConstString,
            register_a: 0,
            reference: Reference::Type("LA;".into()),
        };
        assert!(wrong.validate().is_err());

        let polymorphic: Instruction = Instruction::Format45cc {
            opcode: Opcode::InvokePolymorphic,
            registers: vec![0, 1],
            reference: Reference::Method(MethodReference::new(
                "Ljava/lang/invoke/MethodHandle;",
                "invoke",
                vec!["[Ljava/lang/Object;".into()],
                "Ljava/lang/Object;",
            )),
            reference2: Reference::MethodProto(MethodProtoReference::new(
                vec!["I".into()],
                "V",
            )),
        };
        assert!(polymorphic.validate().is_ok());
    }

    #[test]
    fn validate_register_list_length() {
        let insn: Instruction = Instruction::Format35c {
            opcode: Opcode::InvokeStatic,
            registers: vec![0, 1, 2, 3, 4, 5],
            reference: Reference::Method(MethodReference::new("LA;", "m", vec![], "V")),
        };
        assert!(insn.validate().is_err());
    }

    #[test]
    fn validate_payloads() {
        let unsorted: Instruction = Instruction::SparseSwitchPayload {
            elements: vec![
                SwitchElement { key: 5, offset: 1 },
                SwitchElement { key: 2, offset: 2 },
            ],
        };
        assert!(unsorted.validate().is_err());

        let bad_width: Instruction = Instruction::ArrayPayload {
            element_width: 3,
            elements: vec![],
        };
        assert!(bad_width.validate().is_err());

        let overflow: Instruction = Instruction::ArrayPayload {
            element_width: 1,
            elements: vec![300],
        };
        assert!(overflow.validate().is_err());
    }

    #[test]
    fn map_references_preserves_operands() {
        let insn: Instruction = Instruction::Format3rc {
            opcode: Opcode::InvokeStaticRange,
            start_register: 10,
            register_count: 3,
            reference: Reference::Method(MethodReference::new("LA;", "m", vec![], "V")),
        };
        let mapped = insn
            .map_references(|reference| Ok::<_, crate::Error>(reference.to_string()))
            .unwrap();
        assert_eq!(
            mapped,
            Instruction::Format3rc {
                opcode: Opcode::InvokeStaticRange,
                start_register: 10,
                register_count: 3,
                reference: "LA;->m()V".to_string(),
            }
        );
    }
}
