//! Dalvik opcode table.
//!
//! [`Opcode`] lists the standard Dalvik instruction set up to DEX version 039, the three
//! payload pseudo-opcodes and the odex-only forms that introduce the `20bc`, `22cs`,
//! `35mi`/`3rmi` and `35ms`/`3rms` formats. For each opcode the table records its raw value,
//! mnemonic, [`Format`], the kind of item it references and the API level that introduced it.

use strum::{EnumCount, EnumIter};

use crate::model::{instructions::Format, reference::ReferenceKind};

const NONE: Option<ReferenceKind> = None;
const STRING: Option<ReferenceKind> = Some(ReferenceKind::String);
const TYPE: Option<ReferenceKind> = Some(ReferenceKind::Type);
const FIELD: Option<ReferenceKind> = Some(ReferenceKind::Field);
const METHOD: Option<ReferenceKind> = Some(ReferenceKind::Method);
const PROTO: Option<ReferenceKind> = Some(ReferenceKind::MethodProto);
const HANDLE: Option<ReferenceKind> = Some(ReferenceKind::MethodHandle);
const CALL_SITE: Option<ReferenceKind> = Some(ReferenceKind::CallSite);

macro_rules! opcodes {
    ($($variant:ident => ($value:expr, $name:expr, $format:ident, $reference:expr, $api:expr)),* $(,)?) => {
        /// A Dalvik opcode
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumCount, EnumIter)]
        pub enum Opcode {
            $($variant),*
        }

        impl Opcode {
            /// Raw opcode value; payload pseudo-opcodes use their full 16-bit identifier
            #[must_use]
            pub fn value(self) -> u16 {
                match self {
                    $(Opcode::$variant => $value),*
                }
            }

            /// Smali mnemonic
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name),*
                }
            }

            /// Encoding format
            #[must_use]
            pub fn format(self) -> Format {
                match self {
                    $(Opcode::$variant => Format::$format),*
                }
            }

            /// Kind of the (first) item this opcode references
            #[must_use]
            pub fn reference_kind(self) -> Option<ReferenceKind> {
                match self {
                    $(Opcode::$variant => $reference),*
                }
            }

            /// First Android API level supporting this opcode
            #[must_use]
            pub fn min_api(self) -> u32 {
                match self {
                    $(Opcode::$variant => $api),*
                }
            }
        }
    };
}

opcodes! {
    Nop => (0x00, "nop", Format10x, NONE, 1),
    Move => (0x01, "move", Format12x, NONE, 1),
    MoveFrom16 => (0x02, "move/from16", Format22x, NONE, 1),
    Move16 => (0x03, "move/16", Format32x, NONE, 1),
    MoveWide => (0x04, "move-wide", Format12x, NONE, 1),
    MoveWideFrom16 => (0x05, "move-wide/from16", Format22x, NONE, 1),
    MoveWide16 => (0x06, "move-wide/16", Format32x, NONE, 1),
    MoveObject => (0x07, "move-object", Format12x, NONE, 1),
    MoveObjectFrom16 => (0x08, "move-object/from16", Format22x, NONE, 1),
    MoveObject16 => (0x09, "move-object/16", Format32x, NONE, 1),
    MoveResult => (0x0a, "move-result", Format11x, NONE, 1),
    MoveResultWide => (0x0b, "move-result-wide", Format11x, NONE, 1),
    MoveResultObject => (0x0c, "move-result-object", Format11x, NONE, 1),
    MoveException => (0x0d, "move-exception", Format11x, NONE, 1),
    ReturnVoid => (0x0e, "return-void", Format10x, NONE, 1),
    Return => (0x0f, "return", Format11x, NONE, 1),
    ReturnWide => (0x10, "return-wide", Format11x, NONE, 1),
    ReturnObject => (0x11, "return-object", Format11x, NONE, 1),
    Const4 => (0x12, "const/4", Format11n, NONE, 1),
    Const16 => (0x13, "const/16", Format21s, NONE, 1),
    Const => (0x14, "const", Format31i, NONE, 1),
    ConstHigh16 => (0x15, "const/high16", Format21ih, NONE, 1),
    ConstWide16 => (0x16, "const-wide/16", Format21s, NONE, 1),
    ConstWide32 => (0x17, "const-wide/32", Format31i, NONE, 1),
    ConstWide => (0x18, "const-wide", Format51l, NONE, 1),
    ConstWideHigh16 => (0x19, "const-wide/high16", Format21lh, NONE, 1),
    ConstString => (0x1a, "const-string", Format21c, STRING, 1),
    ConstStringJumbo => (0x1b, "const-string/jumbo", Format31c, STRING, 1),
    ConstClass => (0x1c, "const-class", Format21c, TYPE, 1),
    MonitorEnter => (0x1d, "monitor-enter", Format11x, NONE, 1),
    MonitorExit => (0x1e, "monitor-exit", Format11x, NONE, 1),
    CheckCast => (0x1f, "check-cast", Format21c, TYPE, 1),
    InstanceOf => (0x20, "instance-of", Format22c, TYPE, 1),
    ArrayLength => (0x21, "array-length", Format12x, NONE, 1),
    NewInstance => (0x22, "new-instance", Format21c, TYPE, 1),
    NewArray => (0x23, "new-array", Format22c, TYPE, 1),
    FilledNewArray => (0x24, "filled-new-array", Format35c, TYPE, 1),
    FilledNewArrayRange => (0x25, "filled-new-array/range", Format3rc, TYPE, 1),
    FillArrayData => (0x26, "fill-array-data", Format31t, NONE, 1),
    Throw => (0x27, "throw", Format11x, NONE, 1),
    Goto => (0x28, "goto", Format10t, NONE, 1),
    Goto16 => (0x29, "goto/16", Format20t, NONE, 1),
    Goto32 => (0x2a, "goto/32", Format30t, NONE, 1),
    PackedSwitch => (0x2b, "packed-switch", Format31t, NONE, 1),
    SparseSwitch => (0x2c, "sparse-switch", Format31t, NONE, 1),
    CmplFloat => (0x2d, "cmpl-float", Format23x, NONE, 1),
    CmpgFloat => (0x2e, "cmpg-float", Format23x, NONE, 1),
    CmplDouble => (0x2f, "cmpl-double", Format23x, NONE, 1),
    CmpgDouble => (0x30, "cmpg-double", Format23x, NONE, 1),
    CmpLong => (0x31, "cmp-long", Format23x, NONE, 1),
    IfEq => (0x32, "if-eq", Format22t, NONE, 1),
    IfNe => (0x33, "if-ne", Format22t, NONE, 1),
    IfLt => (0x34, "if-lt", Format22t, NONE, 1),
    IfGe => (0x35, "if-ge", Format22t, NONE, 1),
    IfGt => (0x36, "if-gt", Format22t, NONE, 1),
    IfLe => (0x37, "if-le", Format22t, NONE, 1),
    IfEqz => (0x38, "if-eqz", Format21t, NONE, 1),
    IfNez => (0x39, "if-nez", Format21t, NONE, 1),
    IfLtz => (0x3a, "if-ltz", Format21t, NONE, 1),
    IfGez => (0x3b, "if-gez", Format21t, NONE, 1),
    IfGtz => (0x3c, "if-gtz", Format21t, NONE, 1),
    IfLez => (0x3d, "if-lez", Format21t, NONE, 1),
    Aget => (0x44, "aget", Format23x, NONE, 1),
    AgetWide => (0x45, "aget-wide", Format23x, NONE, 1),
    AgetObject => (0x46, "aget-object", Format23x, NONE, 1),
    AgetBoolean => (0x47, "aget-boolean", Format23x, NONE, 1),
    AgetByte => (0x48, "aget-byte", Format23x, NONE, 1),
    AgetChar => (0x49, "aget-char", Format23x, NONE, 1),
    AgetShort => (0x4a, "aget-short", Format23x, NONE, 1),
    Aput => (0x4b, "aput", Format23x, NONE, 1),
    AputWide => (0x4c, "aput-wide", Format23x, NONE, 1),
    AputObject => (0x4d, "aput-object", Format23x, NONE, 1),
    AputBoolean => (0x4e, "aput-boolean", Format23x, NONE, 1),
    AputByte => (0x4f, "aput-byte", Format23x, NONE, 1),
    AputChar => (0x50, "aput-char", Format23x, NONE, 1),
    AputShort => (0x51, "aput-short", Format23x, NONE, 1),
    Iget => (0x52, "iget", Format22c, FIELD, 1),
    IgetWide => (0x53, "iget-wide", Format22c, FIELD, 1),
    IgetObject => (0x54, "iget-object", Format22c, FIELD, 1),
    IgetBoolean => (0x55, "iget-boolean", Format22c, FIELD, 1),
    IgetByte => (0x56, "iget-byte", Format22c, FIELD, 1),
    IgetChar => (0x57, "iget-char", Format22c, FIELD, 1),
    IgetShort => (0x58, "iget-short", Format22c, FIELD, 1),
    Iput => (0x59, "iput", Format22c, FIELD, 1),
    IputWide => (0x5a, "iput-wide", Format22c, FIELD, 1),
    IputObject => (0x5b, "iput-object", Format22c, FIELD, 1),
    IputBoolean => (0x5c, "iput-boolean", Format22c, FIELD, 1),
    IputByte => (0x5d, "iput-byte", Format22c, FIELD, 1),
    IputChar => (0x5e, "iput-char", Format22c, FIELD, 1),
    IputShort => (0x5f, "iput-short", Format22c, FIELD, 1),
    Sget => (0x60, "sget", Format21c, FIELD, 1),
    SgetWide => (0x61, "sget-wide", Format21c, FIELD, 1),
    SgetObject => (0x62, "sget-object", Format21c, FIELD, 1),
    SgetBoolean => (0x63, "sget-boolean", Format21c, FIELD, 1),
    SgetByte => (0x64, "sget-byte", Format21c, FIELD, 1),
    SgetChar => (0x65, "sget-char", Format21c, FIELD, 1),
    SgetShort => (0x66, "sget-short", Format21c, FIELD, 1),
    Sput => (0x67, "sput", Format21c, FIELD, 1),
    SputWide => (0x68, "sput-wide", Format21c, FIELD, 1),
    SputObject => (0x69, "sput-object", Format21c, FIELD, 1),
    SputBoolean => (0x6a, "sput-boolean", Format21c, FIELD, 1),
    SputByte => (0x6b, "sput-byte", Format21c, FIELD, 1),
    SputChar => (0x6c, "sput-char", Format21c, FIELD, 1),
    SputShort => (0x6d, "sput-short", Format21c, FIELD, 1),
    InvokeVirtual => (0x6e, "invoke-virtual", Format35c, METHOD, 1),
    InvokeSuper => (0x6f, "invoke-super", Format35c, METHOD, 1),
    InvokeDirect => (0x70, "invoke-direct", Format35c, METHOD, 1),
    InvokeStatic => (0x71, "invoke-static", Format35c, METHOD, 1),
    InvokeInterface => (0x72, "invoke-interface", Format35c, METHOD, 1),
    InvokeVirtualRange => (0x74, "invoke-virtual/range", Format3rc, METHOD, 1),
    InvokeSuperRange => (0x75, "invoke-super/range", Format3rc, METHOD, 1),
    InvokeDirectRange => (0x76, "invoke-direct/range", Format3rc, METHOD, 1),
    InvokeStaticRange => (0x77, "invoke-static/range", Format3rc, METHOD, 1),
    InvokeInterfaceRange => (0x78, "invoke-interface/range", Format3rc, METHOD, 1),
    NegInt => (0x7b, "neg-int", Format12x, NONE, 1),
    NotInt => (0x7c, "not-int", Format12x, NONE, 1),
    NegLong => (0x7d, "neg-long", Format12x, NONE, 1),
    NotLong => (0x7e, "not-long", Format12x, NONE, 1),
    NegFloat => (0x7f, "neg-float", Format12x, NONE, 1),
    NegDouble => (0x80, "neg-double", Format12x, NONE, 1),
    IntToLong => (0x81, "int-to-long", Format12x, NONE, 1),
    IntToFloat => (0x82, "int-to-float", Format12x, NONE, 1),
    IntToDouble => (0x83, "int-to-double", Format12x, NONE, 1),
    LongToInt => (0x84, "long-to-int", Format12x, NONE, 1),
    LongToFloat => (0x85, "long-to-float", Format12x, NONE, 1),
    LongToDouble => (0x86, "long-to-double", Format12x, NONE, 1),
    FloatToInt => (0x87, "float-to-int", Format12x, NONE, 1),
    FloatToLong => (0x88, "float-to-long", Format12x, NONE, 1),
    FloatToDouble => (0x89, "float-to-double", Format12x, NONE, 1),
    DoubleToInt => (0x8a, "double-to-int", Format12x, NONE, 1),
    DoubleToLong => (0x8b, "double-to-long", Format12x, NONE, 1),
    DoubleToFloat => (0x8c, "double-to-float", Format12x, NONE, 1),
    IntToByte => (0x8d, "int-to-byte", Format12x, NONE, 1),
    IntToChar => (0x8e, "int-to-char", Format12x, NONE, 1),
    IntToShort => (0x8f, "int-to-short", Format12x, NONE, 1),
    AddInt => (0x90, "add-int", Format23x, NONE, 1),
    SubInt => (0x91, "sub-int", Format23x, NONE, 1),
    MulInt => (0x92, "mul-int", Format23x, NONE, 1),
    DivInt => (0x93, "div-int", Format23x, NONE, 1),
    RemInt => (0x94, "rem-int", Format23x, NONE, 1),
    AndInt => (0x95, "and-int", Format23x, NONE, 1),
    OrInt => (0x96, "or-int", Format23x, NONE, 1),
    XorInt => (0x97, "xor-int", Format23x, NONE, 1),
    ShlInt => (0x98, "shl-int", Format23x, NONE, 1),
    ShrInt => (0x99, "shr-int", Format23x, NONE, 1),
    UshrInt => (0x9a, "ushr-int", Format23x, NONE, 1),
    AddLong => (0x9b, "add-long", Format23x, NONE, 1),
    SubLong => (0x9c, "sub-long", Format23x, NONE, 1),
    MulLong => (0x9d, "mul-long", Format23x, NONE, 1),
    DivLong => (0x9e, "div-long", Format23x, NONE, 1),
    RemLong => (0x9f, "rem-long", Format23x, NONE, 1),
    AndLong => (0xa0, "and-long", Format23x, NONE, 1),
    OrLong => (0xa1, "or-long", Format23x, NONE, 1),
    XorLong => (0xa2, "xor-long", Format23x, NONE, 1),
    ShlLong => (0xa3, "shl-long", Format23x, NONE, 1),
    ShrLong => (0xa4, "shr-long", Format23x, NONE, 1),
    UshrLong => (0xa5, "ushr-long", Format23x, NONE, 1),
    AddFloat => (0xa6, "add-float", Format23x, NONE, 1),
    SubFloat => (0xa7, "sub-float", Format23x, NONE, 1),
    MulFloat => (0xa8, "mul-float", Format23x, NONE, 1),
    DivFloat => (0xa9, "div-float", Format23x, NONE, 1),
    RemFloat => (0xaa, "rem-float", Format23x, NONE, 1),
    AddDouble => (0xab, "add-double", Format23x, NONE, 1),
    SubDouble => (0xac, "sub-double", Format23x, NONE, 1),
    MulDouble => (0xad, "mul-double", Format23x, NONE, 1),
    DivDouble => (0xae, "div-double", Format23x, NONE, 1),
    RemDouble => (0xaf, "rem-double", Format23x, NONE, 1),
    AddInt2addr => (0xb0, "add-int/2addr", Format12x, NONE, 1),
    SubInt2addr => (0xb1, "sub-int/2addr", Format12x, NONE, 1),
    MulInt2addr => (0xb2, "mul-int/2addr", Format12x, NONE, 1),
    DivInt2addr => (0xb3, "div-int/2addr", Format12x, NONE, 1),
    RemInt2addr => (0xb4, "rem-int/2addr", Format12x, NONE, 1),
    AndInt2addr => (0xb5, "and-int/2addr", Format12x, NONE, 1),
    OrInt2addr => (0xb6, "or-int/2addr", Format12x, NONE, 1),
    XorInt2addr => (0xb7, "xor-int/2addr", Format12x, NONE, 1),
    ShlInt2addr => (0xb8, "shl-int/2addr", Format12x, NONE, 1),
    ShrInt2addr => (0xb9, "shr-int/2addr", Format12x, NONE, 1),
    UshrInt2addr => (0xba, "ushr-int/2addr", Format12x, NONE, 1),
    AddLong2addr => (0xbb, "add-long/2addr", Format12x, NONE, 1),
    SubLong2addr => (0xbc, "sub-long/2addr", Format12x, NONE, 1),
    MulLong2addr => (0xbd, "mul-long/2addr", Format12x, NONE, 1),
    DivLong2addr => (0xbe, "div-long/2addr", Format12x, NONE, 1),
    RemLong2addr => (0xbf, "rem-long/2addr", Format12x, NONE, 1),
    AndLong2addr => (0xc0, "and-long/2addr", Format12x, NONE, 1),
    OrLong2addr => (0xc1, "or-long/2addr", Format12x, NONE, 1),
    XorLong2addr => (0xc2, "xor-long/2addr", Format12x, NONE, 1),
    ShlLong2addr => (0xc3, "shl-long/2addr", Format12x, NONE, 1),
    ShrLong2addr => (0xc4, "shr-long/2addr", Format12x, NONE, 1),
    UshrLong2addr => (0xc5, "ushr-long/2addr", Format12x, NONE, 1),
    AddFloat2addr => (0xc6, "add-float/2addr", Format12x, NONE, 1),
    SubFloat2addr => (0xc7, "sub-float/2addr", Format12x, NONE, 1),
    MulFloat2addr => (0xc8, "mul-float/2addr", Format12x, NONE, 1),
    DivFloat2addr => (0xc9, "div-float/2addr", Format12x, NONE, 1),
    RemFloat2addr => (0xca, "rem-float/2addr", Format12x, NONE, 1),
    AddDouble2addr => (0xcb, "add-double/2addr", Format12x, NONE, 1),
    SubDouble2addr => (0xcc, "sub-double/2addr", Format12x, NONE, 1),
    MulDouble2addr => (0xcd, "mul-double/2addr", Format12x, NONE, 1),
    DivDouble2addr => (0xce, "div-double/2addr", Format12x, NONE, 1),
    RemDouble2addr => (0xcf, "rem-double/2addr", Format12x, NONE, 1),
    AddIntLit16 => (0xd0, "add-int/lit16", Format22s, NONE, 1),
    RsubInt => (0xd1, "rsub-int", Format22s, NONE, 1),
    MulIntLit16 => (0xd2, "mul-int/lit16", Format22s, NONE, 1),
    DivIntLit16 => (0xd3, "div-int/lit16", Format22s, NONE, 1),
    RemIntLit16 => (0xd4, "rem-int/lit16", Format22s, NONE, 1),
    AndIntLit16 => (0xd5, "and-int/lit16", Format22s, NONE, 1),
    OrIntLit16 => (0xd6, "or-int/lit16", Format22s, NONE, 1),
    XorIntLit16 => (0xd7, "xor-int/lit16", Format22s, NONE, 1),
    AddIntLit8 => (0xd8, "add-int/lit8", Format22b, NONE, 1),
    RsubIntLit8 => (0xd9, "rsub-int/lit8", Format22b, NONE, 1),
    MulIntLit8 => (0xda, "mul-int/lit8", Format22b, NONE, 1),
    DivIntLit8 => (0xdb, "div-int/lit8", Format22b, NONE, 1),
    RemIntLit8 => (0xdc, "rem-int/lit8", Format22b, NONE, 1),
    AndIntLit8 => (0xdd, "and-int/lit8", Format22b, NONE, 1),
    OrIntLit8 => (0xde, "or-int/lit8", Format22b, NONE, 1),
    XorIntLit8 => (0xdf, "xor-int/lit8", Format22b, NONE, 1),
    ShlIntLit8 => (0xe0, "shl-int/lit8", Format22b, NONE, 1),
    ShrIntLit8 => (0xe1, "shr-int/lit8", Format22b, NONE, 1),
    UshrIntLit8 => (0xe2, "ushr-int/lit8", Format22b, NONE, 1),
    ThrowVerificationError => (0xed, "throw-verification-error", Format20bc, NONE, 5),
    ExecuteInline => (0xee, "execute-inline", Format35mi, NONE, 1),
    ExecuteInlineRange => (0xef, "execute-inline/range", Format3rmi, NONE, 8),
    IgetQuick => (0xf2, "iget-quick", Format22cs, NONE, 1),
    InvokeVirtualQuick => (0xf8, "invoke-virtual-quick", Format35ms, NONE, 1),
    InvokeVirtualQuickRange => (0xf9, "invoke-virtual-quick/range", Format3rms, NONE, 1),
    InvokePolymorphic => (0xfa, "invoke-polymorphic", Format45cc, METHOD, 26),
    InvokePolymorphicRange => (0xfb, "invoke-polymorphic/range", Format4rcc, METHOD, 26),
    InvokeCustom => (0xfc, "invoke-custom", Format35c, CALL_SITE, 26),
    InvokeCustomRange => (0xfd, "invoke-custom/range", Format3rc, CALL_SITE, 26),
    ConstMethodHandle => (0xfe, "const-method-handle", Format21c, HANDLE, 28),
    ConstMethodType => (0xff, "const-method-type", Format21c, PROTO, 28),
    PackedSwitchPayload => (0x0100, "packed-switch-payload", PackedSwitchPayload, NONE, 1),
    SparseSwitchPayload => (0x0200, "sparse-switch-payload", SparseSwitchPayload, NONE, 1),
    ArrayPayload => (0x0300, "array-payload", ArrayPayload, NONE, 1),
}

impl Opcode {
    /// Kind of the second referenced item (`45cc`/`4rcc` prototype operand)
    #[must_use]
    pub fn reference_kind2(self) -> Option<ReferenceKind> {
        match self {
            Opcode::InvokePolymorphic | Opcode::InvokePolymorphicRange => PROTO,
            _ => NONE,
        }
    }

    /// Returns `true` for opcodes that only exist in optimized (odex) files
    #[must_use]
    pub fn is_odex_only(self) -> bool {
        matches!(
            self,
            Opcode::ThrowVerificationError
                | Opcode::ExecuteInline
                | Opcode::ExecuteInlineRange
                | Opcode::IgetQuick
                | Opcode::InvokeVirtualQuick
                | Opcode::InvokeVirtualQuickRange
        )
    }

    /// Returns `true` for the payload pseudo-opcodes
    #[must_use]
    pub fn is_payload(self) -> bool {
        self.format().is_payload()
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn values_and_names_are_unique() {
        let mut values = HashSet::new();
        let mut names = HashSet::new();
        for opcode in Opcode::iter() {
            assert!(values.insert(opcode.value()), "{opcode:?}");
            assert!(names.insert(opcode.name()), "{opcode:?}");
        }
        assert_eq!(values.len(), Opcode::COUNT);
    }

    #[test]
    fn table_spot_checks() {
        assert_eq!(Opcode::ConstString.format(), Format::Format21c);
        assert_eq!(Opcode::ConstString.reference_kind(), STRING);
        assert_eq!(Opcode::InvokeStaticRange.value(), 0x77);
        assert_eq!(Opcode::InvokePolymorphic.reference_kind2(), PROTO);
        assert_eq!(Opcode::ConstMethodHandle.min_api(), 28);
        assert_eq!(Opcode::AddIntLit8.to_string(), "add-int/lit8");
        assert!(Opcode::IgetQuick.is_odex_only());
        assert!(Opcode::ArrayPayload.is_payload());
    }

    #[test]
    fn reference_opcodes_use_reference_formats() {
        for opcode in Opcode::iter().filter(|o| o.reference_kind().is_some()) {
            assert!(
                matches!(
                    opcode.format(),
                    Format::Format21c
                        | Format::Format22c
                        | Format::Format31c
                        | Format::Format35c
                        | Format::Format3rc
                        | Format::Format45cc
                        | Format::Format4rcc
                ),
                "{opcode:?}"
            );
        }
    }
}
