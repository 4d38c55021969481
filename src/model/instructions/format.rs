//! Instruction formats.
//!
//! Every Dalvik opcode is encoded in exactly one format. The format name encodes its size in
//! 16-bit code units (first digit), its register count (second digit) and its operand kind
//! (trailing letters), following the Dalvik bytecode documentation.

use strum::{Display, EnumCount, EnumIter};

/// Encoding format of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum Format {
    /// `op +AA` (branch)
    #[strum(serialize = "10t")]
    Format10t,
    /// `op`
    #[strum(serialize = "10x")]
    Format10x,
    /// `op vA, #+B`
    #[strum(serialize = "11n")]
    Format11n,
    /// `op vAA`
    #[strum(serialize = "11x")]
    Format11x,
    /// `op vA, vB`
    #[strum(serialize = "12x")]
    Format12x,
    /// `op AA, kind@BBBB` (odex verification error)
    #[strum(serialize = "20bc")]
    Format20bc,
    /// `op +AAAA`
    #[strum(serialize = "20t")]
    Format20t,
    /// `op vAA, kind@BBBB`
    #[strum(serialize = "21c")]
    Format21c,
    /// `op vAA, #+BBBB0000`
    #[strum(serialize = "21ih")]
    Format21ih,
    /// `op vAA, #+BBBB000000000000`
    #[strum(serialize = "21lh")]
    Format21lh,
    /// `op vAA, #+BBBB`
    #[strum(serialize = "21s")]
    Format21s,
    /// `op vAA, +BBBB`
    #[strum(serialize = "21t")]
    Format21t,
    /// `op vAA, vBB, #+CC`
    #[strum(serialize = "22b")]
    Format22b,
    /// `op vA, vB, kind@CCCC`
    #[strum(serialize = "22c")]
    Format22c,
    /// `op vA, vB, fieldoff@CCCC` (odex)
    #[strum(serialize = "22cs")]
    Format22cs,
    /// `op vA, vB, #+CCCC`
    #[strum(serialize = "22s")]
    Format22s,
    /// `op vA, vB, +CCCC`
    #[strum(serialize = "22t")]
    Format22t,
    /// `op vAA, vBBBB`
    #[strum(serialize = "22x")]
    Format22x,
    /// `op vAA, vBB, vCC`
    #[strum(serialize = "23x")]
    Format23x,
    /// `op +AAAAAAAA`
    #[strum(serialize = "30t")]
    Format30t,
    /// `op vAA, string@BBBBBBBB`
    #[strum(serialize = "31c")]
    Format31c,
    /// `op vAA, #+BBBBBBBB`
    #[strum(serialize = "31i")]
    Format31i,
    /// `op vAA, +BBBBBBBB`
    #[strum(serialize = "31t")]
    Format31t,
    /// `op vAAAA, vBBBB`
    #[strum(serialize = "32x")]
    Format32x,
    /// `op {vC, vD, vE, vF, vG}, kind@BBBB`
    #[strum(serialize = "35c")]
    Format35c,
    /// `op {vC, vD, vE, vF, vG}, inline@BBBB` (odex)
    #[strum(serialize = "35mi")]
    Format35mi,
    /// `op {vC, vD, vE, vF, vG}, vtaboff@BBBB` (odex)
    #[strum(serialize = "35ms")]
    Format35ms,
    /// `op {vCCCC .. vNNNN}, kind@BBBB`
    #[strum(serialize = "3rc")]
    Format3rc,
    /// `op {vCCCC .. vNNNN}, inline@BBBB` (odex)
    #[strum(serialize = "3rmi")]
    Format3rmi,
    /// `op {vCCCC .. vNNNN}, vtaboff@BBBB` (odex)
    #[strum(serialize = "3rms")]
    Format3rms,
    /// `op {vC, vD, vE, vF, vG}, meth@BBBB, proto@HHHH`
    #[strum(serialize = "45cc")]
    Format45cc,
    /// `op {vCCCC .. vNNNN}, meth@BBBB, proto@HHHH`
    #[strum(serialize = "4rcc")]
    Format4rcc,
    /// `op vAA, #+BBBBBBBBBBBBBBBB`
    #[strum(serialize = "51l")]
    Format51l,
    /// `packed-switch-payload`
    #[strum(serialize = "packed-switch-payload")]
    PackedSwitchPayload,
    /// `sparse-switch-payload`
    #[strum(serialize = "sparse-switch-payload")]
    SparseSwitchPayload,
    /// `fill-array-data-payload`
    #[strum(serialize = "array-payload")]
    ArrayPayload,
}

impl Format {
    /// Fixed size of this format in 16-bit code units, `None` for variable-sized payloads
    #[must_use]
    pub fn size(self) -> Option<usize> {
        match self {
            Format::Format10t
            | Format::Format10x
            | Format::Format11n
            | Format::Format11x
            | Format::Format12x => Some(1),
            Format::Format20bc
            | Format::Format20t
            | Format::Format21c
            | Format::Format21ih
            | Format::Format21lh
            | Format::Format21s
            | Format::Format21t
            | Format::Format22b
            | Format::Format22c
            | Format::Format22cs
            | Format::Format22s
            | Format::Format22t
            | Format::Format22x
            | Format::Format23x => Some(2),
            Format::Format30t
            | Format::Format31c
            | Format::Format31i
            | Format::Format31t
            | Format::Format32x
            | Format::Format35c
            | Format::Format35mi
            | Format::Format35ms
            | Format::Format3rc
            | Format::Format3rmi
            | Format::Format3rms => Some(3),
            Format::Format45cc | Format::Format4rcc => Some(4),
            Format::Format51l => Some(5),
            Format::PackedSwitchPayload | Format::SparseSwitchPayload | Format::ArrayPayload => {
                None
            }
        }
    }

    /// Returns `true` for the three data payload pseudo-formats
    #[must_use]
    pub fn is_payload(self) -> bool {
        self.size().is_none()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn size_matches_leading_digit() {
        for format in Format::iter().filter(|f| !f.is_payload()) {
            let digit = format.to_string().chars().next().unwrap();
            assert_eq!(
                format.size().unwrap(),
                digit.to_digit(10).unwrap() as usize,
                "{format}"
            );
        }
    }

    #[test]
    fn payloads_are_variable() {
        assert!(Format::ArrayPayload.is_payload());
        assert!(Format::PackedSwitchPayload.size().is_none());
        assert!(!Format::Format51l.is_payload());
    }
}
