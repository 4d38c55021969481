//! Access flags and annotation visibility for DEX members.
//!
//! # Key Types
//! - [`AccessFlags`]: `access_flags` bits shared by classes, fields and methods
//! - [`AnnotationVisibility`]: visibility byte of an `annotation_item`

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::Result;

bitflags! {
    /// Access flags of a class, field or method.
    ///
    /// Several bits are reused with a different meaning depending on the member kind
    /// (`VOLATILE`/`BRIDGE`, `TRANSIENT`/`VARARGS`), exactly as in the `access_flags`
    /// definitions of the DEX format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct AccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Only visible to the defining class
        const PRIVATE = 0x0002;
        /// Visible to package and subclasses
        const PROTECTED = 0x0004;
        /// Not bound to an instance
        const STATIC = 0x0008;
        /// Not subclassable / overridable / assignable after construction
        const FINAL = 0x0010;
        /// Associated lock acquired around calls (native methods only)
        const SYNCHRONIZED = 0x0020;
        /// Special access rules for thread safety (fields)
        const VOLATILE = 0x0040;
        /// Bridge method generated by the compiler
        const BRIDGE = 0x0040;
        /// Not saved by default serialization (fields)
        const TRANSIENT = 0x0080;
        /// Last argument treated as "rest" argument (methods)
        const VARARGS = 0x0080;
        /// Implemented in native code
        const NATIVE = 0x0100;
        /// Multiply-implementable abstract class
        const INTERFACE = 0x0200;
        /// Not directly instantiable / unimplemented
        const ABSTRACT = 0x0400;
        /// Strict floating point rules
        const STRICT = 0x0800;
        /// Not directly defined in source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation class
        const ANNOTATION = 0x2000;
        /// Declared as an enumerated type or value
        const ENUM = 0x4000;
        /// Constructor method (class or instance initializer)
        const CONSTRUCTOR = 0x1_0000;
        /// Declared `synchronized`
        const DECLARED_SYNCHRONIZED = 0x2_0000;
    }
}

impl AccessFlags {
    /// Returns `true` if a method with these flags belongs in the `direct_methods` list.
    ///
    /// Direct methods are static, private or constructors; everything else is virtual.
    #[must_use]
    pub fn is_direct_method(self) -> bool {
        self.intersects(AccessFlags::STATIC | AccessFlags::PRIVATE | AccessFlags::CONSTRUCTOR)
    }
}

/// Visibility of an annotation, stored as the leading byte of an `annotation_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum AnnotationVisibility {
    /// Only intended to be visible at build time
    #[strum(serialize = "build")]
    Build = 0,
    /// Intended to be visible at runtime
    #[strum(serialize = "runtime")]
    Runtime = 1,
    /// Intended to be visible to the underlying system at runtime
    #[strum(serialize = "system")]
    System = 2,
}

impl AnnotationVisibility {
    /// Raw value written to the annotation item
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Decode a raw visibility byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for values other than 0, 1 and 2.
    pub fn from_value(value: u8) -> Result<Self> {
        match value {
            0 => Ok(AnnotationVisibility::Build),
            1 => Ok(AnnotationVisibility::Runtime),
            2 => Ok(AnnotationVisibility::System),
            _ => Err(invalid_argument!("Invalid annotation visibility {}", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_method_classification() {
        assert!(AccessFlags::STATIC.is_direct_method());
        assert!(AccessFlags::PRIVATE.is_direct_method());
        assert!((AccessFlags::PUBLIC | AccessFlags::CONSTRUCTOR).is_direct_method());
        assert!(!(AccessFlags::PUBLIC | AccessFlags::FINAL).is_direct_method());
    }

    #[test]
    fn overlapping_member_bits() {
        assert_eq!(AccessFlags::VOLATILE.bits(), AccessFlags::BRIDGE.bits());
        assert_eq!(AccessFlags::TRANSIENT.bits(), AccessFlags::VARARGS.bits());
    }

    #[test]
    fn visibility_round_trip() {
        for raw in 0..3u8 {
            assert_eq!(AnnotationVisibility::from_value(raw).unwrap().value(), raw);
        }
        assert!(AnnotationVisibility::from_value(3).is_err());
        assert_eq!(AnnotationVisibility::Runtime.to_string(), "runtime");
    }
}
