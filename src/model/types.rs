//! Type descriptor helpers.
//!
//! DEX identifies types by their descriptor strings (`I`, `Ljava/lang/String;`, `[[J`, ...).
//! This module validates descriptors, derives method shorty strings and provides the
//! UTF-16 based string order the `string_ids` section is sorted by.

use std::cmp::Ordering;

use crate::Result;

/// Compare two strings by their UTF-16 code units.
///
/// The `string_ids` section (and everything sorted by string index, such as types) is
/// ordered this way. It only differs from plain `str` ordering when supplementary characters
/// are compared against characters in the `U+E000..=U+FFFF` range.
#[must_use]
pub fn utf16_cmp(left: &str, right: &str) -> Ordering {
    left.encode_utf16().cmp(right.encode_utf16())
}

/// Validate a field or parameter type descriptor.
///
/// `V` is only accepted when `allow_void` is set (return types).
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if the descriptor is empty, uses an unknown
/// primitive, is an unterminated class name or an array of `void`.
pub fn check_type_descriptor(descriptor: &str, allow_void: bool) -> Result<()> {
    let element = descriptor.trim_start_matches('[');
    let is_array = element.len() != descriptor.len();

    match element.as_bytes().first() {
        None => Err(invalid_argument!("Invalid type descriptor '{}'", descriptor)),
        Some(b'V') if element.len() == 1 && allow_void && !is_array => Ok(()),
        Some(b'Z' | b'B' | b'S' | b'C' | b'I' | b'J' | b'F' | b'D') if element.len() == 1 => Ok(()),
        Some(b'L') if element.len() > 2 && element.ends_with(';') => Ok(()),
        Some(_) => Err(invalid_argument!("Invalid type descriptor '{}'", descriptor)),
    }
}

/// Shorty character for a single type descriptor.
///
/// Reference types (`L...;`) and arrays (`[...`) both collapse to `L`.
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] for an empty descriptor.
pub fn shorty_char(descriptor: &str) -> Result<char> {
    match descriptor.chars().next() {
        Some('[' | 'L') => Ok('L'),
        Some(c) => Ok(c),
        None => Err(invalid_argument!("Empty type descriptor has no shorty")),
    }
}

/// Build the shorty descriptor of a method prototype: return type first, then one
/// character per parameter.
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if any descriptor is empty.
pub fn shorty_for<S: AsRef<str>>(parameter_types: &[S], return_type: &str) -> Result<String> {
    let mut shorty = String::with_capacity(parameter_types.len() + 1);
    shorty.push(shorty_char(return_type)?);
    for parameter in parameter_types {
        shorty.push(shorty_char(parameter.as_ref())?);
    }
    Ok(shorty)
}

/// Returns `true` for the eight primitive descriptors (excluding `V`)
#[must_use]
pub fn is_primitive(descriptor: &str) -> bool {
    matches!(descriptor, "Z" | "B" | "S" | "C" | "I" | "J" | "F" | "D")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorty_collapses_references() {
        let shorty = shorty_for(&["I", "Ljava/lang/String;", "[J", "Z"], "V").unwrap();
        assert_eq!(shorty, "VILLZ");
        assert_eq!(shorty_for::<&str>(&[], "[I").unwrap(), "L");
        assert!(shorty_char("").is_err());
    }

    #[test]
    fn descriptor_validation() {
        assert!(check_type_descriptor("I", false).is_ok());
        assert!(check_type_descriptor("[[Ljava/lang/Object;", false).is_ok());
        assert!(check_type_descriptor("V", true).is_ok());
        assert!(check_type_descriptor("V", false).is_err());
        assert!(check_type_descriptor("[V", true).is_err());
        assert!(check_type_descriptor("Lfoo", false).is_err());
        assert!(check_type_descriptor("Q", false).is_err());
        assert!(check_type_descriptor("", true).is_err());
    }

    #[test]
    fn utf16_order_differs_from_utf8() {
        // U+FF61 sorts after U+10000 in UTF-8 but before it in UTF-16
        let bmp = "\u{ff61}";
        let supplementary = "\u{10000}";
        assert_eq!(bmp.cmp(supplementary), Ordering::Less);
        assert_eq!(utf16_cmp(bmp, supplementary), Ordering::Greater);
        assert_eq!(utf16_cmp("a", "b"), Ordering::Less);
    }
}
