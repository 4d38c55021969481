use thiserror::Error;

macro_rules! invalid_argument {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidArgument {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! duplicate_definition {
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::DuplicateDefinition(format!($fmt, $($arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every fallible operation of a construction session reports one of these variants. By default
/// all of them propagate to the caller of [`crate::DexBuilder`] and abort the construction of the
/// current class. In lenient mode (see [`crate::BuilderConfig`]) errors raised while interning a
/// single field or method are recorded as diagnostics and the offending item is skipped instead.
///
/// # Error Categories
///
/// ## Construction Errors
/// - [`Error::DuplicateDefinition`] - A class type was interned twice, or a class holds two
///   members with the same descriptor
/// - [`Error::InvalidArgument`] - Malformed input (bad operand ranges, mismatched formats, ...)
/// - [`Error::UnsupportedReferenceKind`] - A reference kind the pools cannot intern
///
/// ## Slot Errors
/// - [`Error::IndexAlreadyAssigned`] - A write-once index/offset slot was written twice
/// - [`Error::IndexNotAssigned`] - A slot was read before the writer assigned it
///
/// ## Session State Errors
/// - [`Error::PoolSealed`] - Interning a class after the sorted class view was materialized
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use dexbuilder::{model::AnnotationSet, DexBuilder, Error};
///
/// let builder = DexBuilder::new();
/// let none = AnnotationSet::new();
/// builder.intern_class_def_parts("LFoo;", 0, None, &[], None, &none, vec![], vec![])?;
///
/// match builder.intern_class_def_parts("LFoo;", 0, None, &[], None, &none, vec![], vec![]) {
///     Err(Error::DuplicateDefinition(message)) => println!("rejected: {message}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// # Ok::<(), dexbuilder::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A definition was interned twice.
    ///
    /// DEX has no notion of two classes sharing a type name, and no class may contain two
    /// fields or two methods with the same descriptor. The message names the offending
    /// descriptor.
    #[error("Duplicate definition - {0}")]
    DuplicateDefinition(String),

    /// The provided input is malformed.
    ///
    /// Raised for missing required values, operands that do not fit their instruction format,
    /// opcodes used with the wrong format or above the configured API level, and inconsistent
    /// collection lengths. The error includes the source location where the problem was
    /// detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was invalid
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invalid argument - {file}:{line}: {message}")]
    InvalidArgument {
        /// The message to be printed for the InvalidArgument error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The reference kind can not be interned by this builder.
    ///
    /// Only string, type, field, method and method prototype references have pools. Method
    /// handles and call sites are rejected with this error.
    #[error("Unsupported reference kind - {0}")]
    UnsupportedReferenceKind(String),

    /// A write-once index or offset slot was assigned a second time.
    #[error("Index or offset slot was already assigned")]
    IndexAlreadyAssigned,

    /// An index or offset slot was read before it was assigned.
    #[error("Index or offset slot has not been assigned yet")]
    IndexNotAssigned,

    /// The class pool no longer accepts new classes.
    ///
    /// The sorted class view is computed once; after it was read, further class interning is
    /// rejected so the view can never go stale.
    #[error("The class pool is sealed, no further classes can be interned")]
    PoolSealed,

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically
    /// when trying to acquire a mutex or rwlock that is in an invalid state.
    #[error("Failed to lock target")]
    LockError,
}
