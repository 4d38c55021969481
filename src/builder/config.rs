//! Construction session configuration.

/// Options of a [`crate::DexBuilder`] session.
///
/// # Examples
///
/// ```rust
/// use dexbuilder::{BuilderConfig, DexBuilder};
///
/// let config = BuilderConfig {
///     api_level: 21,
///     ..BuilderConfig::lenient()
/// };
/// let builder = DexBuilder::with_config(config);
/// assert!(builder.config().lenient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Skip fields and methods that fail to intern instead of failing the whole class.
    ///
    /// Skipped items are logged and recorded in [`crate::DexBuilder::diagnostics`]. Errors
    /// about the class itself (duplicate type, malformed class data) still propagate.
    pub lenient: bool,
    /// Target Android API level; instructions introduced after it are rejected
    pub api_level: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl BuilderConfig {
    /// Every error propagates; API level 28
    #[must_use]
    pub const fn strict() -> Self {
        BuilderConfig {
            lenient: false,
            api_level: 28,
        }
    }

    /// Field and method errors are downgraded to diagnostics; API level 28
    #[must_use]
    pub const fn lenient() -> Self {
        BuilderConfig {
            lenient: true,
            api_level: 28,
        }
    }
}
