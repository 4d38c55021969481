#![allow(unused_macros)]

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let sealed = read_lock!(self.sealed);
///  if *sealed { ... }
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().expect("Failed to acquire read lock")
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  let mut sealed = write_lock!(self.sealed);
///  *sealed = true;
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().expect("Failed to acquire write lock")
    };
}
