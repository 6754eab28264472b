//! Crate-wide error handling.
//!
//! Structural recoveries (a failed UTF-16 decode, a predicate that doesn't
//! hold, a pointer that leads out of any region) are never represented here —
//! they collapse to `None` fields on a record and the record survives. These
//! types and macros exist for the other two buckets: input errors (bad CLI
//! arguments, an unreadable dump directory) and internal invariants (a
//! corrupt offsets table), which do abort the operation that hit them.

pub type Result<T> = anyhow::Result<T>;
pub type EmptyRes = Result<()>;

/// Early-return an `Err(anyhow!(...))` from the current function.
macro_rules! err {
    ($($arg:tt)*) => {
        return Err(anyhow::anyhow!($($arg)*))
    };
}

/// `err!` unless `$cond` holds.
macro_rules! require {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) { err!($($arg)*) }
    };
}

pub use err;
pub use require;
