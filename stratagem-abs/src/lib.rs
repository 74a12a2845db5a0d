/*!

Types and type aliases that abstract over the implementing backing type, mirroring the role the
teacher project's `mod2-abs` crate plays for `mod2-lib`: a leaf crate of small, independently
useful utilities that the rest of the workspace builds on, so that a change of backing
implementation (which string-interning crate, which bitset crate) stays local to this crate.

*/

mod format;
mod nat_set;
mod weak_cache;

pub use format::{impl_display_debug_for_formattable, FormatStyle, Formattable};
pub use nat_set::NatSet;
pub use weak_cache::WeakCache;

/// Interned string. Two `IString`s referring to the same text compare equal in O(1) and can be
/// hashed and cloned cheaply; sort names, operation names, and variable names are all `IString`s.
pub use string_cache::DefaultAtom as IString;

// Re-exported so downstream crates depend on a single `tracing` version.
pub use tracing;
