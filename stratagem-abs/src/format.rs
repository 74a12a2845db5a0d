/*!

There are different text representations possible for terms, strategies, and sorts depending on
context (a stable debug dump vs. a form that round-trips as an input expression). This module
provides a unified API for formatting such objects across the crate, following the same shape as
the teacher project's `core::format` module.

`Formattable` plays the role `Display` would if `Display` could be implemented piecewise for
third-party style parameters; `impl_display_debug_for_formattable!` wires a type's `Formattable`
impl into real `Display` and `Debug` impls.

*/

use std::fmt::Debug;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum FormatStyle {
  #[default]
  Default,
  /// Render as a valid input expression where possible.
  Input,
  /// Render with extra diagnostic detail.
  Debug,
}

pub trait Formattable {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result;
}

#[macro_export]
macro_rules! impl_display_debug_for_formattable {
    ($t:ty) => {
        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                <$t as $crate::Formattable>::repr(self, f, $crate::FormatStyle::Default)
            }
        }

        impl std::fmt::Debug for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                <$t as $crate::Formattable>::repr(self, f, $crate::FormatStyle::Debug)
            }
        }
    };
}
pub use impl_display_debug_for_formattable;
