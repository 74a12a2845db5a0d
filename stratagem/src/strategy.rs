/*!

The strategy combinator algebra: the AST nodes and the declarations that name them.

A closed, tagged variant, printed canonically and stably since the linker (`crate::linker`) quotes
strategy text verbatim in its diagnostics. Grounded on the teacher's `core::strategy::Strategy`
enum (`mod2-lib::core::strategy`), which plays the same "tagged AST, evaluated by a tree-walking
interpreter" role for Maude's strategy language.

*/

use std::{
  fmt::{self, Write},
  rc::Rc,
};

use stratagem_abs::{impl_display_debug_for_formattable, FormatStyle, Formattable, IString};

use crate::term::Term;

/// A formal variable-strategy parameter. Declared once per [`DeclaredStrategy`]; every
/// `Strategy::Variable` node that is meant to refer to it holds a clone of this same `Rc`, so
/// "same object" (matching the linker's identity check in `crate::linker`) is `Rc::ptr_eq`, not
/// name comparison.
#[derive(Debug)]
pub struct VariableHandle {
  pub name: IString,
}

pub type VarHandle = Rc<VariableHandle>;

pub fn variable_handle(name: &str) -> VarHandle {
  Rc::new(VariableHandle { name: IString::from(name) })
}

#[derive(Clone, Debug)]
pub enum Strategy {
  Fail,
  Identity,
  /// `rules` is a non-empty ordered list of (left-hand pattern, right-hand pattern) rewrite rules;
  /// the first whose left-hand side matches wins.
  Simple(Vec<(Term, Term)>),
  Choice(Rc<Strategy>, Rc<Strategy>),
  Sequence(Rc<Strategy>, Rc<Strategy>),
  Union(Rc<Strategy>, Rc<Strategy>),
  IfThenElse(Rc<Strategy>, Rc<Strategy>, Rc<Strategy>),
  /// `k` is one-based; `k == 0` never occurs (`Strategy::one` rejects it).
  One(Rc<Strategy>, usize),
  Not(Rc<Strategy>),
  /// Evaluated identically to `Choice(s, Identity)`, kept as its own variant because it is a
  /// primitive in its own right, not sugar built from `Choice`.
  Try(Rc<Strategy>),
  FixPoint(Rc<Strategy>),
  /// Semantically equivalent to `FixPoint` on a single term; distinguished because the
  /// lattice-level fixed-point driver (`crate::fixpoint`) dispatches on this variant when lifting
  /// to a working set.
  Saturation(Rc<Strategy>, usize),
  Variable(VarHandle),
  /// `DeclaredStrategyInstance(name, actuals)`.
  Instance(IString, Vec<Rc<Strategy>>),
}

impl Strategy {
  pub fn fail() -> Rc<Strategy> {
    Rc::new(Strategy::Fail)
  }
  pub fn identity() -> Rc<Strategy> {
    Rc::new(Strategy::Identity)
  }
  pub fn simple(rules: Vec<(Term, Term)>) -> Rc<Strategy> {
    debug_assert!(!rules.is_empty(), "SimpleStrategy requires at least one rule");
    Rc::new(Strategy::Simple(rules))
  }
  pub fn choice(s1: Rc<Strategy>, s2: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::Choice(s1, s2))
  }
  pub fn sequence(s1: Rc<Strategy>, s2: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::Sequence(s1, s2))
  }
  pub fn union(s1: Rc<Strategy>, s2: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::Union(s1, s2))
  }
  pub fn if_then_else(c: Rc<Strategy>, t: Rc<Strategy>, e: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::IfThenElse(c, t, e))
  }
  /// `k` is one-based. Panics if `k == 0`.
  pub fn one(s: Rc<Strategy>, k: usize) -> Rc<Strategy> {
    assert!(k > 0, "One's child index is one-based");
    Rc::new(Strategy::One(s, k))
  }
  /// `One(s, 1)`, the default when the source's `One` combinator omits its index.
  pub fn one_first(s: Rc<Strategy>) -> Rc<Strategy> {
    Strategy::one(s, 1)
  }
  pub fn not(s: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::Not(s))
  }
  pub fn try_(s: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::Try(s))
  }
  pub fn fix_point(s: Rc<Strategy>) -> Rc<Strategy> {
    Rc::new(Strategy::FixPoint(s))
  }
  pub fn saturation(s: Rc<Strategy>, n: usize) -> Rc<Strategy> {
    Rc::new(Strategy::Saturation(s, n))
  }
  pub fn variable(handle: VarHandle) -> Rc<Strategy> {
    Rc::new(Strategy::Variable(handle))
  }
  pub fn instance(name: &str, actuals: Vec<Rc<Strategy>>) -> Rc<Strategy> {
    Rc::new(Strategy::Instance(IString::from(name), actuals))
  }
}

/// A named strategy declaration.
#[derive(Clone, Debug)]
pub struct DeclaredStrategy {
  pub name: IString,
  pub formals: Vec<VarHandle>,
  pub body: Rc<Strategy>,
  /// Distinguishes a top-level transition relation from an auxiliary helper strategy.
  pub is_transition: bool,
}

impl Formattable for Strategy {
  fn repr(&self, out: &mut dyn Write, style: FormatStyle) -> fmt::Result {
    match self {
      Strategy::Fail => write!(out, "Fail"),
      Strategy::Identity => write!(out, "Identity"),
      Strategy::Simple(rules) => write!(out, "SimpleStrategy({} rule(s))", rules.len()),
      Strategy::Choice(a, b) => {
        write!(out, "Choice(")?;
        a.repr(out, style)?;
        write!(out, ", ")?;
        b.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::Sequence(a, b) => {
        write!(out, "Sequence(")?;
        a.repr(out, style)?;
        write!(out, ", ")?;
        b.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::Union(a, b) => {
        write!(out, "Union(")?;
        a.repr(out, style)?;
        write!(out, ", ")?;
        b.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::IfThenElse(c, t, e) => {
        write!(out, "IfThenElse(")?;
        c.repr(out, style)?;
        write!(out, ", ")?;
        t.repr(out, style)?;
        write!(out, ", ")?;
        e.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::One(s, k) => {
        write!(out, "One(")?;
        s.repr(out, style)?;
        write!(out, ", {k})")
      }
      Strategy::Not(s) => {
        write!(out, "Not(")?;
        s.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::Try(s) => {
        write!(out, "Try(")?;
        s.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::FixPoint(s) => {
        write!(out, "FixPointStrategy(")?;
        s.repr(out, style)?;
        write!(out, ")")
      }
      Strategy::Saturation(s, n) => {
        write!(out, "Saturation(")?;
        s.repr(out, style)?;
        write!(out, ", {n})")
      }
      Strategy::Variable(handle) => write!(out, "{}", handle.name),
      Strategy::Instance(name, actuals) => {
        write!(out, "{name}(")?;
        for (i, a) in actuals.iter().enumerate() {
          if i > 0 {
            write!(out, ", ")?;
          }
          a.repr(out, style)?;
        }
        write!(out, ")")
      }
    }
  }
}
impl_display_debug_for_formattable!(Strategy);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn variable_handle_identity_is_by_rc_not_name() {
    let a = variable_handle("S1");
    let b = variable_handle("S1");
    assert_eq!(a.name, b.name);
    assert!(!Rc::ptr_eq(&a, &b));
  }

  #[test]
  fn display_is_canonical() {
    let s = Strategy::choice(Strategy::fail(), Strategy::identity());
    assert_eq!(format!("{s}"), "Choice(Fail, Identity)");
  }

  #[test]
  fn one_default_index_helper() {
    let s = Strategy::one_first(Strategy::identity());
    assert_eq!(format!("{s}"), "One(Identity, 1)");
  }
}
