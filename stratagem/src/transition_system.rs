/*!

An ADT, its initial state, and the ordered table of strategy declarations built over it.

The declaration table is an `indexmap::IndexMap` rather than a `std::collections::HashMap`
specifically because iteration order must be insertion order: the linker's accumulated-errors
invariant (repeated `link(ts)` yields byte-identical error sets) would not hold over a hash map,
whose iteration order is unspecified.

*/

use indexmap::IndexMap;
use std::rc::Rc;

use stratagem_abs::IString;

use crate::{
  adt::Adt,
  error::StratagemError,
  strategy::{variable_handle, DeclaredStrategy, Strategy},
  term::Term,
};

#[derive(Clone)]
pub struct TransitionSystem {
  adt: Rc<Adt>,
  initial_term: Term,
  strategies: IndexMap<IString, DeclaredStrategy>,
}

impl TransitionSystem {
  /// Fails with [`StratagemError::ForeignInitialTerm`] if `initial_term` was not built from `adt`.
  pub fn new(adt: Rc<Adt>, initial_term: Term) -> Result<Self, StratagemError> {
    if !Rc::ptr_eq(&adt, &initial_term.adt()) {
      return Err(StratagemError::ForeignInitialTerm);
    }
    Ok(TransitionSystem { adt, initial_term, strategies: IndexMap::new() })
  }

  pub fn adt(&self) -> &Rc<Adt> {
    &self.adt
  }

  pub fn initial_term(&self) -> &Term {
    &self.initial_term
  }

  /// Declares a strategy. Chainable: consumes and returns `self`. Re-declaring an already-used
  /// name fails immediately, rather than being deferred to `link`.
  pub fn declare_strategy(
    mut self,
    name: &str,
    formals: Vec<crate::strategy::VarHandle>,
    body: Rc<Strategy>,
    is_transition: bool,
  ) -> Result<Self, StratagemError> {
    let name_istr = IString::from(name);
    if self.strategies.contains_key(&name_istr) {
      return Err(StratagemError::DuplicateStrategyName(name_istr));
    }
    tracing::debug!(strategy = %name_istr, is_transition, "declaring strategy");
    self
        .strategies
        .insert(name_istr.clone(), DeclaredStrategy { name: name_istr, formals, body, is_transition });
    Ok(self)
  }

  /// Registers the library-sugar `repeat(s)` strategy: `Try(Sequence(s, repeat(s)))`, realised
  /// through a self-referential declaration rather than literal infinite AST unrolling.
  /// Callers invoke it with `Strategy::instance("repeat", vec![s])`.
  pub fn with_builtin_repeat(self) -> Result<Self, StratagemError> {
    let s = variable_handle("s");
    let body = Strategy::try_(Strategy::sequence(
      Strategy::variable(s.clone()),
      Strategy::instance("repeat", vec![Strategy::variable(s.clone())]),
    ));
    self.declare_strategy("repeat", vec![s], body, false)
  }

  pub fn strategy(&self, name: &IString) -> Option<&DeclaredStrategy> {
    self.strategies.get(name)
  }

  pub fn declarations(&self) -> impl Iterator<Item = &DeclaredStrategy> {
    self.strategies.values()
  }

  pub fn transition_strategies(&self) -> impl Iterator<Item = &DeclaredStrategy> {
    self.strategies.values().filter(|d| d.is_transition)
  }
}
