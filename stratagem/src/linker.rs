/*!

Static validation of a [`TransitionSystem`]'s strategy declarations.

Checks every declared strategy's body for: unresolved `DeclaredStrategyInstance` references,
actual/formal arity mismatches, `VariableStrategy` nodes that are not the same object as one of
the owning declaration's formals, and illegal forms nested under `Not`. Every violation is
collected; nothing is raised on the first failure, so diagnostics are deterministic across repeated
runs.

Grounded on the teacher's two-pass linking approach in `mod2-lib` (construct, then validate
cross-references in a separate pass over the fully-built structure), here realised as a read-only
walk over an already-built [`TransitionSystem`] rather than a mutating resolution pass, since this
crate's declarations are frozen before `link`/`diagnose` ever runs.

*/

use std::{collections::HashSet, rc::Rc};

use stratagem_abs::IString;

use crate::{
  error::{LinkerError, StratagemError},
  strategy::{DeclaredStrategy, Strategy},
  transition_system::TransitionSystem,
};

/// Runs every check described in this module's docs against `ts` and returns `Err` with every
/// diagnostic found, or `Ok` if the transition system is well-formed.
pub fn link(ts: &TransitionSystem) -> Result<(), StratagemError> {
  let errors = collect_errors(ts);
  if errors.is_empty() {
    Ok(())
  } else {
    Err(StratagemError::BadTransitionSystem(errors))
  }
}

/// An alias for [`link`]: both are read-only and produce byte-identical results on repeated
/// invocation, so there is no separate "fix up and recheck" phase to distinguish them by.
pub fn diagnose(ts: &TransitionSystem) -> Result<(), StratagemError> {
  link(ts)
}

fn collect_errors(ts: &TransitionSystem) -> Vec<LinkerError> {
  let mut errors = Vec::new();
  for decl in ts.declarations() {
    walk_body(ts, decl, &decl.body, &mut errors);
  }
  errors
}

fn walk_body(ts: &TransitionSystem, decl: &DeclaredStrategy, node: &Strategy, errors: &mut Vec<LinkerError>) {
  match node {
    Strategy::Fail | Strategy::Identity | Strategy::Simple(_) => {}
    Strategy::Choice(a, b) | Strategy::Sequence(a, b) | Strategy::Union(a, b) => {
      walk_body(ts, decl, a, errors);
      walk_body(ts, decl, b, errors);
    }
    Strategy::IfThenElse(c, t, e) => {
      walk_body(ts, decl, c, errors);
      walk_body(ts, decl, t, errors);
      walk_body(ts, decl, e, errors);
    }
    Strategy::One(s, _) | Strategy::Try(s) | Strategy::FixPoint(s) | Strategy::Saturation(s, _) => {
      walk_body(ts, decl, s, errors);
    }
    Strategy::Not(inner) => {
      let mut visited = HashSet::new();
      if !allowed_under_not(ts, inner, &mut visited) {
        errors.push(LinkerError::IllegalUnderNot { found: inner.to_string() });
      }
      walk_body(ts, decl, inner, errors);
    }
    Strategy::Variable(handle) => {
      if !decl.formals.iter().any(|f| Rc::ptr_eq(f, handle)) {
        errors.push(LinkerError::UnboundStrategyVariable { name: handle.name.clone() });
      }
    }
    Strategy::Instance(name, actuals) => {
      check_instance(ts, decl.name.clone(), name, actuals.len(), errors);
      for actual in actuals {
        walk_body(ts, decl, actual, errors);
      }
    }
  }
}

fn check_instance(
  ts: &TransitionSystem,
  declared_in: IString,
  name: &IString,
  found_arity: usize,
  errors: &mut Vec<LinkerError>,
) {
  match ts.strategy(name) {
    None => errors.push(LinkerError::UndeclaredStrategy { used: name.clone(), declared_in }),
    Some(target) => {
      if target.formals.len() != found_arity {
        errors.push(LinkerError::ArityMismatch {
          name: name.clone(),
          required: target.formals.len(),
          found: found_arity,
        });
      }
    }
  }
}

/// Whether `node` is a legal immediate child of `Not`: a `SimpleStrategy`, a nested `Not`, a
/// variable strategy, or a zero-argument declared instance whose own body recursively obeys this
/// same restriction. `visited` guards against self-referential declarations (e.g. `repeat` calling
/// itself by name): revisiting a name already on the current path is treated as satisfying the
/// restriction rather than looping forever.
fn allowed_under_not(ts: &TransitionSystem, node: &Strategy, visited: &mut HashSet<IString>) -> bool {
  match node {
    Strategy::Simple(_) => true,
    Strategy::Variable(_) => true,
    Strategy::Not(inner) => allowed_under_not(ts, inner, visited),
    Strategy::Instance(name, actuals) if actuals.is_empty() => {
      if !visited.insert(name.clone()) {
        return true;
      }
      match ts.strategy(name) {
        Some(target) => allowed_under_not(ts, &target.body, visited),
        None => false,
      }
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{adt::Adt, signature::Signature, strategy::variable_handle};

  fn minimal_ts() -> TransitionSystem {
    let sig = Signature::new().with_sort("S", None).unwrap().with_generator("p0", "S", &[]).unwrap();
    let adt = Rc::new(Adt::new("minimal", sig));
    let p0 = adt.term("p0", vec![]).unwrap();
    TransitionSystem::new(adt, p0).unwrap()
  }

  #[test]
  fn undeclared_strategy_is_reported() {
    let s1 = variable_handle("S1");
    let body = Strategy::instance("try", vec![Strategy::variable(s1.clone())]);
    let ts = minimal_ts()
        .declare_strategy("newStrategy", vec![s1], body, false)
        .unwrap();

    let err = link(&ts).unwrap_err();
    let crate::error::StratagemError::BadTransitionSystem(errors) = err else { panic!() };
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().starts_with("Usage of invalid strategy try in declared strategy newStrategy"));
  }

  #[test]
  fn arity_mismatch_is_reported() {
    let s1 = variable_handle("S1");
    let ts = minimal_ts()
        .declare_strategy("try", vec![s1.clone()], Strategy::identity(), false)
        .unwrap();

    let s1b = variable_handle("S1");
    let s2 = variable_handle("S2");
    let body = Strategy::instance("try", vec![Strategy::variable(s1b.clone()), Strategy::variable(s2)]);
    let ts = ts.declare_strategy("newStrategy", vec![s1b], body, false).unwrap();

    let err = link(&ts).unwrap_err();
    let crate::error::StratagemError::BadTransitionSystem(errors) = err else { panic!() };
    assert!(errors[0].to_string().starts_with("Invalid number of parameters for strategy try. Required Set{1}, found Set{2}"));
  }

  #[test]
  fn foreign_variable_strategy_is_reported() {
    let s1 = variable_handle("S1");
    let ts = minimal_ts()
        .declare_strategy("try", vec![s1], Strategy::identity(), false)
        .unwrap();

    let newstrategy_s1 = variable_handle("S1");
    let foreign_s2 = variable_handle("S2");
    let body = Strategy::instance("try", vec![Strategy::variable(foreign_s2)]);
    let ts = ts.declare_strategy("newStrategy", vec![newstrategy_s1], body, false).unwrap();

    let err = link(&ts).unwrap_err();
    let crate::error::StratagemError::BadTransitionSystem(errors) = err else { panic!() };
    assert!(errors[0]
        .to_string()
        .ends_with("Strategy variable name 'S2' is not in declaration. If you wanted to use a declared strategy you need to append parentheses to it, like this: S2()"));
  }

  #[test]
  fn well_formed_declarations_link_cleanly() {
    let s1 = variable_handle("S1");
    let ts = minimal_ts()
        .declare_strategy("goToWaitPhilo", vec![], Strategy::identity(), true)
        .unwrap()
        .declare_strategy("takeRightForkFromWaitingPhilo", vec![], Strategy::identity(), true)
        .unwrap()
        .declare_strategy("helper", vec![s1.clone()], Strategy::variable(s1), false)
        .unwrap();
    assert!(link(&ts).is_ok());
  }
}
