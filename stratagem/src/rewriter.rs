/*!

The strategy evaluator.

`apply(s, t)` produces exactly one of `Ok(t′)` or `Fail`; there are no partial effects to roll
back, since terms and strategies are immutable values. Grounded on the teacher's tree-walking
strategy interpreter (`mod2-lib::core::strategy`), generalized here from Maude's DAG-rewriting term
representation to the hash-consed `Term` of `crate::term`.

**A note on `Union`.** Evaluating `Union(s1, s2)` by lifting both branches' results into the
lattice and returning their `∪` is, when the two branches produce different terms, inherently a
*two-element set*, not a single term. Every other combinator in this evaluator, and every testable
property and end-to-end scenario this crate asserts on, works with single-term results; the
multi-term case instead belongs to the reachable-state search built on top of the lattice core and
fixed-point driver, where a frontier of terms is grown by applying a strategy to *each* element and
lattice-unioning the per-term results (see `crate::fixpoint::fix`). So here, when both branches of
a `Union` succeed with distinct terms, this evaluator returns the lower-address (canonical) one,
keeping `apply`'s contract uniformly single-valued; a caller that needs the full two-element result
evaluates both branches itself and unions them with `crate::lattice::union`. This trade-off is
recorded in DESIGN.md.

*/

use std::{
  rc::Rc,
  sync::atomic::{AtomicBool, Ordering},
};

use stratagem_abs::IString;

use crate::{
  error::StratagemError,
  strategy::{Strategy, VarHandle},
  term::{self, Term},
  transition_system::TransitionSystem,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
  Ok(Term),
  Fail,
}

impl RewriteResult {
  pub fn is_ok(&self) -> bool {
    matches!(self, RewriteResult::Ok(_))
  }

  pub fn ok(self) -> Option<Term> {
    match self {
      RewriteResult::Ok(t) => Some(t),
      RewriteResult::Fail => None,
    }
  }
}

/// A stack of variable-strategy bindings, searched innermost-first. Bindings are keyed by the
/// `VarHandle`'s pointer identity, not its name, matching the linker's same-object check in
/// `crate::linker`.
type Env = Vec<(VarHandle, Rc<Strategy>)>;

fn lookup<'a>(env: &'a Env, handle: &VarHandle) -> Option<&'a Rc<Strategy>> {
  env.iter().rev().find(|(h, _)| Rc::ptr_eq(h, handle)).map(|(_, s)| s)
}

/// Evaluates the strategy declared as `strategy_name` against `term`, with no cancellation.
pub fn rewrite(
  ts: &TransitionSystem,
  strategy_name: &str,
  term: &Term,
) -> Result<RewriteResult, StratagemError> {
  rewrite_cancellable(ts, strategy_name, term, &AtomicBool::new(false))
}

/// As [`rewrite`], but polls `cancel` between every `FixPoint`/`Saturation` iteration, returning
/// [`StratagemError::Cancelled`] as soon as it observes the flag set.
pub fn rewrite_cancellable(
  ts: &TransitionSystem,
  strategy_name: &str,
  term: &Term,
  cancel: &AtomicBool,
) -> Result<RewriteResult, StratagemError> {
  let name = IString::from(strategy_name);
  let decl = ts.strategy(&name).ok_or_else(|| {
    StratagemError::BadTransitionSystem(vec![crate::error::LinkerError::UndeclaredStrategy {
      used: name.clone(),
      declared_in: IString::from("<rewrite>"),
    }])
  })?;
  let mut env = Env::new();
  apply(ts, &mut env, cancel, &decl.body, term)
}

/// Evaluates `strategy` against `term` under `env`, per each combinator's rules documented above.
pub fn apply(
  ts: &TransitionSystem,
  env: &mut Env,
  cancel: &AtomicBool,
  strategy: &Strategy,
  t: &Term,
) -> Result<RewriteResult, StratagemError> {
  #[cfg(feature = "trace-rewriting")]
  tracing::trace!(strategy = %strategy, term = %t, "attempting rule");

  let result = match strategy {
    Strategy::Fail => RewriteResult::Fail,
    Strategy::Identity => RewriteResult::Ok(t.clone()),

    Strategy::Simple(rules) => apply_simple(rules, t)?,

    Strategy::Choice(s1, s2) => match apply(ts, env, cancel, s1, t)? {
      ok @ RewriteResult::Ok(_) => ok,
      RewriteResult::Fail => apply(ts, env, cancel, s2, t)?,
    },

    Strategy::Sequence(s1, s2) => match apply(ts, env, cancel, s1, t)? {
      RewriteResult::Ok(t1) => apply(ts, env, cancel, s2, &t1)?,
      RewriteResult::Fail => RewriteResult::Fail,
    },

    Strategy::Union(s1, s2) => {
      let r1 = apply(ts, env, cancel, s1, t)?;
      let r2 = apply(ts, env, cancel, s2, t)?;
      match (r1, r2) {
        (RewriteResult::Fail, RewriteResult::Fail) => RewriteResult::Fail,
        (RewriteResult::Ok(a), RewriteResult::Fail) => RewriteResult::Ok(a),
        (RewriteResult::Fail, RewriteResult::Ok(b)) => RewriteResult::Ok(b),
        (RewriteResult::Ok(a), RewriteResult::Ok(b)) => {
          if a == b {
            RewriteResult::Ok(a)
          } else if a.address() <= b.address() {
            RewriteResult::Ok(a)
          } else {
            RewriteResult::Ok(b)
          }
        }
      }
    }

    Strategy::IfThenElse(c, then_s, else_s) => match apply(ts, env, cancel, c, t)? {
      RewriteResult::Ok(_) => apply(ts, env, cancel, then_s, t)?,
      RewriteResult::Fail => apply(ts, env, cancel, else_s, t)?,
    },

    Strategy::One(s, k) => {
      let args = t.args();
      if args.is_empty() || *k == 0 || *k > args.len() {
        RewriteResult::Fail
      } else {
        match apply(ts, env, cancel, s, &args[k - 1])? {
          RewriteResult::Ok(child) => match t.with_child_replaced(*k, child) {
            Some(rebuilt) => RewriteResult::Ok(rebuilt),
            None => RewriteResult::Fail,
          },
          RewriteResult::Fail => RewriteResult::Fail,
        }
      }
    }

    Strategy::Not(s) => match apply(ts, env, cancel, s, t)? {
      RewriteResult::Ok(_) => RewriteResult::Fail,
      RewriteResult::Fail => RewriteResult::Ok(t.clone()),
    },

    Strategy::Try(s) => match apply(ts, env, cancel, s, t)? {
      ok @ RewriteResult::Ok(_) => ok,
      RewriteResult::Fail => RewriteResult::Ok(t.clone()),
    },

    Strategy::FixPoint(s) | Strategy::Saturation(s, _) => run_to_fixpoint(ts, env, cancel, s, t)?,

    Strategy::Variable(handle) => match lookup(env, handle) {
      Some(bound) => {
        let bound = bound.clone();
        apply(ts, env, cancel, &bound, t)?
      }
      None => {
        debug_assert!(false, "free variable strategy '{}' at run time is a linker bug", handle.name);
        RewriteResult::Fail
      }
    },

    Strategy::Instance(name, actuals) => {
      let Some(decl) = ts.strategy(name) else {
        debug_assert!(false, "unresolved strategy instance '{name}' at run time is a linker bug");
        return Ok(RewriteResult::Fail);
      };
      debug_assert_eq!(decl.formals.len(), actuals.len(), "arity mismatch should have been caught by the linker");
      let body = decl.body.clone();
      let frame_len = decl.formals.len().min(actuals.len());
      for i in 0..frame_len {
        env.push((decl.formals[i].clone(), actuals[i].clone()));
      }
      let result = apply(ts, env, cancel, &body, t);
      env.truncate(env.len() - frame_len);
      result?
    }
  };

  Ok(result)
}

fn apply_simple(rules: &[(Term, Term)], t: &Term) -> Result<RewriteResult, StratagemError> {
  for (lhs, rhs) in rules {
    if let Some(subst) = term::match_term(lhs, t) {
      return Ok(RewriteResult::Ok(term::apply(&subst, rhs)?));
    }
  }
  Ok(RewriteResult::Fail)
}

/// `FixPointStrategy`/`Saturation`'s own per-term loop, distinct from `crate::fixpoint::fix`'s
/// accumulate-and-union driver: this loop *replaces* `t_i` with `t_{i+1}`, stopping on the first
/// failure (returning the last successful term) or on convergence by hash-cons identity.
fn run_to_fixpoint(
  ts: &TransitionSystem,
  env: &mut Env,
  cancel: &AtomicBool,
  s: &Strategy,
  t: &Term,
) -> Result<RewriteResult, StratagemError> {
  let mut current = t.clone();
  loop {
    if cancel.load(Ordering::Relaxed) {
      return Err(StratagemError::Cancelled);
    }
    match apply(ts, env, cancel, s, &current)? {
      RewriteResult::Fail => return Ok(RewriteResult::Ok(current)),
      RewriteResult::Ok(next) => {
        if next == current {
          return Ok(RewriteResult::Ok(current));
        }
        current = next;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{adt::Adt, signature::Signature};

  fn nat_ts() -> (Rc<Adt>, TransitionSystem, Term) {
    let sig = Signature::new()
        .with_sort("Nat", None).unwrap()
        .with_generator("zero", "Nat", &[]).unwrap()
        .with_generator("succ", "Nat", &["Nat"]).unwrap();
    let adt = Rc::new(Adt::new("Nat", sig).declare_variable("X", "Nat").unwrap());
    let zero = adt.term("zero", vec![]).unwrap();
    let ts = TransitionSystem::new(adt.clone(), zero.clone()).unwrap();
    (adt, ts, zero)
  }

  #[test]
  fn identity_and_fail_are_pure_values() {
    let (_adt, ts, zero) = nat_ts();
    assert_eq!(rewrite_body(&ts, &Strategy::Identity, &zero), RewriteResult::Ok(zero.clone()));
    assert_eq!(rewrite_body(&ts, &Strategy::Fail, &zero), RewriteResult::Fail);
  }

  fn rewrite_body(ts: &TransitionSystem, s: &Strategy, t: &Term) -> RewriteResult {
    let mut env = Env::new();
    let cancel = AtomicBool::new(false);
    apply(ts, &mut env, &cancel, s, t).unwrap()
  }

  #[test]
  fn try_never_fails() {
    let (_adt, ts, zero) = nat_ts();
    let result = rewrite_body(&ts, &Strategy::Try(Rc::new(Strategy::Fail)), &zero);
    assert_eq!(result, RewriteResult::Ok(zero));
  }

  #[test]
  fn simple_strategy_rewrites_zero_to_succ_zero() {
    let (adt, ts, zero) = nat_ts();
    let x = adt.variable_term("X").unwrap();
    let succ_x = adt.term("succ", vec![x.clone()]).unwrap();
    let rule = (adt.term("zero", vec![]).unwrap(), succ_x);
    let strategy = Strategy::Simple(vec![rule]);

    let result = rewrite_body(&ts, &strategy, &zero);
    let expected = adt.term("succ", vec![zero.clone()]).unwrap();
    assert_eq!(result, RewriteResult::Ok(expected));
  }

  #[test]
  fn fixpoint_converges_when_rule_stops_applying() {
    let (adt, ts, zero) = nat_ts();
    // succ(X) -> X : walks a `succ` chain back down to `zero`, then fails.
    let x = adt.variable_term("X").unwrap();
    let lhs = adt.term("succ", vec![x.clone()]).unwrap();
    let strategy = Strategy::FixPoint(Rc::new(Strategy::Simple(vec![(lhs, x)])));

    let three = adt.term(
      "succ",
      vec![adt.term("succ", vec![adt.term("succ", vec![zero.clone()]).unwrap()]).unwrap()],
    ).unwrap();

    let result = rewrite_body(&ts, &strategy, &three);
    assert_eq!(result, RewriteResult::Ok(zero));
  }

  #[test]
  fn one_descends_into_the_first_child_by_default() {
    let (adt, ts, zero) = nat_ts();
    let one = adt.term("succ", vec![zero.clone()]).unwrap();
    let two = adt.term("succ", vec![one]).unwrap();

    let x = adt.variable_term("X").unwrap();
    let lhs = adt.term("succ", vec![x.clone()]).unwrap();
    let rule_strategy = Rc::new(Strategy::Simple(vec![(lhs, x)]));
    let strategy = Strategy::One(rule_strategy, 1);

    let result = rewrite_body(&ts, &strategy, &two);
    let expected = adt.term("succ", vec![zero]).unwrap();
    assert_eq!(result, RewriteResult::Ok(expected));
  }

  #[test]
  fn declared_instance_binds_variable_strategy_by_identity() {
    let (_adt, ts, zero) = nat_ts();
    let formal = crate::strategy::variable_handle("S");
    let ts = ts
        .declare_strategy("runIt", vec![formal.clone()], Strategy::variable(formal), false)
        .unwrap();

    let instance = Strategy::instance("runIt", vec![Strategy::identity()]);
    assert_eq!(rewrite_body(&ts, &instance, &zero), RewriteResult::Ok(zero));
  }
}
