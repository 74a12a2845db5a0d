//! End-to-end scenarios, colocated the way the teacher project keeps its own top-level
//! integration scenarios under `mod2::tests` rather than scattering them across unit tests.

use std::rc::Rc;

use crate::{
  adt::Adt,
  linker,
  rewriter::{self, RewriteResult},
  signature::Signature,
  strategy::{variable_handle, Strategy},
  transition_system::TransitionSystem,
};

/// Scenario 1: a dining-philosophers-shaped signature with six declared (but unimplemented)
/// transition strategies links cleanly.
#[test]
fn philosophers_declaration_only() {
  let sig = Signature::new()
      .with_sort("ph", None).unwrap()
      .with_sort("state", None).unwrap()
      .with_sort("fork", None).unwrap()
      .with_generator("eating", "state", &[]).unwrap()
      .with_generator("thinking", "state", &[]).unwrap()
      .with_generator("waiting", "state", &[]).unwrap()
      .with_generator("waitingForLeftFork", "state", &[]).unwrap()
      .with_generator("waitingForRightFork", "state", &[]).unwrap()
      .with_generator("forkUsed", "fork", &[]).unwrap()
      .with_generator("forkFree", "fork", &[]).unwrap()
      .with_generator("emptytable", "ph", &[]).unwrap()
      .with_generator("philo", "ph", &["state", "fork", "ph"]).unwrap();

  let adt = Rc::new(Adt::new("philosophers", sig));
  let table = adt.term("emptytable", vec![]).unwrap();
  let ts = TransitionSystem::new(adt, table).unwrap();

  let strategy_names = [
    "goToWaitPhilo",
    "takeRightForkFromWaitingPhilo",
    "takeLeftForkFromWaitingRightForkPhilo",
    "takeRightForkFromWaitingLeftForkPhilo",
    "goToEatPhilo",
    "goToThinkPhilo",
  ];

  let ts = strategy_names.iter().copied().try_fold(ts, |ts, name| {
    ts.declare_strategy(name, vec![], Strategy::identity(), true)
  }).unwrap();

  assert!(linker::link(&ts).is_ok());
}

fn one_generator_ts() -> TransitionSystem {
  let sig = Signature::new().with_sort("S", None).unwrap().with_generator("p0", "S", &[]).unwrap();
  let adt = Rc::new(Adt::new("minimal", sig));
  let p0 = adt.term("p0", vec![]).unwrap();
  TransitionSystem::new(adt, p0).unwrap()
}

/// Scenario 2: an instance reference to an undeclared strategy is reported by name.
#[test]
fn undeclared_strategy_reference() {
  let s1 = variable_handle("S1");
  let body = Strategy::instance("try", vec![Strategy::variable(s1.clone())]);
  let ts = one_generator_ts().declare_strategy("newStrategy", vec![s1], body, false).unwrap();

  let err = linker::link(&ts).unwrap_err();
  let crate::StratagemError::BadTransitionSystem(errors) = err else { panic!("wrong error kind") };
  assert_eq!(errors.len(), 1);
  assert!(errors[0]
      .to_string()
      .starts_with("Usage of invalid strategy try in declared strategy newStrategy"));
}

/// Scenario 3: calling a declared strategy with the wrong number of actual parameters.
#[test]
fn strategy_instance_arity_mismatch() {
  let try_formal = variable_handle("S1");
  let ts = one_generator_ts()
      .declare_strategy("try", vec![try_formal], Strategy::identity(), false)
      .unwrap();

  let s1 = variable_handle("S1");
  let s2 = variable_handle("S2");
  let body = Strategy::instance("try", vec![Strategy::variable(s1.clone()), Strategy::variable(s2)]);
  let ts = ts.declare_strategy("newStrategy", vec![s1], body, false).unwrap();

  let err = linker::link(&ts).unwrap_err();
  let crate::StratagemError::BadTransitionSystem(errors) = err else { panic!("wrong error kind") };
  assert!(errors[0]
      .to_string()
      .starts_with("Invalid number of parameters for strategy try. Required Set{1}, found Set{2}"));
}

/// Scenario 4: a variable strategy referencing an object that is not one of the owning
/// declaration's formals, even though it shares a name with one, is rejected.
#[test]
fn variable_strategy_identity_mismatch() {
  let try_formal = variable_handle("S1");
  let ts = one_generator_ts()
      .declare_strategy("try", vec![try_formal], Strategy::identity(), false)
      .unwrap();

  let newstrategy_s1 = variable_handle("S1");
  let foreign_s2 = variable_handle("S2"); // never declared as anyone's formal
  let body = Strategy::instance("try", vec![Strategy::variable(foreign_s2)]);
  let ts = ts.declare_strategy("newStrategy", vec![newstrategy_s1], body, false).unwrap();

  let err = linker::link(&ts).unwrap_err();
  let crate::StratagemError::BadTransitionSystem(errors) = err else { panic!("wrong error kind") };
  assert!(errors[0].to_string().ends_with(
    "Strategy variable name 'S2' is not in declaration. If you wanted to use a declared strategy you need to append parentheses to it, like this: S2()"
  ));
}

/// Scenario 5: redeclaring a strategy name on the same transition system is a construction-time
/// error, not a deferred linker diagnostic.
#[test]
fn duplicate_strategy_declaration_fails_immediately() {
  let ts = one_generator_ts()
      .declare_strategy("goToWaitPhilo", vec![], Strategy::identity(), true)
      .unwrap();

  let err = ts.declare_strategy("goToWaitPhilo", vec![], Strategy::identity(), true).unwrap_err();
  assert!(matches!(err, crate::StratagemError::DuplicateStrategyName(_)));
}

/// Scenario 6: an initial term drawn from a different (even structurally identical) ADT is
/// rejected immediately, not deferred to the linker.
#[test]
fn cross_adt_initial_term_fails_immediately() {
  let sig = || Signature::new().with_sort("S", None).unwrap().with_generator("p0", "S", &[]).unwrap();
  let adt1 = Rc::new(Adt::new("adt1", sig()));
  let adt2 = Rc::new(Adt::new("adt2", sig()));
  let foreign_initial = adt2.term("p0", vec![]).unwrap();

  let err = TransitionSystem::new(adt1, foreign_initial).unwrap_err();
  assert!(matches!(err, crate::StratagemError::ForeignInitialTerm));
}

/// A hand-built Petri-net-shaped transition system, exercising the surface the out-of-scope
/// Petri-net compiler targets (`applyOnce`-style per-transition dispatch composed under a
/// top-level saturation strategy) without using that compiler.
#[test]
fn petri_net_shaped_dispatch_and_saturation() {
  let sig = Signature::new()
      .with_sort("Marking", None).unwrap()
      .with_generator("m0", "Marking", &[]).unwrap()
      .with_generator("m1", "Marking", &[]).unwrap()
      .with_generator("m2", "Marking", &[]).unwrap();
  let adt = Rc::new(Adt::new("petri", sig));
  let m0 = adt.term("m0", vec![]).unwrap();
  let m1 = adt.term("m1", vec![]).unwrap();
  let m2 = adt.term("m2", vec![]).unwrap();

  // Two "transitions", each a single-rule SimpleStrategy, standing in for the per-place rules the
  // compiler would synthesise.
  let t1 = Strategy::Simple(vec![(m0.clone(), m1.clone())]);
  let t2 = Strategy::Simple(vec![(m1.clone(), m2.clone())]);

  // applyOnce: try every transition in the cluster, first match wins.
  let apply_once = Strategy::choice(Rc::new(t1), Rc::new(t2));
  // superClusterSaturationStrategy: keep firing transitions until none applies.
  let saturate = Strategy::fix_point(apply_once);

  let ts = TransitionSystem::new(adt, m0.clone())
      .unwrap()
      .declare_strategy("applyOnce", vec![], saturate.clone(), false)
      .unwrap()
      .declare_strategy("superClusterSaturationStrategy", vec![], saturate, true)
      .unwrap();

  assert!(linker::link(&ts).is_ok());

  let result = rewriter::rewrite(&ts, "superClusterSaturationStrategy", &m0).unwrap();
  assert_eq!(result, RewriteResult::Ok(m2));
}
