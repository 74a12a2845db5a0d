/*!

The generic fixed-point driver, layered on the lattice core.

`fix(f, x)` iterates `x_{i+1} := x_i ∪ f(x_i)` until `x_{i+1} = x_i` (hash-cons identity). This is
deliberately distinct from [`crate::strategy::Strategy::FixPoint`]'s own small loop in
`crate::rewriter`, which implements a *replacing* (not accumulating) per-term convergence rule
directly; `fix` here is the reusable accumulate-and-saturate building block a caller uses to grow a
reachable-state set, e.g. `fix(|frontier| step_strategy(ts, strategy, frontier), initial)`.

*/

use std::{
  rc::Rc,
  sync::atomic::{AtomicBool, Ordering},
};

use crate::{
  error::StratagemError,
  lattice::{self, LatticePool, TermSet},
};

/// Iterates `x_{i+1} := x_i ∪ f(x_i)` to convergence, polling `cancel` once per iteration.
pub fn fix(
  pool: &LatticePool,
  cancel: &AtomicBool,
  f: impl Fn(&Rc<TermSet>) -> Rc<TermSet>,
  start: Rc<TermSet>,
) -> Result<Rc<TermSet>, StratagemError> {
  let mut x = start;
  loop {
    if cancel.load(Ordering::Relaxed) {
      return Err(StratagemError::Cancelled);
    }
    let next = lattice::union(pool, &x, &f(&x));
    if Rc::ptr_eq(&next, &x) {
      return Ok(x);
    }
    x = next;
  }
}
