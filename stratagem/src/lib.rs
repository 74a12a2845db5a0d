/*!

A symbolic model checker: term rewriting driven by ELAN/Stratego-style strategies over a
many-sorted algebraic signature, with a memoised lattice core for state-set operations.

Construction runs through a chain of fallible, consuming builders: [`signature::Signature`], then
[`adt::Adt`], then [`transition_system::TransitionSystem`], each of which freezes once built.
Analysis (`linker::link`, `linker::diagnose`) and evaluation (`rewriter::rewrite`) operate read-only
on a completed `TransitionSystem` thereafter (construction-then-freeze).

```
use std::rc::Rc;
use stratagem::{adt::Adt, signature::Signature, strategy::Strategy, transition_system::TransitionSystem};

let sig = Signature::new()
    .with_sort("S", None).unwrap()
    .with_generator("p0", "S", &[]).unwrap()
    .with_generator("p1", "S", &[]).unwrap();
let adt = Rc::new(Adt::new("example", sig));
let p0 = adt.term("p0", vec![]).unwrap();

let ts = TransitionSystem::new(adt, p0.clone())
    .unwrap()
    .declare_strategy("stay", vec![], Strategy::identity(), true)
    .unwrap();

stratagem::linker::link(&ts).unwrap();
assert_eq!(stratagem::rewriter::rewrite(&ts, "stay", &p0).unwrap().ok(), Some(p0));
```

*/

pub mod adt;
pub mod error;
pub mod fixpoint;
pub mod lattice;
pub mod linker;
pub mod rewriter;
pub mod signature;
pub mod strategy;
pub mod term;
pub mod transition_system;

#[cfg(test)]
mod tests;

pub use error::{LinkerError, StratagemError};
