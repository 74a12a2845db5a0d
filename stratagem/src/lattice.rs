/*!

A memoised lattice of term sets.

The concrete lattice element realised here is [`TermSet`]: a hash-consed, immutable set of ground
terms with `⊥` the empty set. `∪`/`∩`/`\` are the corresponding set operations, each checked against
a short-circuit table before falling back to a raw computation that is then memoised in a
weakly-referenced cache keyed by the *other operand's identity*, so a cache entry never keeps an
operand or result alive beyond what the caller already holds.

Grounded on the contract documented by the teacher's (but not retrieved) `mod2_abs::rccell` module
and realised with [`stratagem_abs::WeakCache`]; the short-circuit and canonical-ordering scheme
mirrors a mixin-based op-cache, re-expressed here as a small decorator function around each
operation.

*/

use std::{
  cell::RefCell,
  collections::HashMap,
  rc::{Rc, Weak},
};

use stratagem_abs::WeakCache;

use crate::term::Term;

#[derive(Default)]
struct OpCaches {
  union: WeakCache<TermSet, TermSet>,
  intersect: WeakCache<TermSet, TermSet>,
  diff: WeakCache<TermSet, TermSet>,
}

/// A hash-consed, immutable set of ground terms. The bottom element is the empty set.
pub struct TermSet {
  elements: Vec<Term>,
  caches: OpCaches,
}

impl TermSet {
  pub fn is_bottom(&self) -> bool {
    self.elements.is_empty()
  }

  pub fn elements(&self) -> &[Term] {
    &self.elements
  }

  pub fn contains(&self, t: &Term) -> bool {
    self.elements.contains(t)
  }

  pub fn len(&self) -> usize {
    self.elements.len()
  }

  /// The unique element of a singleton set, or `None` if this set is empty or has more than one
  /// element.
  pub fn as_singleton(&self) -> Option<&Term> {
    match self.elements.as_slice() {
      [t] => Some(t),
      _ => None,
    }
  }

  fn identity(self_rc: &Rc<TermSet>) -> usize {
    Rc::as_ptr(self_rc) as usize
  }
}

/// The per-`TransitionSystem` table `TermSet`s are hash-consed into. Entries are held weakly: a
/// `TermSet` that has no other live referent is reclaimed: sets are created on demand during
/// rewriting and reclaimed once no live element references them.
pub struct LatticePool {
  bottom: Rc<TermSet>,
  table: RefCell<HashMap<Vec<usize>, Weak<TermSet>>>,
}

impl LatticePool {
  pub fn new() -> Self {
    LatticePool {
      bottom: Rc::new(TermSet { elements: Vec::new(), caches: OpCaches::default() }),
      table: RefCell::new(HashMap::new()),
    }
  }

  pub fn bottom(&self) -> Rc<TermSet> {
    self.bottom.clone()
  }

  pub fn singleton(&self, t: Term) -> Rc<TermSet> {
    self.intern(vec![t])
  }

  fn intern(&self, mut elements: Vec<Term>) -> Rc<TermSet> {
    elements.sort_by_key(Term::address);
    elements.dedup();
    if elements.is_empty() {
      return self.bottom();
    }
    let key: Vec<usize> = elements.iter().map(Term::address).collect();
    if let Some(existing) = self.table.borrow().get(&key).and_then(Weak::upgrade) {
      return existing;
    }
    let set = Rc::new(TermSet { elements, caches: OpCaches::default() });
    self.table.borrow_mut().insert(key, Rc::downgrade(&set));
    set
  }
}

impl Default for LatticePool {
  fn default() -> Self {
    Self::new()
  }
}

/// Deterministically orders `x` and `y` by identity so a commutative operation's cache entry is
/// always stored on the lower-identity operand.
fn canonical_order(x: &Rc<TermSet>, y: &Rc<TermSet>) -> (Rc<TermSet>, Rc<TermSet>) {
  if TermSet::identity(x) <= TermSet::identity(y) {
    (x.clone(), y.clone())
  } else {
    (y.clone(), x.clone())
  }
}

pub fn union(pool: &LatticePool, x: &Rc<TermSet>, y: &Rc<TermSet>) -> Rc<TermSet> {
  if Rc::ptr_eq(x, y) {
    return x.clone();
  }
  if x.is_bottom() {
    return y.clone();
  }
  if y.is_bottom() {
    return x.clone();
  }
  let (a, b) = canonical_order(x, y);
  if let Some(cached) = a.caches.union.get(&b) {
    return cached;
  }
  let mut elements = a.elements.clone();
  elements.extend(b.elements.iter().cloned());
  let result = pool.intern(elements);
  a.caches.union.insert(&b, &result);
  result
}

pub fn intersect(pool: &LatticePool, x: &Rc<TermSet>, y: &Rc<TermSet>) -> Rc<TermSet> {
  if Rc::ptr_eq(x, y) {
    return x.clone();
  }
  if x.is_bottom() || y.is_bottom() {
    return pool.bottom();
  }
  let (a, b) = canonical_order(x, y);
  if let Some(cached) = a.caches.intersect.get(&b) {
    return cached;
  }
  let elements: Vec<Term> = a.elements.iter().filter(|t| b.contains(t)).cloned().collect();
  let result = pool.intern(elements);
  a.caches.intersect.insert(&b, &result);
  result
}

pub fn diff(pool: &LatticePool, x: &Rc<TermSet>, y: &Rc<TermSet>) -> Rc<TermSet> {
  if y.is_bottom() {
    return x.clone();
  }
  if let Some(cached) = x.caches.diff.get(y) {
    return cached;
  }
  let elements: Vec<Term> = x.elements.iter().filter(|t| !y.contains(t)).cloned().collect();
  let result = pool.intern(elements);
  x.caches.diff.insert(y, &result);
  result
}
