/*!

A `NatSet` is a set of small natural numbers, backed by a bitset rather than a hash table. It is
used throughout the crate wherever a set of indices (sort indices, variable indices) needs cheap
membership testing, union, and iteration, and is cheap to clone because it shares the `bit-set`
crate's `BitSet` representation.

This module re-expresses the `bit_set::BitSet`-backed `NatSet` that appears throughout the
teacher project (`mod2_abs::NatSet`, used for example by `Sort::leq_sorts` and `Term::occurs_below`)
without pulling in the rest of that crate's unsafe-pointer machinery.

*/

use std::fmt;
use bit_set::BitSet;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct NatSet {
  bits: BitSet,
}

impl NatSet {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn singleton(n: usize) -> Self {
    let mut set = Self::new();
    set.insert(n);
    set
  }

  #[inline]
  pub fn insert(&mut self, n: usize) -> bool {
    self.bits.insert(n)
  }

  #[inline]
  pub fn contains(&self, n: usize) -> bool {
    self.bits.contains(n)
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.bits.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.bits.is_empty()
  }

  /// Unions `other` into `self` in place.
  #[inline]
  pub fn union_in_place(&mut self, other: &NatSet) {
    self.bits.union_with(&other.bits);
  }

  #[inline]
  pub fn intersect_in_place(&mut self, other: &NatSet) {
    self.bits.intersect_with(&other.bits);
  }

  /// True when every member of `self` is also a member of `other`.
  #[inline]
  pub fn is_subset(&self, other: &NatSet) -> bool {
    self.bits.is_subset(&other.bits)
  }

  #[inline]
  pub fn is_superset(&self, other: &NatSet) -> bool {
    other.is_subset(self)
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
    self.bits.iter()
  }
}

impl FromIterator<usize> for NatSet {
  fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
    let mut set = NatSet::new();
    for n in iter {
      set.insert(n);
    }
    set
  }
}

impl fmt::Debug for NatSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}
