/*!

Sorts, the sub-sort relation, and operations.

Grounded on the teacher project's `mod2-lib::core::sort::sort::Sort`, which stores the transitive
closure of the sub-sort relation in a `NatSet` (`Sort::leq_sorts`) computed once when the sort is
inserted, so that `is_subsort_of` afterwards is a single bitset membership test rather than a graph
walk. Unlike the teacher, a `Sort` here has at most one direct super-sort (`addSort` takes a single
optional super-sort), so the induced relation is a forest rather than a general DAG; this is a
simplification of the teacher's `Kind`/multiple-supersort machinery, recorded in DESIGN.md, since
this crate does not need the teacher's compiled sort-diagram dispatch for runtime theory lookup.

*/

use std::collections::HashMap;

use smallvec::SmallVec;
use stratagem_abs::{IString, NatSet};

use crate::error::StratagemError;

pub type SortId = usize;
pub type OpId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
  pub name: IString,
  pub super_sort: Option<SortId>,
  /// All proper ancestors of this sort (sorts of which this sort is a sub-sort), not including
  /// itself. `is_subsort_of` also treats a sort as a sub-sort of itself (reflexivity).
  ancestors: NatSet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
  pub name: IString,
  pub param_sorts: SmallVec<[SortId; 4]>,
  pub return_sort: SortId,
  pub is_generator: bool,
}

impl Operation {
  pub fn arity(&self) -> usize {
    self.param_sorts.len()
  }
}

#[derive(Clone, Debug, Default)]
pub struct Signature {
  sorts: Vec<Sort>,
  sort_index: HashMap<IString, SortId>,
  operations: Vec<Operation>,
  operation_index: HashMap<IString, OpId>,
}

impl Signature {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a new base sort, or a sub-sort of `super_sort` when given. Chainable: returns `self` by
  /// value so construction reads as `Signature::new().with_sort(..)?.with_sort(..)?`.
  pub fn with_sort(mut self, name: &str, super_sort: Option<&str>) -> Result<Self, StratagemError> {
    let name = IString::from(name);
    if self.sort_index.contains_key(&name) {
      return Err(StratagemError::BadSignature(format!("sort '{name}' is already declared")));
    }

    let super_sort_id = match super_sort {
      Some(super_name) => Some(self.require_sort(super_name)?),
      None => None,
    };

    let mut ancestors = NatSet::new();
    if let Some(parent) = super_sort_id {
      ancestors.insert(parent);
      ancestors.union_in_place(&self.sorts[parent].ancestors);
    }

    let id = self.sorts.len();
    self.sorts.push(Sort { name: name.clone(), super_sort: super_sort_id, ancestors });
    self.sort_index.insert(name, id);
    Ok(self)
  }

  /// Adds a generator (constructor) operation. Equivalent to `with_operation(.., true)`.
  pub fn with_generator(
    self,
    name: &str,
    return_sort: &str,
    param_sorts: &[&str],
  ) -> Result<Self, StratagemError> {
    self.with_operation(name, return_sort, param_sorts, true)
  }

  pub fn with_operation(
    mut self,
    name: &str,
    return_sort: &str,
    param_sorts: &[&str],
    is_generator: bool,
  ) -> Result<Self, StratagemError> {
    let name_istr = IString::from(name);
    if self.operation_index.contains_key(&name_istr) {
      return Err(StratagemError::BadSignature(format!("operation '{name_istr}' is already declared")));
    }

    let return_sort_id = self.require_sort(return_sort)?;
    let param_sort_ids = param_sorts
        .iter()
        .map(|s| self.require_sort(s))
        .collect::<Result<SmallVec<[SortId; 4]>, _>>()?;

    let id = self.operations.len();
    self.operations.push(Operation {
      name: name_istr.clone(),
      param_sorts: param_sort_ids,
      return_sort: return_sort_id,
      is_generator,
    });
    self.operation_index.insert(name_istr, id);
    Ok(self)
  }

  fn require_sort(&self, name: &str) -> Result<SortId, StratagemError> {
    self
        .sort_index
        .get(&IString::from(name))
        .copied()
        .ok_or_else(|| StratagemError::BadSignature(format!("unknown sort '{name}'")))
  }

  pub fn sort_id(&self, name: &str) -> Option<SortId> {
    self.sort_index.get(&IString::from(name)).copied()
  }

  pub fn sort(&self, id: SortId) -> &Sort {
    &self.sorts[id]
  }

  pub fn operation(&self, name: &str) -> Option<&Operation> {
    self.operation_index.get(&IString::from(name)).map(|&id| &self.operations[id])
  }

  pub fn operation_id(&self, name: &str) -> Option<OpId> {
    self.operation_index.get(&IString::from(name)).copied()
  }

  pub fn operation_by_id(&self, id: OpId) -> &Operation {
    &self.operations[id]
  }

  /// `a <= b`: is sort `a` a sub-sort of (or equal to) sort `b`?
  pub fn is_subsort_of(&self, a: SortId, b: SortId) -> bool {
    a == b || self.sorts[a].ancestors.contains(b)
  }
}
