/*!

Ground and open terms, structural equality via hash-consing, matching, and substitution.

A [`Term`] is `Rc<TermData>`; two terms are equal, and hash identically, iff they are the same
allocation, since the hash-consing invariant maintained by [`crate::adt::Adt::intern`] guarantees
this coincides with structural equality. This is the same two-tier identity-then-structure
comparison the teacher's `UnsafePtr`/`DagNode` pair provides (`mod2-lib::core::unsafe_ptr`),
re-expressed with safe `Rc`/`Weak` since this crate has no garbage collector to coordinate with.

*/

use std::{
  fmt::{self, Write},
  hash::{Hash, Hasher},
  rc::{Rc, Weak},
};

use smallvec::SmallVec;
use stratagem_abs::{impl_display_debug_for_formattable, FormatStyle, Formattable, IString, NatSet};

use crate::{
  adt::{Adt, VarId},
  error::StratagemError,
  signature::{OpId, SortId},
};

/// Most operations in a practical signature take only a handful of arguments (Petri-net places,
/// philosopher record fields); inlining up to four elements avoids a heap allocation for the
/// common case, matching the teacher's own "small-vector optimization for argument lists" stack
/// choice (`smallvec`).
pub(crate) type ArgVec = SmallVec<[Term; 4]>;

#[derive(Debug)]
pub(crate) enum TermKind {
  Variable(VarId, IString),
  Application { op: OpId, op_name: IString, args: ArgVec },
}

#[derive(Debug)]
pub(crate) struct TermData {
  adt: Weak<Adt>,
  sort: SortId,
  kind: TermKind,
  free_vars: NatSet,
}

/// The structural shape of a term, used as the hash-cons table's key. Application keys are the
/// operation plus the *addresses* of the (already-interned) argument terms: because arguments are
/// themselves canonical, pointer equality of children is equivalent to structural equality of
/// children, so the key never needs to walk the subtree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TermKey {
  Variable(VarId),
  Application(OpId, Vec<usize>),
}

#[derive(Clone, Debug)]
pub struct Term(Rc<TermData>);

impl Term {
  pub(crate) fn make_variable(adt: &Rc<Adt>, id: VarId, name: IString, sort: SortId) -> Term {
    let key = TermKey::Variable(id);
    adt.intern(key, || {
      Term(Rc::new(TermData {
        adt: Rc::downgrade(adt),
        sort,
        kind: TermKind::Variable(id, name),
        free_vars: NatSet::singleton(id),
      }))
    })
  }

  pub(crate) fn make_application(
    adt: &Rc<Adt>,
    op: OpId,
    op_name: IString,
    args: impl Into<ArgVec>,
  ) -> Term {
    let args = args.into();
    let key = TermKey::Application(op, args.iter().map(Term::address).collect());
    adt.intern(key, || {
      let sort = adt.signature().operation_by_id(op).return_sort;
      let mut free_vars = NatSet::new();
      for arg in &args {
        free_vars.union_in_place(&arg.0.free_vars);
      }
      Term(Rc::new(TermData {
        adt: Rc::downgrade(adt),
        sort,
        kind: TermKind::Application { op, op_name, args },
        free_vars,
      }))
    })
  }

  pub(crate) fn address(&self) -> usize {
    Rc::as_ptr(&self.0) as usize
  }

  pub fn sort(&self) -> SortId {
    self.0.sort
  }

  pub fn is_ground(&self) -> bool {
    self.0.free_vars.is_empty()
  }

  pub fn is_variable(&self) -> bool {
    matches!(self.0.kind, TermKind::Variable(..))
  }

  pub fn args(&self) -> &[Term] {
    match &self.0.kind {
      TermKind::Application { args, .. } => args,
      TermKind::Variable(..) => &[],
    }
  }

  /// The ADT this term was built from. Panics if the ADT has already been dropped, which would
  /// indicate a term outliving its owning ADT (a usage bug, since `TransitionSystem` keeps its
  /// `Adt` alive for exactly as long as any of its terms are reachable).
  pub fn adt(&self) -> Rc<Adt> {
    self.0.adt.upgrade().expect("term outlived its ADT")
  }

  /// Is `v` a free variable of `self`?
  pub fn occurs_in(v: VarId, t: &Term) -> bool {
    t.0.free_vars.contains(v)
  }

  /// Replaces the child at one-based position `k` (as used by the `One` strategy combinator),
  /// returning a new interned application term. Returns `None` if `self` is not an application or
  /// `k` is out of range.
  pub fn with_child_replaced(&self, k: usize, new_child: Term) -> Option<Term> {
    let TermKind::Application { op, op_name, args } = &self.0.kind else { return None };
    if k == 0 || k > args.len() {
      return None;
    }
    let mut new_args = args.clone();
    new_args[k - 1] = new_child;
    let adt = self.adt();
    Some(Term::make_application(&adt, *op, op_name.clone(), new_args))
  }
}

impl PartialEq for Term {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}
impl Eq for Term {}

impl Hash for Term {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.address().hash(state)
  }
}

impl Formattable for Term {
  fn repr(&self, out: &mut dyn Write, style: FormatStyle) -> fmt::Result {
    match &self.0.kind {
      TermKind::Variable(_, name) => write!(out, "{name}"),
      TermKind::Application { op_name, args, .. } => {
        if args.is_empty() {
          write!(out, "{op_name}")
        } else {
          write!(out, "{op_name}(")?;
          for (i, arg) in args.iter().enumerate() {
            if i > 0 {
              write!(out, ", ")?;
            }
            arg.repr(out, style)?;
          }
          write!(out, ")")
        }
      }
    }
  }
}
impl_display_debug_for_formattable!(Term);

/// A finite mapping from variable declarations to ground terms, built by [`match_term`] and
/// consumed by [`apply`].
#[derive(Clone, Default)]
pub struct Substitution {
  bindings: std::collections::HashMap<VarId, Term>,
}

impl Substitution {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, v: VarId) -> Option<&Term> {
    self.bindings.get(&v)
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }
}

/// Matches `pattern` against the ground term `ground`, returning the substitution witnessing the
/// match, or `None` on failure. A variable already bound in the partial substitution must match
/// the new occurrence by hash-cons identity (`==` on `Term`); a first occurrence is bound after
/// checking the ground sub-term's sort is a sub-sort of the variable's declared sort.
pub fn match_term(pattern: &Term, ground: &Term) -> Option<Substitution> {
  let mut subst = Substitution::new();
  if match_into(pattern, ground, &mut subst) {
    Some(subst)
  } else {
    None
  }
}

fn match_into(pattern: &Term, ground: &Term, subst: &mut Substitution) -> bool {
  match &pattern.0.kind {
    TermKind::Variable(v, _) => {
      if let Some(bound) = subst.bindings.get(v) {
        return bound == ground;
      }
      let adt = pattern.adt();
      let var_sort = adt.variable(*v).sort;
      if !adt.signature().is_subsort_of(ground.sort(), var_sort) {
        return false;
      }
      subst.bindings.insert(*v, ground.clone());
      true
    }
    TermKind::Application { op, args, .. } => match &ground.0.kind {
      TermKind::Application { op: gop, args: gargs, .. } if op == gop => {
        args.iter().zip(gargs.iter()).all(|(p, g)| match_into(p, g, subst))
      }
      _ => false,
    },
  }
}

/// Substitutes `subst` into `pattern`, bottom-up. Applying to a ground term is the identity.
/// Fails with [`StratagemError::BadTerm`] if `pattern` contains a variable not bound in `subst`.
pub fn apply(subst: &Substitution, pattern: &Term) -> Result<Term, StratagemError> {
  match &pattern.0.kind {
    TermKind::Variable(v, name) => subst
        .get(*v)
        .cloned()
        .ok_or_else(|| StratagemError::BadTerm(format!("unbound variable '{name}'"))),
    TermKind::Application { op, op_name, args } => {
      if pattern.is_ground() {
        return Ok(pattern.clone());
      }
      let new_args = args
          .iter()
          .map(|a| apply(subst, a))
          .collect::<Result<Vec<_>, _>>()?;
      let adt = pattern.adt();
      Ok(Term::make_application(&adt, *op, op_name.clone(), new_args))
    }
  }
}
