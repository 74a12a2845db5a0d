/*!

An ADT: a [`Signature`] plus variable declarations, and the per-ADT hash-cons table terms are
interned into.

Grounded on the teacher's `HashConsSet`/`IndexSet` (`mod2-lib::core::hash_cons_set`): structurally
equal terms share one heap allocation, so afterwards equality and hashing are pointer operations.
Unlike the teacher, the pool holds strong references to every interned term for the ADT's lifetime
(it is a permanent table, not a reclaiming cache) since terms here are small immutable values with
no GC to coordinate with; this is recorded in DESIGN.md.

A [`Term`] stores only a `Weak<Adt>` back-reference to the ADT it was built from (see
[`crate::term`]), not a strong one: an `Adt`'s pool holds its terms directly, so a strong
`Term -> Adt` edge would form a reference cycle that keeps the `Adt` alive forever.

*/

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use stratagem_abs::IString;

use crate::{
  error::StratagemError,
  signature::{SortId, Signature},
  term::{Term, TermKey},
};

pub type VarId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDecl {
  pub name: IString,
  pub sort: SortId,
}

#[derive(Debug)]
pub struct Adt {
  name: IString,
  signature: Signature,
  variables: Vec<VariableDecl>,
  variable_index: HashMap<IString, VarId>,
  pool: RefCell<HashMap<TermKey, Term>>,
  #[cfg(feature = "count-states")]
  ground_term_count: std::cell::Cell<usize>,
}

impl Adt {
  pub fn new(name: &str, signature: Signature) -> Self {
    Adt {
      name: IString::from(name),
      signature,
      variables: Vec::new(),
      variable_index: HashMap::new(),
      pool: RefCell::new(HashMap::new()),
      #[cfg(feature = "count-states")]
      ground_term_count: std::cell::Cell::new(0),
    }
  }

  /// The number of distinct ground terms hash-consed into this ADT so far. Only present under the
  /// `count-states` feature (named after, and grounded on, the same-named feature of snowcap, the
  /// sibling project in this corpus that instruments state counts for the same family of
  /// reachability problem).
  #[cfg(feature = "count-states")]
  pub fn ground_term_count(&self) -> usize {
    self.ground_term_count.get()
  }

  pub fn name(&self) -> &IString {
    &self.name
  }

  pub fn signature(&self) -> &Signature {
    &self.signature
  }

  /// Declares a variable. Chainable: consumes and returns `self`, matching
  /// [`Signature::with_sort`]'s builder style.
  pub fn declare_variable(mut self, name: &str, sort: &str) -> Result<Self, StratagemError> {
    let name_istr = IString::from(name);
    if self.variable_index.contains_key(&name_istr) {
      return Err(StratagemError::BadTerm(format!("variable '{name_istr}' is already declared")));
    }
    let sort_id = self
        .signature
        .sort_id(sort)
        .ok_or_else(|| StratagemError::BadTerm(format!("unknown sort '{sort}'")))?;

    let id = self.variables.len();
    self.variables.push(VariableDecl { name: name_istr.clone(), sort: sort_id });
    self.variable_index.insert(name_istr, id);
    Ok(self)
  }

  pub fn variable_id(&self, name: &str) -> Option<VarId> {
    self.variable_index.get(&IString::from(name)).copied()
  }

  pub fn variable(&self, id: VarId) -> &VariableDecl {
    &self.variables[id]
  }

  /// Looks up an interned term in this ADT's pool, inserting it if this is the first time this
  /// exact structural shape has been built.
  pub(crate) fn intern(self: &Rc<Self>, key: TermKey, build: impl FnOnce() -> Term) -> Term {
    if let Some(existing) = self.pool.borrow().get(&key) {
      return existing.clone();
    }
    let term = build();
    #[cfg(feature = "count-states")]
    if term.is_ground() {
      self.ground_term_count.set(self.ground_term_count.get() + 1);
    }
    self.pool.borrow_mut().insert(key, term.clone());
    term
  }

  /// Builds (or retrieves the interned copy of) the variable term for a declared variable.
  pub fn variable_term(self: &Rc<Self>, name: &str) -> Result<Term, StratagemError> {
    let id = self
        .variable_id(name)
        .ok_or_else(|| StratagemError::BadTerm(format!("undeclared variable '{name}'")))?;
    let decl = self.variable(id).clone();
    Ok(crate::term::Term::make_variable(self, id, decl.name, decl.sort))
  }

  /// Builds (or retrieves the interned copy of) the application of `op_name` to `args`, after
  /// validating arity and argument sorts against the signature.
  pub fn term(self: &Rc<Self>, op_name: &str, args: Vec<Term>) -> Result<Term, StratagemError> {
    let op_id = self
        .signature
        .operation_id(op_name)
        .ok_or_else(|| StratagemError::BadTerm(format!("unknown operation '{op_name}'")))?;
    let op = self.signature.operation_by_id(op_id).clone();

    if args.len() != op.arity() {
      return Err(StratagemError::BadTerm(format!(
        "operation '{op_name}' expects {} argument(s), found {}",
        op.arity(),
        args.len()
      )));
    }
    for (i, (arg, &formal_sort)) in args.iter().zip(op.param_sorts.iter()).enumerate() {
      if !Rc::ptr_eq(self, &arg.adt()) {
        return Err(StratagemError::BadTerm(format!(
          "argument {i} of '{op_name}' belongs to a different ADT"
        )));
      }
      if !self.signature.is_subsort_of(arg.sort(), formal_sort) {
        return Err(StratagemError::BadTerm(format!(
          "argument {i} of '{op_name}' has the wrong sort"
        )));
      }
    }

    Ok(crate::term::Term::make_application(self, op_id, op.name.clone(), args))
  }
}
