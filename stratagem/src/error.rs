/*!

Structured error types for this crate's construction-time and linking-time failure modes.
Evaluation failure (a strategy not applying to a term) is deliberately *not* a variant here: it is
a legitimate value produced by the rewriter (see [`crate::rewriter::RewriteResult`]), not a
surfaced error.

*/

use stratagem_abs::IString;

/// One diagnostic raised by the linker (`crate::linker::link`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkerError {
  #[error("Usage of invalid strategy {used} in declared strategy {declared_in}")]
  UndeclaredStrategy { used: IString, declared_in: IString },

  #[error("Invalid number of parameters for strategy {name}. Required Set{{{required}}}, found Set{{{found}}}")]
  ArityMismatch { name: IString, required: usize, found: usize },

  #[error(
    "Strategy variable name '{name}' is not in declaration. If you wanted to use a declared \
     strategy you need to append parentheses to it, like this: {name}()"
  )]
  UnboundStrategyVariable { name: IString },

  #[error("Strategy Not only accepts SimpleStrategy and Not strategies as parameters. Found {found}")]
  IllegalUnderNot { found: String },
}

/// The top-level error type for every fallible, non-rewriting operation in the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StratagemError {
  /// Sort/operation uniqueness violations, sub-sort cycles, references to unknown operations.
  #[error("bad signature: {0}")]
  BadSignature(String),

  /// Arity mismatches, ill-sorted arguments, sub-terms drawn from the wrong ADT.
  #[error("bad term: {0}")]
  BadTerm(String),

  /// A strategy name was declared twice on the same transition system.
  #[error("strategy '{0}' is already declared")]
  DuplicateStrategyName(IString),

  /// The initial term supplied to `TransitionSystem::new` belongs to a different ADT.
  #[error("initial term does not belong to this transition system's ADT")]
  ForeignInitialTerm,

  /// One or more diagnostics accumulated by `link`/`diagnose`.
  #[error("bad transition system:\n{}", join_errors(.0))]
  BadTransitionSystem(Vec<LinkerError>),

  /// Cooperative cancellation was observed while iterating a fixed point.
  #[error("rewriting was cancelled")]
  Cancelled,
}

fn join_errors(errors: &[LinkerError]) -> String {
  errors.iter().map(|e| format!("  {e}")).collect::<Vec<_>>().join("\n")
}
