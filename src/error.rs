//! Evaluation errors.
//!
//! Only the fatal conditions live here; a tuple whose arity disagrees
//! with its relation's scheme is rejected locally by
//! [`Relation::insert`](crate::Relation::insert) and evaluation continues.

use thiserror::Error;

/// A fatal condition aborting the current run.
///
/// Evaluation is deterministic and non-transient, so nothing is retried.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum EvalError {
    /// A fact, rule predicate or query names a relation with no matching
    /// scheme declaration.
    #[error("relation '{0}' is not declared by any scheme")]
    UndeclaredRelation(String),

    /// A rule is not range-restricted: its head uses a variable that
    /// never appears in its body.
    #[error("head variable '{variable}' of rule '{rule}' does not appear in the rule body")]
    UnboundHeadVariable {
        /// The offending rule, stringified.
        rule: String,
        /// The head variable with no body occurrence.
        variable: String,
    },

    /// Writing the evaluation trace failed.
    #[error("trace output failed: {0}")]
    Trace(#[from] std::fmt::Error),
}
