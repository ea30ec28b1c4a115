//! # Microdb
//!
//! A micro deductive database in Rust: relations as named sets of tuples,
//! Datalog-style rules evaluated to a fixpoint in dependency order, and
//! queries answered against the derived state.
//!
//! ## Features
//!
//! - Relational algebra (select, project, rename, natural join, union)
//! - Recursive rule evaluation ordered by Kosaraju SCC decomposition
//! - Deterministic evaluation trace and query output
//!
//! ## Example
//!
//! ```rust
//! use microdb::{DatalogProgram, Interpreter, Parameter, Predicate, Rule};
//!
//! let mut program = DatalogProgram::default();
//! program.add_scheme(Predicate::new(
//!     "edge",
//!     vec![Parameter::variable("A"), Parameter::variable("B")],
//! ));
//! program.add_scheme(Predicate::new(
//!     "path",
//!     vec![Parameter::variable("X"), Parameter::variable("Y")],
//! ));
//! program.add_fact(Predicate::new(
//!     "edge",
//!     vec![Parameter::constant("a"), Parameter::constant("b")],
//! ));
//! program.add_rule(Rule {
//!     head: Predicate::new("path", vec![Parameter::variable("x"), Parameter::variable("y")]),
//!     body: vec![Predicate::new("edge", vec![Parameter::variable("x"), Parameter::variable("y")])],
//! });
//! program.add_query(Predicate::new(
//!     "path",
//!     vec![Parameter::variable("W"), Parameter::constant("b")],
//! ));
//!
//! let mut interpreter = Interpreter::new(program);
//! let trace = interpreter.run_to_string().unwrap();
//! assert!(trace.contains("path(W,'b')? Yes(1)"));
//! ```

/// Program structure consumed by the interpreter.
pub mod ast;
/// The relation store.
pub mod database;
/// Fatal evaluation errors.
pub mod error;
/// Rule dependency graph and SCC decomposition.
pub mod graph;
/// Program evaluation.
pub mod interpreter;
/// Parser for the reference surface syntax.
#[cfg(feature = "parsing")]
pub mod parser;
/// Relations and the relational algebra.
pub mod relation;

pub use ast::{DatalogProgram, Parameter, Predicate, Rule};
pub use database::Database;
pub use error::EvalError;
pub use graph::DependencyGraph;
pub use interpreter::Interpreter;
#[cfg(feature = "parsing")]
pub use parser::{parse_program, ParseError};
pub use relation::{Relation, Scheme, Tuple};
