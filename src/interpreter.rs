//! The interpreter: loads schemes and facts into the database, evaluates
//! rules to a fixpoint in dependency order, then answers queries.
//!
//! Rule and query predicates are compiled into the same renamed algebra
//! expression: constants become value selects, repeated variables become
//! column-equality selects, and the distinct variables (in first-occurrence
//! order) become the projected, renamed scheme. Rules additionally join
//! their body relations left to right and map the result onto the head
//! relation's columns.

use crate::ast::{DatalogProgram, Parameter, Predicate, Rule};
use crate::database::Database;
use crate::error::EvalError;
use crate::graph::DependencyGraph;
use crate::relation::{Relation, Scheme, Tuple};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::fmt::Write;

/// Column-index scratch lists stay inline for typical predicate arities.
type Columns = SmallVec<[usize; 4]>;

/// Evaluates a [`DatalogProgram`] against an exclusively owned
/// [`Database`], writing the evaluation trace to a [`std::fmt::Write`]
/// sink.
#[derive(Debug)]
pub struct Interpreter {
    program: DatalogProgram,
    database: Database,
}

impl Interpreter {
    /// Create an interpreter for a program, with an empty database.
    #[must_use]
    pub fn new(program: DatalogProgram) -> Self {
        Self {
            program,
            database: Database::new(),
        }
    }

    /// The database, for inspection after a run.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Evaluate the whole program, writing the trace to `out`.
    ///
    /// Order: load schemes, validate rules, load facts, print the
    /// dependency graph, evaluate each SCC to a local fixpoint in
    /// discovery order, answer queries.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UndeclaredRelation`] if a fact, rule predicate
    /// or query names a relation with no scheme declaration, and
    /// [`EvalError::UnboundHeadVariable`] if a rule is not
    /// range-restricted. Rule validation runs before any fact is loaded,
    /// so a fatal rule error leaves every relation empty.
    pub fn run(&mut self, out: &mut impl Write) -> Result<(), EvalError> {
        self.load_schemes();
        self.validate_rules()?;
        self.load_facts()?;

        let graph = DependencyGraph::from_rules(&self.program.rules);
        writeln!(out, "Dependency Graph")?;
        write!(out, "{graph}")?;
        writeln!(out)?;

        self.evaluate_rules(&graph, out)?;
        self.evaluate_queries(out)
    }

    /// Evaluate the whole program, returning the trace as a string.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Interpreter::run`].
    pub fn run_to_string(&mut self) -> Result<String, EvalError> {
        let mut out = String::new();
        self.run(&mut out)?;
        Ok(out)
    }

    /// Create one empty relation per declared scheme.
    fn load_schemes(&mut self) {
        for scheme in &self.program.schemes {
            let attributes = Scheme::from_names(scheme.parameters.iter().map(Parameter::value));
            self.database.create_relation(&scheme.name, attributes);
        }
    }

    /// Check every rule before anything is evaluated: all predicate names
    /// must be declared and every head variable must occur in the body.
    fn validate_rules(&self) -> Result<(), EvalError> {
        for rule in &self.program.rules {
            for predicate in std::iter::once(&rule.head).chain(rule.body.iter()) {
                if !self.database.contains(&predicate.name) {
                    return Err(EvalError::UndeclaredRelation(predicate.name.clone()));
                }
            }
            let body_variables: IndexSet<&str> = rule
                .body
                .iter()
                .flat_map(|predicate| predicate.parameters.iter())
                .filter_map(Parameter::variable_name)
                .collect();
            for parameter in &rule.head.parameters {
                if let Parameter::Variable(name) = parameter {
                    if !body_variables.contains(name.as_str()) {
                        return Err(EvalError::UnboundHeadVariable {
                            rule: rule.to_string(),
                            variable: name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Insert every fact tuple into its declared relation.
    ///
    /// A fact whose arity disagrees with the scheme is dropped with a
    /// warning; a duplicate fact collapses silently.
    fn load_facts(&mut self) -> Result<(), EvalError> {
        for fact in &self.program.facts {
            let Some(relation) = self.database.relation_mut(&fact.name) else {
                return Err(EvalError::UndeclaredRelation(fact.name.clone()));
            };
            if fact.parameters.len() != relation.scheme().len() {
                log::warn!(
                    "dropping fact {fact}: arity {} does not match scheme arity {}",
                    fact.parameters.len(),
                    relation.scheme().len()
                );
                continue;
            }
            let tuple = Tuple::from_values(fact.parameters.iter().map(Parameter::value));
            relation.insert(tuple);
        }
        Ok(())
    }

    /// Evaluate every SCC of the dependency graph, in discovery order,
    /// each to its own local fixpoint.
    fn evaluate_rules(
        &mut self,
        graph: &DependencyGraph,
        out: &mut impl Write,
    ) -> Result<(), EvalError> {
        writeln!(out, "Rule Evaluation")?;
        let rules = self.program.rules.clone();
        let mut total_passes = 0_u32;

        for component in graph.strongly_connected_components() {
            let indices: Vec<usize> = component.iter().copied().collect();
            let label = indices
                .iter()
                .map(|i| format!("R{i}"))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(out, "SCC: {label}")?;
            log::debug!("evaluating component {label}");

            // A single rule with no self-loop cannot feed itself; its rule
            // text is printed once, while a cyclic component reprints its
            // rules every pass.
            let trivial = indices.len() == 1 && !graph.has_edge(indices[0], indices[0]);
            if trivial {
                writeln!(out, "{}.", &rules[indices[0]])?;
            }
            let passes =
                Self::run_to_fixpoint(&mut self.database, &rules, &indices, !trivial, out)?;
            total_passes += passes;
            writeln!(out, "{passes} passes: {label}")?;
            writeln!(out)?;
        }

        writeln!(
            out,
            "Schemes populated after {total_passes} passes through the Rules."
        )?;
        writeln!(out)?;
        Ok(())
    }

    /// Repeatedly evaluate the given rules until one full pass inserts
    /// nothing. The returned count includes the final, unproductive pass.
    ///
    /// Termination is guaranteed: relations only grow and the constant
    /// domain is finite, so the number of distinct derivable tuples is
    /// bounded.
    fn run_to_fixpoint(
        database: &mut Database,
        rules: &[Rule],
        indices: &[usize],
        print_rules: bool,
        out: &mut impl Write,
    ) -> Result<u32, EvalError> {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for &index in indices {
                let rule = &rules[index];
                if print_rules {
                    writeln!(out, "{rule}.")?;
                }
                changed |= Self::apply_rule(database, rule, out)?;
            }
            if !changed {
                break;
            }
        }
        Ok(passes)
    }

    /// One application of a rule's body-to-head step: compile each body
    /// predicate, join left to right, project onto the head variables and
    /// insert into the target relation. Returns whether anything new was
    /// inserted; newly derived tuples are traced with the target
    /// relation's attribute names.
    fn apply_rule(
        database: &mut Database,
        rule: &Rule,
        out: &mut impl Write,
    ) -> Result<bool, EvalError> {
        let mut body = rule.body.iter();
        let Some(first) = body.next() else {
            // An empty body contributes nothing.
            return Ok(false);
        };
        let mut joined = Self::compile_predicate(database, first)?;
        for predicate in body {
            let relation = Self::compile_predicate(database, predicate)?;
            joined = joined.join(&relation);
        }

        let mut positions = Columns::new();
        for parameter in &rule.head.parameters {
            let name = parameter.value();
            let position = joined.scheme().position(name).ok_or_else(|| {
                EvalError::UnboundHeadVariable {
                    rule: rule.to_string(),
                    variable: name.to_string(),
                }
            })?;
            positions.push(position);
        }
        let derived = joined.project(&positions);

        let target = database
            .relation_mut(&rule.head.name)
            .ok_or_else(|| EvalError::UndeclaredRelation(rule.head.name.clone()))?;
        let mut grew = false;
        for tuple in derived.tuples() {
            if target.insert(tuple.clone()) {
                writeln!(out, "  {}", tuple.render(target.scheme()))?;
                grew = true;
            }
        }
        Ok(grew)
    }

    /// Compile a predicate into a renamed algebra expression over its base
    /// relation: value selects for constants, column-equality selects for
    /// repeated variables, then a projection onto the first occurrence of
    /// each distinct variable renamed to the variable names.
    fn compile_predicate(
        database: &Database,
        predicate: &Predicate,
    ) -> Result<Relation, EvalError> {
        let base = database
            .relation(&predicate.name)
            .ok_or_else(|| EvalError::UndeclaredRelation(predicate.name.clone()))?;

        if predicate.parameters.len() != base.scheme().len() {
            // A pattern of the wrong arity matches nothing.
            let mut variables: Vec<&str> = Vec::new();
            for parameter in &predicate.parameters {
                if let Parameter::Variable(name) = parameter {
                    if !variables.contains(&name.as_str()) {
                        variables.push(name);
                    }
                }
            }
            return Ok(Relation::new(base.name(), Scheme::from_names(variables)));
        }

        let mut current = base.clone();
        let mut first_seen: IndexMap<&str, usize> = IndexMap::new();
        for (position, parameter) in predicate.parameters.iter().enumerate() {
            match parameter {
                Parameter::Constant(value) => {
                    current = current.select_value(position, value);
                }
                Parameter::Variable(name) => {
                    if let Some(&first) = first_seen.get(name.as_str()) {
                        current = current.select_equal(first, position);
                    } else {
                        first_seen.insert(name, position);
                    }
                }
            }
        }

        let positions: Columns = first_seen.values().copied().collect();
        let variables = Scheme::from_names(first_seen.keys().copied());
        Ok(current.project(&positions).rename(variables))
    }

    /// Answer each query read-only against the final database state.
    fn evaluate_queries(&self, out: &mut impl Write) -> Result<(), EvalError> {
        writeln!(out, "Query Evaluation")?;
        for query in &self.program.queries {
            let result = Self::compile_predicate(&self.database, query)?;
            write!(out, "{query}? ")?;
            if result.is_empty() {
                writeln!(out, "No")?;
            } else {
                writeln!(out, "Yes({})", result.len())?;
                if !result.scheme().is_empty() {
                    for tuple in result.sorted_tuples() {
                        writeln!(out, "  {}", tuple.render(result.scheme()))?;
                    }
                }
            }
            log::debug!("query {query} matched {} tuples", result.len());
        }
        Ok(())
    }
}
