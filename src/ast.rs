//! Abstract syntax of a Datalog program.
//!
//! This is the structure the parsing collaborator hands to the
//! [`Interpreter`](crate::Interpreter): four ordered collections of
//! scheme, fact, rule and query predicates. Everything here is immutable
//! once built; the interpreter only reads it.

use std::collections::BTreeSet;
use std::fmt;

/// One argument of a predicate: a bound variable or a literal constant.
///
/// Constants hold their value in final comparable form; the surrounding
/// quote markers of the surface syntax are stripped at ingestion and only
/// reattached by the `Display` impl.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parameter {
    /// A variable to be bound during evaluation (e.g. `X`).
    Variable(String),
    /// A literal constant (e.g. `'alice'`, stored as `alice`).
    Constant(String),
}

impl Parameter {
    /// Create a variable parameter.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Create a constant parameter from an already-unquoted value.
    pub fn constant(value: impl Into<String>) -> Self {
        Self::Constant(value.into())
    }

    /// Classify a surface token: a leading quote marks a constant, and
    /// the surrounding quotes are stripped here, once.
    #[must_use]
    pub fn from_surface(token: &str) -> Self {
        if let Some(stripped) = token.strip_prefix('\'') {
            Self::Constant(stripped.strip_suffix('\'').unwrap_or(stripped).to_string())
        } else {
            Self::Variable(token.to_string())
        }
    }

    /// The variable name or constant value, without quoting.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Variable(name) | Self::Constant(name) => name,
        }
    }

    /// Whether this parameter is a variable.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// The variable name, if this parameter is one.
    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            Self::Constant(_) => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "{name}"),
            Self::Constant(value) => write!(f, "'{value}'"),
        }
    }
}

/// A predicate: a name with an ordered parameter list.
///
/// Schemes, facts and queries are all plain predicates; they differ only
/// in which collection of the program they appear in.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Predicate {
    /// The predicate (relation) name.
    pub name: String,
    /// The ordered parameters.
    pub parameters: Vec<Parameter>,
}

impl Predicate {
    /// Create a predicate.
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ")")
    }
}

/// A rule: one head predicate derived from a conjunction of body
/// predicates.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// The derived predicate.
    pub head: Predicate,
    /// The body predicates, combined by implicit conjunction.
    pub body: Vec<Predicate>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.head)?;
        for (i, predicate) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

/// A complete program: schemes, facts, rules and queries, each in
/// declaration order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatalogProgram {
    /// Scheme declarations (name + attribute names).
    pub schemes: Vec<Predicate>,
    /// Facts (name + constant values).
    pub facts: Vec<Predicate>,
    /// Rules.
    pub rules: Vec<Rule>,
    /// Queries.
    pub queries: Vec<Predicate>,
}

impl DatalogProgram {
    /// Append a scheme declaration.
    pub fn add_scheme(&mut self, scheme: Predicate) {
        self.schemes.push(scheme);
    }

    /// Append a fact.
    pub fn add_fact(&mut self, fact: Predicate) {
        self.facts.push(fact);
    }

    /// Append a rule.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append a query.
    pub fn add_query(&mut self, query: Predicate) {
        self.queries.push(query);
    }

    /// The constant domain: every constant appearing in a fact, sorted.
    #[must_use]
    pub fn domain(&self) -> BTreeSet<&str> {
        self.facts
            .iter()
            .flat_map(|fact| fact.parameters.iter())
            .filter_map(|parameter| match parameter {
                Parameter::Constant(value) => Some(value.as_str()),
                Parameter::Variable(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for DatalogProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schemes({}):", self.schemes.len())?;
        for scheme in &self.schemes {
            writeln!(f, "  {scheme}")?;
        }
        writeln!(f, "Facts({}):", self.facts.len())?;
        for fact in &self.facts {
            writeln!(f, "  {fact}.")?;
        }
        writeln!(f, "Rules({}):", self.rules.len())?;
        for rule in &self.rules {
            writeln!(f, "  {rule}.")?;
        }
        writeln!(f, "Queries({}):", self.queries.len())?;
        for query in &self.queries {
            writeln!(f, "  {query}?")?;
        }
        let domain = self.domain();
        writeln!(f, "Domain({}):", domain.len())?;
        for value in domain {
            writeln!(f, "  '{value}'")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_surface_strips_quotes_on_constants() {
        assert_eq!(Parameter::from_surface("'c'"), Parameter::constant("c"));
        assert_eq!(Parameter::from_surface("X"), Parameter::variable("X"));
        assert_eq!(Parameter::from_surface("''"), Parameter::constant(""));
    }

    #[test]
    fn predicate_display_requotes_constants() {
        let predicate = Predicate::new(
            "SK",
            vec![Parameter::variable("X"), Parameter::constant("c")],
        );
        assert_eq!(predicate.to_string(), "SK(X,'c')");
    }

    #[test]
    fn rule_display_joins_body_with_commas() {
        let rule = Rule {
            head: Predicate::new("path", vec![Parameter::variable("x"), Parameter::variable("z")]),
            body: vec![
                Predicate::new("path", vec![Parameter::variable("x"), Parameter::variable("y")]),
                Predicate::new("edge", vec![Parameter::variable("y"), Parameter::variable("z")]),
            ],
        };
        assert_eq!(rule.to_string(), "path(x,z) :- path(x,y),edge(y,z)");
    }

    #[test]
    fn program_summary_counts_sections_and_domain() {
        let mut program = DatalogProgram::default();
        program.add_scheme(Predicate::new("a", vec![Parameter::variable("x")]));
        program.add_fact(Predicate::new("a", vec![Parameter::constant("1")]));
        program.add_fact(Predicate::new("a", vec![Parameter::constant("1")]));
        program.add_fact(Predicate::new("a", vec![Parameter::constant("2")]));
        program.add_query(Predicate::new("a", vec![Parameter::variable("X")]));

        let summary = program.to_string();
        assert!(summary.contains("Schemes(1):"));
        assert!(summary.contains("Facts(3):"));
        assert!(summary.contains("Rules(0):"));
        assert!(summary.contains("Queries(1):"));
        assert!(summary.contains("Domain(2):"));
        assert!(summary.contains("  a('1').\n"));
        assert!(summary.contains("  a(X)?\n"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn program_round_trips_through_json() {
        let mut program = DatalogProgram::default();
        program.add_scheme(Predicate::new("edge", vec![Parameter::variable("A"), Parameter::variable("B")]));
        program.add_fact(Predicate::new("edge", vec![Parameter::constant("a"), Parameter::constant("b")]));
        program.add_rule(Rule {
            head: Predicate::new("path", vec![Parameter::variable("x"), Parameter::variable("y")]),
            body: vec![Predicate::new("edge", vec![Parameter::variable("x"), Parameter::variable("y")])],
        });

        let json = serde_json::to_string(&program).expect("serialize");
        let back: DatalogProgram = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(program, back);
    }
}
