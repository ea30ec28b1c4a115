//! Relations and the relational algebra operating on them.
//!
//! A [`Relation`] is a named set of same-arity [`Tuple`]s sharing one
//! [`Scheme`]. The algebra operators (`select`, `project`, `rename`,
//! `join`, `union`) are the substrate the interpreter compiles rule and
//! query predicates into.

use indexmap::IndexSet;
use std::ops::Index;

/// Ordered list of attribute names defining a relation's columns.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scheme {
    attributes: Vec<String>,
}

impl Scheme {
    /// Create a scheme from a list of attribute names.
    #[must_use]
    pub fn new(attributes: Vec<String>) -> Self {
        Self { attributes }
    }

    /// Create a scheme from anything yielding attribute names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Into::into).collect())
    }

    /// Number of attributes (the relation's arity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the scheme has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over the attribute names in column order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Position of the first attribute with the given name, if any.
    #[must_use]
    pub fn position(&self, attribute: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == attribute)
    }
}

impl Index<usize> for Scheme {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.attributes[index]
    }
}

/// Ordered list of value strings, positionally aligned with a [`Scheme`].
///
/// Tuples are immutable once constructed and compare lexicographically
/// over all positions; the ordering is used only for deterministic query
/// output.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tuple {
    values: Vec<String>,
}

impl Tuple {
    /// Create a tuple from a list of values.
    #[must_use]
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Create a tuple from anything yielding values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    /// Number of values (the tuple's arity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tuple has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the values in column order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Value at the given column, if in range.
    #[must_use]
    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Render the tuple against a scheme as `attr='value', attr='value'`.
    #[must_use]
    pub fn render(&self, scheme: &Scheme) -> String {
        self.values
            .iter()
            .zip(scheme.iter())
            .map(|(value, attribute)| format!("{attribute}='{value}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Index<usize> for Tuple {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

/// A named set of same-arity tuples sharing one scheme.
///
/// Tuples are structurally deduplicated and never removed; relations only
/// grow, which is what guarantees the interpreter's fixpoint loops
/// terminate over a finite constant domain.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    name: String,
    scheme: Scheme,
    tuples: IndexSet<Tuple>,
}

impl Relation {
    /// Create an empty relation with the given name and scheme.
    #[must_use]
    pub fn new(name: impl Into<String>, scheme: Scheme) -> Self {
        Self {
            name: name.into(),
            scheme,
            tuples: IndexSet::new(),
        }
    }

    /// The relation's name, also its lookup key in the database.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The relation's current scheme.
    #[must_use]
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// The tuple set, in insertion order.
    #[must_use]
    pub fn tuples(&self) -> &IndexSet<Tuple> {
        &self.tuples
    }

    /// Number of tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the relation holds no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// The tuples in lexicographic order, for deterministic output.
    #[must_use]
    pub fn sorted_tuples(&self) -> Vec<&Tuple> {
        let mut tuples: Vec<&Tuple> = self.tuples.iter().collect();
        tuples.sort();
        tuples
    }

    /// Insert a tuple. Returns `true` iff the tuple was new.
    ///
    /// A tuple whose arity disagrees with the scheme is rejected (returns
    /// `false`, no mutation). This is the only mutating growth point of a
    /// relation besides [`Relation::union`].
    pub fn insert(&mut self, tuple: Tuple) -> bool {
        if tuple.len() != self.scheme.len() {
            return false;
        }
        self.tuples.insert(tuple)
    }

    /// Retain tuples whose value at `column` equals `value`.
    #[must_use]
    pub fn select_value(&self, column: usize, value: &str) -> Relation {
        let mut result = Relation::new(self.name.clone(), self.scheme.clone());
        for tuple in &self.tuples {
            if tuple.get(column) == Some(value) {
                result.insert(tuple.clone());
            }
        }
        result
    }

    /// Retain tuples where the two columns hold equal values.
    ///
    /// This is what makes a repeated variable within one predicate denote
    /// equal values.
    #[must_use]
    pub fn select_equal(&self, left: usize, right: usize) -> Relation {
        let mut result = Relation::new(self.name.clone(), self.scheme.clone());
        for tuple in &self.tuples {
            if tuple.get(left) == tuple.get(right) {
                result.insert(tuple.clone());
            }
        }
        result
    }

    /// Project onto the given columns, in the given order.
    ///
    /// Order and repetition are both significant: the column list may
    /// reorder, duplicate, or drop attributes, and the new scheme reads
    /// the old attribute names at those positions.
    #[must_use]
    pub fn project(&self, columns: &[usize]) -> Relation {
        let scheme = Scheme::from_names(columns.iter().map(|&c| &self.scheme[c]));
        let mut result = Relation::new(self.name.clone(), scheme);
        for tuple in &self.tuples {
            result.insert(Tuple::from_values(columns.iter().map(|&c| &tuple[c])));
        }
        result
    }

    /// Replace the scheme, keeping tuples unchanged.
    ///
    /// Positional correspondence is preserved; the new scheme must have
    /// the same arity as the old one.
    #[must_use]
    pub fn rename(&self, scheme: Scheme) -> Relation {
        Relation {
            name: self.name.clone(),
            scheme,
            tuples: self.tuples.clone(),
        }
    }

    /// Natural join on attribute-name equality.
    ///
    /// The result scheme is this relation's scheme followed by the other's
    /// attributes whose names are not already present. A tuple pair is
    /// retained when the two tuples agree on every shared attribute name.
    /// Nested-loop evaluation; cost is the product of the two tuple-set
    /// sizes.
    #[must_use]
    pub fn join(&self, other: &Relation) -> Relation {
        // Column pairs that share an attribute name, scanning
        // left-to-right then top-to-bottom.
        let mut overlap: Vec<(usize, usize)> = Vec::new();
        for (left, left_attr) in self.scheme.iter().enumerate() {
            for (right, right_attr) in other.scheme.iter().enumerate() {
                if left_attr == right_attr {
                    overlap.push((left, right));
                }
            }
        }
        let in_overlap = |column: usize| overlap.iter().any(|&(_, right)| right == column);

        let mut attributes: Vec<String> = self.scheme.iter().map(str::to_string).collect();
        for (column, attribute) in other.scheme.iter().enumerate() {
            if !in_overlap(column) {
                attributes.push(attribute.to_string());
            }
        }

        let mut result = Relation::new(
            format!("{}-{}", self.name, other.name),
            Scheme::new(attributes),
        );
        for left_tuple in &self.tuples {
            for right_tuple in &other.tuples {
                if overlap.iter().all(|&(l, r)| left_tuple[l] == right_tuple[r]) {
                    let mut values: Vec<String> =
                        left_tuple.iter().map(str::to_string).collect();
                    for (column, value) in right_tuple.iter().enumerate() {
                        if !in_overlap(column) {
                            values.push(value.to_string());
                        }
                    }
                    result.insert(Tuple::new(values));
                }
            }
        }
        result
    }

    /// Merge the other relation's tuples into this one.
    ///
    /// Only sensible when the schemes match. Returns whether this relation
    /// grew.
    pub fn union(&mut self, other: &Relation) -> bool {
        let before = self.tuples.len();
        for tuple in &other.tuples {
            self.insert(tuple.clone());
        }
        self.tuples.len() > before
    }
}
