//! The database: exclusive owner of all relations, keyed by name.

use crate::relation::{Relation, Scheme};
use indexmap::IndexMap;

/// Mapping from relation name to [`Relation`], in declaration order.
///
/// One relation exists per declared scheme name; relations are never
/// created implicitly, so a lookup miss means the name was never declared.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Database {
    relations: IndexMap<String, Relation>,
}

impl Database {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty relation for a declared scheme.
    ///
    /// A repeated declaration of the same name keeps the first scheme.
    pub fn create_relation(&mut self, name: &str, scheme: Scheme) {
        self.relations
            .entry(name.to_string())
            .or_insert_with(|| Relation::new(name, scheme));
    }

    /// Look up a relation by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Look up a relation by name for mutation.
    pub fn relation_mut(&mut self, name: &str) -> Option<&mut Relation> {
        self.relations.get_mut(name)
    }

    /// Whether a relation with the given name was declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Number of relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether no relations were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Iterate over the relations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.relations
            .iter()
            .map(|(name, relation)| (name.as_str(), relation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Tuple;

    #[test]
    fn relations_are_created_empty_and_looked_up_by_name() {
        let mut db = Database::new();
        db.create_relation("SK", Scheme::from_names(["A", "B"]));
        assert!(db.contains("SK"));
        assert!(!db.contains("sk"));
        assert!(db.relation("SK").expect("declared").is_empty());
        assert!(db.relation("missing").is_none());
    }

    #[test]
    fn repeated_declaration_keeps_first_scheme() {
        let mut db = Database::new();
        db.create_relation("r", Scheme::from_names(["A"]));
        db.relation_mut("r")
            .expect("declared")
            .insert(Tuple::from_values(["1"]));
        db.create_relation("r", Scheme::from_names(["X", "Y"]));
        let relation = db.relation("r").expect("declared");
        assert_eq!(relation.scheme(), &Scheme::from_names(["A"]));
        assert_eq!(relation.len(), 1);
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let mut db = Database::new();
        db.create_relation("b", Scheme::from_names(["X"]));
        db.create_relation("a", Scheme::from_names(["X"]));
        let names: Vec<&str> = db.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
