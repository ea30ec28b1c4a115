//! Rule dependency graph and its strongly-connected-component
//! decomposition.
//!
//! Nodes are rule indices; an edge `i -> j` means rule `i`'s body mentions
//! rule `j`'s head relation, so evaluating `i` may depend on `j` having
//! already populated that relation. SCCs are found with Kosaraju's
//! two-pass depth-first search and come out in an order that visits a
//! component's dependencies before the component itself.

use crate::ast::Rule;
use std::collections::BTreeSet;
use std::fmt;

/// Directed graph over rule indices `0..N`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DependencyGraph {
    edges: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    /// Create a graph with the given number of nodes and no edges.
    #[must_use]
    pub fn with_nodes(count: usize) -> Self {
        Self {
            edges: vec![BTreeSet::new(); count],
        }
    }

    /// Build the dependency graph of a rule list: edge `i -> j` whenever a
    /// body predicate of rule `i` names the head relation of rule `j`.
    #[must_use]
    pub fn from_rules(rules: &[Rule]) -> Self {
        let mut graph = Self::with_nodes(rules.len());
        for (from, rule) in rules.iter().enumerate() {
            for body in &rule.body {
                for (to, candidate) in rules.iter().enumerate() {
                    if body.name == candidate.head.name {
                        graph.add_edge(from, to);
                    }
                }
            }
        }
        log::debug!("dependency graph:\n{graph}");
        graph
    }

    /// Add an edge. Parallel edges collapse.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.edges[from].insert(to);
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes adjacent to `node`, in ascending order.
    #[must_use]
    pub fn adjacent(&self, node: usize) -> &BTreeSet<usize> {
        &self.edges[node]
    }

    /// Whether the edge `from -> to` exists.
    #[must_use]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges[from].contains(&to)
    }

    /// The graph with every edge flipped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut reversed = Self::with_nodes(self.edges.len());
        for (from, adjacent) in self.edges.iter().enumerate() {
            for &to in adjacent {
                reversed.add_edge(to, from);
            }
        }
        reversed
    }

    /// Depth-first-search forest finishing sequence: unvisited nodes are
    /// taken in index order and each node is appended after all of its
    /// descendants, so the last element finished last.
    #[must_use]
    pub fn post_order(&self) -> Vec<usize> {
        let mut visited = vec![false; self.edges.len()];
        let mut order = Vec::with_capacity(self.edges.len());
        for node in 0..self.edges.len() {
            if !visited[node] {
                self.visit_post_order(node, &mut visited, &mut order);
            }
        }
        order
    }

    fn visit_post_order(&self, node: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        visited[node] = true;
        for &next in &self.edges[node] {
            if !visited[next] {
                self.visit_post_order(next, visited, order);
            }
        }
        order.push(node);
    }

    /// Kosaraju SCC decomposition, in discovery order.
    ///
    /// The finishing sequence is computed on the reversed graph, then the
    /// finish stack is popped and each still-unvisited node seeds one DFS
    /// sweep over this graph, collecting exactly one component. With
    /// edges meaning "depends on", this discovery order reaches a
    /// component only after every component it depends on.
    #[must_use]
    pub fn strongly_connected_components(&self) -> Vec<BTreeSet<usize>> {
        let order = self.reversed().post_order();
        let mut visited = vec![false; self.edges.len()];
        let mut components = Vec::new();
        for &node in order.iter().rev() {
            if !visited[node] {
                let mut component = BTreeSet::new();
                self.collect_component(node, &mut visited, &mut component);
                components.push(component);
            }
        }
        components
    }

    fn collect_component(
        &self,
        node: usize,
        visited: &mut [bool],
        component: &mut BTreeSet<usize>,
    ) {
        visited[node] = true;
        component.insert(node);
        for &next in &self.edges[node] {
            if !visited[next] {
                self.collect_component(next, visited, component);
            }
        }
    }
}

impl fmt::Display for DependencyGraph {
    /// One line per node: `R<index>:<comma-separated adjacent list>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (node, adjacent) in self.edges.iter().enumerate() {
            write!(f, "R{node}:")?;
            for (i, to) in adjacent.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "R{to}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Parameter, Predicate, Rule};

    fn rule(head: &str, body: &[&str]) -> Rule {
        let predicate = |name: &str| Predicate::new(name, vec![Parameter::variable("x")]);
        Rule {
            head: predicate(head),
            body: body.iter().map(|name| predicate(name)).collect(),
        }
    }

    #[test]
    fn edges_follow_body_to_head_name_matches() {
        // R0: b :- a   R1: c :- b   a has no rule
        let rules = vec![rule("b", &["a"]), rule("c", &["b"])];
        let graph = DependencyGraph::from_rules(&rules);
        assert!(graph.adjacent(0).is_empty());
        assert_eq!(graph.adjacent(1), &BTreeSet::from([0]));
    }

    #[test]
    fn self_loop_from_recursive_rule() {
        let rules = vec![rule("p", &["p"])];
        let graph = DependencyGraph::from_rules(&rules);
        assert!(graph.has_edge(0, 0));
    }

    #[test]
    fn reversed_flips_every_edge() {
        let mut graph = DependencyGraph::with_nodes(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let reversed = graph.reversed();
        assert!(reversed.has_edge(1, 0));
        assert!(reversed.has_edge(2, 1));
        assert!(!reversed.has_edge(0, 1));
    }

    #[test]
    fn post_order_finishes_descendants_first() {
        let mut graph = DependencyGraph::with_nodes(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        assert_eq!(graph.post_order(), vec![2, 1, 0]);
    }

    #[test]
    fn mutual_recursion_forms_one_component() {
        let rules = vec![rule("p", &["q"]), rule("q", &["p"])];
        let graph = DependencyGraph::from_rules(&rules);
        let components = graph.strongly_connected_components();
        assert_eq!(components, vec![BTreeSet::from([0, 1])]);
    }

    #[test]
    fn chain_discovers_dependencies_first() {
        // R1 depends on R0, R2 depends on R1; discovery order must let a
        // single evaluation of each rule see its inputs populated.
        let rules = vec![rule("b", &["a"]), rule("c", &["b"]), rule("d", &["c"])];
        let graph = DependencyGraph::from_rules(&rules);
        let components = graph.strongly_connected_components();
        assert_eq!(
            components,
            vec![
                BTreeSet::from([0]),
                BTreeSet::from([1]),
                BTreeSet::from([2]),
            ]
        );
    }

    #[test]
    fn cycle_plus_downstream_rule() {
        // R0 and R1 are mutually recursive; R2 consumes their output.
        let rules = vec![
            rule("p", &["q"]),
            rule("q", &["p"]),
            rule("r", &["p"]),
        ];
        let graph = DependencyGraph::from_rules(&rules);
        let components = graph.strongly_connected_components();
        assert_eq!(
            components,
            vec![BTreeSet::from([0, 1]), BTreeSet::from([2])]
        );
    }

    #[test]
    fn display_lists_adjacency_in_index_order() {
        let mut graph = DependencyGraph::with_nodes(3);
        graph.add_edge(0, 2);
        graph.add_edge(0, 1);
        graph.add_edge(2, 0);
        assert_eq!(graph.to_string(), "R0:R1,R2\nR1:\nR2:R0\n");
    }
}
