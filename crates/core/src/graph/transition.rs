use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::history::types::CasOperation;

/// Directed multigraph of register transitions backed by an adjacency map.
///
/// Each vertex of type `T` maps to the list of its outgoing neighbors, in
/// insertion order. Parallel edges are kept: the same transition recorded
/// twice contributes two edges. Only vertices with at least one outgoing edge
/// are keys of the map.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    /// Maps each vertex to the vertices it has edges to.
    pub adj_map: HashMap<T, Vec<T>>,
    edge_count: usize,
}

impl<T> Default for TransitionGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    fn default() -> Self {
        Self {
            adj_map: HashMap::new(),
            edge_count: 0,
        }
    }
}

impl<T> TransitionGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    /// Builds the graph of `expected_value -> new_value` edges of every
    /// successful operation. Failed operations contribute nothing.
    pub fn from_successful<'a, I>(operations: I) -> Self
    where
        I: IntoIterator<Item = &'a CasOperation<T>>,
        T: 'a,
    {
        let mut graph = Self::default();
        for operation in operations {
            if operation.succeeded {
                graph.add_edge(
                    operation.expected_value.clone(),
                    operation.new_value.clone(),
                );
            }
        }
        graph
    }

    /// Inserts a directed edge from `source` to `target`.
    pub fn add_edge(&mut self, source: T, target: T) {
        self.adj_map.entry(source).or_default().push(target);
        self.edge_count += 1;
    }

    /// The outgoing neighbors of `source`, empty if it has none.
    #[must_use]
    pub fn successors(&self, source: &T) -> &[T] {
        self.adj_map
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn out_degree(&self, source: &T) -> usize {
        self.successors(source).len()
    }

    #[must_use]
    pub fn has_outgoing(&self, source: &T) -> bool {
        self.out_degree(source) > 0
    }

    /// Total number of edges, parallel edges counted separately.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Number of incoming edges per vertex, for every vertex with at least one.
    #[must_use]
    pub fn in_degrees(&self) -> HashMap<T, usize> {
        let mut in_degree: HashMap<T, usize> = HashMap::new();
        for targets in self.adj_map.values() {
            for target in targets {
                *in_degree.entry(target.clone()).or_insert(0) += 1;
            }
        }
        in_degree
    }

    /// Number of outgoing edges per vertex, for every vertex with at least one.
    #[must_use]
    pub fn out_degrees(&self) -> HashMap<T, usize> {
        self.adj_map
            .iter()
            .map(|(source, targets)| (source.clone(), targets.len()))
            .collect()
    }

    /// Every vertex that is the source or target of some edge.
    #[must_use]
    pub fn vertices(&self) -> Vec<T> {
        let mut seen: HashSet<&T> = HashSet::new();
        for (source, targets) in &self.adj_map {
            seen.insert(source);
            seen.extend(targets);
        }
        seen.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_failed_operations_add_no_edges() {
        let operations = vec![
            CasOperation::succeeded(1, 2),
            CasOperation::failed(2, 3),
            CasOperation::succeeded(2, 4),
        ];
        let graph = TransitionGraph::from_successful(&operations);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.successors(&1), &[2]);
        assert_eq!(graph.successors(&2), &[4]);
        assert!(!graph.has_outgoing(&3));
        assert!(!graph.has_outgoing(&4));
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut graph = TransitionGraph::default();
        graph.add_edge(1, 2);
        graph.add_edge(1, 2);
        graph.add_edge(2, 1);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.out_degree(&1), 2);
        assert_eq!(graph.in_degrees().get(&2), Some(&2));
        assert_eq!(graph.out_degrees().get(&2), Some(&1));
    }

    #[test]
    fn test_vertices_include_sinks() {
        let mut graph = TransitionGraph::default();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        let mut vertices = graph.vertices();
        vertices.sort_unstable();
        assert_eq!(vertices, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_graph() {
        let graph: TransitionGraph<u64> = TransitionGraph::default();
        assert!(graph.is_empty());
        assert!(graph.successors(&0).is_empty());
        assert!(graph.vertices().is_empty());
    }
}
