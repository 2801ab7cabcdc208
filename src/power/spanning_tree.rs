use super::{Edge, Network, NodeId};
use std::collections::HashMap;

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    /// Returns false if both were already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        true
    }
}

impl Network {
    /// Spanning tree built by Kruskal's algorithm over the edges sorted by
    /// ascending tier, then by endpoint ids. Only used for display; settlement
    /// never consults it.
    pub fn get_spanning_tree(&self) -> Vec<Edge> {
        let index: HashMap<NodeId, usize> = self
            .members()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();

        let mut edges: Vec<Edge> = self.edges().collect();
        edges.sort_by_key(|edge| (edge.strength, edge.a, edge.b));

        let mut sets = DisjointSet::new(index.len());
        let mut tree = Vec::with_capacity(index.len().saturating_sub(1));
        for edge in edges {
            let (Some(&a), Some(&b)) = (index.get(&edge.a), index.get(&edge.b)) else {
                continue;
            };
            if sets.union(a, b) {
                tree.push(edge);
            }
        }
        tree
    }
}
