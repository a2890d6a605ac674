use super::Graph;
use super::node::NodeId;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

impl Graph {
    /// Longest path, in edges, from `from` back up to `target`.
    ///
    /// Returns `Some(0)` when both are the same node and `None` when `target`
    /// is not upstream of `from`.
    pub fn distance(&self, from: NodeId, target: NodeId) -> Option<usize> {
        let mut memo = AHashMap::new();
        self.longest_upstream(from, target, &mut memo)
    }

    /// Edge insertion rejects cycles, so the walk always terminates. Results are
    /// memoized per node for the fixed `target`, which keeps diamonds linear.
    fn longest_upstream(
        &self,
        node: NodeId,
        target: NodeId,
        memo: &mut AHashMap<NodeId, Option<usize>>,
    ) -> Option<usize> {
        if node == target {
            return Some(0);
        }
        if let Some(known) = memo.get(&node) {
            return *known;
        }
        let producers = self
            .nodes
            .get(&node)
            .map(|n| n.incoming.clone())
            .unwrap_or_default();
        let longest = producers
            .into_iter()
            .filter_map(|p| self.longest_upstream(p, target, memo))
            .max()
            .map(|d| d + 1);
        memo.insert(node, longest);
        longest
    }

    /// `true` if `candidate` feeds `node`, directly or through other nodes.
    pub fn is_upstream(&self, candidate: NodeId, node: NodeId) -> bool {
        candidate != node && self.distance(node, candidate).is_some()
    }

    /// Every node downstream of `source`, grouped by their distance to it.
    ///
    /// Groups come in ascending distance; within a group nodes keep insertion
    /// order. Nodes of one group do not depend on each other.
    pub fn downstream_layers(&self, source: NodeId) -> Vec<(usize, Vec<NodeId>)> {
        let mut memo = AHashMap::new();
        self.order
            .iter()
            .filter(|id| **id != source)
            .filter_map(|id| {
                self.longest_upstream(*id, source, &mut memo)
                    .filter(|d| *d > 0)
                    .map(|d| (d, *id))
            })
            .into_group_map()
            .into_iter()
            .sorted_by_key(|(distance, _)| *distance)
            .collect()
    }

    /// All nodes reachable from `source` through dependents, in breadth-first order.
    pub fn downstream(&self, source: NodeId) -> Vec<NodeId> {
        let mut seen = AHashSet::new();
        let mut queue = std::collections::VecDeque::new();
        let mut result = Vec::new();
        seen.insert(source);
        queue.push_back(source);
        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            for dependent in &node.dependents {
                if seen.insert(*dependent) {
                    result.push(*dependent);
                    queue.push_back(*dependent);
                }
            }
        }
        result
    }
}
