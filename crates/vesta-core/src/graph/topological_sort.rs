// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Kahn's algorithm, made stable so ties keep their input order.

use std::collections::HashMap;
use std::hash::Hash;

/// An error indicating that a cycle was detected in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError;

/// Performs a stable topological sort on a directed graph.
///
/// Among the nodes that are ready at any point, the one that came first in
/// `nodes` is emitted first. A graph without edges therefore comes back in its
/// input order.
///
/// # Arguments
///
/// * `nodes`: The unique nodes of the graph, in their preferred order.
/// * `edges`: The directed edges, as `(parent, child)` tuples. Edges that
///   mention unknown nodes are ignored.
///
/// # Returns
///
/// * `Ok(Vec<T>)`: The nodes in a valid topological order.
/// * `Err(CycleError)`: If the graph contains one or more cycles.
pub fn topological_sort<T>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
) -> Result<Vec<T>, CycleError>
where
    T: Copy + Eq + Hash,
{
    topological_sort_with(nodes, edges, |_, _| 0)
}

/// Performs a topological sort, letting `pick` choose among the ready nodes.
///
/// `pick` receives the last emitted node (if any) and the ready nodes in input
/// order, and returns the index of the node to emit next. An out-of-range
/// index falls back to the first ready node.
pub fn topological_sort_with<T, F>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
    mut pick: F,
) -> Result<Vec<T>, CycleError>
where
    T: Copy + Eq + Hash,
    F: FnMut(Option<&T>, &[T]) -> usize,
{
    let node_list: Vec<T> = nodes.into_iter().collect();
    if node_list.is_empty() {
        return Ok(Vec::new());
    }
    let position: HashMap<T, usize> = node_list
        .iter()
        .enumerate()
        .map(|(index, node)| (*node, index))
        .collect();

    let mut adjacency_list: HashMap<T, Vec<T>> = HashMap::new();
    let mut in_degree: HashMap<T, usize> = node_list.iter().map(|id| (*id, 0)).collect();

    // 1. Build adjacency list and in-degree counts from edges.
    for (parent, child) in edges {
        if !position.contains_key(&parent) {
            continue;
        }
        if let Some(degree) = in_degree.get_mut(&child) {
            *degree += 1;
            adjacency_list.entry(parent).or_default().push(child);
        }
    }

    // 2. Ready set, kept in input order.
    let mut ready: Vec<T> = node_list
        .iter()
        .copied()
        .filter(|node| in_degree.get(node).copied().unwrap_or(0) == 0)
        .collect();

    // 3. Emit one ready node at a time.
    let mut sorted_list: Vec<T> = Vec::with_capacity(node_list.len());
    while !ready.is_empty() {
        let chosen = pick(sorted_list.last(), &ready);
        let chosen = if chosen < ready.len() { chosen } else { 0 };
        let parent_node = ready.remove(chosen);
        sorted_list.push(parent_node);

        if let Some(children) = adjacency_list.get(&parent_node) {
            for &child_node in children {
                if let Some(degree) = in_degree.get_mut(&child_node) {
                    *degree -= 1;
                    if *degree == 0 {
                        let at = ready
                            .iter()
                            .position(|other| position[other] > position[&child_node])
                            .unwrap_or(ready.len());
                        ready.insert(at, child_node);
                    }
                }
            }
        }
    }

    // 4. Check for cycles.
    if sorted_list.len() != node_list.len() {
        Err(CycleError)
    } else {
        Ok(sorted_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edges_keeps_input_order() {
        let sorted = topological_sort([3, 1, 2], []).unwrap();
        assert_eq!(sorted, vec![3, 1, 2]);
    }

    #[test]
    fn edges_are_respected() {
        // 1 -> 0, 2 -> 1
        let sorted = topological_sort([0, 1, 2], [(1, 0), (2, 1)]).unwrap();
        assert_eq!(sorted, vec![2, 1, 0]);
    }

    #[test]
    fn released_nodes_return_to_input_order() {
        // 'c' waits on 'a'; once released it must come before 'd'.
        let sorted = topological_sort(['a', 'b', 'c', 'd'], [('a', 'c')]).unwrap();
        assert_eq!(sorted, vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn cycle_is_detected() {
        let result = topological_sort([1, 2, 3], [(1, 2), (2, 3), (3, 1)]);
        assert_eq!(result, Err(CycleError));
    }

    #[test]
    fn unknown_edges_are_ignored() {
        let sorted = topological_sort([1, 2], [(7, 1), (2, 9)]).unwrap();
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn pick_groups_matching_nodes() {
        // Nodes are (id, group). Prefer staying in the same group.
        let nodes = [(0, 'x'), (1, 'y'), (2, 'x'), (3, 'y')];
        let sorted = topological_sort_with(nodes, [], |last, ready| {
            last.and_then(|(_, group)| ready.iter().position(|(_, g)| g == group))
                .unwrap_or(0)
        })
        .unwrap();
        assert_eq!(sorted, vec![(0, 'x'), (2, 'x'), (1, 'y'), (3, 'y')]);
    }

    #[test]
    fn pick_cannot_break_dependencies() {
        // 2 depends on 1; even though the picker wants group 'x', 2 is not ready.
        let nodes = [(0, 'x'), (1, 'y'), (2, 'x')];
        let edges = [((1, 'y'), (2, 'x'))];
        let sorted = topological_sort_with(nodes, edges, |last, ready| {
            last.and_then(|(_, group)| ready.iter().position(|(_, g)| g == group))
                .unwrap_or(0)
        })
        .unwrap();
        assert_eq!(sorted, vec![(0, 'x'), (1, 'y'), (2, 'x')]);
    }
}
