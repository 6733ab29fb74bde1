use std::collections::VecDeque;

/// A precedence graph over task indices. An edge `(a, b)` means `a` must end before `b` starts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrecedenceGraph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl PrecedenceGraph {
    /// Creates a graph with `tasks` vertices and no edges.
    #[must_use]
    pub fn new(tasks: usize) -> Self {
        Self {
            successors: vec![Vec::new(); tasks],
            predecessors: vec![Vec::new(); tasks],
        }
    }

    /// Adds an edge. Returns false if the edge was already present.
    pub fn add_edge(&mut self, before: usize, after: usize) -> bool {
        if self.successors[before].contains(&after) {
            return false;
        }
        self.successors[before].push(after);
        self.predecessors[after].push(before);
        true
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    /// Returns whether the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Returns all edges in insertion order per source vertex.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(before, after)| after.iter().map(move |&after| (before, after)))
    }

    /// Computes a topological order with Kahn's algorithm, smallest index first.
    ///
    /// # Errors
    /// - If the graph has a cycle. The error holds the vertices of one cycle in edge order.
    pub fn topological_order(&self) -> Result<Vec<usize>, Vec<usize>> {
        let mut in_degree: Vec<_> = self.predecessors.iter().map(Vec::len).collect();
        let mut queue: VecDeque<_> = (0..self.len()).filter(|&v| in_degree[v] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(vertex) = queue.pop_front() {
            order.push(vertex);
            for &next in &self.successors[vertex] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() == self.len() {
            Ok(order)
        } else {
            Err(self.find_cycle(&in_degree))
        }
    }

    /// Every vertex left with a positive in-degree has a predecessor in the same state,
    /// so walking predecessors from any of them must close a cycle.
    fn find_cycle(&self, in_degree: &[usize]) -> Vec<usize> {
        let Some(start) = (0..self.len()).find(|&v| in_degree[v] > 0) else {
            unreachable!("Cycle search requires a vertex left by Kahn's algorithm");
        };

        let mut visited = vec![None; self.len()];
        let mut path = Vec::new();
        let mut current = start;

        while visited[current].is_none() {
            visited[current] = Some(path.len());
            path.push(current);
            let Some(&previous) = self.predecessors[current]
                .iter()
                .find(|&&p| in_degree[p] > 0)
            else {
                unreachable!("Vertex on a cycle must have a remaining predecessor");
            };
            current = previous;
        }

        let mut cycle = path.split_off(visited[current].unwrap_or_default());
        cycle.reverse();
        cycle
    }

    /// Returns whether the order lists every vertex exactly once and respects every edge.
    #[must_use]
    pub fn is_linear_extension(&self, order: &[usize]) -> bool {
        if order.len() != self.len() {
            return false;
        }

        let mut position = vec![usize::MAX; self.len()];
        for (index, &vertex) in order.iter().enumerate() {
            if vertex >= self.len() || position[vertex] != usize::MAX {
                return false;
            }
            position[vertex] = index;
        }

        self.edges().all(|(before, after)| position[before] < position[after])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn topological_order_respects_edges() -> Result<(), Vec<usize>> {
        let mut graph = PrecedenceGraph::new(4);
        graph.add_edge(2, 0);
        graph.add_edge(0, 1);
        graph.add_edge(3, 1);

        let order = graph.topological_order()?;

        assert_eq!(order, [2, 3, 0, 1]);
        assert!(graph.is_linear_extension(&order));
        Ok(())
    }

    #[test]
    fn duplicate_edges_are_ignored() {
        let mut graph = PrecedenceGraph::new(2);
        assert!(graph.add_edge(0, 1));
        assert!(!graph.add_edge(0, 1));
        assert_eq!(graph.edges().collect::<Vec<_>>(), [(0, 1)]);
    }

    #[test]
    fn cycle_is_reported_without_its_tail() {
        let mut graph = PrecedenceGraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 1);
        graph.add_edge(2, 3);

        let Err(mut cycle) = graph.topological_order() else {
            panic!("Cycle must be detected");
        };
        cycle.sort_unstable();

        assert_eq!(cycle, [1, 2]);
    }

    #[test]
    fn linear_extension_rejects_violations() {
        let mut graph = PrecedenceGraph::new(3);
        graph.add_edge(0, 2);

        assert!(graph.is_linear_extension(&[0, 1, 2]));
        assert!(graph.is_linear_extension(&[1, 0, 2]));
        assert!(!graph.is_linear_extension(&[2, 0, 1]));
        assert!(!graph.is_linear_extension(&[0, 0, 2]));
        assert!(!graph.is_linear_extension(&[0, 2]));
    }
}
