use std::collections::{HashMap, VecDeque};

/// Graph structure for ordering and traversal.
///
/// Node order is the insertion order of the ids passed to [`Graph::new`];
/// neighbor lists keep edge order.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in insertion order.
  nodes: Vec<String>,
  /// Adjacency list: node_id -> list of downstream node_ids.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node_id -> list of upstream node_ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Nodes with no incoming edges.
  entry_points: Vec<String>,
}

impl Graph {
  /// Build a graph from node ids and edges.
  ///
  /// Edges are expected to reference known ids; unknown endpoints only
  /// affect the adjacency lists, never the node set.
  pub fn new<I, S>(node_ids: I, edges: &[(String, String)]) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let nodes: Vec<String> = node_ids.into_iter().map(Into::into).collect();
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    // Initialize all nodes
    for node_id in &nodes {
      adjacency.entry(node_id.clone()).or_default();
      reverse_adjacency.entry(node_id.clone()).or_default();
    }

    // Build adjacency lists
    for (from, to) in edges {
      adjacency.entry(from.clone()).or_default().push(to.clone());
      reverse_adjacency
        .entry(to.clone())
        .or_default()
        .push(from.clone());
    }

    // Find entry points (no incoming edges)
    let entry_points: Vec<String> = nodes
      .iter()
      .filter(|id| reverse_adjacency.get(*id).is_none_or(|v| v.is_empty()))
      .cloned()
      .collect();

    Self {
      nodes,
      adjacency,
      reverse_adjacency,
      entry_points,
    }
  }

  /// Get entry points (nodes with no incoming edges).
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream nodes for a given node, in edge order.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Topological order by Kahn's algorithm.
  ///
  /// Ready nodes are taken first-in first-out, seeded in insertion order.
  /// On a cycle, returns the nodes that could not be ordered, in insertion
  /// order.
  pub fn topological_order(&self) -> Result<Vec<String>, Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = self
      .nodes
      .iter()
      .map(|id| (id.as_str(), self.upstream(id).len()))
      .collect();

    let mut queue: VecDeque<&str> = self
      .entry_points
      .iter()
      .map(|id| id.as_str())
      .collect();
    let mut ordered: Vec<String> = Vec::with_capacity(self.nodes.len());

    while let Some(current) = queue.pop_front() {
      ordered.push(current.to_string());

      for neighbor in self.downstream(current) {
        if let Some(degree) = in_degree.get_mut(neighbor.as_str()) {
          *degree -= 1;
          if *degree == 0 {
            queue.push_back(neighbor.as_str());
          }
        }
      }
    }

    if ordered.len() == self.nodes.len() {
      return Ok(ordered);
    }

    let remaining = self
      .nodes
      .iter()
      .filter(|id| in_degree.get(id.as_str()).is_some_and(|d| *d > 0))
      .cloned()
      .collect();
    Err(remaining)
  }
}
