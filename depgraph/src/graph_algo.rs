use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;

use crate::error::GraphError;
use crate::graph::{DependencyGraph, ROOT};

impl DependencyGraph {
    /// Check that the graph is a tree headed by the root node.
    ///
    /// Every edge must connect two nodes of the graph, the root must not
    /// have a head, every other node must have exactly one head, and the
    /// graph must be acyclic. Together, these conditions imply that every
    /// node is reachable from the root.
    pub fn check_tree(&self) -> Result<(), GraphError> {
        TreeView::new(self).map(|_| ())
    }

    /// Get the distance of every node to the root.
    ///
    /// The root itself has depth 0. Fails with the same errors as
    /// `check_tree`.
    pub fn depths(&self) -> Result<BTreeMap<String, usize>, GraphError> {
        let view = TreeView::new(self)?;

        let mut depths = HashMap::new();
        depths.insert(view.root, 0);

        let mut bfs = Bfs::new(&view.graph, view.root);
        while let Some(node) = bfs.next(&view.graph) {
            let depth = depths[&node];
            for dependent in view.graph.neighbors(node) {
                depths.entry(dependent).or_insert(depth + 1);
            }
        }

        Ok(depths
            .into_iter()
            .map(|(idx, depth)| (view.graph[idx].to_string(), depth))
            .collect())
    }
}

/// A validated petgraph copy of the dependency tree.
struct TreeView<'a> {
    graph: DiGraph<&'a str, ()>,
    root: NodeIndex,
}

impl<'a> TreeView<'a> {
    fn new(dep_graph: &'a DependencyGraph) -> Result<Self, GraphError> {
        let mut graph = DiGraph::with_capacity(dep_graph.node_count(), dep_graph.edge_count());
        let indices = dep_graph
            .nodes()
            .map(|(key, _)| (key, graph.add_node(key)))
            .collect::<HashMap<_, _>>();

        let root = node_index(&indices, ROOT)?;

        for edge in dep_graph.edges() {
            let head = node_index(&indices, edge.head())?;
            let dependent = node_index(&indices, edge.dependent())?;
            graph.add_edge(head, dependent, ());
        }

        for idx in graph.node_indices() {
            let n_heads = graph.edges_directed(idx, Direction::Incoming).count();

            if idx == root {
                if n_heads != 0 {
                    return Err(GraphError::RootHasHead);
                }
            } else if n_heads == 0 {
                return Err(GraphError::NoHead {
                    node: graph[idx].to_string(),
                });
            } else if n_heads > 1 {
                return Err(GraphError::MultipleHeads {
                    node: graph[idx].to_string(),
                    count: n_heads,
                });
            }
        }

        toposort(&graph, None).map_err(|cycle| GraphError::Cycle {
            node: graph[cycle.node_id()].to_string(),
        })?;

        Ok(TreeView { graph, root })
    }
}

fn node_index(indices: &HashMap<&str, NodeIndex>, key: &str) -> Result<NodeIndex, GraphError> {
    indices
        .get(key)
        .copied()
        .ok_or_else(|| GraphError::MissingNode {
            node: key.to_owned(),
        })
}
