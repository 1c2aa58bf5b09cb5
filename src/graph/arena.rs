//! Identity-keyed lineage graph.
//!
//! Nodes live in an arena keyed by [`NodeIdentity`]; edges point from a node
//! to its upstream. Shared subtrees are stored once, and each
//! `(from, to)` identity pair holds at most one edge.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::node::{EdgeIdentity, LineageKind, LineageNode, NodeIdentity, NodeType};
use super::tree::build_reporting_tree;
use crate::lineage::LineageRow;
use crate::metadata::ReportingField;

/// Lineage graph with deduplicated nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    graph: DiGraph<LineageNode, ()>,
    index: HashMap<NodeIdentity, NodeIndex>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a tree into a graph.
    pub fn from_tree(root: &LineageNode) -> Self {
        let mut graph = Self::new();
        graph.merge_tree(root);
        graph
    }

    /// Merge the lineage trees of several reporting fields.
    pub fn from_reporting_fields(fields: &[ReportingField]) -> Self {
        let mut graph = Self::new();
        for field in fields {
            graph.merge_tree(&build_reporting_tree(field));
        }
        graph
    }

    /// Build a graph from resolved rows.
    ///
    /// Each row links its field to its upstream field (when named), and the
    /// upstream field, or the field itself for top-level datasource rows, to
    /// the physical column (when present).
    pub fn from_rows(rows: &[LineageRow]) -> Self {
        let mut graph = Self::new();
        for row in rows {
            let field = graph.add_node(field_node(&row.field_name));

            let upstream = if row.upstream_field_name.is_empty() {
                field
            } else {
                let upstream = graph.add_node(field_node(&row.upstream_field_name));
                graph.link(field, upstream);
                upstream
            };

            if !row.upstream_column.is_empty() {
                let column = graph.add_node(LineageNode::new(
                    row.upstream_column.as_str(),
                    NodeType::Column,
                    row.upstream_table.as_str(),
                    LineageKind::ReportingSide,
                ));
                graph.link(upstream, column);
            }
        }
        graph
    }

    /// Add every node and edge of `root` to the graph.
    pub fn merge_tree(&mut self, root: &LineageNode) -> NodeIndex {
        let parent = self.add_node(root.detached());
        for child in &root.children {
            let child_idx = self.merge_tree(child);
            self.link(parent, child_idx);
        }
        parent
    }

    /// Get or create the node with `node`'s identity.
    ///
    /// The first node inserted under an identity is kept.
    pub fn add_node(&mut self, node: LineageNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.identity) {
            return idx;
        }
        let identity = node.identity.clone();
        let idx = self.graph.add_node(node.detached());
        self.index.insert(identity, idx);
        idx
    }

    /// Add an edge between two known identities.
    ///
    /// Returns false if either identity is unknown or the edge already exists.
    pub fn add_edge(&mut self, from: &NodeIdentity, to: &NodeIdentity) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&from), Some(&to)) => self.link(from, to),
            _ => false,
        }
    }

    fn link(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    pub fn node(&self, identity: &NodeIdentity) -> Option<&LineageNode> {
        self.index
            .get(identity)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn contains(&self, identity: &NodeIdentity) -> bool {
        self.index.contains_key(identity)
    }

    /// Direct upstream nodes of `identity`, in insertion order.
    pub fn upstream_of(&self, identity: &NodeIdentity) -> Vec<&LineageNode> {
        let Some(&idx) = self.index.get(identity) else {
            return Vec::new();
        };
        let mut targets: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        targets.sort();
        targets.iter().map(|&t| &self.graph[t]).collect()
    }

    /// Nodes nothing points at, in insertion order.
    pub fn roots(&self) -> Vec<&LineageNode> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &LineageNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&LineageNode, &LineageNode)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()]))
    }

    pub fn edge_identities(&self) -> Vec<EdgeIdentity> {
        self.edges()
            .map(|(from, to)| (from.identity.clone(), to.identity.clone()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cycles among nodes, each as the identities involved.
    ///
    /// Uses Tarjan's SCC algorithm; self-loops count as cycles of one.
    pub fn cycles(&self) -> Vec<Vec<NodeIdentity>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || (scc.len() == 1 && self.graph.contains_edge(scc[0], scc[0]))
            })
            .map(|scc| {
                let mut ids: Vec<NodeIdentity> =
                    scc.into_iter().map(|idx| self.graph[idx].identity.clone()).collect();
                ids.sort();
                ids
            })
            .collect()
    }
}

fn field_node(name: &str) -> LineageNode {
    LineageNode::new(name, NodeType::Field, "", LineageKind::ReportingSide)
}
