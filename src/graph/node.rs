//! Render-graph nodes and their identity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the lineage a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineageKind {
    /// Reporting fields, their columns and tables.
    ReportingSide,
    /// Database columns derived from SQL.
    DatabaseSide,
}

impl LineageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineageKind::ReportingSide => "Reporting Side Lineage",
            LineageKind::DatabaseSide => "Database Side Lineage",
        }
    }
}

impl fmt::Display for LineageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Field,
    Column,
    DbColumn,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Field => "Field",
            NodeType::Column => "Column",
            NodeType::DbColumn => "DB Column",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable key of a rendered node: name, table and lineage kind.
///
/// Two nodes built independently on different paths merge when their
/// identities match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIdentity(String);

impl NodeIdentity {
    pub fn new(name: &str, table: &str, kind: LineageKind) -> Self {
        Self(format!("{}_{}_{}", name, table, kind.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a rendered edge. An edge is drawn once however often it is found.
pub type EdgeIdentity = (NodeIdentity, NodeIdentity);

/// Descriptive attributes shown on hover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub description: String,
    pub reasoning: String,
    pub formula: String,
}

/// A lineage node in tree form.
///
/// A node reachable from two parents appears twice with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    pub identity: NodeIdentity,
    pub display_name: String,
    pub node_type: NodeType,
    pub table: String,
    pub lineage_kind: LineageKind,
    pub metadata: NodeMetadata,
    pub children: Vec<LineageNode>,
}

impl LineageNode {
    pub fn new(
        name: impl Into<String>,
        node_type: NodeType,
        table: impl Into<String>,
        lineage_kind: LineageKind,
    ) -> Self {
        let display_name = name.into();
        let table = table.into();
        Self {
            identity: NodeIdentity::new(&display_name, &table, lineage_kind),
            display_name,
            node_type,
            table,
            lineage_kind,
            metadata: NodeMetadata::default(),
            children: Vec::new(),
        }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.metadata.formula = formula.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.metadata.reasoning = reasoning.into();
        self
    }

    pub fn add_child(&mut self, child: LineageNode) {
        self.children.push(child);
    }

    /// Copy of this node without its children.
    pub fn detached(&self) -> LineageNode {
        LineageNode {
            identity: self.identity.clone(),
            display_name: self.display_name.clone(),
            node_type: self.node_type,
            table: self.table.clone(),
            lineage_kind: self.lineage_kind,
            metadata: self.metadata.clone(),
            children: Vec::new(),
        }
    }

    /// Hover text lines, `(label, value)`.
    pub fn metadata_lines(&self) -> [(&'static str, &str); 7] {
        [
            ("Name", self.display_name.as_str()),
            ("Type", self.node_type.as_str()),
            ("Table", self.table.as_str()),
            ("Description", self.metadata.description.as_str()),
            ("Reasoning", self.metadata.reasoning.as_str()),
            ("Formula", self.metadata.formula.as_str()),
            ("Lineage Type", self.lineage_kind.as_str()),
        ]
    }

    /// Number of nodes in this tree, counting repeats.
    pub fn tree_size(&self) -> usize {
        1 + self.children.iter().map(LineageNode::tree_size).sum::<usize>()
    }
}
