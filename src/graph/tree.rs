//! Tree builders for reporting-side and database-side records.

use crate::lineage::VisitedSet;
use crate::metadata::{DbLineage, ReportingField};

use super::node::{LineageKind, LineageNode, NodeType};

/// Build the lineage tree of a reporting-side field.
///
/// Each upstream column becomes a child (its table label joins the upstream
/// table names), with the column's database lineage beneath it. Nested
/// upstream fields become child subtrees.
pub fn build_reporting_tree(field: &ReportingField) -> LineageNode {
    let mut root = LineageNode::new(
        field.name.as_str(),
        NodeType::Field,
        "",
        LineageKind::ReportingSide,
    )
    .with_formula(field.formula.as_str());

    for column in &field.upstream_columns {
        let mut column_node = LineageNode::new(
            column.name.as_str(),
            NodeType::Column,
            column.tables.join(", "),
            LineageKind::ReportingSide,
        );
        if let Some(db) = &column.database_lineage {
            // Fresh per column: revisits are suppressed within one column's
            // database lineage only.
            let mut visited = VisitedSet::new();
            column_node.add_child(build_db_lineage(db, &mut visited));
        }
        root.add_child(column_node);
    }

    for upstream in &field.upstream_fields {
        root.add_child(build_reporting_tree(upstream));
    }

    root
}

/// Build the database-side subtree of `record`.
///
/// A `model.column` already in `visited` comes back as a leaf: the edge into
/// it is kept, its upstream is not walked again.
pub fn build_db_lineage(record: &DbLineage, visited: &mut VisitedSet) -> LineageNode {
    let mut node = LineageNode::new(
        record.column.as_str(),
        NodeType::DbColumn,
        record.model.as_str(),
        LineageKind::DatabaseSide,
    )
    .with_description(record.description.as_str())
    .with_reasoning(record.reasoning.as_str());

    if !visited.insert(&record.identity()) {
        return node;
    }
    for upstream in &record.upstream {
        node.add_child(build_db_lineage(upstream, visited));
    }
    node
}
