//! Database-side lineage edges.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::visited::VisitedSet;
use crate::metadata::DbLineage;

/// One "database column depends on upstream column" fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbLineageEdge {
    /// Downstream `model.column`.
    pub column: String,
    /// Upstream `model.column`.
    pub upstream: String,
    /// Reasoning recorded on the upstream record.
    pub reasoning: String,
}

/// Flatten a database lineage record into edges, depth-first.
///
/// Every distinct `(column, upstream)` pair is recorded once. A `model.column`
/// already expanded in this call is linked to but not expanded again.
pub fn db_lineage_edges(record: &DbLineage) -> Vec<DbLineageEdge> {
    let mut visited = VisitedSet::new();
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    visited.insert(&record.identity());
    collect(record, &mut visited, &mut seen, &mut edges);
    edges
}

fn collect(
    record: &DbLineage,
    visited: &mut VisitedSet,
    seen: &mut HashSet<(String, String)>,
    edges: &mut Vec<DbLineageEdge>,
) {
    let column = record.identity();
    for upstream in &record.upstream {
        let identity = upstream.identity();
        if seen.insert((column.clone(), identity.clone())) {
            edges.push(DbLineageEdge {
                column: column.clone(),
                upstream: identity.clone(),
                reasoning: upstream.reasoning.clone(),
            });
        }
        if visited.insert(&identity) {
            collect(upstream, visited, seen, edges);
        }
    }
}
