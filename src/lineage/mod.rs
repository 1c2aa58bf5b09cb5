//! Lineage resolution engine.
//!
//! Resolution runs in three stages:
//!
//! 1. **Resolve** - walk calculated-field upstream references depth-first
//!    ([`Resolver`]), guarded by a [`VisitedSet`]
//! 2. **Flatten** - expand multi-valued physical references into rows
//!    ([`flatten`])
//! 3. **Drive** - treat every sheet-exposed field as a root, once per
//!    dashboard ([`resolve_workbook`])
//!
//! Each run is a pure function of its input. Rows flagged with a
//! [`Sentinel`](crate::error::Sentinel) mark where resolution could not
//! continue.

pub mod db;
pub mod flatten;
pub mod model;
pub mod resolve;
pub mod visited;
pub mod workbook;

pub use db::{db_lineage_edges, DbLineageEdge};
pub use flatten::{flatten, flatten_paired, flatten_with, FlattenMode};
pub use model::{
    index_defs, CalculatedFieldDef, CalculatedFieldDefs, ColumnRef, DatabaseRef, FieldKind,
    FieldRef, LineageRow, TableRef, TraversalContext, UpstreamType,
};
pub use resolve::{resolve, Resolver};
pub use visited::{VisitedScope, VisitedSet};
pub use workbook::{resolve_workbook, resolve_workbooks};
