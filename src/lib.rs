//! # Lineage
//!
//! Resolves how reporting fields are derived, from calculated-field formulas
//! through datasource fields down to physical tables, columns and databases.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Metadata (pre-fetched JSON)                 │
//! │  (workbooks, calculated-field batches, reporting fields) │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [normalize]
//! ┌─────────────────────────────────────────────────────────┐
//! │      FieldRef / CalculatedFieldDef / Workbook            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolve + flatten]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  LineageRow (edges)                      │
//! └─────────────────────────────────────────────────────────┘
//!                │                           │
//!                ▼ [export]                  ▼ [graph]
//! ┌──────────────────────────┐   ┌─────────────────────────┐
//! │  deduplicated sheets     │   │  LineageGraph → DOT     │
//! └──────────────────────────┘   └─────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod lineage;
pub mod logging;
pub mod metadata;
pub mod render;

pub use error::{LineageError, LineageResult, Sentinel};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::error::{LineageError, LineageResult, Sentinel};
    pub use crate::export::{dedup_rows, group_by_workbook, Sheet};
    pub use crate::graph::{build_reporting_tree, LineageGraph, LineageNode, NodeIdentity};
    pub use crate::lineage::{
        flatten, resolve, resolve_workbook, CalculatedFieldDef, CalculatedFieldDefs, FieldKind,
        FieldRef, LineageRow, Resolver, TraversalContext, UpstreamType, VisitedSet,
    };
    pub use crate::metadata::{JsonMetadataProvider, MetadataProvider, Workbook};
    pub use crate::render::{to_dot, Theme, ThemeName};
}
