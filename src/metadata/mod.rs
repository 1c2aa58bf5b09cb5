//! Metadata documents and their normalization.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     MetadataProvider                         │
//! │   workbook(name)  calculated_fields(ids)  workbook_names()   │
//! └──────────────────────────────────────────────────────────────┘
//!                           │ raw JSON (raw.rs)
//!                           ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      normalize.rs                            │
//! │   required-key checks → MalformedMetadata { entity, key }    │
//! └──────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//!        Workbook / CalculatedFieldDefs / ReportingField
//! ```
//!
//! Reporting-side documents (combined trees or bare field records) are read
//! separately through [`select_reporting_fields`].

pub mod combined;
pub mod normalize;
pub mod provider;
pub mod raw;
pub mod types;

pub use combined::{parse_db_lineage, parse_records, select_reporting_fields, FieldSelection};
pub use normalize::{
    normalize_calculated_field, normalize_calculated_fields, normalize_db_lineage,
    normalize_field, normalize_reporting_field, normalize_workbook,
};
pub use provider::{parse_calculated_fields, parse_workbooks, JsonMetadataProvider, MetadataProvider};
pub use types::{
    Dashboard, DbLineage, ReportingField, Sheet, SheetField, UpstreamColumn, Workbook,
};
