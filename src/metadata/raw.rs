//! Raw metadata documents as the catalog returns them.
//!
//! Every key is optional here so that normalization can report exactly
//! which one is missing, and on which entity. GraphQL lists may come back
//! as `null`; those deserialize to `None` as well.

use serde::{Deserialize, Serialize};

/// `{ "data": ... }` wrapper around GraphQL responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphQlEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawNamed {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTable {
    pub name: Option<String>,
    pub schema: Option<String>,
}

/// A field as it appears in any upstream list, or as a sheet field instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub upstream_datasources: Option<Vec<RawNamed>>,
    pub upstream_tables: Option<Vec<RawTable>>,
    pub upstream_columns: Option<Vec<RawNamed>>,
    pub upstream_databases: Option<Vec<RawNamed>>,
    pub upstream_fields: Option<Vec<RawField>>,
}

/// One entry of the calculated-field batch lookup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCalculatedField {
    pub id: Option<String>,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub fields: Option<Vec<RawField>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculatedFields {
    pub calculated_fields: Option<Vec<RawCalculatedField>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDashboard {
    pub name: Option<String>,
    pub upstream_fields: Option<Vec<RawField>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSheet {
    pub id: Option<String>,
    pub name: Option<String>,
    pub contained_in_dashboards: Option<Vec<RawNamed>>,
    pub sheet_field_instances: Option<Vec<RawField>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWorkbook {
    pub id: Option<String>,
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub dashboards: Option<Vec<RawDashboard>>,
    pub sheets: Option<Vec<RawSheet>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawWorkbooks {
    pub workbooks: Option<Vec<RawWorkbook>>,
}

// =============================================================================
// Reporting-side and database-side records
// =============================================================================

/// SQL-derived lineage of one database column.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDbLineage {
    pub model: Option<String>,
    pub column: Option<String>,
    #[serde(rename = "column Description")]
    pub description: Option<String>,
    pub reasoning: Option<String>,
    pub upstream_models: Option<Vec<RawDbLineage>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUpstreamColumn {
    pub name: Option<String>,
    pub upstream_tables: Option<Vec<RawNamed>>,
    #[serde(rename = "database_lineage")]
    pub database_lineage: Option<RawDbLineage>,
}

/// Reporting-side field record used for graph rendering.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReportingField {
    pub name: Option<String>,
    pub formula: Option<String>,
    pub upstream_columns: Option<Vec<RawUpstreamColumn>>,
    pub upstream_fields: Option<Vec<RawReportingField>>,
}

// =============================================================================
// Combined reporting document
// =============================================================================

/// `workbooks -> dashboards -> upstreamDatasources -> sheets -> upstreamFields`
/// document with reporting fields at the leaves.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCombined {
    pub workbooks: Option<Vec<RawCombinedWorkbook>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCombinedWorkbook {
    pub name: Option<String>,
    pub dashboards: Option<Vec<RawCombinedDashboard>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCombinedDashboard {
    pub name: Option<String>,
    pub upstream_datasources: Option<Vec<RawCombinedDatasource>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCombinedDatasource {
    pub name: Option<String>,
    pub sheets: Option<Vec<RawCombinedSheet>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCombinedSheet {
    pub name: Option<String>,
    pub upstream_fields: Option<Vec<RawReportingField>>,
}
