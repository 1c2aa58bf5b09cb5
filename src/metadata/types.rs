//! Normalized workbook, reporting-side and database-side records.

use serde::{Deserialize, Serialize};

use crate::lineage::model::{FieldKind, FieldRef};

/// A workbook with its dashboards and sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub name: String,
    pub project: Option<String>,
    pub dashboards: Vec<Dashboard>,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: None,
            dashboards: Vec::new(),
            sheets: Vec::new(),
        }
    }

    /// Distinct calculated-field ids referenced by any dashboard, sorted.
    ///
    /// This is the id list handed to the batch lookup.
    pub fn calculated_field_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .dashboards
            .iter()
            .flat_map(|d| &d.upstream_fields)
            .filter(|f| f.kind == FieldKind::CalculatedField)
            .map(|f| f.id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub name: String,
    pub upstream_fields: Vec<FieldRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    /// Names of the dashboards that contain this sheet.
    pub dashboards: Vec<String>,
    pub fields: Vec<SheetField>,
}

/// A field exposed on a sheet; the roots of resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetField {
    pub field: FieldRef,
    pub datasources: Vec<String>,
}

impl SheetField {
    /// Data source label for rows rooted at this field.
    pub fn data_source_label(&self) -> String {
        self.datasources.join(", ")
    }
}

/// Reporting-side field with its upstream columns and fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingField {
    pub name: String,
    pub formula: String,
    pub upstream_columns: Vec<UpstreamColumn>,
    pub upstream_fields: Vec<ReportingField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamColumn {
    pub name: String,
    pub tables: Vec<String>,
    pub database_lineage: Option<DbLineage>,
}

/// SQL-derived lineage of a database column, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbLineage {
    pub model: String,
    pub column: String,
    pub description: String,
    pub reasoning: String,
    pub upstream: Vec<DbLineage>,
}

impl DbLineage {
    pub fn new(model: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            column: column.into(),
            description: String::new(),
            reasoning: String::new(),
            upstream: Vec::new(),
        }
    }

    pub fn with_upstream(mut self, upstream: DbLineage) -> Self {
        self.upstream.push(upstream);
        self
    }

    /// `model.column`, the key used to suppress revisits.
    pub fn identity(&self) -> String {
        format!("{}.{}", self.model, self.column)
    }
}
