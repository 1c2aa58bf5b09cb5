//! Field selection over reporting-side documents.
//!
//! A reporting document is either the combined
//! `workbooks -> dashboards -> upstreamDatasources -> sheets -> upstreamFields`
//! tree, a single field record, or an array of field records.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::normalize::{normalize_db_lineage, normalize_reporting_field};
use super::raw::{RawCombined, RawDbLineage, RawReportingField};
use super::types::{DbLineage, ReportingField};
use crate::error::LineageResult;

/// Name filters, one per level. `None` (or no field names) matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    pub workbook: Option<String>,
    pub dashboard: Option<String>,
    pub datasource: Option<String>,
    pub sheet: Option<String>,
    pub fields: Vec<String>,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn workbook(mut self, name: impl Into<String>) -> Self {
        self.workbook = Some(name.into());
        self
    }

    pub fn dashboard(mut self, name: impl Into<String>) -> Self {
        self.dashboard = Some(name.into());
        self
    }

    pub fn datasource(mut self, name: impl Into<String>) -> Self {
        self.datasource = Some(name.into());
        self
    }

    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    fn matches_field(&self, name: Option<&str>) -> bool {
        self.fields.is_empty() || name.is_some_and(|n| self.fields.iter().any(|f| f == n))
    }
}

fn matches(filter: &Option<String>, name: &Option<String>) -> bool {
    match filter {
        None => true,
        Some(wanted) => name.as_deref() == Some(wanted.as_str()),
    }
}

/// Parse a single record or an array of records.
pub fn parse_records<T: DeserializeOwned>(json: &str) -> LineageResult<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

/// Reporting fields of `json` that `selection` picks, normalized.
///
/// The level filters only apply to the combined document. Malformed fields
/// are skipped with a warning.
pub fn select_reporting_fields(
    json: &str,
    selection: &FieldSelection,
) -> LineageResult<Vec<ReportingField>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let raws: Vec<RawReportingField> = if value.get("workbooks").is_some() {
        let combined: RawCombined = serde_json::from_value(value)?;
        select_from_combined(&combined, selection)
    } else {
        parse_records::<RawReportingField>(json)?
            .into_iter()
            .filter(|f| selection.matches_field(f.name.as_deref()))
            .collect()
    };

    let mut fields = Vec::with_capacity(raws.len());
    for raw in &raws {
        match normalize_reporting_field(raw) {
            Ok(field) => fields.push(field),
            Err(e) => warn!(error = %e, "skipping reporting field"),
        }
    }
    debug!(selected = fields.len(), "reporting fields selected");
    Ok(fields)
}

fn select_from_combined(doc: &RawCombined, selection: &FieldSelection) -> Vec<RawReportingField> {
    let mut out = Vec::new();
    let workbooks = doc.workbooks.iter().flatten();
    for workbook in workbooks.filter(|w| matches(&selection.workbook, &w.name)) {
        let dashboards = workbook.dashboards.iter().flatten();
        for dashboard in dashboards.filter(|d| matches(&selection.dashboard, &d.name)) {
            let datasources = dashboard.upstream_datasources.iter().flatten();
            for datasource in datasources.filter(|d| matches(&selection.datasource, &d.name)) {
                let sheets = datasource.sheets.iter().flatten();
                for sheet in sheets.filter(|s| matches(&selection.sheet, &s.name)) {
                    out.extend(
                        sheet
                            .upstream_fields
                            .iter()
                            .flatten()
                            .filter(|f| selection.matches_field(f.name.as_deref()))
                            .cloned(),
                    );
                }
            }
        }
    }
    out
}

/// Database lineage records of `json` (one record or an array), normalized.
pub fn parse_db_lineage(json: &str) -> LineageResult<Vec<DbLineage>> {
    parse_records::<RawDbLineage>(json)?
        .iter()
        .map(normalize_db_lineage)
        .collect()
}
