//! MetadataProvider trait definition.
//!
//! Fetching metadata from the catalog service (authentication, GraphQL,
//! retries) happens outside this crate. A provider hands over documents that
//! were already fetched; [`JsonMetadataProvider`] reads them from JSON.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::normalize::{normalize_calculated_fields, normalize_workbook};
use super::raw::{
    GraphQlEnvelope, RawCalculatedField, RawCalculatedFields, RawWorkbook, RawWorkbooks,
};
use super::types::Workbook;
use crate::error::{LineageError, LineageResult};
use crate::lineage::model::CalculatedFieldDefs;

/// Source of workbook documents and calculated-field batch lookups.
pub trait MetadataProvider {
    /// Workbook with the given name, normalized.
    fn workbook(&self, name: &str) -> LineageResult<Workbook>;

    /// Batch lookup of the given calculated-field ids.
    ///
    /// Ids the provider does not know are simply absent from the result.
    fn calculated_fields(&self, ids: &[String]) -> LineageResult<CalculatedFieldDefs>;

    /// Names of every workbook the provider can serve.
    fn workbook_names(&self) -> Vec<String>;
}

/// Provider over pre-fetched JSON documents.
///
/// Accepts both the GraphQL envelope (`{"data": {"workbooks": [...]}}`) and
/// the bare payload (`{"workbooks": [...]}` or a top-level array).
#[derive(Debug, Clone, Default)]
pub struct JsonMetadataProvider {
    workbooks: Vec<RawWorkbook>,
    calculated_fields: Vec<RawCalculatedField>,
}

impl JsonMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse workbook and calculated-field documents from strings.
    pub fn from_json(workbooks: &str, calculated_fields: &str) -> LineageResult<Self> {
        Ok(Self {
            workbooks: parse_workbooks(workbooks)?,
            calculated_fields: parse_calculated_fields(calculated_fields)?,
        })
    }

    /// Read workbook and calculated-field documents from files.
    pub fn from_files(
        workbooks: impl AsRef<Path>,
        calculated_fields: impl AsRef<Path>,
    ) -> LineageResult<Self> {
        let workbooks = fs::read_to_string(workbooks)?;
        let calculated_fields = fs::read_to_string(calculated_fields)?;
        Self::from_json(&workbooks, &calculated_fields)
    }

    pub fn with_workbook(mut self, workbook: RawWorkbook) -> Self {
        self.workbooks.push(workbook);
        self
    }

    pub fn with_calculated_field(mut self, field: RawCalculatedField) -> Self {
        self.calculated_fields.push(field);
        self
    }
}

impl MetadataProvider for JsonMetadataProvider {
    fn workbook(&self, name: &str) -> LineageResult<Workbook> {
        let raw = self
            .workbooks
            .iter()
            .find(|w| w.name.as_deref() == Some(name))
            .ok_or_else(|| LineageError::WorkbookNotFound(name.to_string()))?;
        normalize_workbook(raw)
    }

    fn calculated_fields(&self, ids: &[String]) -> LineageResult<CalculatedFieldDefs> {
        if ids.is_empty() {
            return Ok(CalculatedFieldDefs::new());
        }
        let wanted = self
            .calculated_fields
            .iter()
            .filter(|f| f.id.as_ref().is_some_and(|id| ids.contains(id)));
        Ok(normalize_calculated_fields(wanted))
    }

    fn workbook_names(&self) -> Vec<String> {
        self.workbooks.iter().filter_map(|w| w.name.clone()).collect()
    }
}

/// Parse `T` from either a GraphQL envelope or the bare payload.
fn parse_enveloped<T: DeserializeOwned>(json: &str) -> LineageResult<T> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("data").is_some() {
        let envelope: GraphQlEnvelope<T> = serde_json::from_value(value)?;
        Ok(envelope.data)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

/// Workbooks from a `workbooks` query response, an object, or an array.
pub fn parse_workbooks(json: &str) -> LineageResult<Vec<RawWorkbook>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let parsed: RawWorkbooks = parse_enveloped(json)?;
    Ok(parsed.workbooks.unwrap_or_default())
}

/// Calculated fields from a `calculatedFields` query response, or an array.
pub fn parse_calculated_fields(json: &str) -> LineageResult<Vec<RawCalculatedField>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let parsed: RawCalculatedFields = parse_enveloped(json)?;
    Ok(parsed.calculated_fields.unwrap_or_default())
}
