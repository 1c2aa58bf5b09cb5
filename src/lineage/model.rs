//! Node and edge types for lineage resolution.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Sentinel;

// =============================================================================
// Field references
// =============================================================================

/// What kind of entity an upstream reference points at.
///
/// Parsed from the catalog's `__typename` tag. Tags the engine does not
/// special-case are kept verbatim in [`FieldKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    CalculatedField,
    DatasourceField,
    ColumnField,
    Other(String),
}

impl FieldKind {
    pub fn from_typename(tag: &str) -> Self {
        match tag {
            "CalculatedField" => FieldKind::CalculatedField,
            "DatasourceField" => FieldKind::DatasourceField,
            "ColumnField" => FieldKind::ColumnField,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::CalculatedField => "CalculatedField",
            FieldKind::DatasourceField => "DatasourceField",
            FieldKind::ColumnField => "ColumnField",
            FieldKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from_typename(&tag)
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A physical table behind a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

/// A physical column behind a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub name: String,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A physical database behind a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseRef {
    pub name: String,
}

impl DatabaseRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A reference to an upstream entity, as listed inside another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Opaque id, unique within one metadata snapshot.
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub tables: Vec<TableRef>,
    #[serde(default)]
    pub columns: Vec<ColumnRef>,
    #[serde(default)]
    pub databases: Vec<DatabaseRef>,
    /// Further upstream structure, e.g. a datasource field wrapping a
    /// calculated field.
    #[serde(default)]
    pub upstream_fields: Vec<FieldRef>,
}

impl FieldRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            tables: Vec::new(),
            columns: Vec::new(),
            databases: Vec::new(),
            upstream_fields: Vec::new(),
        }
    }

    pub fn calculated(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, FieldKind::CalculatedField)
    }

    pub fn datasource(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, FieldKind::DatasourceField)
    }

    pub fn column(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, FieldKind::ColumnField)
    }

    pub fn with_table(mut self, table: TableRef) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(ColumnRef::new(column));
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.databases.push(DatabaseRef::new(database));
        self
    }

    pub fn with_upstream(mut self, field: FieldRef) -> Self {
        self.upstream_fields.push(field);
        self
    }
}

/// A calculated field as returned by the batch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedFieldDef {
    pub id: String,
    pub name: String,
    pub formula: String,
    pub upstream: Vec<FieldRef>,
}

impl CalculatedFieldDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            formula: formula.into(),
            upstream: Vec::new(),
        }
    }

    pub fn with_upstream(mut self, field: FieldRef) -> Self {
        self.upstream.push(field);
        self
    }
}

/// Batch lookup table of calculated fields, keyed by id.
pub type CalculatedFieldDefs = HashMap<String, CalculatedFieldDef>;

/// Index definitions by id. Later duplicates replace earlier ones.
pub fn index_defs(defs: impl IntoIterator<Item = CalculatedFieldDef>) -> CalculatedFieldDefs {
    defs.into_iter().map(|def| (def.id.clone(), def)).collect()
}

// =============================================================================
// Upstream type column
// =============================================================================

/// Value of a row's `upstream_field_type` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpstreamType {
    /// No upstream on this row (top-level datasource fields).
    Blank,
    /// A resolved upstream reference of the given kind.
    Field(FieldKind),
    /// Referenced id missing from the batch lookup.
    Unknown,
    /// Calculated field without upstream fields.
    NoUpstream,
}

impl UpstreamType {
    pub const UNKNOWN: &'static str = "UNKNOWN";
    pub const NO_UPSTREAM: &'static str = "Constant/NoUpstream";

    pub fn as_str(&self) -> &str {
        match self {
            UpstreamType::Blank => "",
            UpstreamType::Field(kind) => kind.as_str(),
            UpstreamType::Unknown => Self::UNKNOWN,
            UpstreamType::NoUpstream => Self::NO_UPSTREAM,
        }
    }

    /// The sentinel this value records, if any.
    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            UpstreamType::Unknown => Some(Sentinel::UnknownUpstreamId),
            UpstreamType::NoUpstream => Some(Sentinel::EmptyUpstream),
            UpstreamType::Field(FieldKind::Other(_)) => Some(Sentinel::UnrecognizedKind),
            _ => None,
        }
    }
}

impl fmt::Display for UpstreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserved labels win over kind tags: a verbatim `UNKNOWN`,
/// `Constant/NoUpstream` or empty tag reads back as the sentinel, not as
/// `Field(Other(..))`. Normalization rejects blank tags.
impl From<String> for UpstreamType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => UpstreamType::Blank,
            Self::UNKNOWN => UpstreamType::Unknown,
            Self::NO_UPSTREAM => UpstreamType::NoUpstream,
            tag => UpstreamType::Field(FieldKind::from_typename(tag)),
        }
    }
}

impl From<UpstreamType> for String {
    fn from(value: UpstreamType) -> Self {
        value.as_str().to_string()
    }
}

impl From<FieldKind> for UpstreamType {
    fn from(kind: FieldKind) -> Self {
        UpstreamType::Field(kind)
    }
}

// =============================================================================
// Traversal context
// =============================================================================

/// Labels threaded through one resolution.
///
/// Immutable per call. Descending into an upstream field derives a new
/// context with only the parent field name changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalContext {
    pub workbook: String,
    pub sheet: String,
    pub dashboard: String,
    pub data_source: String,
    /// Name attributed to the "from" side of the next emitted edge.
    pub parent_field_name: String,
    at_root: bool,
}

impl TraversalContext {
    /// Context for a top-level, sheet-exposed field.
    pub fn new(
        workbook: impl Into<String>,
        sheet: impl Into<String>,
        dashboard: impl Into<String>,
        data_source: impl Into<String>,
        root_field_name: impl Into<String>,
    ) -> Self {
        Self {
            workbook: workbook.into(),
            sheet: sheet.into(),
            dashboard: dashboard.into(),
            data_source: data_source.into(),
            parent_field_name: root_field_name.into(),
            at_root: true,
        }
    }

    /// Derive the context for one hop upstream.
    pub fn with_parent(&self, name: impl Into<String>) -> Self {
        Self {
            parent_field_name: name.into(),
            at_root: false,
            ..self.clone()
        }
    }

    /// True while the parent field is the sheet-exposed root field.
    pub fn is_root(&self) -> bool {
        self.at_root
    }

    /// A row from the current parent field with blank physical columns.
    pub fn row(
        &self,
        field_type: FieldKind,
        upstream_field_name: impl Into<String>,
        upstream_field_type: impl Into<UpstreamType>,
        formula: impl Into<String>,
    ) -> LineageRow {
        LineageRow {
            workbook: self.workbook.clone(),
            worksheet: self.sheet.clone(),
            data_source: self.data_source.clone(),
            dashboard: self.dashboard.clone(),
            field_name: self.parent_field_name.clone(),
            field_type,
            upstream_field_name: upstream_field_name.into(),
            upstream_field_type: upstream_field_type.into(),
            formula: formula.into(),
            upstream_column: String::new(),
            upstream_table: String::new(),
            upstream_schema: String::new(),
            upstream_database: String::new(),
            is_primary: self.at_root,
        }
    }
}

// =============================================================================
// Output row
// =============================================================================

/// One flattened "field depends on upstream" fact.
///
/// Serialized with the column names of the tabular export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageRow {
    #[serde(rename = "workbook_name")]
    pub workbook: String,
    #[serde(rename = "worksheet_name")]
    pub worksheet: String,
    #[serde(rename = "data_source_name")]
    pub data_source: String,
    #[serde(rename = "dashboard_name")]
    pub dashboard: String,
    pub field_name: String,
    pub field_type: FieldKind,
    pub upstream_field_name: String,
    pub upstream_field_type: UpstreamType,
    pub formula: String,
    pub upstream_column: String,
    pub upstream_table: String,
    pub upstream_schema: String,
    pub upstream_database: String,
    pub is_primary: bool,
}

impl LineageRow {
    /// Column headers in export order.
    pub const HEADERS: [&'static str; 14] = [
        "workbook_name",
        "worksheet_name",
        "data_source_name",
        "dashboard_name",
        "field_name",
        "field_type",
        "upstream_field_name",
        "upstream_field_type",
        "formula",
        "upstream_column",
        "upstream_table",
        "upstream_schema",
        "upstream_database",
        "is_primary",
    ];

    /// Fill the physical columns from one flattened combination.
    ///
    /// Consumes and returns the row; rows are complete once they leave
    /// the resolver.
    pub fn with_physical(
        mut self,
        table: Option<&TableRef>,
        column: Option<&ColumnRef>,
        database: Option<&DatabaseRef>,
    ) -> Self {
        if let Some(table) = table {
            self.upstream_table = table.name.clone();
            self.upstream_schema = table.schema.clone().unwrap_or_default();
        }
        if let Some(column) = column {
            self.upstream_column = column.name.clone();
        }
        if let Some(database) = database {
            self.upstream_database = database.name.clone();
        }
        self
    }

    pub fn sentinel(&self) -> Option<Sentinel> {
        self.upstream_field_type.sentinel()
    }

    /// Cell values in [`LineageRow::HEADERS`] order.
    pub fn cells(&self) -> [String; 14] {
        [
            self.workbook.clone(),
            self.worksheet.clone(),
            self.data_source.clone(),
            self.dashboard.clone(),
            self.field_name.clone(),
            self.field_type.to_string(),
            self.upstream_field_name.clone(),
            self.upstream_field_type.to_string(),
            self.formula.clone(),
            self.upstream_column.clone(),
            self.upstream_table.clone(),
            self.upstream_schema.clone(),
            self.upstream_database.clone(),
            self.is_primary.to_string(),
        ]
    }
}
