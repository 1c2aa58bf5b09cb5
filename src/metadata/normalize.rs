//! Conversion from raw catalog documents into lineage types.
//!
//! Only the presence of required keys is checked. A record missing one is
//! rejected with [`LineageError::MalformedMetadata`]; batch helpers skip the
//! rejected record and carry on with its siblings.

use tracing::warn;

use super::raw::{
    RawCalculatedField, RawDbLineage, RawField, RawNamed, RawReportingField, RawSheet,
    RawUpstreamColumn, RawWorkbook,
};
use super::types::{
    Dashboard, DbLineage, ReportingField, Sheet, SheetField, UpstreamColumn, Workbook,
};
use crate::error::{LineageError, LineageResult};
use crate::lineage::model::{
    CalculatedFieldDef, CalculatedFieldDefs, ColumnRef, DatabaseRef, FieldKind, FieldRef,
    TableRef,
};

const UNNAMED: &str = "<unnamed>";

fn required<'a>(value: &'a Option<String>, entity: &str, key: &'static str) -> LineageResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| LineageError::malformed(entity, key))
}

fn names(items: &Option<Vec<RawNamed>>, entity: &str) -> LineageResult<Vec<String>> {
    items
        .iter()
        .flatten()
        .map(|item| required(&item.name, entity, "name").map(str::to_string))
        .collect()
}

/// Normalize an upstream list, dropping malformed entries with a warning.
fn normalize_upstream(raws: &Option<Vec<RawField>>, parent: &str) -> Vec<FieldRef> {
    raws.iter()
        .flatten()
        .filter_map(|raw| match normalize_field(raw) {
            Ok(field) => Some(field),
            Err(e) => {
                warn!(field = parent, error = %e, "skipping upstream field");
                None
            }
        })
        .collect()
}

/// Normalize a field reference and any nested upstream fields.
///
/// Requires `id`, `name` and a non-blank `__typename`; physical references
/// require `name`. Malformed nested upstream fields are skipped.
pub fn normalize_field(raw: &RawField) -> LineageResult<FieldRef> {
    let id = required(&raw.id, raw.name.as_deref().unwrap_or(UNNAMED), "id")?;
    let name = required(&raw.name, id, "name")?;
    let typename = required(&raw.typename, id, "__typename")?;
    // A blank tag would read back as an empty upstream type.
    if typename.is_empty() {
        return Err(LineageError::malformed(id, "__typename"));
    }

    let tables = raw
        .upstream_tables
        .iter()
        .flatten()
        .map(|t| {
            let name = required(&t.name, id, "name")?;
            Ok(TableRef {
                name: name.to_string(),
                schema: t.schema.clone().filter(|s| !s.is_empty()),
            })
        })
        .collect::<LineageResult<Vec<_>>>()?;

    let columns = names(&raw.upstream_columns, id)?
        .into_iter()
        .map(ColumnRef::new)
        .collect();
    let databases = names(&raw.upstream_databases, id)?
        .into_iter()
        .map(DatabaseRef::new)
        .collect();

    let upstream_fields = normalize_upstream(&raw.upstream_fields, id);

    Ok(FieldRef {
        id: id.to_string(),
        name: name.to_string(),
        kind: FieldKind::from_typename(typename),
        tables,
        columns,
        databases,
        upstream_fields,
    })
}

/// Normalize one batch-lookup entry. A missing formula becomes empty.
///
/// Malformed upstream fields are skipped; their siblings are kept.
pub fn normalize_calculated_field(raw: &RawCalculatedField) -> LineageResult<CalculatedFieldDef> {
    let id = required(&raw.id, raw.name.as_deref().unwrap_or(UNNAMED), "id")?;
    let name = required(&raw.name, id, "name")?;

    let upstream = normalize_upstream(&raw.fields, id);

    Ok(CalculatedFieldDef {
        id: id.to_string(),
        name: name.to_string(),
        formula: raw.formula.clone().unwrap_or_default(),
        upstream,
    })
}

/// Build the lookup table, dropping malformed entries.
///
/// A dropped entry's id later resolves as `UNKNOWN`.
pub fn normalize_calculated_fields<'a>(
    raws: impl IntoIterator<Item = &'a RawCalculatedField>,
) -> CalculatedFieldDefs {
    let mut defs = CalculatedFieldDefs::new();
    for raw in raws {
        match normalize_calculated_field(raw) {
            Ok(def) => {
                defs.insert(def.id.clone(), def);
            }
            Err(e) => warn!(error = %e, "skipping calculated field"),
        }
    }
    defs
}

fn normalize_sheet(raw: &RawSheet, workbook: &str) -> LineageResult<Sheet> {
    let name = required(&raw.name, raw.id.as_deref().unwrap_or(workbook), "name")?;
    let dashboards = names(&raw.contained_in_dashboards, name)?;

    let mut fields = Vec::new();
    for raw_field in raw.sheet_field_instances.iter().flatten() {
        let field = match normalize_field(raw_field) {
            Ok(field) => field,
            Err(e) => {
                warn!(sheet = name, error = %e, "skipping sheet field");
                continue;
            }
        };
        let datasources = match names(&raw_field.upstream_datasources, &field.id) {
            Ok(datasources) => datasources,
            Err(e) => {
                warn!(sheet = name, error = %e, "skipping sheet field");
                continue;
            }
        };
        fields.push(SheetField { field, datasources });
    }

    Ok(Sheet {
        name: name.to_string(),
        dashboards,
        fields,
    })
}

/// Normalize a workbook document.
///
/// The workbook itself needs a `name`. Malformed sheets, sheet fields and
/// dashboard field references are skipped with a warning.
pub fn normalize_workbook(raw: &RawWorkbook) -> LineageResult<Workbook> {
    let name = required(&raw.name, raw.id.as_deref().unwrap_or(UNNAMED), "name")?;

    let mut dashboards = Vec::new();
    for raw_dash in raw.dashboards.iter().flatten() {
        let Some(dash_name) = raw_dash.name.as_deref() else {
            warn!(workbook = name, "skipping dashboard without a name");
            continue;
        };
        let upstream_fields = normalize_upstream(&raw_dash.upstream_fields, dash_name);
        dashboards.push(Dashboard {
            name: dash_name.to_string(),
            upstream_fields,
        });
    }

    let mut sheets = Vec::new();
    for raw_sheet in raw.sheets.iter().flatten() {
        match normalize_sheet(raw_sheet, name) {
            Ok(sheet) => sheets.push(sheet),
            Err(e) => warn!(workbook = name, error = %e, "skipping sheet"),
        }
    }

    Ok(Workbook {
        name: name.to_string(),
        project: raw.project_name.clone(),
        dashboards,
        sheets,
    })
}

/// Normalize a database-side lineage record. Requires `model` and `column`.
pub fn normalize_db_lineage(raw: &RawDbLineage) -> LineageResult<DbLineage> {
    let column = raw.column.as_deref();
    let model = required(&raw.model, column.unwrap_or(UNNAMED), "model")?;
    let column = required(&raw.column, model, "column")?;

    let upstream = raw
        .upstream_models
        .iter()
        .flatten()
        .map(normalize_db_lineage)
        .collect::<LineageResult<Vec<_>>>()?;

    Ok(DbLineage {
        model: model.to_string(),
        column: column.to_string(),
        description: raw.description.clone().unwrap_or_default(),
        reasoning: raw.reasoning.clone().unwrap_or_default(),
        upstream,
    })
}

fn normalize_upstream_column(raw: &RawUpstreamColumn, field: &str) -> LineageResult<UpstreamColumn> {
    let name = required(&raw.name, field, "name")?;
    let tables = names(&raw.upstream_tables, name)?;
    let database_lineage = raw
        .database_lineage
        .as_ref()
        .map(normalize_db_lineage)
        .transpose()?;

    Ok(UpstreamColumn {
        name: name.to_string(),
        tables,
        database_lineage,
    })
}

/// Normalize a reporting-side field record. Requires `name` throughout.
pub fn normalize_reporting_field(raw: &RawReportingField) -> LineageResult<ReportingField> {
    let name = required(&raw.name, UNNAMED, "name")?;

    let upstream_columns = raw
        .upstream_columns
        .iter()
        .flatten()
        .map(|c| normalize_upstream_column(c, name))
        .collect::<LineageResult<Vec<_>>>()?;

    let upstream_fields = raw
        .upstream_fields
        .iter()
        .flatten()
        .map(normalize_reporting_field)
        .collect::<LineageResult<Vec<_>>>()?;

    Ok(ReportingField {
        name: name.to_string(),
        formula: raw.formula.clone().unwrap_or_default(),
        upstream_columns,
        upstream_fields,
    })
}
