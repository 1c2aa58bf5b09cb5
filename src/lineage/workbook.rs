//! Workbook-level resolution.
//!
//! Every field exposed on a sheet is a root. Each root is resolved once per
//! dashboard that contains the sheet, so the same field legitimately shows
//! up under several dashboards.

use tracing::{info, warn};

use super::flatten::flatten_with;
use super::model::{CalculatedFieldDefs, FieldKind, LineageRow, TraversalContext, UpstreamType};
use super::resolve::Resolver;
use super::visited::{VisitedScope, VisitedSet};
use crate::config::ResolveSettings;
use crate::error::{LineageError, LineageResult};
use crate::export::dedup_rows;
use crate::metadata::{MetadataProvider, SheetField, Workbook};

/// Resolve every sheet field of `workbook`.
pub fn resolve_workbook(
    workbook: &Workbook,
    defs: &CalculatedFieldDefs,
    settings: &ResolveSettings,
) -> Vec<LineageRow> {
    let resolver = Resolver::new(defs).with_flatten_mode(settings.flatten);
    let mut shared = VisitedSet::new();
    let mut rows = Vec::new();

    for sheet in &workbook.sheets {
        let dashboards: Vec<&str> = if sheet.dashboards.is_empty() {
            vec![settings.no_dashboard_label.as_str()]
        } else {
            sheet.dashboards.iter().map(String::as_str).collect()
        };

        for sheet_field in &sheet.fields {
            let data_source = sheet_field.data_source_label();
            for dashboard in &dashboards {
                let ctx = TraversalContext::new(
                    workbook.name.as_str(),
                    sheet.name.as_str(),
                    *dashboard,
                    data_source.as_str(),
                    sheet_field.field.name.as_str(),
                );
                match settings.visited_scope {
                    VisitedScope::Root => {
                        let mut visited = VisitedSet::new();
                        resolve_root(&resolver, sheet_field, &ctx, &mut visited, settings, &mut rows);
                    }
                    VisitedScope::Workbook => {
                        resolve_root(&resolver, sheet_field, &ctx, &mut shared, settings, &mut rows);
                    }
                }
            }
        }
    }

    info!(workbook = %workbook.name, rows = rows.len(), "resolved workbook");
    rows
}

fn resolve_root(
    resolver: &Resolver<'_>,
    sheet_field: &SheetField,
    ctx: &TraversalContext,
    visited: &mut VisitedSet,
    settings: &ResolveSettings,
    rows: &mut Vec<LineageRow>,
) {
    let field = &sheet_field.field;
    match &field.kind {
        FieldKind::DatasourceField => {
            let combos = flatten_with(settings.flatten, &field.tables, &field.columns, &field.databases);
            for (table, column, database) in combos {
                rows.push(
                    ctx.row(FieldKind::DatasourceField, "", UpstreamType::Blank, "")
                        .with_physical(table, column, database),
                );
            }
        }
        FieldKind::CalculatedField => {
            rows.extend(resolver.resolve(&field.id, ctx, visited));
        }
        other => {
            rows.push(ctx.row(other.clone(), "", UpstreamType::Blank, ""));
        }
    }
}

/// Resolve the named workbooks through `provider`.
///
/// Workbooks the provider does not know are skipped with a warning. Other
/// provider errors abort. With `dedup`, exact duplicate rows are dropped.
pub fn resolve_workbooks<P: MetadataProvider + ?Sized>(
    provider: &P,
    names: &[String],
    settings: &ResolveSettings,
    dedup: bool,
) -> LineageResult<Vec<LineageRow>> {
    let mut rows = Vec::new();

    for name in names {
        let workbook = match provider.workbook(name) {
            Ok(workbook) => workbook,
            Err(LineageError::WorkbookNotFound(missing)) => {
                warn!(workbook = %missing, "no workbook with this name, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };

        let ids = workbook.calculated_field_ids();
        let defs = provider.calculated_fields(&ids)?;
        if defs.len() < ids.len() {
            warn!(
                workbook = %workbook.name,
                requested = ids.len(),
                returned = defs.len(),
                "batch lookup returned fewer calculated fields than requested"
            );
        }

        rows.extend(resolve_workbook(&workbook, &defs, settings));
    }

    Ok(if dedup { dedup_rows(rows) } else { rows })
}
