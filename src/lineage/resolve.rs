//! Upstream traversal engine.
//!
//! Walks a calculated field's upstream references depth-first and emits one
//! [`LineageRow`] per edge, in pre-order. Every calculated-field id is
//! expanded at most once per [`VisitedSet`], which bounds the walk by the
//! number of distinct ids and makes it terminate on cyclic metadata.
//!
//! Dead ends never abort the walk:
//!
//! | Situation                        | Row emitted                          |
//! |----------------------------------|--------------------------------------|
//! | id missing from the batch lookup | `UNKNOWN` / `UNKNOWN`                |
//! | calculated field with no inputs  | own name / `Constant/NoUpstream`     |
//! | unrecognized upstream kind       | upstream name / tag verbatim         |

use tracing::{debug, warn};

use super::flatten::{flatten_with, FlattenMode};
use super::model::{
    CalculatedFieldDefs, FieldKind, FieldRef, LineageRow, TraversalContext, UpstreamType,
};
use super::visited::VisitedSet;

/// Resolves calculated fields against one batch lookup table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    defs: &'a CalculatedFieldDefs,
    flatten: FlattenMode,
}

impl<'a> Resolver<'a> {
    pub fn new(defs: &'a CalculatedFieldDefs) -> Self {
        Self {
            defs,
            flatten: FlattenMode::default(),
        }
    }

    pub fn with_flatten_mode(mut self, mode: FlattenMode) -> Self {
        self.flatten = mode;
        self
    }

    /// Resolve the lineage of `field_id`.
    ///
    /// Returns nothing if `field_id` is already in `visited`: the caller has
    /// recorded the edge into it, and its subtree was emitted earlier in the
    /// run.
    pub fn resolve(
        &self,
        field_id: &str,
        ctx: &TraversalContext,
        visited: &mut VisitedSet,
    ) -> Vec<LineageRow> {
        let mut rows = Vec::new();
        self.resolve_into(field_id, ctx, visited, &mut rows);
        rows
    }

    fn resolve_into(
        &self,
        field_id: &str,
        ctx: &TraversalContext,
        visited: &mut VisitedSet,
        rows: &mut Vec<LineageRow>,
    ) {
        if !visited.insert(field_id) {
            debug!(field_id, parent = %ctx.parent_field_name, "already expanded");
            return;
        }

        let Some(def) = self.defs.get(field_id) else {
            warn!(
                field_id,
                field = %ctx.parent_field_name,
                sheet = %ctx.sheet,
                "calculated field missing from batch lookup"
            );
            rows.push(ctx.row(
                FieldKind::CalculatedField,
                UpstreamType::UNKNOWN,
                UpstreamType::Unknown,
                "",
            ));
            return;
        };

        if def.upstream.is_empty() {
            rows.push(ctx.row(
                FieldKind::CalculatedField,
                def.name.as_str(),
                UpstreamType::NoUpstream,
                def.formula.as_str(),
            ));
            return;
        }

        debug!(field_id, name = %def.name, upstream = def.upstream.len(), "expanding");

        for upstream in &def.upstream {
            match &upstream.kind {
                FieldKind::CalculatedField => {
                    rows.push(ctx.row(
                        FieldKind::CalculatedField,
                        upstream.name.as_str(),
                        FieldKind::CalculatedField,
                        def.formula.as_str(),
                    ));
                    let next = ctx.with_parent(upstream.name.as_str());
                    self.resolve_into(&upstream.id, &next, visited, rows);
                }
                FieldKind::ColumnField => {
                    self.push_physical(ctx, upstream, &def.formula, rows);
                }
                FieldKind::DatasourceField => {
                    self.push_physical(ctx, upstream, &def.formula, rows);
                    self.resolve_wrapped(ctx, upstream, visited, rows);
                }
                FieldKind::Other(tag) => {
                    debug!(tag = %tag, name = %upstream.name, "unrecognized upstream kind");
                    rows.push(ctx.row(
                        FieldKind::CalculatedField,
                        upstream.name.as_str(),
                        upstream.kind.clone(),
                        def.formula.as_str(),
                    ));
                }
            }
        }
    }

    /// One row per flattened physical combination of `upstream`.
    fn push_physical(
        &self,
        ctx: &TraversalContext,
        upstream: &FieldRef,
        formula: &str,
        rows: &mut Vec<LineageRow>,
    ) {
        let combos = flatten_with(
            self.flatten,
            &upstream.tables,
            &upstream.columns,
            &upstream.databases,
        );
        for (table, column, database) in combos {
            rows.push(
                ctx.row(
                    FieldKind::CalculatedField,
                    upstream.name.as_str(),
                    upstream.kind.clone(),
                    formula,
                )
                .with_physical(table, column, database),
            );
        }
    }

    /// Continue through a datasource field that wraps further fields.
    fn resolve_wrapped(
        &self,
        ctx: &TraversalContext,
        datasource: &FieldRef,
        visited: &mut VisitedSet,
        rows: &mut Vec<LineageRow>,
    ) {
        if datasource.upstream_fields.is_empty() {
            return;
        }
        let from = ctx.with_parent(datasource.name.as_str());

        for nested in &datasource.upstream_fields {
            rows.push(from.row(
                FieldKind::DatasourceField,
                nested.name.as_str(),
                nested.kind.clone(),
                "",
            ));
            if nested.kind == FieldKind::CalculatedField {
                let next = ctx.with_parent(nested.name.as_str());
                self.resolve_into(&nested.id, &next, visited, rows);
            }
        }
    }
}

/// Resolve `field_id` with the default flattening mode.
pub fn resolve(
    field_id: &str,
    defs: &CalculatedFieldDefs,
    ctx: &TraversalContext,
    visited: &mut VisitedSet,
) -> Vec<LineageRow> {
    Resolver::new(defs).resolve(field_id, ctx, visited)
}
