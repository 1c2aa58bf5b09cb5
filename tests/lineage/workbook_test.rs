//! Integration tests for workbook-level resolution.
//!
//! These tests run the full provider -> resolver -> rows pipeline over JSON fixtures.

use lineage::config::ResolveSettings;
use lineage::lineage::{resolve_workbooks, FieldKind, LineageRow, UpstreamType, VisitedScope};
use lineage::metadata::raw::{
    RawCalculatedField, RawDashboard, RawField, RawNamed, RawSheet, RawTable, RawWorkbook,
};
use lineage::metadata::{JsonMetadataProvider, MetadataProvider};
use lineage::{LineageError, Sentinel};
use serde_json::json;

/// Workbook document as the metadata API returns it.
fn workbooks_json() -> String {
    json!({
        "data": {
            "workbooks": [
                {
                    "id": "wb-1",
                    "name": "Superstore",
                    "projectName": "Sales",
                    "dashboards": [
                        {
                            "name": "Exec",
                            "upstreamFields": [
                                {"id": "calc-profit", "name": "Profit Ratio", "__typename": "CalculatedField"},
                                {"id": "calc-margin", "name": "Margin", "__typename": "CalculatedField"},
                                {"id": "ds-sales", "name": "Sales", "__typename": "DatasourceField"}
                            ]
                        }
                    ],
                    "sheets": [
                        {
                            "id": "sh-1",
                            "name": "Overview",
                            "containedInDashboards": [{"name": "Exec"}, {"name": "Ops"}],
                            "sheetFieldInstances": [
                                {
                                    "id": "calc-profit",
                                    "name": "Profit Ratio",
                                    "__typename": "CalculatedField",
                                    "upstreamDatasources": [{"name": "Orders"}]
                                },
                                {
                                    "id": "ds-sales",
                                    "name": "Sales",
                                    "__typename": "DatasourceField",
                                    "upstreamDatasources": [{"name": "Orders"}, {"name": "Returns"}],
                                    "upstreamTables": [{"name": "orders", "schema": "public"}],
                                    "upstreamColumns": [{"name": "sales"}],
                                    "upstreamDatabases": [{"name": "warehouse"}]
                                }
                            ]
                        },
                        {
                            "id": "sh-2",
                            "name": "Scratch",
                            "containedInDashboards": [],
                            "sheetFieldInstances": [
                                {
                                    "id": "calc-ghost",
                                    "name": "Ghost",
                                    "__typename": "CalculatedField",
                                    "upstreamDatasources": [{"name": "Orders"}]
                                },
                                {
                                    "name": "No id",
                                    "__typename": "DatasourceField"
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    })
    .to_string()
}

fn calculated_fields_json() -> String {
    json!({
        "data": {
            "calculatedFields": [
                {
                    "id": "calc-profit",
                    "name": "Profit Ratio",
                    "formula": "SUM([Profit])/SUM([Sales])",
                    "fields": [
                        {
                            "id": "ds-profit",
                            "name": "Profit",
                            "__typename": "DatasourceField",
                            "upstreamTables": [{"name": "orders", "schema": "public"}],
                            "upstreamColumns": [{"name": "profit"}],
                            "upstreamDatabases": [{"name": "warehouse"}]
                        },
                        {"id": "calc-margin", "name": "Margin", "__typename": "CalculatedField"}
                    ]
                },
                {
                    "id": "calc-margin",
                    "name": "Margin",
                    "formula": "0.3",
                    "fields": []
                }
            ]
        }
    })
    .to_string()
}

fn provider() -> JsonMetadataProvider {
    JsonMetadataProvider::from_json(&workbooks_json(), &calculated_fields_json()).unwrap()
}

fn rows_for(settings: &ResolveSettings, dedup: bool) -> Vec<LineageRow> {
    resolve_workbooks(&provider(), &["Superstore".to_string()], settings, dedup).unwrap()
}

#[test]
fn test_batch_ids_come_from_dashboards() {
    let workbook = provider().workbook("Superstore").unwrap();
    assert_eq!(workbook.calculated_field_ids(), vec!["calc-margin", "calc-profit"]);
    assert_eq!(workbook.project.as_deref(), Some("Sales"));
}

#[test]
fn test_malformed_sheet_field_is_skipped() {
    let workbook = provider().workbook("Superstore").unwrap();
    let scratch = workbook.sheets.iter().find(|s| s.name == "Scratch").unwrap();
    assert_eq!(scratch.fields.len(), 1);
    assert_eq!(scratch.fields[0].field.name, "Ghost");
}

#[test]
fn test_rows_repeat_per_dashboard() {
    let rows = rows_for(&ResolveSettings::default(), true);

    let profit_edges: Vec<_> = rows
        .iter()
        .filter(|r| r.field_name == "Profit Ratio" && r.upstream_field_name == "Profit")
        .map(|r| r.dashboard.as_str())
        .collect();
    assert_eq!(profit_edges, vec!["Exec", "Ops"]);
}

#[test]
fn test_calculated_root_resolves_through_batch() {
    let rows = rows_for(&ResolveSettings::default(), true);
    let exec: Vec<_> = rows
        .iter()
        .filter(|r| r.dashboard == "Exec" && r.worksheet == "Overview")
        .collect();

    let profit = exec
        .iter()
        .find(|r| r.upstream_field_name == "Profit")
        .unwrap();
    assert_eq!(profit.field_type, FieldKind::CalculatedField);
    assert_eq!(profit.upstream_table, "orders");
    assert_eq!(profit.upstream_schema, "public");
    assert_eq!(profit.upstream_database, "warehouse");
    assert_eq!(profit.data_source, "Orders");
    assert!(profit.is_primary);

    let constant = exec
        .iter()
        .find(|r| r.upstream_field_type == UpstreamType::NoUpstream)
        .unwrap();
    assert_eq!(constant.field_name, "Margin");
    assert_eq!(constant.formula, "0.3");
    assert!(!constant.is_primary);
}

#[test]
fn test_datasource_root_row() {
    let rows = rows_for(&ResolveSettings::default(), true);
    let sales: Vec<_> = rows
        .iter()
        .filter(|r| r.field_name == "Sales" && r.field_type == FieldKind::DatasourceField)
        .collect();

    assert_eq!(sales.len(), 2);
    assert!(sales.iter().all(|r| r.data_source == "Orders, Returns"));
    assert!(sales.iter().all(|r| r.upstream_field_type == UpstreamType::Blank));
    assert!(sales.iter().all(|r| r.upstream_column == "sales"));
}

#[test]
fn test_unlisted_calculation_is_unknown() {
    let rows = rows_for(&ResolveSettings::default(), true);
    let ghost: Vec<_> = rows.iter().filter(|r| r.field_name == "Ghost").collect();

    assert_eq!(ghost.len(), 1);
    assert_eq!(ghost[0].dashboard, "NoDashboard");
    assert_eq!(ghost[0].sentinel(), Some(Sentinel::UnknownUpstreamId));
}

#[test]
fn test_dedup_removes_only_exact_duplicates() {
    let settings = ResolveSettings::default();
    let names = vec!["Superstore".to_string(), "Superstore".to_string()];

    let raw = resolve_workbooks(&provider(), &names, &settings, false).unwrap();
    let deduped = resolve_workbooks(&provider(), &names, &settings, true).unwrap();

    assert_eq!(raw.len(), deduped.len() * 2);
    assert_eq!(deduped, rows_for(&settings, false));
}

#[test]
fn test_workbook_scope_suppresses_repeats() {
    let per_root = rows_for(&ResolveSettings::default(), false);
    let shared = rows_for(
        &ResolveSettings {
            visited_scope: VisitedScope::Workbook,
            ..ResolveSettings::default()
        },
        false,
    );

    assert!(shared.len() < per_root.len());
    assert!(!shared.iter().any(|r| r.dashboard == "Ops" && r.field_name == "Profit Ratio"));
}

#[test]
fn test_unknown_workbook_is_skipped() {
    let names = vec!["Missing".to_string(), "Superstore".to_string()];
    let rows = resolve_workbooks(&provider(), &names, &ResolveSettings::default(), true).unwrap();

    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.workbook == "Superstore"));
    assert!(matches!(
        provider().workbook("Missing"),
        Err(LineageError::WorkbookNotFound(name)) if name == "Missing"
    ));
}

fn raw_field(id: &str, name: &str, typename: Option<&str>) -> RawField {
    RawField {
        id: Some(id.into()),
        name: Some(name.into()),
        typename: typename.map(Into::into),
        ..RawField::default()
    }
}

#[test]
fn test_malformed_upstream_keeps_sibling_rows() {
    let price = RawField {
        upstream_tables: Some(vec![RawTable {
            name: Some("Orders".into()),
            schema: None,
        }]),
        upstream_columns: Some(vec![RawNamed {
            name: Some("price".into()),
        }]),
        ..raw_field("ds-price", "Price", Some("DatasourceField"))
    };
    let revenue = raw_field("calc-revenue", "Revenue", Some("CalculatedField"));
    let provider = JsonMetadataProvider::new()
        .with_workbook(RawWorkbook {
            name: Some("Shop".into()),
            dashboards: Some(vec![RawDashboard {
                name: Some("Main".into()),
                upstream_fields: Some(vec![revenue.clone()]),
            }]),
            sheets: Some(vec![RawSheet {
                id: Some("sh-1".into()),
                name: Some("Totals".into()),
                contained_in_dashboards: Some(vec![RawNamed {
                    name: Some("Main".into()),
                }]),
                sheet_field_instances: Some(vec![revenue]),
            }]),
            ..RawWorkbook::default()
        })
        .with_calculated_field(RawCalculatedField {
            id: Some("calc-revenue".into()),
            name: Some("Revenue".into()),
            formula: Some("[Price]*[Qty]".into()),
            // Qty carries no __typename.
            fields: Some(vec![price, raw_field("ds-qty", "Qty", None)]),
        });

    let rows = resolve_workbooks(
        &provider,
        &["Shop".to_string()],
        &ResolveSettings::default(),
        true,
    )
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].upstream_field_name, "Price");
    assert_eq!(
        rows[0].upstream_field_type,
        UpstreamType::Field(FieldKind::DatasourceField)
    );
    assert_eq!(rows[0].upstream_table, "Orders");
    assert_eq!(rows[0].upstream_column, "price");
    assert_eq!(rows[0].sentinel(), None);
}
