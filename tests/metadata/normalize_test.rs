//! Integration tests for metadata normalization.

use lineage::lineage::{FieldKind, TableRef};
use lineage::metadata::raw::{
    RawCalculatedField, RawDbLineage, RawField, RawReportingField, RawWorkbook,
};
use lineage::metadata::{
    normalize_calculated_field, normalize_calculated_fields, normalize_db_lineage,
    normalize_field, normalize_reporting_field, normalize_workbook, parse_calculated_fields,
    parse_workbooks,
};
use lineage::LineageError;
use serde_json::{json, Value};

fn raw_field(value: Value) -> RawField {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_field_with_physical_references() {
    let field = normalize_field(&raw_field(json!({
        "id": "f1",
        "name": "Sales",
        "__typename": "DatasourceField",
        "upstreamTables": [{"name": "orders", "schema": ""}, {"name": "returns", "schema": "ops"}],
        "upstreamColumns": [{"name": "sales"}],
        "upstreamDatabases": null
    })))
    .unwrap();

    assert_eq!(field.kind, FieldKind::DatasourceField);
    assert_eq!(
        field.tables,
        vec![TableRef::new("orders"), TableRef::new("returns").with_schema("ops")]
    );
    assert_eq!(field.columns.len(), 1);
    assert!(field.databases.is_empty());
}

#[test]
fn test_unrecognized_typename_kept() {
    let field = normalize_field(&raw_field(json!({
        "id": "f1", "name": "Region Group", "__typename": "GroupField"
    })))
    .unwrap();
    assert_eq!(field.kind, FieldKind::Other("GroupField".to_string()));
}

#[test]
fn test_missing_typename_names_entity_and_key() {
    let err = normalize_field(&raw_field(json!({"id": "f1", "name": "Sales"}))).unwrap_err();
    match err {
        LineageError::MalformedMetadata { entity, key } => {
            assert_eq!(entity, "f1");
            assert_eq!(key, "__typename");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nameless_table_rejects_field() {
    let err = normalize_field(&raw_field(json!({
        "id": "f1",
        "name": "Sales",
        "__typename": "ColumnField",
        "upstreamTables": [{"schema": "public"}]
    })))
    .unwrap_err();
    assert!(matches!(err, LineageError::MalformedMetadata { key: "name", .. }));
}

#[test]
fn test_nested_upstream_fields() {
    let field = normalize_field(&raw_field(json!({
        "id": "ds",
        "name": "Net",
        "__typename": "DatasourceField",
        "upstreamFields": [
            {"id": "c1", "name": "Net Calc", "__typename": "CalculatedField"}
        ]
    })))
    .unwrap();
    assert_eq!(field.upstream_fields.len(), 1);
    assert_eq!(field.upstream_fields[0].kind, FieldKind::CalculatedField);
}

#[test]
fn test_calculated_field_without_formula() {
    let raw: RawCalculatedField =
        serde_json::from_value(json!({"id": "c1", "name": "Flag", "fields": null})).unwrap();
    let def = normalize_calculated_field(&raw).unwrap();
    assert_eq!(def.formula, "");
    assert!(def.upstream.is_empty());
}

#[test]
fn test_batch_skips_malformed_entries() {
    let raws = parse_calculated_fields(
        &json!([
            {"id": "c1", "name": "Good", "formula": "1", "fields": []},
            {"name": "No id", "formula": "2"},
            {"id": "c3", "name": "Bad upstream", "fields": [{"id": "x", "name": "X"}]}
        ])
        .to_string(),
    )
    .unwrap();

    let defs = normalize_calculated_fields(&raws);
    assert_eq!(defs.len(), 2);
    assert!(defs.contains_key("c1"));
    // Only the untyped upstream field is dropped.
    assert!(defs["c3"].upstream.is_empty());
    assert_eq!(defs["c3"].name, "Bad upstream");
}

#[test]
fn test_workbook_requires_name() {
    let raw = RawWorkbook {
        id: Some("wb-9".into()),
        ..RawWorkbook::default()
    };
    let err = normalize_workbook(&raw).unwrap_err();
    assert_eq!(err.to_string(), LineageError::malformed("wb-9", "name").to_string());
}

#[test]
fn test_bare_workbook_payloads() {
    let array = json!([{"name": "A"}, {"name": "B"}]).to_string();
    let object = json!({"workbooks": [{"name": "A"}]}).to_string();
    let empty = json!({"data": {"workbooks": null}}).to_string();

    assert_eq!(parse_workbooks(&array).unwrap().len(), 2);
    assert_eq!(parse_workbooks(&object).unwrap().len(), 1);
    assert!(parse_workbooks(&empty).unwrap().is_empty());
    assert!(matches!(parse_workbooks("not json"), Err(LineageError::Json(_))));
}

#[test]
fn test_db_lineage_tree() {
    let raw: RawDbLineage = serde_json::from_value(json!({
        "model": "fct_orders",
        "column": "amount",
        "column Description": "Order amount",
        "reasoning": "SUM of line amounts",
        "upstream_models": [
            {"model": "stg_lines", "column": "line_amount", "upstream_models": null}
        ]
    }))
    .unwrap();

    let lineage = normalize_db_lineage(&raw).unwrap();
    assert_eq!(lineage.identity(), "fct_orders.amount");
    assert_eq!(lineage.description, "Order amount");
    assert_eq!(lineage.upstream.len(), 1);
    assert_eq!(lineage.upstream[0].reasoning, "");
}

#[test]
fn test_db_lineage_requires_column() {
    let raw: RawDbLineage = serde_json::from_value(json!({"model": "fct_orders"})).unwrap();
    assert!(matches!(
        normalize_db_lineage(&raw),
        Err(LineageError::MalformedMetadata { key: "column", .. })
    ));
}

#[test]
fn test_reporting_field() {
    let raw: RawReportingField = serde_json::from_value(json!({
        "name": "Profit Ratio",
        "formula": "[Profit]/[Sales]",
        "upstreamColumns": [
            {"name": "profit", "upstreamTables": [{"name": "orders"}, {"name": "orders_v2"}]}
        ],
        "upstreamFields": [{"name": "Profit"}]
    }))
    .unwrap();

    let field = normalize_reporting_field(&raw).unwrap();
    assert_eq!(field.upstream_columns[0].tables, vec!["orders", "orders_v2"]);
    assert!(field.upstream_columns[0].database_lineage.is_none());
    assert_eq!(field.upstream_fields[0].formula, "");
}
