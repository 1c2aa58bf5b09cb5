//! Integration tests for upstream field resolution.

use lineage::lineage::{
    index_defs, resolve, CalculatedFieldDef, CalculatedFieldDefs, FieldKind, FieldRef,
    FlattenMode, LineageRow, Resolver, TableRef, TraversalContext, UpstreamType, VisitedSet,
};
use lineage::Sentinel;

fn ctx(root: &str) -> TraversalContext {
    TraversalContext::new("Superstore", "Overview", "Exec", "Orders", root)
}

fn edge(row: &LineageRow) -> (&str, &str) {
    (row.field_name.as_str(), row.upstream_field_name.as_str())
}

fn orders_column(id: &str, name: &str, column: &str) -> FieldRef {
    FieldRef::datasource(id, name)
        .with_table(TableRef::new("Orders"))
        .with_column(column)
}

#[test]
fn test_formula_over_two_datasource_fields() {
    let defs = index_defs([CalculatedFieldDef::new("rev", "Revenue", "[Price]*[Qty]")
        .with_upstream(orders_column("p", "Price", "price"))
        .with_upstream(orders_column("q", "Qty", "qty"))]);

    let rows = resolve("rev", &defs, &ctx("Revenue"), &mut VisitedSet::new());

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.upstream_field_type, UpstreamType::Field(FieldKind::DatasourceField));
        assert_eq!(row.upstream_table, "Orders");
        assert_eq!(row.field_name, "Revenue");
        assert_eq!(row.formula, "[Price]*[Qty]");
    }
    assert_eq!(rows[0].upstream_column, "price");
    assert_eq!(rows[1].upstream_column, "qty");
}

#[test]
fn test_cycle_emits_each_edge_once() {
    let defs = index_defs([
        CalculatedFieldDef::new("a", "A", "[B]+1").with_upstream(FieldRef::calculated("b", "B")),
        CalculatedFieldDef::new("b", "B", "[A]-1").with_upstream(FieldRef::calculated("a", "A")),
    ]);
    let mut visited = VisitedSet::new();

    let rows = resolve("a", &defs, &ctx("A"), &mut visited);

    let edges: Vec<_> = rows.iter().map(edge).collect();
    assert_eq!(edges, vec![("A", "B"), ("B", "A")]);
    assert_eq!(visited.len(), 2);
}

#[test]
fn test_self_reference_terminates() {
    let defs = index_defs([CalculatedFieldDef::new("a", "A", "[A]")
        .with_upstream(FieldRef::calculated("a", "A"))]);

    let rows = resolve("a", &defs, &ctx("A"), &mut VisitedSet::new());

    assert_eq!(rows.iter().map(edge).collect::<Vec<_>>(), vec![("A", "A")]);
}

#[test]
fn test_constant_field() {
    let defs = index_defs([CalculatedFieldDef::new("k", "Target", "100")]);

    let rows = resolve("k", &defs, &ctx("Target"), &mut VisitedSet::new());

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].upstream_field_type, UpstreamType::NoUpstream);
    assert_eq!(rows[0].upstream_field_type.to_string(), "Constant/NoUpstream");
    assert_eq!(rows[0].upstream_field_name, "Target");
    assert_eq!(rows[0].formula, "100");
    assert_eq!(rows[0].sentinel(), Some(Sentinel::EmptyUpstream));
}

#[test]
fn test_flatten_missing_databases() {
    let defs = index_defs([CalculatedFieldDef::new("c", "Amount", "[Amt]").with_upstream(
        FieldRef::datasource("d", "Amt")
            .with_table(TableRef::new("T1"))
            .with_table(TableRef::new("T2"))
            .with_column("C1"),
    )]);

    let rows = resolve("c", &defs, &ctx("Amount"), &mut VisitedSet::new());

    let physical: Vec<_> = rows
        .iter()
        .map(|r| {
            (
                r.upstream_table.as_str(),
                r.upstream_column.as_str(),
                r.upstream_database.as_str(),
            )
        })
        .collect();
    assert_eq!(physical, vec![("T1", "C1", ""), ("T2", "C1", "")]);
}

#[test]
fn test_diamond_expands_shared_field_once() {
    // Top -> Left -> Base, Top -> Right -> Base
    let defs = index_defs([
        CalculatedFieldDef::new("top", "Top", "[Left]+[Right]")
            .with_upstream(FieldRef::calculated("left", "Left"))
            .with_upstream(FieldRef::calculated("right", "Right")),
        CalculatedFieldDef::new("left", "Left", "[Base]*2")
            .with_upstream(FieldRef::calculated("base", "Base")),
        CalculatedFieldDef::new("right", "Right", "[Base]*3")
            .with_upstream(FieldRef::calculated("base", "Base")),
        CalculatedFieldDef::new("base", "Base", "[Sales]")
            .with_upstream(orders_column("s", "Sales", "sales")),
    ]);

    let rows = resolve("top", &defs, &ctx("Top"), &mut VisitedSet::new());

    let edges: Vec<_> = rows.iter().map(edge).collect();
    assert_eq!(
        edges,
        vec![
            ("Top", "Left"),
            ("Left", "Base"),
            ("Base", "Sales"),
            ("Top", "Right"),
            ("Right", "Base"),
        ]
    );
    assert_eq!(edges.iter().filter(|(from, _)| *from == "Base").count(), 1);
}

#[test]
fn test_missing_upstream_definition() {
    let defs = index_defs([CalculatedFieldDef::new("a", "A", "[Gone]")
        .with_upstream(FieldRef::calculated("gone", "Gone"))]);

    let rows = resolve("a", &defs, &ctx("A"), &mut VisitedSet::new());

    assert_eq!(rows.len(), 2);
    assert_eq!(edge(&rows[0]), ("A", "Gone"));
    assert_eq!(edge(&rows[1]), ("Gone", "UNKNOWN"));
    assert_eq!(rows[1].upstream_field_type, UpstreamType::Unknown);
    assert_eq!(rows[1].sentinel(), Some(Sentinel::UnknownUpstreamId));
}

#[test]
fn test_every_dead_end_is_marked() {
    let defs = index_defs([
        CalculatedFieldDef::new("root", "Root", "[K] + [Gone] + [Bin]")
            .with_upstream(FieldRef::calculated("k", "K"))
            .with_upstream(FieldRef::calculated("gone", "Gone"))
            .with_upstream(FieldRef::new("bin", "Bin", FieldKind::Other("BinField".into()))),
        CalculatedFieldDef::new("k", "K", "42"),
    ]);

    let rows = resolve("root", &defs, &ctx("Root"), &mut VisitedSet::new());

    let sentinels: Vec<_> = rows.iter().filter_map(LineageRow::sentinel).collect();
    assert_eq!(
        sentinels,
        vec![
            Sentinel::EmptyUpstream,
            Sentinel::UnknownUpstreamId,
            Sentinel::UnrecognizedKind,
        ]
    );
}

#[test]
fn test_nested_datasource_continues_into_calculation() {
    let wrapped = FieldRef::datasource("ds", "Net Sales")
        .with_table(TableRef::new("Orders"))
        .with_column("net")
        .with_upstream(FieldRef::calculated("inner", "Net Calc"))
        .with_upstream(FieldRef::column("col", "Discount"));
    let defs = index_defs([
        CalculatedFieldDef::new("outer", "Outer", "[Net Sales]").with_upstream(wrapped),
        CalculatedFieldDef::new("inner", "Net Calc", "[Sales]-[Discount]")
            .with_upstream(orders_column("s", "Sales", "sales")),
    ]);

    let rows = resolve("outer", &defs, &ctx("Outer"), &mut VisitedSet::new());

    let edges: Vec<_> = rows.iter().map(edge).collect();
    assert_eq!(
        edges,
        vec![
            ("Outer", "Net Sales"),
            ("Net Sales", "Net Calc"),
            ("Net Calc", "Sales"),
            ("Net Sales", "Discount"),
        ]
    );
    assert_eq!(rows[1].field_type, FieldKind::DatasourceField);
    assert!(rows[1].formula.is_empty());
    assert_eq!(rows[3].upstream_field_type, UpstreamType::Field(FieldKind::ColumnField));
    assert!(rows[3].upstream_table.is_empty());
}

#[test]
fn test_only_root_edges_are_primary() {
    let defs = index_defs([
        CalculatedFieldDef::new("a", "A", "[B]").with_upstream(FieldRef::calculated("b", "B")),
        CalculatedFieldDef::new("b", "B", "[Sales]")
            .with_upstream(orders_column("s", "Sales", "sales")),
    ]);

    let rows = resolve("a", &defs, &ctx("A"), &mut VisitedSet::new());

    assert_eq!(
        rows.iter().map(|r| r.is_primary).collect::<Vec<_>>(),
        vec![true, false]
    );
}

#[test]
fn test_fresh_runs_are_identical() {
    let defs = index_defs([
        CalculatedFieldDef::new("a", "A", "[B]*[Sales]")
            .with_upstream(FieldRef::calculated("b", "B"))
            .with_upstream(orders_column("s", "Sales", "sales")),
        CalculatedFieldDef::new("b", "B", "1"),
    ]);

    let first = resolve("a", &defs, &ctx("A"), &mut VisitedSet::new());
    let second = resolve("a", &defs, &ctx("A"), &mut VisitedSet::new());

    assert_eq!(first, second);
}

#[test]
fn test_long_chain_terminates() {
    let mut defs = CalculatedFieldDefs::new();
    for i in 0..500 {
        let next = (i + 1) % 500;
        let def = CalculatedFieldDef::new(format!("c{i}"), format!("F{i}"), "")
            .with_upstream(FieldRef::calculated(format!("c{next}"), format!("F{next}")));
        defs.insert(def.id.clone(), def);
    }
    let mut visited = VisitedSet::new();

    let rows = resolve("c0", &defs, &ctx("F0"), &mut visited);

    assert_eq!(rows.len(), 500);
    assert_eq!(visited.len(), 500);
}

#[test]
fn test_shared_visited_set_suppresses_second_root() {
    let defs = index_defs([CalculatedFieldDef::new("a", "A", "[Sales]")
        .with_upstream(orders_column("s", "Sales", "sales"))]);
    let resolver = Resolver::new(&defs).with_flatten_mode(FlattenMode::Cartesian);
    let mut visited = VisitedSet::new();

    let first = resolver.resolve("a", &ctx("A"), &mut visited);
    let second = resolver.resolve("a", &ctx("A"), &mut visited);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}
