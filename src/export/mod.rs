//! Tabular export of resolved rows.
//!
//! Rows are deduplicated by full structural equality and grouped into one
//! sheet per workbook. Writing an actual spreadsheet file is left to the
//! caller; this module produces the sheets and their text encodings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::lineage::{DbLineageEdge, LineageRow};

/// Default sheet-name limit of common spreadsheet formats.
pub const SHEET_NAME_LIMIT: usize = 31;

/// Smallest limit that still leaves room for a `~N` collision suffix.
pub const MIN_SHEET_NAME_LIMIT: usize = 4;

/// Drop exact duplicate rows, keeping the first occurrence in order.
///
/// Rows that differ only in dashboard or worksheet are distinct and kept.
pub fn dedup_rows(rows: Vec<LineageRow>) -> Vec<LineageRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
}

/// Truncate `name` to at most `limit` characters.
pub fn sheet_name(name: &str, limit: usize) -> String {
    name.chars().take(limit).collect()
}

/// Rows of one workbook under a spreadsheet-safe name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub workbook: String,
    pub rows: Vec<LineageRow>,
}

/// Group rows by workbook, in order of first appearance.
///
/// Sheet names are truncated to `limit` characters. When two workbooks
/// truncate to the same name, later ones get a `~N` suffix that still fits
/// the limit. Limits below [`MIN_SHEET_NAME_LIMIT`] are raised to it.
pub fn group_by_workbook(rows: Vec<LineageRow>, limit: usize) -> Vec<Sheet> {
    let limit = limit.max(MIN_SHEET_NAME_LIMIT);
    let mut sheets: Vec<Sheet> = Vec::new();
    for row in rows {
        match sheets.iter_mut().find(|s| s.workbook == row.workbook) {
            Some(sheet) => sheet.rows.push(row),
            None => sheets.push(Sheet {
                name: String::new(),
                workbook: row.workbook.clone(),
                rows: vec![row],
            }),
        }
    }

    let mut used = HashSet::new();
    for sheet in &mut sheets {
        let base = sheet_name(&sheet.workbook, limit);
        let mut name = base.clone();
        let mut n = 1;
        while !used.insert(name.clone()) {
            n += 1;
            let suffix = format!("~{}", n);
            let keep = limit.saturating_sub(suffix.chars().count());
            name = format!("{}{}", sheet_name(&base, keep), suffix);
        }
        sheet.name = name;
    }
    sheets
}

/// Tab-separated rows with a header line.
///
/// Tabs and line breaks inside cells are replaced by spaces.
pub fn to_tsv(rows: &[LineageRow]) -> String {
    let mut out = LineageRow::HEADERS.join("\t");
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| clean_cell(c)).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

fn clean_cell(cell: &str) -> String {
    cell.chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// Tab-separated database lineage edges with a header line.
pub fn db_edges_to_tsv(edges: &[DbLineageEdge]) -> String {
    let mut out = String::from("column\tupstream_column\treasoning\n");
    for edge in edges {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            clean_cell(&edge.column),
            clean_cell(&edge.upstream),
            clean_cell(&edge.reasoning)
        ));
    }
    out
}

/// Pretty-printed JSON array of sheets.
pub fn to_json(sheets: &[Sheet]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(sheets)
}
