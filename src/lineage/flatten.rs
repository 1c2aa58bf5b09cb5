//! Row flattening for multi-valued physical references.
//!
//! A field can list several backing tables, columns and databases without
//! saying which go together. The default projection emits every
//! combination, so the rows describe *possible* physical lineage rather
//! than asserted pairings.

use serde::{Deserialize, Serialize};

/// One flattened combination of physical references.
pub type Physical<'a, T, C, D> = (Option<&'a T>, Option<&'a C>, Option<&'a D>);

/// How physical reference lists are combined into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlattenMode {
    /// Full Cartesian product.
    #[default]
    Cartesian,
    /// Positional pairing when every non-empty list has the same length,
    /// Cartesian otherwise.
    Paired,
}

/// Cartesian product of the three lists, empty lists standing in as `[None]`.
///
/// Yields `max(1,|T|) * max(1,|C|) * max(1,|D|)` tuples, tables outermost.
/// When all three are empty that is the single `(None, None, None)` row.
pub fn flatten<'a, T, C, D>(
    tables: &'a [T],
    columns: &'a [C],
    databases: &'a [D],
) -> Vec<Physical<'a, T, C, D>> {
    let tables = slots(tables);
    let columns = slots(columns);
    let databases = slots(databases);

    let mut out = Vec::with_capacity(tables.len() * columns.len() * databases.len());
    for &table in &tables {
        for &column in &columns {
            for &database in &databases {
                out.push((table, column, database));
            }
        }
    }
    out
}

/// Zip the lists positionally when they are aligned.
///
/// Aligned means every non-empty list has the same length; empty lists
/// contribute `None` at every position. Anything else falls back to
/// [`flatten`].
pub fn flatten_paired<'a, T, C, D>(
    tables: &'a [T],
    columns: &'a [C],
    databases: &'a [D],
) -> Vec<Physical<'a, T, C, D>> {
    let lengths = [tables.len(), columns.len(), databases.len()];
    let width = lengths.iter().copied().max().unwrap_or(0);
    let aligned = lengths.iter().all(|&len| len == 0 || len == width);

    if width == 0 || !aligned {
        return flatten(tables, columns, databases);
    }

    (0..width)
        .map(|i| (tables.get(i), columns.get(i), databases.get(i)))
        .collect()
}

/// Dispatch on `mode`.
pub fn flatten_with<'a, T, C, D>(
    mode: FlattenMode,
    tables: &'a [T],
    columns: &'a [C],
    databases: &'a [D],
) -> Vec<Physical<'a, T, C, D>> {
    match mode {
        FlattenMode::Cartesian => flatten(tables, columns, databases),
        FlattenMode::Paired => flatten_paired(tables, columns, databases),
    }
}

fn slots<T>(items: &[T]) -> Vec<Option<&T>> {
    if items.is_empty() {
        vec![None]
    } else {
        items.iter().map(Some).collect()
    }
}
