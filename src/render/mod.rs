//! Graphviz DOT rendering of a [`LineageGraph`].

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::graph::{LineageGraph, LineageNode, NodeType};

/// Named color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Default,
    Blue,
    Dark,
}

/// Graph, node and edge attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub color: &'static str,
    pub fillcolor: &'static str,
    pub bgcolor: &'static str,
    pub fontcolor: &'static str,
    pub style: &'static str,
    pub shape: &'static str,
    pub pencolor: &'static str,
    pub penwidth: &'static str,
}

impl Theme {
    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Theme {
                color: "#6c6c6c",
                fillcolor: "#e0e0e0",
                bgcolor: "#ffffff",
                fontcolor: "#000000",
                style: "filled",
                shape: "box",
                pencolor: "#696969",
                penwidth: "1",
            },
            ThemeName::Blue => Theme {
                color: "#1a5282",
                fillcolor: "#d3dcef",
                bgcolor: "#ffffff",
                fontcolor: "#000000",
                style: "filled",
                shape: "ellipse",
                pencolor: "#0078d7",
                penwidth: "2",
            },
            ThemeName::Dark => Theme {
                color: "#ffffff",
                fillcolor: "#333333",
                bgcolor: "#000000",
                fontcolor: "#ffffff",
                style: "filled",
                shape: "box",
                pencolor: "#ffffff",
                penwidth: "1",
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::named(ThemeName::Default)
    }
}

/// Render `graph` as a left-to-right DOT digraph.
///
/// Nodes are keyed by identity, so each node and edge appears once.
pub fn to_dot(graph: &LineageGraph, theme: &Theme) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dot(&mut out, graph, theme);
    out
}

fn write_dot(out: &mut String, graph: &LineageGraph, theme: &Theme) -> std::fmt::Result {
    writeln!(out, "digraph {{")?;
    writeln!(out, "    // Data Lineage")?;
    writeln!(
        out,
        "    graph [bgcolor=\"{}\", rankdir=\"LR\"];",
        theme.bgcolor
    )?;
    writeln!(
        out,
        "    node [style=\"{}\", shape=\"{}\", fillcolor=\"{}\", color=\"{}\", fontcolor=\"{}\", width=\"2.16\", height=\"0.72\"];",
        theme.style, theme.shape, theme.fillcolor, theme.color, theme.fontcolor
    )?;
    writeln!(
        out,
        "    edge [color=\"{}\", penwidth=\"{}\"];",
        theme.pencolor, theme.penwidth
    )?;

    for node in graph.nodes() {
        writeln!(
            out,
            "    \"{}\" [label=\"{}\", tooltip=\"{}\"];",
            escape(node.identity.as_str()),
            escape(&label(node)),
            escape(&tooltip(node))
        )?;
    }
    for (from, to) in graph.edges() {
        writeln!(
            out,
            "    \"{}\" -> \"{}\";",
            escape(from.identity.as_str()),
            escape(to.identity.as_str())
        )?;
    }
    writeln!(out, "}}")
}

/// `name`, then `(table)` or `(type)` for non-field nodes, then the kind.
fn label(node: &LineageNode) -> String {
    let mut label = node.display_name.clone();
    if !node.table.is_empty() {
        label.push_str(&format!("\n({})", node.table));
    } else if node.node_type != NodeType::Field {
        label.push_str(&format!("\n({})", node.node_type));
    }
    label.push_str(&format!("\n\n{}", node.lineage_kind));
    label
}

fn tooltip(node: &LineageNode) -> String {
    node.metadata_lines()
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape for a double-quoted DOT string; newlines become `\n`.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}
