//! Lineage CLI - resolve field lineage from pre-fetched catalog metadata
//!
//! Usage:
//!   lineage resolve --workbooks <wb.json> --calculated-fields <calc.json> [--name <workbook>]...
//!   lineage ids --workbooks <wb.json>
//!   lineage graph --lineage <combined.json> [--workbook <name>] [--sheet <name>] [--field <name>]...
//!   lineage db --lineage <db_lineage.json> [--format tsv|json]
//!
//! Examples:
//!   lineage resolve --workbooks data/workbooks.json --calculated-fields data/calcs.json --format tsv
//!   lineage resolve --name Superstore --scope workbook --format dot > superstore.dot
//!   lineage graph --lineage combined_lineage.json --dashboard Exec --field Profit --theme dark

use clap::{Parser, Subcommand, ValueEnum};
use lineage::config::{ExportFormat, Settings};
use lineage::export::{db_edges_to_tsv, group_by_workbook, to_json, to_tsv};
use lineage::graph::LineageGraph;
use lineage::lineage::{db_lineage_edges, resolve_workbooks, FlattenMode, VisitedScope};
use lineage::metadata::{
    normalize_workbook, parse_db_lineage, parse_workbooks, select_reporting_fields,
    FieldSelection, JsonMetadataProvider, MetadataProvider,
};
use lineage::render::{to_dot, Theme, ThemeName};
use lineage::{logging, LineageError, LineageResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Lineage - resolve reporting-field lineage into edge tables and graphs")]
#[command(version)]
struct Cli {
    /// Path to a lineage.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve workbook fields into lineage rows
    Resolve {
        /// Workbook document (falls back to [metadata].workbooks)
        #[arg(short, long)]
        workbooks: Option<PathBuf>,

        /// Calculated-field batch document (falls back to [metadata].calculated_fields)
        #[arg(short = 'f', long)]
        calculated_fields: Option<PathBuf>,

        /// Workbook to resolve; repeatable (all workbooks if omitted)
        #[arg(short, long)]
        name: Vec<String>,

        /// Output format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Visited-set lifetime
        #[arg(long)]
        scope: Option<ScopeArg>,

        /// Physical reference flattening
        #[arg(long)]
        flatten: Option<FlattenArg>,

        /// Keep exact duplicate rows
        #[arg(long)]
        no_dedup: bool,
    },

    /// List the calculated-field ids each workbook's dashboards reference
    Ids {
        /// Workbook document
        #[arg(short, long)]
        workbooks: PathBuf,
    },

    /// Render reporting-side field lineage as Graphviz DOT
    Graph {
        /// Combined lineage document, a field record, or an array of them
        #[arg(short, long)]
        lineage: PathBuf,

        /// Only fields of this workbook
        #[arg(long)]
        workbook: Option<String>,

        /// Only fields of this dashboard
        #[arg(long)]
        dashboard: Option<String>,

        /// Only fields of this datasource
        #[arg(long)]
        datasource: Option<String>,

        /// Only fields of this sheet
        #[arg(long)]
        sheet: Option<String>,

        /// Field to include; repeatable (all fields if omitted)
        #[arg(long)]
        field: Vec<String>,

        /// Color theme
        #[arg(short, long)]
        theme: Option<ThemeArg>,
    },

    /// List database-side lineage edges
    Db {
        /// Database lineage record, or an array of them
        #[arg(short, long)]
        lineage: PathBuf,

        /// Output format
        #[arg(long, default_value = "tsv")]
        format: DbFormatArg,
    },
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    Json,
    Tsv,
    Dot,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Dot => ExportFormat::Dot,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum DbFormatArg {
    Json,
    Tsv,
}

#[derive(Clone, ValueEnum)]
enum ScopeArg {
    Root,
    Workbook,
}

impl From<ScopeArg> for VisitedScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Root => VisitedScope::Root,
            ScopeArg::Workbook => VisitedScope::Workbook,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum FlattenArg {
    Cartesian,
    Paired,
}

impl From<FlattenArg> for FlattenMode {
    fn from(arg: FlattenArg) -> Self {
        match arg {
            FlattenArg::Cartesian => FlattenMode::Cartesian,
            FlattenArg::Paired => FlattenMode::Paired,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum ThemeArg {
    Default,
    Blue,
    Dark,
}

impl From<ThemeArg> for ThemeName {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Default => ThemeName::Default,
            ThemeArg::Blue => ThemeName::Blue,
            ThemeArg::Dark => ThemeName::Dark,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let mut settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.logging.level);

    let result = match cli.command {
        Commands::Resolve {
            workbooks,
            calculated_fields,
            name,
            format,
            scope,
            flatten,
            no_dedup,
        } => {
            if let Some(format) = format {
                settings.export.format = format.into();
            }
            if let Some(scope) = scope {
                settings.resolve.visited_scope = scope.into();
            }
            if let Some(flatten) = flatten {
                settings.resolve.flatten = flatten.into();
            }
            if no_dedup {
                settings.export.dedup = false;
            }
            if !name.is_empty() {
                settings.metadata.workbook_names = name;
            }
            cmd_resolve(workbooks, calculated_fields, &settings)
        }
        Commands::Ids { workbooks } => cmd_ids(&workbooks),
        Commands::Graph {
            lineage,
            workbook,
            dashboard,
            datasource,
            sheet,
            field,
            theme,
        } => {
            let selection = FieldSelection {
                workbook,
                dashboard,
                datasource,
                sheet,
                fields: field,
            };
            let theme = theme.map(ThemeName::from).unwrap_or(settings.render.theme);
            cmd_graph(&lineage, &selection, theme)
        }
        Commands::Db { lineage, format } => cmd_db(&lineage, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn required_path(
    flag: Option<PathBuf>,
    configured: Option<PathBuf>,
    what: &str,
) -> LineageResult<PathBuf> {
    flag.or(configured).ok_or_else(|| {
        LineageError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no {} document given (flag or [metadata] config)", what),
        ))
    })
}

fn cmd_resolve(
    workbooks: Option<PathBuf>,
    calculated_fields: Option<PathBuf>,
    settings: &Settings,
) -> LineageResult<()> {
    let workbooks = required_path(workbooks, settings.metadata.workbooks_path()?, "workbook")?;
    let calculated_fields = required_path(
        calculated_fields,
        settings.metadata.calculated_fields_path()?,
        "calculated-field",
    )?;

    let provider = JsonMetadataProvider::from_files(&workbooks, &calculated_fields)?;
    let names = if settings.metadata.workbook_names.is_empty() {
        provider.workbook_names()
    } else {
        settings.metadata.workbook_names.clone()
    };

    let rows = resolve_workbooks(&provider, &names, &settings.resolve, settings.export.dedup)?;

    match settings.export.format {
        ExportFormat::Tsv => print!("{}", to_tsv(&rows)),
        ExportFormat::Dot => {
            let graph = LineageGraph::from_rows(&rows);
            print!("{}", to_dot(&graph, &Theme::named(settings.render.theme)));
        }
        ExportFormat::Json => {
            let sheets = group_by_workbook(rows, settings.export.sheet_name_limit);
            println!("{}", to_json(&sheets)?);
        }
    }
    Ok(())
}

fn cmd_ids(workbooks: &Path) -> LineageResult<()> {
    let source = fs::read_to_string(workbooks)?;
    for raw in parse_workbooks(&source)? {
        let workbook = normalize_workbook(&raw)?;
        println!("{}", workbook.name);
        for id in workbook.calculated_field_ids() {
            println!("  {}", id);
        }
    }
    Ok(())
}

fn cmd_graph(lineage: &Path, selection: &FieldSelection, theme: ThemeName) -> LineageResult<()> {
    let source = fs::read_to_string(lineage)?;
    let fields = select_reporting_fields(&source, selection)?;
    if fields.is_empty() {
        eprintln!("No fields matched the selection");
    }

    let graph = LineageGraph::from_reporting_fields(&fields);
    print!("{}", to_dot(&graph, &Theme::named(theme)));
    Ok(())
}

fn cmd_db(lineage: &Path, format: DbFormatArg) -> LineageResult<()> {
    let source = fs::read_to_string(lineage)?;
    let edges: Vec<_> = parse_db_lineage(&source)?
        .iter()
        .flat_map(db_lineage_edges)
        .collect();

    match format {
        DbFormatArg::Tsv => print!("{}", db_edges_to_tsv(&edges)),
        DbFormatArg::Json => println!("{}", serde_json::to_string_pretty(&edges)?),
    }
    Ok(())
}
