//! Binary entry point for the sombra-slots administrative CLI.
#![forbid(unsafe_code)]

#[path = "cli/config.rs"]
mod config;

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sombra_slots::{
    init_logging, CreateEdgeOptions, Dir, EdgeId, ElementId, Graph, GraphStats, PropValue,
    VertexId,
};

use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(
    name = "sombra-slots",
    version,
    about = "Administrative CLI for sombra-slots graph directories",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "SOMBRA_SLOTS_DB",
        value_name = "DIR",
        help = "Graph directory (defaults to [graph].default in the config file)"
    )]
    db: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE", help = "CLI config file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "RUST_LOG",
        default_value = "warn",
        help = "Log filter, RUST_LOG syntax"
    )]
    log: String,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Show live record counts and the corruption flag")]
    Stats,

    #[command(about = "List vertices with their properties")]
    Vertices,

    #[command(about = "List edges with labels and properties")]
    Edges,

    #[command(about = "Create a vertex and print its id")]
    AddVertex,

    #[command(about = "Create an edge and print its id")]
    AddEdge(AddEdgeCmd),

    #[command(about = "Set a property on a vertex or an edge")]
    SetProp(SetPropCmd),
}

#[derive(Args, Debug)]
struct AddEdgeCmd {
    #[arg(value_name = "OUT")]
    out: u64,

    #[arg(value_name = "IN")]
    in_: u64,

    #[arg(value_name = "LABEL")]
    label: String,

    #[arg(long, help = "Clear the directed flag on the new edge")]
    undirected: bool,
}

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["vertex", "edge"])))]
struct SetPropCmd {
    #[arg(long, value_name = "ID", help = "Target vertex id")]
    vertex: Option<u64>,

    #[arg(long, value_name = "ID", help = "Target edge id")]
    edge: Option<u64>,

    #[arg(value_name = "KEY")]
    key: String,

    #[arg(value_name = "VALUE")]
    value: String,

    #[arg(
        long = "type",
        value_enum,
        default_value_t = PropType::Str,
        help = "Value type; bytes are given as hex"
    )]
    kind: PropType,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum PropType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Str,
    Bytes,
}

#[derive(Serialize)]
struct StatsReport {
    path: String,
    #[serde(flatten)]
    stats: GraphStats,
}

#[derive(Serialize)]
struct VertexRow {
    id: VertexId,
    degree: usize,
    properties: Vec<PropertyRow>,
}

#[derive(Serialize)]
struct EdgeRow {
    id: EdgeId,
    out_vertex: VertexId,
    in_vertex: VertexId,
    label: String,
    directed: bool,
    properties: Vec<PropertyRow>,
}

#[derive(Serialize)]
struct PropertyRow {
    key: String,
    value: PropValue,
}

#[derive(Serialize)]
struct Created {
    id: u64,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;
    let config = CliConfig::load(cli.config.clone())?;
    tracing::debug!(config = ?config.path(), "cli.config");
    let db_path = cli
        .db
        .clone()
        .or_else(|| config.default_graph().cloned())
        .ok_or("no graph directory; pass --db or set [graph].default in the config file")?;

    let read_only = matches!(
        cli.command,
        Command::Stats | Command::Vertices | Command::Edges
    );
    let options = config
        .graph_config()
        .options_for(&db_path)?
        .create_if_missing(!read_only);
    let mut graph = Graph::open(options)?;

    match &cli.command {
        Command::Stats => {
            let report = StatsReport {
                path: db_path.display().to_string(),
                stats: graph.stats()?,
            };
            emit(&cli.format, &report, |_| print_stats_text(&report))?;
        }
        Command::Vertices => {
            let rows = vertex_rows(&graph)?;
            emit(&cli.format, &rows, |_| print_vertices_text(&rows))?;
        }
        Command::Edges => {
            let rows = edge_rows(&graph)?;
            emit(&cli.format, &rows, |_| print_edges_text(&rows))?;
        }
        Command::AddVertex => {
            let id = graph.add_vertex()?;
            let created = Created { id: id.0 };
            emit(&cli.format, &created, |_| println!("Created vertex {id}"))?;
        }
        Command::AddEdge(cmd) => {
            let id = graph.add_edge_with(
                VertexId(cmd.out),
                VertexId(cmd.in_),
                &cmd.label,
                CreateEdgeOptions {
                    directed: !cmd.undirected,
                },
            )?;
            let created = Created { id: id.0 };
            emit(&cli.format, &created, |_| println!("Created edge {id}"))?;
        }
        Command::SetProp(cmd) => {
            let target: ElementId = match (cmd.vertex, cmd.edge) {
                (Some(v), _) => VertexId(v).into(),
                (None, Some(e)) => EdgeId(e).into(),
                (None, None) => return Err("pass --vertex or --edge".into()),
            };
            let value = parse_value(cmd.kind, &cmd.value)?;
            graph.set_property(target, &cmd.key, value)?;
            let target = describe(target);
            let report = serde_json::json!({ "target": target, "key": cmd.key });
            emit(&cli.format, &report, |_| {
                println!("Set {} on {}", cmd.key, target)
            })?;
        }
    }

    graph.close()?;
    Ok(())
}

fn vertex_rows(graph: &Graph) -> Result<Vec<VertexRow>, Box<dyn Error>> {
    let mut rows = Vec::new();
    for id in graph.vertices()? {
        let degree = graph
            .get_edges(id, Dir::Both, &[])?
            .collect::<sombra_slots::Result<Vec<_>>>()?
            .len();
        rows.push(VertexRow {
            id,
            degree,
            properties: property_rows(graph.properties(id)?),
        });
    }
    Ok(rows)
}

fn edge_rows(graph: &Graph) -> Result<Vec<EdgeRow>, Box<dyn Error>> {
    let mut rows = Vec::new();
    for id in graph.edges()? {
        let Some(edge) = graph.get_edge(id)? else {
            continue;
        };
        rows.push(EdgeRow {
            id,
            out_vertex: edge.out_vertex,
            in_vertex: edge.in_vertex,
            label: edge.label,
            directed: edge.directed,
            properties: property_rows(graph.properties(id)?),
        });
    }
    Ok(rows)
}

fn property_rows(pairs: Vec<(String, PropValue)>) -> Vec<PropertyRow> {
    pairs
        .into_iter()
        .map(|(key, value)| PropertyRow { key, value })
        .collect()
}

fn parse_value(kind: PropType, raw: &str) -> Result<PropValue, Box<dyn Error>> {
    Ok(match kind {
        PropType::Bool => PropValue::Bool(raw.parse()?),
        PropType::Int32 => PropValue::Int32(raw.parse()?),
        PropType::Int64 => PropValue::Int64(raw.parse()?),
        PropType::Float32 => PropValue::Float32(raw.parse()?),
        PropType::Float64 => PropValue::Float64(raw.parse()?),
        PropType::Str => PropValue::Str(raw.to_owned()),
        PropType::Bytes => PropValue::Bytes(hex::decode(raw)?),
    })
}

fn describe(element: ElementId) -> String {
    match element {
        ElementId::Vertex(id) => format!("vertex {id}"),
        ElementId::Edge(id) => format!("edge {id}"),
    }
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_stats_text(report: &StatsReport) {
    let stats = &report.stats;
    println!("Graph: {}", report.path);
    println!(
        "  vertices={} edges={} properties={} value_blocks={}",
        stats.vertices, stats.edges, stats.properties, stats.value_blocks
    );
    println!(
        "  property_keys={} labels={}",
        stats.property_keys, stats.labels
    );
    if stats.corrupted {
        println!("  corrupted=true (a store was not closed cleanly; no repair is attempted)");
    } else {
        println!("  corrupted=false");
    }
}

fn print_vertices_text(rows: &[VertexRow]) {
    for row in rows {
        println!("{} degree={}{}", row.id, row.degree, props_suffix(&row.properties));
    }
}

fn print_edges_text(rows: &[EdgeRow]) {
    for row in rows {
        let arrow = if row.directed { "->" } else { "--" };
        println!(
            "{} {} {arrow} {} [{}]{}",
            row.id,
            row.out_vertex,
            row.in_vertex,
            row.label,
            props_suffix(&row.properties)
        );
    }
}

fn props_suffix(props: &[PropertyRow]) -> String {
    if props.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = props
        .iter()
        .map(|p| format!("{}={}", p.key, p.value))
        .collect();
    format!(" {{{}}}", parts.join(", "))
}
