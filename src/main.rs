use std::path::PathBuf;
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser as ClapParser;
use clap::{ArgGroup, Subcommand};
use sqlineage::deps::extract_script_lineage;
use sqlineage::graph::DependencyGraph;
use sqlineage::render::{RenderTarget, render};

#[derive(clap::Parser)]
#[command(name = "sqlineage")]
#[command(about = "SQL lineage graph extractor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a dependency graph from one or more SQL scripts.
    Extract(ExtractCommand),
    /// Restrict a dependency graph to one object and everything upstream of it.
    Filter(FilterCommand),
    /// Render a dependency graph as a diagram.
    Render(RenderCommand),
    /// Build a dependency graph from CSV adjacency pairs.
    FromCsv(FromCsvCommand),
}

#[derive(clap::Args)]
struct ExtractCommand {
    /// Paths to SQL files, or directories containing SQL files.
    #[arg(value_name = "SQL_[FILE|DIR]", required = true)]
    sql: Vec<PathBuf>,
    /// Pretty-print the output graph.
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args)]
struct FilterCommand {
    /// Name of the object to compute the lineage of.
    object: String,
    /// Paths to JSON graph files, merged before filtering.
    #[arg(value_name = "JSON_FILE", required = true)]
    graphs: Vec<PathBuf>,
    /// Pretty-print the output graph.
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("syntax").required(true).args(["dot", "mmd"])))]
struct RenderCommand {
    /// Emit Graphviz DOT syntax.
    #[arg(long)]
    dot: bool,
    /// Emit Mermaid syntax.
    #[arg(long)]
    mmd: bool,
    /// Paths to JSON graph files, merged before rendering.
    #[arg(value_name = "JSON_FILE", required = true)]
    graphs: Vec<PathBuf>,
}

#[derive(clap::Args)]
struct FromCsvCommand {
    /// Paths to CSV files of `object,upstream` rows.
    #[arg(value_name = "CSV_FILE", required = true)]
    csv: Vec<PathBuf>,
    /// Pretty-print the output graph.
    #[arg(long)]
    pretty: bool,
}

fn read_file(path: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|err| anyhow!("Failed to read file {}: {}", path.display(), err))
}

fn sql_files(path: &PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.clone()]);
    }
    Ok(std::fs::read_dir(path)?
        .filter_map(|res| res.ok())
        .map(|entry| entry.path())
        .filter(|file| file.extension().is_some_and(|ext| ext == "sql"))
        .collect())
}

fn merged_graphs(paths: &[PathBuf]) -> anyhow::Result<DependencyGraph> {
    let mut merged = DependencyGraph::new();
    for path in paths {
        let graph: DependencyGraph = serde_json::from_str(&read_file(path)?).map_err(|err| {
            anyhow!(
                "Failed to parse JSON graph in file {}: {}",
                path.display(),
                err
            )
        })?;
        merged.merge(&graph);
    }
    Ok(merged)
}

fn print_graph(graph: &DependencyGraph, pretty: bool) -> anyhow::Result<()> {
    let out_str = if pretty {
        serde_json::to_string_pretty(graph)?
    } else {
        serde_json::to_string(graph)?
    };
    println!("{}", out_str);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract(extract_command) => {
            let mut graph = DependencyGraph::new();
            for path in &extract_command.sql {
                for sql_file in sql_files(path)? {
                    log::debug!("extracting lineage from {}", sql_file.display());
                    graph.merge(&extract_script_lineage(&read_file(&sql_file)?));
                }
            }
            print_graph(&graph, extract_command.pretty)?;
        }
        Commands::Filter(filter_command) => {
            let merged = merged_graphs(&filter_command.graphs)?;
            let filtered = merged.lineage(&filter_command.object)?;
            print_graph(&filtered, filter_command.pretty)?;
        }
        Commands::Render(render_command) => {
            let merged = merged_graphs(&render_command.graphs)?;
            let target = if render_command.dot {
                RenderTarget::Dot
            } else {
                RenderTarget::Mermaid
            };
            print!("{}", render(&merged, target));
        }
        Commands::FromCsv(from_csv_command) => {
            let mut graph = DependencyGraph::new();
            for path in &from_csv_command.csv {
                graph.merge_csv(&read_file(path)?)?;
            }
            print_graph(&graph, from_csv_command.pretty)?;
        }
    }

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}
