//! Schema Builders CLI
//!
//! Host adapter around the builder generator: loads named schemas from an
//! OpenAPI document or a schema directory, runs the pipeline, and writes the
//! generated module.
//!
//! Usage:
//!   schema-builders generate --input openapi.json --out-dir src/client
//!   schema-builders graph --input schemas/ --output schemas.dot

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_builders::config::{BuildersConfig, PluginConfig};
use schema_builders::graph::{self, ReferenceGraph};
use schema_builders::plugin::{index_export_line, MemorySink, SchemaCollector};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-builders")]
#[command(about = "Generate mock factories and fluent builders from named JSON schemas")]
struct Cli {
    /// Config file (layered over builders.toml and BUILDERS__* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the builders module
    Generate {
        /// OpenAPI document or directory of *.json schemas
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the generated file is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Export the reference graph as DOT
    Graph {
        /// OpenAPI document or directory of *.json schemas
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to schemas.dot)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BuildersConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Generate { input, out_dir } => generate(&config, &input, &out_dir),
        Command::Graph { input, output } => export_graph(&config, &input, output),
    }
}

fn collect(config: &BuildersConfig, input: &Path) -> anyhow::Result<SchemaCollector> {
    let entries = graph::load_path(input, &config.input.load_config())?;
    let mut collector = SchemaCollector::new();
    collector.extend(entries);
    Ok(collector)
}

fn generate(config: &BuildersConfig, input: &Path, out_dir: &Path) -> anyhow::Result<()> {
    println!("📂 Loading schemas from: {:?}", input);
    let collector = collect(config, input)?;
    println!("   Found {} schemas\n", collector.len());

    let mut sink = MemorySink::new();
    let report = collector.finalize(&config.plugin, &config.options, &mut sink)?;

    let file = sink
        .files()
        .first()
        .context("Generator produced no file")?;
    let path = config.output_path(out_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, file.content()).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Wrote {} ({})", path.display(), file.id);

    if config.plugin.export_from_index {
        ensure_index_export(out_dir, &config.plugin)?;
    }

    println!("\n📊 Summary:");
    println!("   Builders:  {}", report.builder_count);
    println!("   Constants: {}", report.constant_count);
    if !report.diagnostics.is_empty() {
        println!("\n⚠️  Diagnostics:\n{}", report.diagnostics.format_all());
    }
    Ok(())
}

/// Append the re-export line to `index.ts` unless it is already there
fn ensure_index_export(out_dir: &Path, plugin: &PluginConfig) -> anyhow::Result<()> {
    let index = out_dir.join("index.ts");
    let line = index_export_line(plugin);
    let existing = if index.exists() {
        fs::read_to_string(&index).with_context(|| format!("Failed to read {}", index.display()))?
    } else {
        String::new()
    };

    if existing.lines().any(|l| l.trim() == line.trim()) {
        return Ok(());
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&line);
    fs::write(&index, content).with_context(|| format!("Failed to write {}", index.display()))?;
    println!("✅ Updated {}", index.display());
    Ok(())
}

fn export_graph(config: &BuildersConfig, input: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let collector = collect(config, input)?;
    let schemas = collector.parse()?;
    let graph = ReferenceGraph::from_schemas(&schemas);

    println!(
        "Graph loaded: {} schemas, {} edges",
        graph.schema_count(),
        graph.edge_count()
    );

    let diagnostics = graph.cycle_diagnostics();
    if !diagnostics.is_empty() {
        println!("{}", diagnostics.format_all());
    }
    for (schema, pointer) in graph.dangling() {
        println!("⚠️  {}: reference not found for {}", schema, pointer);
    }
    for (schema, pointer) in graph.unfollowed() {
        println!("⚠️  {}: reference under an unsupported keyword left in place: {}", schema, pointer);
    }

    let output_path = output.unwrap_or_else(|| PathBuf::from("schemas.dot"));
    fs::write(&output_path, graph.to_dot()).with_context(|| format!("Failed to write {}", output_path.display()))?;
    println!("✅ Exported DOT to: {:?}", output_path);
    Ok(())
}
