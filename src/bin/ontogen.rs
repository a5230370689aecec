//! Ontology Compiler CLI
//!
//! Loads a Turtle ontology, compiles it into a Python/Pydantic module,
//! and writes the result to a file or stdout. `--dump-ir` serializes the
//! resolved class descriptors as JSON instead, for inspection.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use ontogen::{build_descriptors, compile, EmitConfig, OntologyGraph};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ontogen")]
#[command(about = "Compile an OWL/RDFS/SHACL ontology into Pydantic models")]
struct Cli {
    /// Path to the Turtle ontology
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Namespace for synthesized instance URIs
    #[arg(long)]
    namespace: Option<String>,

    /// Python expression used to mint fresh instance ids
    #[arg(long)]
    id_factory: Option<String>,

    /// Dump the resolved class descriptors as JSON instead of Python
    #[arg(long)]
    dump_ir: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ttl = fs::read_to_string(&cli.input)?;
    let graph = OntologyGraph::parse_turtle(&ttl)?;

    let mut config = EmitConfig::default();
    if let Some(namespace) = cli.namespace {
        config.instance_namespace = namespace;
    }
    if let Some(id_factory) = cli.id_factory {
        config.id_factory_expr = id_factory;
    }

    let rendered = if cli.dump_ir {
        let table = build_descriptors(&graph);
        let order = ontogen::order::topological_order(&table);
        let descriptors: Vec<_> = order.iter().filter_map(|uri| table.get(uri)).collect();
        serde_json::to_string_pretty(&descriptors)?
    } else {
        compile(&graph, &config)
    };

    match cli.output {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{}", rendered),
    }
    Ok(())
}
