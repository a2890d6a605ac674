use clap::Parser;
use opgraph::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Loads an operator graph, validates it and reports the status of every node
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the graph definition JSON file
    graph_path: String,

    /// Optional path to an editor config JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Only validate the part of the graph fed by this node
    #[arg(short, long)]
    from: Option<String>,

    /// Restore node positions from a presentation XML file before validating
    #[arg(long)]
    layout: Option<String>,

    /// Write the node positions as presentation XML to this path
    #[arg(short, long)]
    presentation: Option<String>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct NodeReport {
    name: String,
    operator: String,
    status: ValidationStatus,
    inputs: usize,
    output: Option<String>,
    message: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GraphConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => GraphConfig::default(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();

    let total_start = Instant::now();

    // --- 1. Load ---
    let definition = GraphDefinition::from_file(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load graph '{}': {}",
            cli.graph_path, e
        ))
    });
    let sink = MemorySink::new();
    let context = GraphContext::new(Arc::new(sink.clone()), config);
    let mut graph = Graph::new(OperatorRegistry::with_defaults(), context)
        .with_definition(&definition)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build graph: {}", e)));

    if let Some(layout) = &cli.layout {
        let restored = graph
            .read_presentation(layout)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read layout: {}", e)));
        log::info!("restored {} node position(s) from '{}'", restored, layout);
    }

    // --- 2. Validate ---
    let validate_start = Instant::now();
    match &cli.from {
        Some(name) => {
            let id = graph
                .find(name)
                .unwrap_or_else(|| exit_with_error(&format!("No node named '{}'", name)));
            let pass = graph
                .validate_from(id, true)
                .unwrap_or_else(|e| exit_with_error(&format!("Validation failed: {}", e)));
            log::info!(
                "{} downstream node(s) revalidated, {} invalidated",
                pass.revalidated.len(),
                pass.invalidated.len()
            );
        }
        None => {
            graph.validate_all();
        }
    }
    let validate_duration = validate_start.elapsed();

    // --- 3. Report ---
    let reports: Vec<NodeReport> = graph
        .nodes()
        .map(|n| NodeReport {
            name: n.name().to_string(),
            operator: n.operator_name().to_string(),
            status: n.status(),
            inputs: n.connection_count(),
            output: n.output().map(|p| p.name.clone()),
            message: sink
                .last_for(n.name())
                .filter(|note| note.severity != Severity::Info)
                .map(|note| note.message),
        })
        .collect();

    if cli.json {
        let json = serde_json::to_string_pretty(&reports)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode report: {}", e)));
        println!("{}", json);
    } else {
        print_table(&reports);
        println!("\nValidation:       {:?}", validate_duration);
        println!("Total Execution:  {:?}", total_start.elapsed());
    }

    if let Some(path) = &cli.presentation {
        graph
            .write_presentation(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write presentation: {}", e)));
        log::info!("presentation written to '{}'", path);
    }
}

fn print_table(reports: &[NodeReport]) {
    let width = reports.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    println!("{:<width$}  {:<10}  {:<9}  {:>6}  OUTPUT", "NODE", "OPERATOR", "STATUS", "INPUTS");
    for r in reports {
        println!(
            "{:<width$}  {:<10}  {:<9}  {:>6}  {}",
            r.name,
            r.operator,
            r.status.to_string(),
            r.inputs,
            r.output.as_deref().unwrap_or("-"),
        );
        if let Some(message) = &r.message {
            println!("{:<width$}    -> {}", "", message);
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
