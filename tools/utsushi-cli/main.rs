use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utsushi::prelude::*;

/// Compiles an API-format workflow export into a standalone Python script
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow JSON file (API format)
    workflow_path: PathBuf,

    /// Where to write the script; printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How many times the script runs the workflow
    #[arg(short, long, default_value_t = 10)]
    queue_size: u32,

    /// Node class facts layered over the built-in catalog (JSON, or a snapshot ending in .bin)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Write the merged catalog as a binary snapshot for later runs
    #[arg(long)]
    save_catalog: Option<PathBuf>,

    /// Do not wrap the script body in `torch.inference_mode()`
    #[arg(long)]
    no_inference_mode: bool,

    /// Do not emit the helpers that locate the node library at runtime
    #[arg(long)]
    no_path_discovery: bool,

    /// Keep seed values from the workflow instead of drawing new ones
    #[arg(long)]
    keep_seeds: bool,

    /// Fail when the compiler reports any warning
    #[arg(long)]
    strict: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let workflow_json = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        report_missing_workflow(&cli.workflow_path);
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            cli.workflow_path.display(),
            e
        ))
    });

    let catalog = load_catalog(cli.catalog.as_deref());
    if let Some(path) = &cli.save_catalog {
        let bytes = catalog
            .to_bytes()
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        fs::write(path, bytes).unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to write catalog snapshot '{}': {}",
                path.display(),
                e
            ))
        });
        info!(path = %path.display(), classes = catalog.len(), "catalog snapshot written");
    }

    let options = ScriptOptions {
        inference_mode: !cli.no_inference_mode,
        path_discovery: !cli.no_path_discovery,
        randomize_seeds: !cli.keep_seeds,
        ..ScriptOptions::default()
    };

    let graph = WorkflowGraph::from_json(&workflow_json)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    debug!(nodes = graph.len(), "workflow parsed");

    let script = Compiler::builder(graph)
        .iterations(cli.queue_size)
        .with_catalog(catalog)
        .options(options)
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    for diagnostic in &script.diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }

    match &cli.output {
        Some(path) => {
            fs::write(path, &script.source).unwrap_or_else(|e| {
                exit_with_error(&format!(
                    "Failed to write script '{}': {}",
                    path.display(),
                    e
                ))
            });
            info!(path = %path.display(), "script written");
        }
        None => print!("{}", script.source),
    }

    if cli.strict && !script.is_clean() {
        exit_with_error(&format!(
            "{} warning(s) reported in strict mode",
            script.diagnostics.len()
        ));
    }
}

/// Initializes tracing on stderr so stdout carries only the script.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_catalog(path: Option<&Path>) -> NodeCatalog {
    let builtin = NodeCatalog::builtin();
    let Some(path) = path else {
        return builtin;
    };

    let loaded = if path.extension().is_some_and(|ext| ext == "bin") {
        fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| NodeCatalog::from_bytes(&bytes).map_err(|e| e.to_string()))
    } else {
        fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| NodeCatalog::from_json(&json).map_err(|e| e.to_string()))
    };
    let extra = loaded.unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load catalog '{}': {}",
            path.display(),
            e
        ))
    });

    info!(classes = extra.len(), "catalog loaded");
    builtin.merge(extra)
}

/// Lists the JSON files next to a workflow path that does not exist.
fn report_missing_workflow(path: &Path) {
    if path.exists() {
        return;
    }
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Ok(entries) = fs::read_dir(directory) else {
        return;
    };

    let mut candidates: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|p| p.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect();
    candidates.sort();

    if candidates.is_empty() {
        eprintln!("No .json files found in '{}'.", directory.display());
    } else {
        eprintln!("JSON files in '{}':", directory.display());
        for name in candidates {
            eprintln!("  {}", name);
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
