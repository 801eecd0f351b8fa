//! # Utsushi - Workflow Graph to Python Compiler
//!
//! **Utsushi** turns the API-format export of a node-editor workflow into a
//! standalone Python script that performs the same node calls in the same
//! order, without the editor or its server. The output is deterministic: the
//! same graph, catalog and options always produce byte-identical source.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: [`WorkflowGraph::from_json`](graph::WorkflowGraph::from_json) reads the export.
//!     Front-ends holding the graph in memory implement [`IntoWorkflow`](graph::IntoWorkflow) instead.
//! 2.  **Describe the node library**: a [`NodeCatalog`](catalog::NodeCatalog) tells the compiler which
//!     operation each `class_type` runs, whether it is async, and whether its result can be reused.
//! 3.  **Compile**: [`Compiler::builder`](compiler::Compiler::builder) orders the nodes, hoists cacheable
//!     work out of the queue loop, names every variable and assembles the script.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use utsushi::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let workflow = std::fs::read_to_string("workflow_api.json")?;
//!
//!     let graph = WorkflowGraph::from_json(&workflow)?;
//!     let script = Compiler::builder(graph)
//!         .iterations(4)
//!         .with_type_mapping("CheckpointLoader|pysssss", "CheckpointLoaderSimple")
//!         .build()
//!         .compile()?;
//!
//!     for warning in &script.diagnostics {
//!         eprintln!("warning: {}", warning);
//!     }
//!     std::fs::write("workflow_api.py", script.source)?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod options;
pub mod prelude;
pub mod script;

#[cfg(feature = "python-bindings")]
mod python;

use compiler::{CompiledScript, Compiler};
use error::CompileError;
use graph::WorkflowGraph;

/// Compiles `graph_json` with the built-in catalog and default options.
///
/// The generated script runs the workflow `iteration_count` times.
pub fn compile(graph_json: &str, iteration_count: u32) -> Result<CompiledScript, CompileError> {
    let graph = WorkflowGraph::from_json(graph_json)?;
    Compiler::builder(graph)
        .iterations(iteration_count)
        .build()
        .compile()
}
