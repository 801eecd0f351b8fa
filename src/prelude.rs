//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the utsushi crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use utsushi::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let workflow = std::fs::read_to_string("path/to/workflow_api.json")?;
//! let catalog_json = std::fs::read_to_string("path/to/catalog.json")?;
//!
//! let catalog = NodeCatalog::builtin().merge(NodeCatalog::from_json(&catalog_json)?);
//! let script = Compiler::builder(WorkflowGraph::from_json(&workflow)?)
//!     .with_catalog(catalog)
//!     .build()
//!     .compile()?;
//!
//! println!("{}", script.source);
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{CompiledScript, Compiler, ExecutionPlan, Placement, VariableBinding};
pub use crate::options::ScriptOptions;

// Graph model
pub use crate::graph::{
    InputValue, IntoWorkflow, LinkRef, Literal, NodeId, NodeSpec, WorkflowGraph,
};

// Node catalog
pub use crate::catalog::{ClassOrigin, NodeCatalog, NodeClassInfo, ReturnShape};

// Error types
pub use crate::error::{CatalogError, CompileError, Diagnostic};

// Result type alias for convenience
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;
