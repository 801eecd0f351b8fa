use crate::graph::NodeId;
use itertools::Itertools;
use thiserror::Error;

/// Fatal errors that abort a compilation. No source text is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Failed to parse workflow: node '{node_id}', field '{field}': {message}")]
    Parse {
        node_id: String,
        field: String,
        message: String,
    },

    #[error(
        "Node '{missing}' not found, which is required by input '{input}' of node '{node_id}'"
    )]
    UnresolvedReference {
        node_id: NodeId,
        input: String,
        missing: NodeId,
    },

    #[error("Workflow contains a cycle through nodes {}", format_cycle(.cycle))]
    CyclicGraph { cycle: Vec<NodeId> },
}

impl CompileError {
    /// A parse error about the document as a whole rather than one node.
    pub(crate) fn document(message: impl Into<String>) -> Self {
        CompileError::Parse {
            node_id: "<root>".to_string(),
            field: "<root>".to_string(),
            message: message.into(),
        }
    }
}

fn format_cycle(cycle: &[NodeId]) -> String {
    cycle.iter().map(|id| format!("'{}'", id)).join(" -> ")
}

/// Non-fatal findings. The compiler emits best-effort code for the node and
/// flags it with a comment in the script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Node '{node_id}' uses class '{class_type}' which is not in the node catalog")]
    UnknownNodeClass { node_id: NodeId, class_type: String },

    #[error("Node '{node_id}' ({class_type}) has no value for required input '{input}'")]
    UnboundRequiredInput {
        node_id: NodeId,
        class_type: String,
        input: String,
    },
}

impl Diagnostic {
    pub fn node_id(&self) -> &NodeId {
        match self {
            Diagnostic::UnknownNodeClass { node_id, .. }
            | Diagnostic::UnboundRequiredInput { node_id, .. } => node_id,
        }
    }
}

/// Errors raised while loading or snapshotting a node catalog.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Failed to parse node catalog JSON: {0}")]
    Json(String),

    #[error("Failed to read or write catalog snapshot: {0}")]
    Snapshot(String),
}

/// Errors that can occur when converting a custom graph format into a `WorkflowGraph`.
#[derive(Error, Debug, Clone)]
pub enum GraphConversionError {
    #[error("Invalid custom data: {0}")]
    Validation(String),
}
