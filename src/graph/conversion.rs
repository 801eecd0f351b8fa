use super::definition::WorkflowGraph;
use crate::error::GraphConversionError;

/// A trait for custom graph models that can be converted into a `WorkflowGraph`.
///
/// The JSON export is only one way in. Front-ends that already hold the graph
/// in memory (an editor, a test harness, another exporter) implement this
/// trait to hand the compiler a graph directly.
///
/// # Example
///
/// ```rust,no_run
/// use utsushi::prelude::*;
/// use utsushi::error::GraphConversionError;
///
/// struct MyStep { id: u32, op: String, prompt: String }
/// struct MyPipeline { steps: Vec<MyStep> }
///
/// impl IntoWorkflow for MyPipeline {
///     fn into_workflow(self) -> Result<WorkflowGraph, GraphConversionError> {
///         let mut graph = WorkflowGraph::new();
///         for step in self.steps {
///             let node = NodeSpec::new(step.op)
///                 .with_literal("text", Literal::String(step.prompt));
///             graph.insert(step.id.to_string(), node);
///         }
///         Ok(graph)
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a compilable workflow graph.
    fn into_workflow(self) -> Result<WorkflowGraph, GraphConversionError>;
}

impl IntoWorkflow for WorkflowGraph {
    fn into_workflow(self) -> Result<WorkflowGraph, GraphConversionError> {
        Ok(self)
    }
}
