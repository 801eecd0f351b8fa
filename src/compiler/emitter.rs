use crate::catalog::{NodeCatalog, ReturnShape};
use crate::error::Diagnostic;
use crate::graph::{InputValue, LinkRef, NodeId, NodeSpec, WorkflowGraph};
use crate::options::ScriptOptions;
use crate::script::{EmittedStatement, is_python_identifier, render_literal, render_string};
use ahash::AHashMap;

/// Operation name used for classes the catalog does not know.
pub const FALLBACK_OPERATION: &str = "execute";

const RANDOM_SEED: &str = "random.randint(1, 2**64)";

/// Renders one node invocation at a time.
///
/// The emitter is stateless between nodes. Everything it needs from
/// previously emitted nodes comes through `results`, the map from node id to
/// the variable holding that node's return value.
pub struct NodeEmitter<'a> {
    graph: &'a WorkflowGraph,
    catalog: &'a NodeCatalog,
    options: &'a ScriptOptions,
}

impl<'a> NodeEmitter<'a> {
    pub fn new(
        graph: &'a WorkflowGraph,
        catalog: &'a NodeCatalog,
        options: &'a ScriptOptions,
    ) -> Self {
        Self {
            graph,
            catalog,
            options,
        }
    }

    pub fn emit(
        &self,
        id: &NodeId,
        node: &NodeSpec,
        handle: &str,
        target: String,
        results: &AHashMap<NodeId, String>,
    ) -> (EmittedStatement, Vec<Diagnostic>) {
        let info = self.catalog.get(&node.class_type);
        let mut diagnostics = Vec::new();
        let mut arguments = Vec::with_capacity(node.inputs.len() + 1);

        if info.is_none() {
            diagnostics.push(Diagnostic::UnknownNodeClass {
                node_id: id.clone(),
                class_type: node.class_type.clone(),
            });
        }

        for (name, value) in &node.inputs {
            if info.is_some_and(|info| info.is_widget_input(name)) {
                continue;
            }
            let expr = match value {
                InputValue::Link(link) => match self.link_expression(link, results) {
                    Some(expr) => expr,
                    None => {
                        diagnostics.push(Diagnostic::UnboundRequiredInput {
                            node_id: id.clone(),
                            class_type: node.class_type.clone(),
                            input: name.clone(),
                        });
                        continue;
                    }
                },
                InputValue::Literal(_) if self.options.is_randomized(name, value) => {
                    RANDOM_SEED.to_string()
                }
                InputValue::Literal(literal) => render_literal(literal),
            };
            arguments.push((name.clone(), expr));
        }

        if let Some(info) = info {
            for required in &info.required {
                if node.input(required).is_none() {
                    diagnostics.push(Diagnostic::UnboundRequiredInput {
                        node_id: id.clone(),
                        class_type: node.class_type.clone(),
                        input: required.clone(),
                    });
                }
            }
            if info.hidden.iter().any(|h| h == "unique_id") && node.input("unique_id").is_none() {
                arguments.push(("unique_id".to_string(), render_string(id.as_str())));
            }
        }

        let operation = info.map_or(FALLBACK_OPERATION, |info| info.function.as_str());
        let callee = if is_python_identifier(operation) {
            format!("{}.{}", handle, operation)
        } else {
            format!("getattr({}, {})", handle, render_string(operation))
        };

        let statement = EmittedStatement {
            node_id: id.clone(),
            target,
            callee,
            arguments,
            is_async: info.is_some_and(|info| info.is_async),
            warnings: diagnostics.iter().map(ToString::to_string).collect(),
        };
        (statement, diagnostics)
    }

    /// The expression reading output `link.output_index` of the producer,
    /// or `None` when the producer was left out of the script.
    fn link_expression(&self, link: &LinkRef, results: &AHashMap<NodeId, String>) -> Option<String> {
        let producer = results.get(&link.source)?;
        let shape = self
            .graph
            .get(&link.source)
            .and_then(|node| self.catalog.get(&node.class_type))
            .map_or(ReturnShape::Unknown, |info| info.return_shape);

        let index = link.output_index;
        Some(match shape {
            ReturnShape::Sequence => format!("{}[{}]", producer, index),
            ReturnShape::Mapping => format!("{}[\"result\"][{}]", producer, index),
            ReturnShape::Unknown => format!("get_value_at_index({}, {})", producer, index),
        })
    }
}
