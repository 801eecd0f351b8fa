use crate::error::CompileError;
use crate::graph::{NodeId, WorkflowGraph};
use std::collections::{BTreeMap, BTreeSet};

/// For every node, the nodes it reads from through links.
pub type DependencyMap = BTreeMap<NodeId, BTreeSet<NodeId>>;

/// Builds the dependency edges of `graph`.
///
/// Every node gets an entry, even without links. A link to a node that is not
/// in the graph fails with [`CompileError::UnresolvedReference`]; nodes are
/// checked in ascending id order and inputs in source order, so the reported
/// link is always the same one.
pub fn resolve_dependencies(graph: &WorkflowGraph) -> Result<DependencyMap, CompileError> {
    let mut dependencies = DependencyMap::new();

    for (id, node) in graph.nodes() {
        let mut sources = BTreeSet::new();
        for (input, link) in node.links() {
            if !graph.contains(&link.source) {
                return Err(CompileError::UnresolvedReference {
                    node_id: id.clone(),
                    input: input.to_string(),
                    missing: link.source.clone(),
                });
            }
            sources.insert(link.source.clone());
        }
        dependencies.insert(id.clone(), sources);
    }

    Ok(dependencies)
}
