use super::resolver::DependencyMap;
use crate::error::CompileError;
use crate::graph::NodeId;
use ahash::AHashMap;
use std::collections::BTreeSet;

static NO_DEPENDENCIES: BTreeSet<NodeId> = BTreeSet::new();

/// A topologically valid order of nodes: every node comes after all of the
/// nodes it links to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionPlan {
    order: Vec<NodeId>,
}

impl ExecutionPlan {
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.order
    }

    /// Position of `id` in the plan.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.order.iter().position(|n| n == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Orders the nodes of `dependencies` by depth-first post-order.
///
/// Traversal starts from each unvisited node in ascending id order and visits
/// dependencies in ascending id order, so the plan only depends on the graph.
/// Reaching a node that is still in progress means the graph has a cycle; the
/// error lists the nodes on it, starting with the node that closes it.
pub fn schedule(dependencies: &DependencyMap) -> Result<ExecutionPlan, CompileError> {
    let mut marks: AHashMap<&NodeId, Mark> = AHashMap::with_capacity(dependencies.len());
    let mut order = Vec::with_capacity(dependencies.len());

    for start in dependencies.keys() {
        if marks.contains_key(start) {
            continue;
        }

        // Explicit stack of (node, remaining dependencies) keeps deep chains off the call stack
        let mut stack = vec![(start, dependencies_of(dependencies, start).iter())];
        marks.insert(start, Mark::InProgress);

        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            match pending.next() {
                Some(dependency) => match marks.get(dependency) {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        let entry = stack
                            .iter()
                            .position(|(id, _)| *id == dependency)
                            .unwrap_or(0);
                        let cycle = stack[entry..].iter().map(|(id, _)| (*id).clone()).collect();
                        return Err(CompileError::CyclicGraph { cycle });
                    }
                    None => {
                        marks.insert(dependency, Mark::InProgress);
                        stack.push((dependency, dependencies_of(dependencies, dependency).iter()));
                    }
                },
                None => {
                    marks.insert(node, Mark::Done);
                    order.push(node.clone());
                    stack.pop();
                }
            }
        }
    }

    Ok(ExecutionPlan { order })
}

fn dependencies_of<'a>(dependencies: &'a DependencyMap, id: &NodeId) -> &'a BTreeSet<NodeId> {
    dependencies.get(id).unwrap_or(&NO_DEPENDENCIES)
}
