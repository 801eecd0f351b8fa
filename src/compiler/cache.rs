use super::scheduler::ExecutionPlan;
use crate::catalog::NodeCatalog;
use crate::graph::{NodeId, NodeSpec, WorkflowGraph};
use crate::options::ScriptOptions;
use ahash::AHashMap;
use std::fmt;
use tracing::debug;

/// Where a node's call lands in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Computed once, before the queue loop.
    Cached,
    /// Recomputed on every iteration of the queue loop.
    PerIteration,
}

/// Why a node could not be hoisted out of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Blocker {
    UnknownClass,
    NotCacheable,
    DisplayOnly,
    RandomizedInput(String),
    PerIterationInput { input: String, source: NodeId },
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::UnknownClass => write!(f, "class is not in the catalog"),
            Blocker::NotCacheable => write!(f, "class is not cacheable"),
            Blocker::DisplayOnly => write!(f, "class is display-only"),
            Blocker::RandomizedInput(input) => write!(f, "input '{}' is re-seeded", input),
            Blocker::PerIterationInput { input, source } => {
                write!(f, "input '{}' reads per-iteration node '{}'", input, source)
            }
        }
    }
}

/// Decides, for every node of the plan, whether it can be computed once.
///
/// A node is cached when its class is known and cacheable, none of its
/// inputs is re-drawn per iteration, and every node it links to is cached.
/// Nodes are visited in plan order, so the last rule only ever looks at
/// decisions that are already made.
pub struct CacheAnalyzer<'a> {
    catalog: &'a NodeCatalog,
    options: &'a ScriptOptions,
}

impl<'a> CacheAnalyzer<'a> {
    pub fn new(catalog: &'a NodeCatalog, options: &'a ScriptOptions) -> Self {
        Self { catalog, options }
    }

    pub fn analyze(
        &self,
        graph: &WorkflowGraph,
        plan: &ExecutionPlan,
    ) -> AHashMap<NodeId, Placement> {
        let mut placements = AHashMap::with_capacity(plan.len());

        for id in plan {
            let Some(node) = graph.get(id) else {
                continue;
            };
            let placement = match self.blocker(node, &placements) {
                None => Placement::Cached,
                Some(blocker) => {
                    debug!(node_id = %id, class_type = %node.class_type, reason = %blocker, "node runs per iteration");
                    Placement::PerIteration
                }
            };
            placements.insert(id.clone(), placement);
        }

        placements
    }

    fn blocker(
        &self,
        node: &NodeSpec,
        placements: &AHashMap<NodeId, Placement>,
    ) -> Option<Blocker> {
        let Some(info) = self.catalog.get(&node.class_type) else {
            return Some(Blocker::UnknownClass);
        };
        if info.display_only {
            return Some(Blocker::DisplayOnly);
        }
        if !info.cacheable {
            return Some(Blocker::NotCacheable);
        }

        for (name, value) in &node.inputs {
            if self.options.is_randomized(name, value) {
                return Some(Blocker::RandomizedInput(name.clone()));
            }
            if let Some(link) = value.as_link() {
                // A display-only producer has no placement and is never computed
                if placements.get(&link.source) != Some(&Placement::Cached) {
                    return Some(Blocker::PerIterationInput {
                        input: name.clone(),
                        source: link.source.clone(),
                    });
                }
            }
        }
        None
    }
}
