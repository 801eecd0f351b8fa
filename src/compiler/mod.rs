use crate::catalog::{ClassOrigin, NodeCatalog, NodeClassInfo};
use crate::error::{CompileError, Diagnostic};
use crate::graph::{NodeId, WorkflowGraph};
use crate::options::ScriptOptions;
use crate::script::{FactoryStatement, SetupStatement, is_python_identifier};
use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::iter;
use tracing::{debug, info, warn};

pub mod assembler;
pub mod cache;
pub mod emitter;
pub mod naming;
pub mod resolver;
pub mod scheduler;

use assembler::{ScriptParts, assemble};
use cache::CacheAnalyzer;
use emitter::NodeEmitter;
use naming::IdentifierAllocator;

pub use cache::Placement;
pub use resolver::{DependencyMap, resolve_dependencies};
pub use scheduler::{ExecutionPlan, schedule};

/// Queue iterations used when the builder is not told otherwise.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// The Python variables generated for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    /// The factory object of the node's class.
    pub handle: String,
    /// The variable holding the node's return value.
    pub result: String,
    pub placement: Placement,
}

/// The output of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    /// The complete Python module.
    pub source: String,
    /// Non-fatal findings, in plan order.
    pub diagnostics: Vec<Diagnostic>,
    pub plan: ExecutionPlan,
    /// One entry per emitted node. Display-only nodes have none.
    pub bindings: BTreeMap<NodeId, VariableBinding>,
}

impl CompiledScript {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Compiles one workflow graph into a Python script.
///
/// A compiler is configured through [`CompilerBuilder`] and consumed by
/// [`Compiler::compile`].
pub struct Compiler {
    graph: WorkflowGraph,
    catalog: NodeCatalog,
    options: ScriptOptions,
    iterations: u32,
}

pub struct CompilerBuilder {
    graph: WorkflowGraph,
    catalog: NodeCatalog,
    options: ScriptOptions,
    iterations: u32,
}

impl CompilerBuilder {
    pub fn new(graph: WorkflowGraph) -> Self {
        Self {
            graph,
            catalog: NodeCatalog::builtin(),
            options: ScriptOptions::default(),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Number of times the queue loop runs.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Replaces the catalog. Use [`NodeCatalog::merge`] to extend the built-ins instead.
    pub fn with_catalog(mut self, catalog: NodeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_class_info(mut self, class_type: &str, info: NodeClassInfo) -> Self {
        self.catalog.insert(class_type, info);
        self
    }

    /// Treats `alias` as another name for the catalogued class `known_class`.
    pub fn with_type_mapping(mut self, alias: &str, known_class: &str) -> Self {
        if !self.catalog.alias(alias, known_class) {
            warn!(alias, known_class, "type mapping ignored: target class is not in the catalog");
        }
        self
    }

    pub fn options(mut self, options: ScriptOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            graph: self.graph,
            catalog: self.catalog,
            options: self.options,
            iterations: self.iterations,
        }
    }
}

impl Compiler {
    pub fn builder(graph: WorkflowGraph) -> CompilerBuilder {
        CompilerBuilder::new(graph)
    }

    /// A compiler with the built-in catalog and default options.
    pub fn from_json(graph_json: &str) -> Result<Self, CompileError> {
        Ok(Self::builder(WorkflowGraph::from_json(graph_json)?).build())
    }

    pub fn compile(self) -> Result<CompiledScript, CompileError> {
        let dependencies = resolve_dependencies(&self.graph)?;
        let plan = schedule(&dependencies)?;
        debug!(nodes = plan.len(), "execution plan ready");
        if self.options.loop_counter() != self.options.loop_variable {
            warn!(
                loop_variable = %self.options.loop_variable,
                "loop variable is not a Python identifier, using `q`"
            );
        }

        let placements = CacheAnalyzer::new(&self.catalog, &self.options).analyze(&self.graph, &plan);

        let builtin_imports = self.builtin_imports(&plan);
        let mut names = IdentifierAllocator::new(
            builtin_imports
                .iter()
                .map(String::as_str)
                .chain(iter::once(self.options.loop_counter())),
        );
        let emitter = NodeEmitter::new(&self.graph, &self.catalog, &self.options);

        let mut parts = ScriptParts {
            builtin_imports,
            iterations: self.iterations,
            ..ScriptParts::default()
        };
        let mut results: AHashMap<NodeId, String> = AHashMap::with_capacity(plan.len());
        let mut bindings = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for id in &plan {
            let Some(node) = self.graph.get(id) else {
                continue;
            };
            let info = self.catalog.get(&node.class_type);
            if info.is_some_and(|info| info.display_only) {
                debug!(node_id = %id, class_type = %node.class_type, "display-only node omitted");
                continue;
            }

            let (handle, is_new) = names.handle_for(&node.class_type);
            if is_new {
                let factory = FactoryStatement {
                    handle: handle.clone(),
                    class_type: node.class_type.clone(),
                    origin: info.map_or(ClassOrigin::Custom, |info| info.origin),
                };
                parts.needs_class_mappings |= !factory.is_importable();
                parts.has_custom_nodes |= factory.origin == ClassOrigin::Custom;
                parts.setup.push(SetupStatement::Factory(factory));
            }

            let result = names.result_for(id, &node.class_type);
            let (statement, found) = emitter.emit(id, node, &handle, result.clone(), &results);
            for diagnostic in &found {
                warn!(node_id = %id, "{}", diagnostic);
            }
            diagnostics.extend(found);
            parts.is_async |= statement.is_async;

            let placement = placements
                .get(id)
                .copied()
                .unwrap_or(Placement::PerIteration);
            match placement {
                Placement::Cached => parts.setup.push(SetupStatement::Call(statement)),
                Placement::PerIteration => parts.per_iteration.push(statement),
            }

            results.insert(id.clone(), result.clone());
            bindings.insert(
                id.clone(),
                VariableBinding {
                    handle,
                    result,
                    placement,
                },
            );
        }

        let source = assemble(&parts, &self.options);
        info!(
            nodes = bindings.len(),
            per_iteration = parts.per_iteration.len(),
            diagnostics = diagnostics.len(),
            iterations = self.iterations,
            "workflow compiled"
        );

        Ok(CompiledScript {
            source,
            diagnostics,
            plan,
            bindings,
        })
    }

    /// Built-in classes of the emitted nodes that can be imported by name.
    fn builtin_imports(&self, plan: &ExecutionPlan) -> BTreeSet<String> {
        plan.iter()
            .filter_map(|id| self.graph.get(id))
            .filter(|node| {
                self.catalog.get(&node.class_type).is_some_and(|info| {
                    !info.display_only && info.origin == ClassOrigin::Builtin
                })
            })
            .filter(|node| is_python_identifier(&node.class_type))
            .map(|node| node.class_type.clone())
            .collect()
    }
}
