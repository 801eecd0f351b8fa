use crate::catalog::NodeCatalog;
use crate::compiler::{CompiledScript, Compiler};
use crate::graph::WorkflowGraph;
use crate::options::ScriptOptions;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

fn compile_script(
    workflow_json: &str,
    queue_size: u32,
    catalog_json: Option<&str>,
    options_json: Option<&str>,
) -> PyResult<CompiledScript> {
    let graph = WorkflowGraph::from_json(workflow_json).map_err(value_error)?;

    let mut catalog = NodeCatalog::builtin();
    if let Some(json) = catalog_json {
        catalog = catalog.merge(NodeCatalog::from_json(json).map_err(value_error)?);
    }

    let options: ScriptOptions = match options_json {
        Some(json) => serde_json::from_str(json).map_err(value_error)?,
        None => ScriptOptions::default(),
    };

    Compiler::builder(graph)
        .iterations(queue_size)
        .with_catalog(catalog)
        .options(options)
        .build()
        .compile()
        .map_err(value_error)
}

/// Compiles an API-format workflow into a standalone Python script.
///
/// Args:
///     workflow_json (str): The workflow as exported in API format.
///     queue_size (int): How many times the generated script runs the
///         workflow. Defaults to 10.
///     catalog_json (str | None): Node class facts layered over the
///         built-in catalog, keyed by class name.
///     options_json (str | None): Script options; omitted fields keep
///         their defaults.
///
/// Returns:
///     str: The generated Python source.
///
/// Raises:
///     ValueError: If the workflow is malformed, links to a missing node,
///         or contains a cycle.
#[pyfunction]
#[pyo3(signature = (workflow_json, queue_size = 10, catalog_json = None, options_json = None))]
fn compile(
    workflow_json: &str,
    queue_size: u32,
    catalog_json: Option<&str>,
    options_json: Option<&str>,
) -> PyResult<String> {
    compile_script(workflow_json, queue_size, catalog_json, options_json).map(|s| s.source)
}

/// Like `compile`, but also returns the warnings found along the way.
///
/// Returns:
///     tuple[str, list[str]]: The generated source and one message per
///         unknown class or unbound required input.
#[pyfunction]
#[pyo3(signature = (workflow_json, queue_size = 10, catalog_json = None, options_json = None))]
fn compile_with_diagnostics(
    workflow_json: &str,
    queue_size: u32,
    catalog_json: Option<&str>,
    options_json: Option<&str>,
) -> PyResult<(String, Vec<String>)> {
    let script = compile_script(workflow_json, queue_size, catalog_json, options_json)?;
    let messages = script.diagnostics.iter().map(ToString::to_string).collect();
    Ok((script.source, messages))
}

/// Compiles node-editor workflow graphs into standalone Python scripts.
#[pymodule]
fn utsushi(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compile, m)?)?;
    m.add_function(wrap_pyfunction!(compile_with_diagnostics, m)?)?;
    Ok(())
}
