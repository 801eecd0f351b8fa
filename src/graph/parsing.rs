use super::definition::{InputValue, LinkRef, Literal, NodeId, NodeMeta, NodeSpec, WorkflowGraph};
use crate::error::CompileError;
use serde_json::{Map, Value};

impl WorkflowGraph {
    /// Parses an API-format workflow export.
    ///
    /// The document must be a JSON object mapping node ids to objects with a
    /// `class_type` string and an `inputs` object. An input is a link when it is
    /// a two-element array `[source_node_id, output_index]` with a string id and
    /// a non-negative integer index; everything else is a literal.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| CompileError::document(format!("invalid JSON: {}", e)))?;
        Self::from_value(&document)
    }

    /// Same as [`WorkflowGraph::from_json`], for an already decoded document.
    pub fn from_value(document: &Value) -> Result<Self, CompileError> {
        let entries = document.as_object().ok_or_else(|| {
            CompileError::document(format!(
                "expected an object of nodes, found {}",
                kind_of(document)
            ))
        })?;

        let mut graph = WorkflowGraph::new();
        for (id, entry) in entries {
            let node = parse_node(id, entry)?;
            graph.insert(NodeId::new(id.as_str()), node);
        }
        Ok(graph)
    }
}

fn parse_node(id: &str, entry: &Value) -> Result<NodeSpec, CompileError> {
    let fields = entry.as_object().ok_or_else(|| {
        parse_error(
            id,
            "<node>",
            format!("expected an object, found {}", kind_of(entry)),
        )
    })?;

    let class_type = match fields.get("class_type") {
        Some(Value::String(class_type)) if !class_type.trim().is_empty() => class_type.clone(),
        Some(Value::String(_)) => return Err(parse_error(id, "class_type", "must not be empty")),
        Some(other) => {
            return Err(parse_error(
                id,
                "class_type",
                format!("expected a string, found {}", kind_of(other)),
            ));
        }
        None => return Err(parse_error(id, "class_type", "missing")),
    };

    let inputs = match fields.get("inputs") {
        Some(Value::Object(inputs)) => parse_inputs(inputs),
        // The editor omits `inputs` for nodes without any
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(parse_error(
                id,
                "inputs",
                format!("expected an object, found {}", kind_of(other)),
            ));
        }
    };

    let meta = fields
        .get("_meta")
        .and_then(Value::as_object)
        .map(|meta| NodeMeta {
            title: meta.get("title").and_then(Value::as_str).map(str::to_string),
        });

    Ok(NodeSpec {
        class_type,
        inputs,
        meta,
    })
}

fn parse_inputs(inputs: &Map<String, Value>) -> Vec<(String, InputValue)> {
    inputs
        .iter()
        .map(|(name, value)| {
            let input = match as_link(value) {
                Some(link) => InputValue::Link(link),
                None => InputValue::Literal(to_literal(value)),
            };
            (name.clone(), input)
        })
        .collect()
}

fn as_link(value: &Value) -> Option<LinkRef> {
    match value.as_array()?.as_slice() {
        [Value::String(source), Value::Number(index)] => {
            let output_index = u32::try_from(index.as_u64()?).ok()?;
            Some(LinkRef {
                source: NodeId::new(source.as_str()),
                output_index,
            })
        }
        _ => None,
    }
}

fn to_literal(value: &Value) -> Literal {
    match value {
        Value::Null => Literal::Null,
        Value::Bool(b) => Literal::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Literal::Int(i)
            } else if let Some(u) = n.as_u64() {
                Literal::UInt(u)
            } else {
                Literal::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Literal::String(s.clone()),
        Value::Array(items) => Literal::List(items.iter().map(to_literal).collect()),
        Value::Object(fields) => Literal::Map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_literal(v)))
                .collect(),
        ),
    }
}

fn parse_error(node_id: &str, field: &str, message: impl Into<String>) -> CompileError {
    CompileError::Parse {
        node_id: node_id.to_string(),
        field: field.to_string(),
        message: message.into(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
