use crate::graph::NodeId;
use crate::script::literal::PYTHON_KEYWORDS;
use crate::script::prelude::RESERVED_NAMES;
use ahash::{AHashMap, AHashSet};

/// Hands out Python variable names for node handles and call results.
///
/// Names derive from the class type (`CLIPTextEncode` -> `cliptextencode`)
/// and, for results, the node id (`cliptextencode_6`). All names come from a
/// single pool, so a clash between a keyword, a prelude helper or another
/// node is resolved by appending `_2`, `_3`, ... to the later name.
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    used: AHashSet<String>,
    handles: AHashMap<String, String>,
    results: AHashMap<NodeId, String>,
}

impl IdentifierAllocator {
    /// An allocator with Python keywords, prelude names and `extra` reserved.
    pub fn new<'a>(extra: impl IntoIterator<Item = &'a str>) -> Self {
        let used = PYTHON_KEYWORDS
            .iter()
            .chain(RESERVED_NAMES)
            .map(|name| name.to_string())
            .chain(extra.into_iter().map(str::to_string))
            .collect();
        Self {
            used,
            handles: AHashMap::new(),
            results: AHashMap::new(),
        }
    }

    /// The factory handle of `class_type`, allocated on first request.
    /// The flag is `true` when the handle was created by this call.
    pub fn handle_for(&mut self, class_type: &str) -> (String, bool) {
        if let Some(handle) = self.handles.get(class_type) {
            return (handle.clone(), false);
        }
        let handle = self.claim(clean_variable_name(class_type));
        self.handles.insert(class_type.to_string(), handle.clone());
        (handle, true)
    }

    /// The result variable of node `id`, allocated on first request.
    pub fn result_for(&mut self, id: &NodeId, class_type: &str) -> String {
        if let Some(name) = self.results.get(id) {
            return name.clone();
        }
        let candidate = format!(
            "{}_{}",
            clean_variable_name(class_type),
            sanitize_node_id(id.as_str())
        );
        let name = self.claim(candidate);
        self.results.insert(id.clone(), name.clone());
        name
    }

    fn claim(&mut self, candidate: String) -> String {
        let mut name = candidate.clone();
        let mut counter = 2;
        while self.used.contains(&name) {
            name = format!("{}_{}", candidate, counter);
            counter += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

/// Lowercases a class type and strips everything Python cannot take in a name.
pub fn clean_variable_name(class_type: &str) -> String {
    let cleaned: String = class_type
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    match cleaned.chars().next() {
        None => "node".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        Some(_) => cleaned,
    }
}

fn sanitize_node_id(id: &str) -> String {
    id.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}
