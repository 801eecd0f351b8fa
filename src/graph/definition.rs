use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A graph-local node identifier, the key of a node in the exported workflow.
///
/// Ids that parse as unsigned integers order numerically and sort before every
/// non-numeric id; the rest order lexicographically. This keeps `"2"` ahead of
/// `"10"` the way the editor numbers its nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u128> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            // "01" and "1" compare equal numerically, fall back to the text
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A constant input value, as it appeared in the exported graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`, seeds mostly.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Literal>),
    Map(Vec<(String, Literal)>),
}

/// A back-reference from a consuming input to one output slot of a producing node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkRef {
    pub source: NodeId,
    pub output_index: u32,
}

/// The value bound to one named input of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Literal(Literal),
    Link(LinkRef),
}

impl InputValue {
    pub fn as_link(&self) -> Option<&LinkRef> {
        match self {
            InputValue::Link(link) => Some(link),
            InputValue::Literal(_) => None,
        }
    }
}

/// Display-only information carried along with a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMeta {
    pub title: Option<String>,
}

/// One node of the workflow: which class to run and what to feed it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub class_type: String,
    /// Inputs in the order the editor exported them.
    pub inputs: Vec<(String, InputValue)>,
    pub meta: Option<NodeMeta>,
}

impl NodeSpec {
    pub fn new(class_type: impl Into<String>) -> Self {
        Self {
            class_type: class_type.into(),
            inputs: Vec::new(),
            meta: None,
        }
    }

    /// Builder-style helper to attach a literal input.
    pub fn with_literal(mut self, name: impl Into<String>, value: Literal) -> Self {
        self.inputs.push((name.into(), InputValue::Literal(value)));
        self
    }

    /// Builder-style helper to attach a link to another node's output.
    pub fn with_link(
        mut self,
        name: impl Into<String>,
        source: impl Into<NodeId>,
        output_index: u32,
    ) -> Self {
        self.inputs.push((
            name.into(),
            InputValue::Link(LinkRef {
                source: source.into(),
                output_index,
            }),
        ));
        self
    }

    pub fn input(&self, name: &str) -> Option<&InputValue> {
        self.inputs
            .iter()
            .find(|(input_name, _)| input_name == name)
            .map(|(_, value)| value)
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &LinkRef)> {
        self.inputs
            .iter()
            .filter_map(|(name, value)| value.as_link().map(|link| (name.as_str(), link)))
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.title.as_deref())
    }
}

/// The complete, immutable workflow ready for compilation.
///
/// Nodes are stored in ascending [`NodeId`] order, so every traversal over the
/// graph is reproducible regardless of how the source was laid out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowGraph {
    nodes: BTreeMap<NodeId, NodeSpec>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing any previous node with the same id.
    pub fn insert(&mut self, id: impl Into<NodeId>, node: NodeSpec) -> Option<NodeSpec> {
        self.nodes.insert(id.into(), node)
    }

    pub fn with_node(mut self, id: impl Into<NodeId>, node: NodeSpec) -> Self {
        self.insert(id, node);
        self
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeSpec> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &NodeSpec)> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<(NodeId, NodeSpec)> for WorkflowGraph {
    fn from_iter<T: IntoIterator<Item = (NodeId, NodeSpec)>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
