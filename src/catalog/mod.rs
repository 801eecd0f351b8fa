//! The node catalog: what the compiler knows about each `class_type`.
//!
//! The compiler never inspects the node library itself. Whoever drives it
//! (the editor extension, the CLI, a test) supplies a [`NodeCatalog`] that
//! answers three questions per class: which operation to call, whether the
//! call is asynchronous, and whether its result may be computed once and
//! reused across queue iterations.

use crate::error::CatalogError;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

mod builtin;

pub use builtin::builtin_class_names;

/// How a node returns its outputs, which decides how links index into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// A tuple of outputs, indexed directly.
    Sequence,
    /// A dict carrying the outputs under `"result"`.
    Mapping,
    /// Not declared; resolved at runtime by the `get_value_at_index` helper.
    #[default]
    Unknown,
}

/// Where a node class comes from in the node library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassOrigin {
    /// Importable by name from the library's `nodes` module.
    Builtin,
    /// Registered by an extension, only reachable through `NODE_CLASS_MAPPINGS`.
    #[default]
    Custom,
}

/// Facts about one node class, as reported by the node library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeClassInfo {
    /// Name of the method that executes the node.
    pub function: String,
    #[serde(default)]
    pub is_async: bool,
    /// Safe to compute once and reuse across iterations.
    #[serde(default)]
    pub cacheable: bool,
    #[serde(default)]
    pub return_shape: ReturnShape,
    #[serde(default)]
    pub origin: ClassOrigin,
    /// Only meaningful inside the editor (previews); left out of the script.
    #[serde(default)]
    pub display_only: bool,
    #[serde(default)]
    pub required: Vec<String>,
    /// Editor widgets exported as inputs that the operation does not accept.
    #[serde(default)]
    pub widget_inputs: Vec<String>,
    /// Hidden inputs the operation accepts, e.g. `unique_id`.
    #[serde(default)]
    pub hidden: Vec<String>,
}

impl NodeClassInfo {
    /// A synchronous, non-cacheable custom class calling `function`.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            is_async: false,
            cacheable: false,
            return_shape: ReturnShape::Unknown,
            origin: ClassOrigin::Custom,
            display_only: false,
            required: Vec::new(),
            widget_inputs: Vec::new(),
            hidden: Vec::new(),
        }
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn origin(mut self, origin: ClassOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn return_shape(mut self, shape: ReturnShape) -> Self {
        self.return_shape = shape;
        self
    }

    pub fn required<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_widget_input(&self, name: &str) -> bool {
        self.widget_inputs.iter().any(|w| w == name)
    }
}

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CatalogSnapshot {
    version: u32,
    entries: Vec<(String, NodeClassInfo)>,
}

/// Lookup table from `class_type` to [`NodeClassInfo`].
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    entries: AHashMap<String, NodeClassInfo>,
}

impl NodeCatalog {
    /// An empty catalog. Every class will be reported as unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of the library's common built-in nodes.
    pub fn builtin() -> Self {
        let mut entries = AHashMap::new();
        builtin::register_builtin_classes(&mut entries);
        Self { entries }
    }

    /// Loads a table exported by the node library's introspection.
    ///
    /// The document is an object keyed by class name; only `function` is
    /// mandatory in each entry.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: AHashMap<String, NodeClassInfo> =
            serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Serializes the catalog with a stable entry order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CatalogError> {
        let snapshot = CatalogSnapshot {
            version: SNAPSHOT_VERSION,
            entries: self
                .entries
                .iter()
                .sorted_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(name, info)| (name.clone(), info.clone()))
                .collect(),
        };
        encode_to_vec(&snapshot, standard())
            .map_err(|e| CatalogError::Snapshot(format!("Serialization failed: {}", e)))
    }

    /// Restores a catalog written by [`NodeCatalog::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        let (snapshot, _): (CatalogSnapshot, usize) = decode_from_slice(bytes, standard())
            .map_err(|e| CatalogError::Snapshot(format!("Deserialization failed: {}", e)))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CatalogError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        Ok(Self {
            entries: snapshot.entries.into_iter().collect(),
        })
    }

    /// Layers `other` on top of this catalog; its entries win.
    pub fn merge(mut self, other: NodeCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn insert(&mut self, class_type: impl Into<String>, info: NodeClassInfo) {
        self.entries.insert(class_type.into(), info);
    }

    /// Makes `alias` resolve to the same facts as `class_type`.
    /// Returns `false` when `class_type` is not in the catalog.
    ///
    /// The alias is never importable from `nodes`, so it is always looked up
    /// through `NODE_CLASS_MAPPINGS`.
    pub fn alias(&mut self, alias: &str, class_type: &str) -> bool {
        match self.entries.get(class_type).cloned() {
            Some(mut info) => {
                info.origin = ClassOrigin::Custom;
                self.entries.insert(alias.to_string(), info);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, class_type: &str) -> Option<&NodeClassInfo> {
        self.entries.get(class_type)
    }

    pub fn contains(&self, class_type: &str) -> bool {
        self.entries.contains_key(class_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
