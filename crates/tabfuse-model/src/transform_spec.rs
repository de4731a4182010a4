//! Serializable description of one transformation step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One transformation step: registry name plus raw parameters.
///
/// Specs round-trip through JSON so a pipeline can be saved and replayed.
/// Parameters stay untyped here; the transformation validates them against
/// its own schema before running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Registry name, e.g. `numeric_scaling`.
    pub name: String,
    /// Raw parameter map, validated at application time.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl TransformSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}
