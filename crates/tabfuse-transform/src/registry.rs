//! Transformation trait and registry.
//!
//! Each built-in transformation implements [`Transform`] and is registered
//! in the [`TransformRegistry`], which provides lookup by name. The set is
//! fixed at compile time; [`registry()`] returns the cached default with
//! every built-in registered.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use tabfuse_model::Table;

use crate::error::Result;
use crate::ops;
use crate::param::{ParamSpec, Params};

/// A named column transformation with a declared parameter schema.
///
/// Implementors describe their parameters via [`Transform::parameters`];
/// validation and typed access run through [`Params::validate`] before
/// [`Transform::apply`] is called, so `apply` can assume every declared
/// parameter is present (or defaulted) and well typed.
pub trait Transform: Send + Sync {
    /// Registry name, e.g. `date_format`.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    /// Parameter schema, in display order.
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Required-parameter check against a raw spec.
    ///
    /// Returns one message per required parameter that is absent or blank
    /// and has no default. Full type checking happens in
    /// [`Params::validate`]; this exists so callers can surface all missing
    /// parameters at once instead of failing on the first.
    fn validate(&self, raw: &serde_json::Map<String, Value>) -> BTreeMap<&'static str, String> {
        let mut errors = BTreeMap::new();
        for spec in self.parameters() {
            if !spec.required || spec.default.is_some() {
                continue;
            }
            let missing = match raw.get(spec.name) {
                None | Some(Value::Null) => true,
                Some(Value::String(text)) => text.trim().is_empty(),
                Some(_) => false,
            };
            if missing {
                errors.insert(spec.name, format!("Parameter '{}' is required", spec.label));
            }
        }
        errors
    }

    /// Apply the transformation, producing a new table.
    fn apply(&self, table: &Table, params: &Params) -> Result<Table>;
}

/// Registry of transformations indexed by name.
pub struct TransformRegistry {
    order: Vec<&'static str>,
    transforms: HashMap<&'static str, Box<dyn Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            transforms: HashMap::new(),
        }
    }

    /// Registers a transformation under its name, replacing any previous
    /// entry with the same name.
    pub fn register(&mut self, transform: Box<dyn Transform>) {
        let name = transform.name();
        if self.transforms.insert(name, transform).is_none() {
            self.order.push(name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Transform> {
        self.transforms.get(name).map(Box::as_ref)
    }

    /// All registered transformations in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Transform> {
        self.order
            .iter()
            .filter_map(|name| self.transforms.get(name).map(Box::as_ref))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        for transform in ops::builtin() {
            registry.register(transform);
        }
        registry
    }
}

/// Cached registry holding every built-in transformation.
static REGISTRY: OnceLock<TransformRegistry> = OnceLock::new();

/// Returns the shared registry with all built-in transformations.
pub fn registry() -> &'static TransformRegistry {
    REGISTRY.get_or_init(TransformRegistry::default)
}

/// Validated-parameter shortcut used by the pipeline and by tests.
pub(crate) fn validated(
    transform: &dyn Transform,
    raw: &serde_json::Map<String, Value>,
    table: &Table,
) -> Result<Params> {
    Params::validate(&transform.parameters(), raw, table)
}
