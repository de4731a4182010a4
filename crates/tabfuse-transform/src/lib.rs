//! Column transformations over [`Table`](tabfuse_model::Table)s.
//!
//! Every transformation implements the [`Transform`] trait and lives in
//! the global [`registry`]. Callers drive it with [`TransformSpec`]
//! values, either one at a time through [`apply_one`] (failures
//! propagate) or as an ordered pipeline through [`apply_all`] (failing
//! steps are skipped with a warning diagnostic).

pub mod data_utils;
pub mod datetime;
pub mod error;
pub mod expr;
pub mod ops;
pub mod param;
pub mod pipeline;
pub mod registry;

pub use error::{Result, TransformError};
pub use param::{ParamKind, ParamSpec, Params};
pub use pipeline::{TransformOutcome, apply_all, apply_one};
pub use registry::{Transform, TransformRegistry, registry};

#[doc(no_inline)]
pub use tabfuse_model::TransformSpec;
