//! Table merging: append, key joins, and key autodetection.
//!
//! The entry point is [`merge`]. Tables are cleaned per the options,
//! then combined by the selected strategy. Everything noteworthy that
//! happened along the way comes back as diagnostics on the outcome;
//! anything that makes the result wrong aborts with a [`MergeError`]
//! and no partial output.

pub mod append;
pub mod clean;
pub mod engine;
pub mod error;
pub mod join;
pub mod smart;

pub use clean::{DuplicateReport, drop_duplicate_rows};
pub use engine::{MergeOutcome, merge};
pub use error::{KeyProblem, MergeError, Result};
