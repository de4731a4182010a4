//! CLI library components for tabfuse.

pub mod logging;
