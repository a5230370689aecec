//! Error types for the ontology compiler
//!
//! Only an unreadable input graph is fatal. Everything else degrades
//! locally: unresolvable identifiers drop the affected class or property,
//! ambiguous cardinalities resolve through the prefer-concrete merge rule,
//! and inheritance cycles are short-circuited and logged.

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Ontology compiler errors
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to parse ontology graph: {0}")]
    GraphParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
