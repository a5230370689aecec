//! Ontogen
//!
//! An ontology-to-typed-class compiler: reads a graph of OWL/RDFS classes
//! and properties (optionally constrained by SHACL shapes) and emits one
//! Python/Pydantic class per ontology class, with correctly-shaped fields,
//! multi-parent inheritance, and enough metadata to serialize instances
//! back into triples.
//!
//! ## Features
//!
//! - **Restriction resolution**: OWL restrictions, `unionOf` /
//!   `intersectionOf` collections, cardinality merging
//! - **SHACL tightening**: node shapes mark properties required and bound
//! - **Cycle tolerance**: inheritance cycles are short-circuited and
//!   logged, never fatal
//! - **Round-trip metadata**: emitted classes carry their origin URIs and
//!   an `rdf()` serialization method
//!
//! ## Pipeline
//!
//! ```text
//! Turtle ──> OntologyGraph ──> collect ──> resolve ──> inherit
//!                                                         │
//!            Python module <── emit <── order <── metadata
//! ```

pub mod collect;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod graph;
pub mod inherit;
pub mod metadata;
pub mod names;
pub mod order;
pub mod resolve;
pub mod vocab;

pub use config::EmitConfig;
pub use descriptor::{ClassDescriptor, ClassTable, Datatype, PropertyDescriptor, PropertyKind};
pub use error::{CompileError, Result};
pub use graph::OntologyGraph;

use tracing::warn;

/// Run passes 2-6 and return the resolved class table
pub fn build_descriptors(graph: &OntologyGraph) -> ClassTable {
    let mut table = collect::collect_classes(graph);
    resolve::resolve_properties(graph, &mut table);
    inherit::propagate_inheritance(&mut table);
    metadata::inject_metadata(&mut table);
    table
}

/// Compile an already-loaded graph into a Python module.
///
/// Infallible: malformed ontology fragments degrade locally (dropped
/// elements, merged cardinalities, short-circuited cycles) and the result
/// is a best-effort module.
pub fn compile(graph: &OntologyGraph, config: &EmitConfig) -> String {
    let table = build_descriptors(graph);
    for cycle in order::inheritance_cycles(&table) {
        warn!(classes = %cycle.join(", "), "inheritance cycle detected");
    }
    let order = order::topological_order(&table);
    emit::emit_module(&table, &order, config)
}

/// Parse a Turtle document and compile it.
///
/// Only an unparsable document fails; see [`compile`] for everything else.
pub fn compile_turtle(ttl: &str, config: &EmitConfig) -> Result<String> {
    let graph = OntologyGraph::parse_turtle(ttl)?;
    Ok(compile(&graph, config))
}
