//! Class collection pass
//!
//! Scans the graph for class subjects (OWL classes first, then RDFS
//! classes not already seen) and produces one `ClassDescriptor` per
//! distinct class URI. Blank-node subjects are skipped: anonymous classes
//! are never emitted as named types. `rdfs:subClassOf` objects that
//! resolve to another known class become parents; blank-node supers are
//! left for the restriction pass.

use oxrdf::{NamedNode, Subject, Term};
use tracing::debug;

use crate::descriptor::{ClassDescriptor, ClassTable};
use crate::graph::OntologyGraph;
use crate::names;
use crate::vocab::{owl, rdfs};

/// Collect every named class in the graph into a `ClassTable`
pub fn collect_classes(graph: &OntologyGraph) -> ClassTable {
    let mut table = ClassTable::new();

    for subject in graph.subjects_with_type(owl::CLASS) {
        add_class(graph, &mut table, subject);
    }
    // RDFS classes that were not also asserted as OWL classes.
    for subject in graph.subjects_with_type(rdfs::CLASS) {
        add_class(graph, &mut table, subject);
    }

    link_parents(graph, &mut table);

    debug!(classes = table.len(), "collected ontology classes");
    table
}

fn add_class(graph: &OntologyGraph, table: &mut ClassTable, subject: &Subject) {
    let Subject::NamedNode(node) = subject else {
        return;
    };
    if table.contains_uri(node.as_str()) {
        return;
    }
    let Some(name) = names::class_name_for(graph, node) else {
        debug!(uri = node.as_str(), "dropping class with unresolvable name");
        return;
    };

    let mut descriptor = ClassDescriptor::new(name, node.as_str());
    descriptor.label = graph
        .first_literal(subject, rdfs::LABEL)
        .map(|l| strip_tag(l.value()));
    descriptor.description = description_for(graph, subject);
    table.insert(descriptor);
}

/// First `rdfs:comment`, else first `rdfs:label`
fn description_for(graph: &OntologyGraph, subject: &Subject) -> Option<String> {
    graph
        .first_literal(subject, rdfs::COMMENT)
        .or_else(|| graph.first_literal(subject, rdfs::LABEL))
        .map(|l| l.value().to_string())
}

fn strip_tag(value: &str) -> String {
    match value.find('@') {
        Some(idx) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

fn link_parents(graph: &OntologyGraph, table: &mut ClassTable) {
    let uris: Vec<String> = table.uris().to_vec();
    for uri in uris {
        let subject = Subject::NamedNode(NamedNode::new_unchecked(uri.clone()));
        let mut parents = Vec::new();
        for object in graph.objects(&subject, rdfs::SUB_CLASS_OF) {
            if let Term::NamedNode(parent) = object {
                if let Some(parent_class) = table.get(parent.as_str()) {
                    parents.push(parent_class.name.clone());
                }
            }
            // Blank-node supers encode OWL restrictions, handled by the
            // property resolver.
        }
        if let Some(class) = table.get_mut(&uri) {
            class.parents = parents;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_owl_and_rdfs_classes() {
        let ttl = r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

ex:Person a owl:Class ;
    rdfs:label "Person" ;
    rdfs:comment "A human being" .

ex:Agent a rdfs:Class ;
    rdfs:label "Agent" .

ex:Employee a owl:Class ;
    rdfs:label "Employee" ;
    rdfs:subClassOf ex:Person, ex:Agent .
"#;
        let graph = OntologyGraph::parse_turtle(ttl).unwrap();
        let table = collect_classes(&graph);

        assert_eq!(table.len(), 3);
        let employee = table.get("http://example.org/Employee").unwrap();
        let mut parents = employee.parents.clone();
        parents.sort();
        assert_eq!(parents, vec!["Agent", "Person"]);

        let person = table.get("http://example.org/Person").unwrap();
        assert_eq!(person.description.as_deref(), Some("A human being"));
        // No comment: label doubles as description.
        let agent = table.get("http://example.org/Agent").unwrap();
        assert_eq!(agent.description.as_deref(), Some("Agent"));
    }

    #[test]
    fn unnameable_class_is_dropped() {
        let ttl = r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .

<http://example.org/onto#123> a owl:Class .
ex:Keep a owl:Class .
"#;
        let graph = OntologyGraph::parse_turtle(ttl).unwrap();
        let table = collect_classes(&graph);
        assert_eq!(table.len(), 1);
        assert!(table.contains_uri("http://example.org/Keep"));
    }
}
