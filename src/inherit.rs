//! Inheritance propagation pass
//!
//! Copies every ancestor property down to each class as an independent
//! value copy, preserving required/cardinality, skipping names the class
//! already declares. The ancestor walk carries a visited set keyed by
//! class name, so inheritance cycles terminate. Running the pass twice
//! yields the same property set as running it once.

use std::collections::HashSet;

use tracing::debug;

use crate::descriptor::{ClassTable, PropertyDescriptor};

/// Copy ancestor properties down to every class in the table
pub fn propagate_inheritance(table: &mut ClassTable) {
    let uris: Vec<String> = table.uris().to_vec();
    for uri in uris {
        let additions = {
            let Some(class) = table.get(&uri) else {
                continue;
            };
            let mut visited: HashSet<String> = HashSet::new();
            visited.insert(class.name.clone());
            let mut inherited: Vec<PropertyDescriptor> = Vec::new();
            for parent in &class.parents {
                collect_ancestor_properties(table, parent, &mut visited, &mut inherited);
            }

            let mut additions: Vec<(PropertyDescriptor, Option<String>)> = Vec::new();
            for property in inherited {
                if class.has_property(&property.name) {
                    continue;
                }
                if additions.iter().any(|(p, _)| p.name == property.name) {
                    continue;
                }
                let origin_uri = find_property_uri(table, &class.name, &property.name);
                additions.push((property, origin_uri));
            }
            additions
        };

        if additions.is_empty() {
            continue;
        }
        let Some(class) = table.get_mut(&uri) else {
            continue;
        };
        debug!(
            class = class.name.as_str(),
            inherited = additions.len(),
            "propagated ancestor properties"
        );
        for (property, origin_uri) in additions {
            if let Some(origin_uri) = origin_uri {
                class.property_uris.insert(property.name.clone(), origin_uri);
            }
            class.properties.push(property);
        }
    }
}

/// Depth-first collection of every property on the ancestor chain
fn collect_ancestor_properties(
    table: &ClassTable,
    name: &str,
    visited: &mut HashSet<String>,
    out: &mut Vec<PropertyDescriptor>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    let Some(class) = table.by_name(name) else {
        return;
    };
    for property in &class.properties {
        out.push(property.clone());
    }
    for parent in &class.parents {
        collect_ancestor_properties(table, parent, visited, out);
    }
}

/// Origin URI for an inherited property: the first class in the ancestor
/// search order that records it wins.
fn find_property_uri(table: &ClassTable, class_name: &str, property_name: &str) -> Option<String> {
    let mut visited: HashSet<String> = HashSet::new();
    search_property_uri(table, class_name, property_name, &mut visited)
}

fn search_property_uri(
    table: &ClassTable,
    class_name: &str,
    property_name: &str,
    visited: &mut HashSet<String>,
) -> Option<String> {
    if !visited.insert(class_name.to_string()) {
        return None;
    }
    let class = table.by_name(class_name)?;
    if let Some(uri) = class.property_uris.get(property_name) {
        return Some(uri.clone());
    }
    for parent in &class.parents {
        if let Some(uri) = search_property_uri(table, parent, property_name, visited) {
            return Some(uri);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_classes;
    use crate::graph::OntologyGraph;
    use crate::resolve::resolve_properties;

    fn build(ttl: &str) -> ClassTable {
        let graph = OntologyGraph::parse_turtle(ttl).unwrap();
        let mut table = collect_classes(&graph);
        resolve_properties(&graph, &mut table);
        propagate_inheritance(&mut table);
        table
    }

    const HAS_NAME: &str = r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix sh: <http://www.w3.org/ns/shacl#> .

ex:ClassA a owl:Class .
ex:ClassB a owl:Class ;
    rdfs:subClassOf ex:ClassA .

ex:hasName a owl:DatatypeProperty ;
    rdfs:domain ex:ClassA ;
    rdfs:range xsd:string .

ex:ClassAShape a sh:NodeShape ;
    sh:targetClass ex:ClassA ;
    sh:property [ sh:path ex:hasName ; sh:minCount 1 ] .
"#;

    #[test]
    fn descendant_inherits_required_property() {
        let table = build(HAS_NAME);
        let class_b = table.get("http://example.org/ClassB").unwrap();
        let has_name = class_b.property("hasName").unwrap();
        assert!(has_name.required);
        assert_eq!(
            class_b.property_uris.get("hasName").map(String::as_str),
            Some("http://example.org/hasName")
        );
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut table = build(HAS_NAME);
        let before: Vec<String> = table
            .get("http://example.org/ClassB")
            .unwrap()
            .properties
            .iter()
            .map(|p| p.name.clone())
            .collect();

        propagate_inheritance(&mut table);
        let after: Vec<String> = table
            .get("http://example.org/ClassB")
            .unwrap()
            .properties
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn diamond_inheritance_yields_one_copy() {
        let table = build(
            r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:Top a owl:Class .
ex:Left a owl:Class ; rdfs:subClassOf ex:Top .
ex:Right a owl:Class ; rdfs:subClassOf ex:Top .
ex:Bottom a owl:Class ; rdfs:subClassOf ex:Left, ex:Right .

ex:hasId a owl:DatatypeProperty ;
    rdfs:domain ex:Top ;
    rdfs:range xsd:integer .
"#,
        );

        let bottom = table.get("http://example.org/Bottom").unwrap();
        let copies = bottom
            .properties
            .iter()
            .filter(|p| p.name == "hasId")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn cyclic_inheritance_terminates() {
        let table = build(
            r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:A a owl:Class ; rdfs:subClassOf ex:B .
ex:B a owl:Class ; rdfs:subClassOf ex:A .

ex:hasTag a owl:DatatypeProperty ;
    rdfs:domain ex:A ;
    rdfs:range xsd:string .
"#,
        );

        let b = table.get("http://example.org/B").unwrap();
        assert!(b.has_property("hasTag"));
    }
}
