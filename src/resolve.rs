//! Property resolution pass
//!
//! Three sources feed each class's property list, in order:
//!
//! 1. named `owl:ObjectProperty` / `owl:DatatypeProperty` declarations,
//!    attached to every `rdfs:domain` class;
//! 2. SHACL node shapes, which tighten required/cardinality on the named
//!    property prototypes before domain association so that every domain
//!    copy carries the constraint;
//! 3. OWL restrictions reached through blank-node `rdfs:subClassOf`
//!    edges, which contribute object properties with per-range
//!    cardinalities.
//!
//! Duplicate declarations of one property name on one class merge
//! conservatively: `required` is the conjunction, concrete cardinalities
//! win over unspecified ones, the first non-empty description sticks.
//! Restriction-derived properties only ever merge their range map; they
//! never imply requiredness.

use std::collections::{BTreeMap, HashMap, HashSet};

use oxrdf::{NamedNode, Subject, Term};
use tracing::debug;

use crate::descriptor::{Cardinality, ClassTable, Datatype, PropertyDescriptor, PropertyKind};
use crate::graph::OntologyGraph;
use crate::names;
use crate::vocab::{owl, rdf, rdfs, sh, skos};

/// A named property declaration before domain association
struct Prototype {
    uri: String,
    descriptor: PropertyDescriptor,
}

/// Resolve all property sources into the class table
pub fn resolve_properties(graph: &OntologyGraph, table: &mut ClassTable) {
    let mut prototypes = collect_prototypes(graph, table);
    apply_shacl(graph, table, &mut prototypes);
    associate_domains(graph, table, &prototypes);
    apply_restrictions(graph, table);
}

fn collect_prototypes(graph: &OntologyGraph, table: &ClassTable) -> Vec<Prototype> {
    let mut prototypes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for subject in graph.subjects_with_type(owl::OBJECT_PROPERTY) {
        let Subject::NamedNode(node) = subject else {
            continue;
        };
        if seen.contains(node.as_str()) {
            continue;
        }
        let Some(name) = names::property_name_for(graph, node) else {
            debug!(uri = node.as_str(), "dropping property with unresolvable name");
            continue;
        };

        let mut ranges: BTreeMap<String, Cardinality> = BTreeMap::new();
        for object in graph.objects(subject, rdfs::RANGE) {
            if let Term::NamedNode(range) = object {
                if let Some(class) = table.get(range.as_str()) {
                    ranges.entry(class.name.clone()).or_insert(None);
                }
            }
        }
        let mut descriptor = PropertyDescriptor::object(name, ranges);
        descriptor.description = property_description(graph, subject);
        seen.insert(node.as_str().to_string());
        prototypes.push(Prototype {
            uri: node.as_str().to_string(),
            descriptor,
        });
    }

    for subject in graph.subjects_with_type(owl::DATATYPE_PROPERTY) {
        let Subject::NamedNode(node) = subject else {
            continue;
        };
        if seen.contains(node.as_str()) {
            continue;
        }
        let Some(name) = names::property_name_for(graph, node) else {
            debug!(uri = node.as_str(), "dropping property with unresolvable name");
            continue;
        };

        let datatype = graph
            .objects(subject, rdfs::RANGE)
            .into_iter()
            .find_map(|object| match object {
                Term::NamedNode(range) => Datatype::from_xsd(range.as_ref()),
                _ => None,
            })
            .unwrap_or(Datatype::Any);
        let mut descriptor = PropertyDescriptor::data(name, datatype);
        descriptor.description = property_description(graph, subject);
        seen.insert(node.as_str().to_string());
        prototypes.push(Prototype {
            uri: node.as_str().to_string(),
            descriptor,
        });
    }

    debug!(properties = prototypes.len(), "collected named properties");
    prototypes
}

/// First `skos:definition` literal, language tag stripped
fn property_description(graph: &OntologyGraph, subject: &Subject) -> Option<String> {
    graph.first_literal(subject, skos::DEFINITION).map(|l| {
        let value = l.value();
        match value.find('@') {
            Some(idx) => value[..idx].to_string(),
            None => value.to_string(),
        }
    })
}

/// Tighten prototypes with `sh:NodeShape` constraints.
///
/// Shapes whose target class is unknown are ignored; so are paths that do
/// not match a named property. Shapes never invent properties.
fn apply_shacl(graph: &OntologyGraph, table: &ClassTable, prototypes: &mut [Prototype]) {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, proto) in prototypes.iter().enumerate() {
        index.entry(proto.uri.clone()).or_insert(i);
    }

    for shape in graph.subjects_with_type(sh::NODE_SHAPE) {
        let targets_known_class = graph
            .objects(shape, sh::TARGET_CLASS)
            .into_iter()
            .any(|t| matches!(t, Term::NamedNode(n) if table.contains_uri(n.as_str())));
        if !targets_known_class {
            continue;
        }

        for shape_term in graph.objects(shape, sh::PROPERTY) {
            let Some(property_shape) = subject_of(shape_term) else {
                continue;
            };
            for path in graph.objects(&property_shape, sh::PATH) {
                let Term::NamedNode(path) = path else {
                    continue;
                };
                let Some(&i) = index.get(path.as_str()) else {
                    continue;
                };
                let descriptor = &mut prototypes[i].descriptor;

                if let Some(min) = graph
                    .first_literal(&property_shape, sh::MIN_COUNT)
                    .and_then(|l| l.value().parse::<u32>().ok())
                {
                    if min > 0 {
                        descriptor.required = true;
                    }
                }
                if let Some(max) = graph
                    .first_literal(&property_shape, sh::MAX_COUNT)
                    .and_then(|l| l.value().parse::<u32>().ok())
                {
                    descriptor.cardinality = Some(max);
                    if let PropertyKind::Object { ranges } = &mut descriptor.kind {
                        for cardinality in ranges.values_mut() {
                            *cardinality = Some(max);
                        }
                    }
                }
            }
        }
    }
}

/// Attach each prototype to every `rdfs:domain` class, merging duplicates
fn associate_domains(graph: &OntologyGraph, table: &mut ClassTable, prototypes: &[Prototype]) {
    for proto in prototypes {
        let subject = Subject::NamedNode(NamedNode::new_unchecked(proto.uri.clone()));
        for domain in graph.objects(&subject, rdfs::DOMAIN) {
            let Term::NamedNode(domain) = domain else {
                continue;
            };
            let Some(class) = table.get_mut(domain.as_str()) else {
                continue;
            };
            match class.property_mut(&proto.descriptor.name) {
                Some(existing) => merge_declarations(existing, &proto.descriptor),
                None => {
                    class.properties.push(proto.descriptor.clone());
                    class
                        .property_uris
                        .insert(proto.descriptor.name.clone(), proto.uri.clone());
                }
            }
        }
    }
}

/// Conservative merge of two declarations of the same property name.
///
/// Either declaration being optional makes the result optional. This
/// mirrors the source generator's behavior and is kept as an explicit
/// contract rather than silently tightened.
fn merge_declarations(existing: &mut PropertyDescriptor, incoming: &PropertyDescriptor) {
    existing.required = existing.required && incoming.required;
    if existing.cardinality.is_none() {
        existing.cardinality = incoming.cardinality;
    }
    if existing.description.is_none() {
        existing.description = incoming.description.clone();
    }
    if let (PropertyKind::Object { ranges }, PropertyKind::Object { ranges: incoming_ranges }) =
        (&mut existing.kind, &incoming.kind)
    {
        for (name, cardinality) in incoming_ranges {
            merge_range_entry(ranges, name.clone(), *cardinality);
        }
    }
}

/// Union a range entry into a map, preferring concrete cardinalities
fn merge_range_entry(ranges: &mut BTreeMap<String, Cardinality>, name: String, cardinality: Cardinality) {
    let entry = ranges.entry(name).or_insert(None);
    if entry.is_none() {
        *entry = cardinality;
    }
}

/// Walk every class's blank-node `rdfs:subClassOf` edges into restrictions
fn apply_restrictions(graph: &OntologyGraph, table: &mut ClassTable) {
    // Snapshot of known class names; resolution reads it while one class
    // is mutably borrowed.
    let known: HashMap<String, String> = table
        .iter()
        .map(|c| (c.uri.clone(), c.name.clone()))
        .collect();

    let uris: Vec<String> = table.uris().to_vec();
    for uri in uris {
        let subject = Subject::NamedNode(NamedNode::new_unchecked(uri.clone()));
        let mut found = Vec::new();
        for parent in graph.objects(&subject, rdfs::SUB_CLASS_OF) {
            let Term::BlankNode(node) = parent else {
                continue;
            };
            let restriction = Subject::BlankNode(node.clone());
            if !graph.has_type(&restriction, owl::RESTRICTION) {
                continue;
            }
            if let Some(resolved) = resolve_restriction(graph, &known, &restriction) {
                found.push(resolved);
            }
        }
        let Some(class) = table.get_mut(&uri) else {
            continue;
        };
        for (property_uri, descriptor) in found {
            match class.property_mut(&descriptor.name) {
                Some(existing) => {
                    // Only the range map merges; a restriction does not
                    // loosen or tighten an existing declaration.
                    if let (
                        PropertyKind::Object { ranges },
                        PropertyKind::Object { ranges: incoming },
                    ) = (&mut existing.kind, &descriptor.kind)
                    {
                        for (name, cardinality) in incoming {
                            merge_range_entry(ranges, name.clone(), *cardinality);
                        }
                    }
                }
                None => {
                    class
                        .property_uris
                        .insert(descriptor.name.clone(), property_uri);
                    class.properties.push(descriptor);
                }
            }
        }
    }
}

/// Resolve one `owl:Restriction` into an object property descriptor
fn resolve_restriction(
    graph: &OntologyGraph,
    known: &HashMap<String, String>,
    restriction: &Subject,
) -> Option<(String, PropertyDescriptor)> {
    let Some(Term::NamedNode(property)) = graph.first_object(restriction, owl::ON_PROPERTY) else {
        // Blank-node properties cannot be named or serialized.
        return None;
    };
    let name = names::property_name_for(graph, property)?;
    let main_cardinality = restriction_cardinality(graph, restriction);

    let mut collected: Vec<(String, Cardinality)> = Vec::new();
    for term in graph.objects(restriction, owl::ALL_VALUES_FROM) {
        collect_range_term(graph, known, term, main_cardinality, &mut collected);
    }
    if collected.is_empty() {
        for term in graph.objects(restriction, owl::SOME_VALUES_FROM) {
            collect_range_term(graph, known, term, main_cardinality, &mut collected);
        }
    }
    for term in graph.objects(restriction, owl::ON_CLASS) {
        if let Term::NamedNode(node) = term {
            if let Some(range) = class_name(graph, known, node) {
                collected.push((range, main_cardinality));
            }
        }
    }

    let mut ranges: BTreeMap<String, Cardinality> = BTreeMap::new();
    for (range, cardinality) in collected {
        merge_range_entry(&mut ranges, range, cardinality);
    }

    let mut descriptor = PropertyDescriptor::object(name, ranges);
    descriptor.description = property_description(graph, &Subject::NamedNode(property.clone()));
    Some((property.as_str().to_string(), descriptor))
}

/// Cardinality a restriction imposes on its matched values.
///
/// `owl:cardinality` always yields its count; `owl:minCardinality` /
/// `owl:maxCardinality` only count when they actually imply multiplicity.
fn restriction_cardinality(graph: &OntologyGraph, restriction: &Subject) -> Cardinality {
    if let Some(n) = count_literal(graph, restriction, owl::CARDINALITY) {
        return Some(n);
    }
    for predicate in [owl::MIN_CARDINALITY, owl::MAX_CARDINALITY] {
        if let Some(n) = count_literal(graph, restriction, predicate) {
            if n > 1 {
                return Some(n);
            }
        }
    }
    None
}

fn count_literal(
    graph: &OntologyGraph,
    subject: &Subject,
    predicate: oxrdf::NamedNodeRef<'_>,
) -> Option<u32> {
    graph
        .first_literal(subject, predicate)
        .and_then(|l| l.value().parse::<u32>().ok())
}

/// Classify one `allValuesFrom`/`someValuesFrom` value into range entries
fn collect_range_term(
    graph: &OntologyGraph,
    known: &HashMap<String, String>,
    term: &Term,
    main_cardinality: Cardinality,
    out: &mut Vec<(String, Cardinality)>,
) {
    match term {
        Term::NamedNode(node) => {
            if let Some(range) = class_name(graph, known, node) {
                out.push((range, main_cardinality));
            }
        }
        Term::BlankNode(blank) => {
            let subject = Subject::BlankNode(blank.clone());
            if let Some(head) = graph.first_object(&subject, owl::UNION_OF) {
                collect_collection(graph, known, head, main_cardinality, out);
            } else if graph.first_object(&subject, rdf::FIRST).is_some() {
                // A bare collection head without the unionOf wrapper.
                collect_collection(graph, known, term, main_cardinality, out);
            } else if let Some(head) = graph.first_object(&subject, owl::INTERSECTION_OF) {
                collect_intersection(graph, known, head, main_cardinality, out);
            }
        }
        Term::Literal(_) => {}
    }
}

fn collect_collection(
    graph: &OntologyGraph,
    known: &HashMap<String, String>,
    head: &Term,
    cardinality: Cardinality,
    out: &mut Vec<(String, Cardinality)>,
) {
    for item in graph.collection_items(head) {
        if let Term::NamedNode(node) = item {
            if let Some(range) = class_name(graph, known, &node) {
                out.push((range, cardinality));
            }
        }
    }
}

/// Intersection members may be nested restrictions whose own cardinality
/// overrides the outer one.
fn collect_intersection(
    graph: &OntologyGraph,
    known: &HashMap<String, String>,
    head: &Term,
    main_cardinality: Cardinality,
    out: &mut Vec<(String, Cardinality)>,
) {
    for item in graph.collection_items(head) {
        match item {
            Term::NamedNode(node) => {
                if let Some(range) = class_name(graph, known, &node) {
                    out.push((range, main_cardinality));
                }
            }
            Term::BlankNode(blank) => {
                let nested = Subject::BlankNode(blank.clone());
                let cardinality = restriction_cardinality(graph, &nested).or(main_cardinality);
                for predicate in [owl::ON_CLASS, owl::ALL_VALUES_FROM, owl::SOME_VALUES_FROM] {
                    for value in graph.objects(&nested, predicate) {
                        if let Term::NamedNode(node) = value {
                            if let Some(range) = class_name(graph, known, node) {
                                out.push((range, cardinality));
                            }
                        }
                    }
                }
            }
            Term::Literal(_) => {}
        }
    }
}

/// Known class name for a URI, else a name derived from the URI itself
fn class_name(
    graph: &OntologyGraph,
    known: &HashMap<String, String>,
    node: &NamedNode,
) -> Option<String> {
    if let Some(name) = known.get(node.as_str()) {
        return Some(name.clone());
    }
    names::class_name_for(graph, node)
}

fn subject_of(term: &Term) -> Option<Subject> {
    match term {
        Term::NamedNode(n) => Some(Subject::NamedNode(n.clone())),
        Term::BlankNode(b) => Some(Subject::BlankNode(b.clone())),
        Term::Literal(_) => None,
    }
}
