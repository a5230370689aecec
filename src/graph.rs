//! Ontology graph
//!
//! In-memory triple index over `oxrdf` terms, queryable by any of the
//! three positions. Loading from Turtle (via `oxttl`) is the only fatal
//! operation in the compiler; everything downstream reads the graph
//! through the query surface here.

use std::collections::{HashMap, HashSet};

use oxrdf::{Literal, NamedNode, NamedNodeRef, Subject, Term, TermRef, Triple};
use oxttl::TurtleParser;

use crate::error::{CompileError, Result};
use crate::vocab::rdf;

/// Read-only triple multiset with subject/predicate/object indexes
#[derive(Debug, Default, Clone)]
pub struct OntologyGraph {
    triples: Vec<Triple>,
    by_subject: HashMap<Subject, Vec<usize>>,
    by_predicate: HashMap<NamedNode, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
}

impl OntologyGraph {
    /// Parse a Turtle document into an indexed graph.
    ///
    /// This is the compiler's only fatal failure: a document the parser
    /// cannot read surfaces as [`CompileError::GraphParse`].
    pub fn parse_turtle(input: &str) -> Result<Self> {
        let mut triples = Vec::new();
        for triple in TurtleParser::new().for_reader(input.as_bytes()) {
            let triple = triple.map_err(|e| CompileError::GraphParse(e.to_string()))?;
            triples.push(triple);
        }
        Ok(Self::from_triples(triples))
    }

    /// Build the three position indexes over an existing triple set
    pub fn from_triples(triples: Vec<Triple>) -> Self {
        let mut by_subject: HashMap<Subject, Vec<usize>> = HashMap::with_capacity(triples.len());
        let mut by_predicate: HashMap<NamedNode, Vec<usize>> =
            HashMap::with_capacity(triples.len());
        let mut by_object: HashMap<Term, Vec<usize>> = HashMap::with_capacity(triples.len());

        for (i, triple) in triples.iter().enumerate() {
            by_subject.entry(triple.subject.clone()).or_default().push(i);
            by_predicate
                .entry(triple.predicate.clone())
                .or_default()
                .push(i);
            by_object.entry(triple.object.clone()).or_default().push(i);
        }

        Self {
            triples,
            by_subject,
            by_predicate,
            by_object,
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Objects of all `(subject, predicate, ?)` triples, in document order
    pub fn objects(&self, subject: &Subject, predicate: NamedNodeRef<'_>) -> Vec<&Term> {
        let Some(indices) = self.by_subject.get(subject) else {
            return Vec::new();
        };
        indices
            .iter()
            .map(|&i| &self.triples[i])
            .filter(|t| t.predicate.as_ref() == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// First object of `(subject, predicate, ?)`, if any
    pub fn first_object(&self, subject: &Subject, predicate: NamedNodeRef<'_>) -> Option<&Term> {
        self.objects(subject, predicate).into_iter().next()
    }

    /// Literal objects of `(subject, predicate, ?)`
    pub fn literals(&self, subject: &Subject, predicate: NamedNodeRef<'_>) -> Vec<&Literal> {
        self.objects(subject, predicate)
            .into_iter()
            .filter_map(|t| match t {
                Term::Literal(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    /// First literal object of `(subject, predicate, ?)`, if any
    pub fn first_literal(&self, subject: &Subject, predicate: NamedNodeRef<'_>) -> Option<&Literal> {
        self.literals(subject, predicate).into_iter().next()
    }

    /// Subjects of all `(?, predicate, object)` triples, in document order
    pub fn subjects_for(&self, predicate: NamedNodeRef<'_>, object: TermRef<'_>) -> Vec<&Subject> {
        let Some(indices) = self.by_object.get(&object.into_owned()) else {
            return Vec::new();
        };
        indices
            .iter()
            .map(|&i| &self.triples[i])
            .filter(|t| t.predicate.as_ref() == predicate)
            .map(|t| &t.subject)
            .collect()
    }

    /// Distinct subjects asserted as instances of `class`, in document order
    pub fn subjects_with_type(&self, class: NamedNodeRef<'_>) -> Vec<&Subject> {
        let mut seen: HashSet<&Subject> = HashSet::new();
        self.subjects_for(rdf::TYPE, TermRef::from(class))
            .into_iter()
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Whether `(subject, rdf:type, class)` is asserted
    pub fn has_type(&self, subject: &Subject, class: NamedNodeRef<'_>) -> bool {
        self.objects(subject, rdf::TYPE)
            .into_iter()
            .any(|t| matches!(t, Term::NamedNode(n) if n.as_ref() == class))
    }

    /// Walk an RDF collection iteratively, returning its member terms.
    ///
    /// Terminates on `rdf:nil` and treats malformed lists (missing
    /// `rdf:first`/`rdf:rest`, literal links, loops) as a normal boundary
    /// case, returning the members collected so far.
    pub fn collection_items(&self, head: &Term) -> Vec<Term> {
        let mut items = Vec::new();
        let mut seen: HashSet<Subject> = HashSet::new();
        let mut current = head.clone();

        loop {
            let cell = match &current {
                Term::NamedNode(n) if n.as_ref() == rdf::NIL => break,
                Term::NamedNode(n) => Subject::NamedNode(n.clone()),
                Term::BlankNode(b) => Subject::BlankNode(b.clone()),
                Term::Literal(_) => break,
            };
            if !seen.insert(cell.clone()) {
                break;
            }
            match self.first_object(&cell, rdf::FIRST) {
                Some(first) => items.push(first.clone()),
                None => break,
            }
            match self.first_object(&cell, rdf::REST) {
                Some(rest) => current = rest.clone(),
                None => break,
            }
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{owl, rdfs};

    const SIMPLE: &str = r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

ex:Person a owl:Class ;
    rdfs:label "Person" ;
    rdfs:comment "A human being" .

ex:Organization a owl:Class ;
    rdfs:label "Organization" .
"#;

    fn subject(uri: &str) -> Subject {
        Subject::NamedNode(NamedNode::new_unchecked(uri))
    }

    #[test]
    fn parse_and_query() {
        let graph = OntologyGraph::parse_turtle(SIMPLE).unwrap();
        assert_eq!(graph.len(), 5);

        let classes = graph.subjects_with_type(owl::CLASS);
        assert_eq!(classes.len(), 2);

        let person = subject("http://example.org/Person");
        assert!(graph.has_type(&person, owl::CLASS));
        let label = graph.first_literal(&person, rdfs::LABEL).unwrap();
        assert_eq!(label.value(), "Person");
    }

    #[test]
    fn broken_turtle_is_fatal() {
        let err = OntologyGraph::parse_turtle("ex:Person a owl:Class .").unwrap_err();
        assert!(matches!(err, CompileError::GraphParse(_)));
    }

    #[test]
    fn collection_walk_terminates_on_nil() {
        let ttl = r#"
@prefix ex: <http://example.org/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .

ex:thing owl:unionOf ( ex:A ex:B ex:C ) .
"#;
        let graph = OntologyGraph::parse_turtle(ttl).unwrap();
        let head = graph
            .first_object(&subject("http://example.org/thing"), owl::UNION_OF)
            .unwrap()
            .clone();
        let items = graph.collection_items(&head);
        let uris: Vec<String> = items
            .iter()
            .filter_map(|t| match t {
                Term::NamedNode(n) => Some(n.as_str().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(
            uris,
            vec![
                "http://example.org/A",
                "http://example.org/B",
                "http://example.org/C"
            ]
        );
    }

    #[test]
    fn malformed_collection_returns_partial_results() {
        // A hand-built list whose second cell has no rdf:rest.
        let ttl = r#"
@prefix ex: <http://example.org/> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .

ex:head rdf:first ex:A ;
    rdf:rest ex:tail .
ex:tail rdf:first ex:B .
"#;
        let graph = OntologyGraph::parse_turtle(ttl).unwrap();
        let head = Term::NamedNode(NamedNode::new_unchecked("http://example.org/head"));
        let items = graph.collection_items(&head);
        assert_eq!(items.len(), 2);
    }
}
