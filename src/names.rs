//! Identifier derivation
//!
//! Builds Python identifiers for classes (PascalCase) and properties
//! (lower-leading) from `rdfs:label` literals, falling back to the URI
//! fragment or last path segment. Anything that cannot be cleaned into a
//! valid, non-keyword identifier yields `None` and the caller drops the
//! element from generation.

use oxrdf::{NamedNode, Subject};

use crate::graph::OntologyGraph;
use crate::vocab::rdfs;

/// Reserved words that are valid identifier shapes but unusable as Python
/// class or attribute names.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

fn is_python_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !PYTHON_KEYWORDS.contains(&s)
}

/// Strip a language tag embedded in the lexical form ("Person@en" -> "Person")
fn strip_language_tag(label: &str) -> &str {
    match label.find('@') {
        Some(idx) => &label[..idx],
        None => label,
    }
}

/// Fragment after `#`, else last `/` segment, else the whole URI
fn uri_tail(uri: &str) -> &str {
    if let Some(idx) = uri.rfind('#') {
        &uri[idx + 1..]
    } else if let Some(idx) = uri.rfind('/') {
        &uri[idx + 1..]
    } else {
        uri
    }
}

fn clean(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// PascalCase class name from an `rdfs:label` literal
pub fn class_name_from_label(label: &str) -> Option<String> {
    let label = strip_language_tag(label);
    let mut name = String::with_capacity(label.len());
    for word in label.split_whitespace() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    let name = clean(&name);
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) && is_python_identifier(&name) {
        Some(name)
    } else {
        None
    }
}

/// Class name from the URI fragment or last path segment.
///
/// Blank-node-like tails (leading underscore after cleanup) are rejected
/// so anonymous-looking URIs never become named types.
pub fn class_name_from_uri(uri: &str) -> Option<String> {
    let mut name = clean(uri_tail(uri));
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_lowercase()) {
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            name = first.to_ascii_uppercase().to_string() + chars.as_str();
        }
    }
    if is_python_identifier(&name) {
        Some(name)
    } else {
        None
    }
}

/// Lower-case, underscore-joined property name from an `rdfs:label` literal
pub fn property_name_from_label(label: &str) -> Option<String> {
    let label = strip_language_tag(label);
    let mut name = String::with_capacity(label.len());
    for (i, word) in label.split_whitespace().enumerate() {
        if i > 0 {
            name.push('_');
        }
        name.push_str(&word.to_lowercase());
    }
    let name = clean(&name);
    let name = name.trim_matches('_');
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) && is_python_identifier(name) {
        Some(name.to_string())
    } else {
        None
    }
}

/// Property name from the URI fragment or last path segment
pub fn property_name_from_uri(uri: &str) -> Option<String> {
    let mut name = clean(uri_tail(uri));
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_uppercase()) {
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            name = first.to_ascii_lowercase().to_string() + chars.as_str();
        }
    }
    if is_python_identifier(&name) {
        Some(name)
    } else {
        None
    }
}

/// Class name for a node, preferring its labels over its URI
pub fn class_name_for(graph: &OntologyGraph, node: &NamedNode) -> Option<String> {
    let subject = Subject::NamedNode(node.clone());
    for literal in graph.literals(&subject, rdfs::LABEL) {
        if let Some(name) = class_name_from_label(literal.value()) {
            return Some(name);
        }
    }
    class_name_from_uri(node.as_str())
}

/// Property name for a node, preferring its labels over its URI
pub fn property_name_for(graph: &OntologyGraph, node: &NamedNode) -> Option<String> {
    let subject = Subject::NamedNode(node.clone());
    for literal in graph.literals(&subject, rdfs::LABEL) {
        if let Some(name) = property_name_from_label(literal.value()) {
            return Some(name);
        }
    }
    property_name_from_uri(node.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_from_labels() {
        assert_eq!(class_name_from_label("Person"), Some("Person".to_string()));
        assert_eq!(
            class_name_from_label("commercial organization"),
            Some("CommercialOrganization".to_string())
        );
        assert_eq!(class_name_from_label("Person@en"), Some("Person".to_string()));
        // Word interiors keep their case.
        assert_eq!(class_name_from_label("eCommerce site"), Some("ECommerceSite".to_string()));
        assert_eq!(class_name_from_label("42 things"), None);
        assert_eq!(class_name_from_label("   "), None);
    }

    #[test]
    fn class_names_from_uris() {
        assert_eq!(
            class_name_from_uri("http://example.org/onto#person"),
            Some("Person".to_string())
        );
        assert_eq!(
            class_name_from_uri("http://example.org/onto/Organization"),
            Some("Organization".to_string())
        );
        assert_eq!(class_name_from_uri("http://example.org/onto#_:b12"), None);
        assert_eq!(class_name_from_uri("http://example.org/onto#42"), None);
    }

    #[test]
    fn property_names() {
        assert_eq!(
            property_name_from_label("has name"),
            Some("has_name".to_string())
        );
        assert_eq!(
            property_name_from_label("concretizes@en"),
            Some("concretizes".to_string())
        );
        assert_eq!(
            property_name_from_uri("http://example.org/onto#hasName"),
            Some("hasName".to_string())
        );
        assert_eq!(
            property_name_from_uri("http://example.org/onto#HasName"),
            Some("hasName".to_string())
        );
        assert_eq!(property_name_from_label("123"), None);
    }

    #[test]
    fn keywords_are_rejected() {
        assert_eq!(class_name_from_label("True"), None);
        assert_eq!(property_name_from_label("class"), None);
        assert_eq!(property_name_from_uri("http://example.org/onto#import"), None);
    }
}
