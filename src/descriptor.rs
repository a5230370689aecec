//! Intermediate representation
//!
//! `ClassDescriptor` and `PropertyDescriptor` are the compiler's IR: built
//! by the class collector, enriched by the property resolver, inheritance
//! propagator, and metadata injector, then consumed read-only by the
//! orderer and emitter. Class identity is the origin URI, never the
//! generated name (names may collide across namespaces).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::vocab::xsd;
use oxrdf::NamedNodeRef;

/// Value-count constraint for a property or one of its range entries.
/// `None` means unspecified, which defaults to single-valued.
pub type Cardinality = Option<u32>;

/// Scalar type of a data property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Datatype {
    Str,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    /// Unknown or missing range
    Any,
}

impl Datatype {
    /// Map an `rdfs:range` datatype IRI through the fixed lexical table.
    pub fn from_xsd(datatype: NamedNodeRef<'_>) -> Option<Self> {
        if datatype == xsd::STRING {
            Some(Datatype::Str)
        } else if datatype == xsd::INTEGER || datatype == xsd::INT {
            Some(Datatype::Int)
        } else if datatype == xsd::FLOAT || datatype == xsd::DOUBLE {
            Some(Datatype::Float)
        } else if datatype == xsd::BOOLEAN {
            Some(Datatype::Bool)
        } else if datatype == xsd::DATE {
            Some(Datatype::Date)
        } else if datatype == xsd::DATE_TIME {
            Some(Datatype::DateTime)
        } else {
            None
        }
    }

    /// Python annotation for this scalar
    pub fn python_annotation(&self) -> &'static str {
        match self {
            Datatype::Str => "str",
            Datatype::Int => "int",
            Datatype::Float => "float",
            Datatype::Bool => "bool",
            Datatype::Date => "datetime.date",
            Datatype::DateTime => "datetime.datetime",
            Datatype::Any => "Any",
        }
    }
}

/// Data vs object property, with the kind-specific payload attached so a
/// data property can never carry range classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PropertyKind {
    Data {
        datatype: Datatype,
    },
    Object {
        /// Range class name -> cardinality. Empty map falls back to an
        /// open `Any` type at emission time.
        ranges: BTreeMap<String, Cardinality>,
    },
}

impl PropertyKind {
    pub fn is_object(&self) -> bool {
        matches!(self, PropertyKind::Object { .. })
    }
}

/// One resolved property on a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    /// Generated snake_case identifier
    pub name: String,
    pub kind: PropertyKind,
    pub required: bool,
    /// Property-level count hint (set by SHACL shapes)
    pub cardinality: Cardinality,
    pub description: Option<String>,
    /// Python expression used as the field's default factory
    pub default_expr: Option<String>,
}

impl PropertyDescriptor {
    pub fn data(name: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Data { datatype },
            required: false,
            cardinality: None,
            description: None,
            default_expr: None,
        }
    }

    pub fn object(name: impl Into<String>, ranges: BTreeMap<String, Cardinality>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Object { ranges },
            required: false,
            cardinality: None,
            description: None,
            default_expr: None,
        }
    }

    /// Whether the property holds more than one value
    pub fn is_multi_valued(&self) -> bool {
        matches!(self.cardinality, Some(n) if n > 1)
    }
}

/// One resolved ontology class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    /// Generated PascalCase identifier
    pub name: String,
    /// Origin class IRI (the class's identity)
    pub uri: String,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Generated names of direct parents, in declaration order
    pub parents: Vec<String>,
    /// Properties in discovery order
    pub properties: Vec<PropertyDescriptor>,
    /// Property name -> origin property IRI, for serialization
    pub property_uris: BTreeMap<String, String>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            label: None,
            description: None,
            parents: Vec::new(),
            properties: Vec::new(),
            property_uris: BTreeMap::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyDescriptor> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}

/// Class descriptors keyed by URI, iterable in discovery order.
///
/// Name lookups resolve to the first class discovered with that name,
/// which keeps behaviors deterministic when generated names collide.
#[derive(Debug, Default, Clone)]
pub struct ClassTable {
    order: Vec<String>,
    by_uri: HashMap<String, ClassDescriptor>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor; an existing entry for the same URI is kept.
    pub fn insert(&mut self, descriptor: ClassDescriptor) {
        if !self.by_uri.contains_key(&descriptor.uri) {
            self.order.push(descriptor.uri.clone());
            self.by_uri.insert(descriptor.uri.clone(), descriptor);
        }
    }

    pub fn contains_uri(&self, uri: &str) -> bool {
        self.by_uri.contains_key(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&ClassDescriptor> {
        self.by_uri.get(uri)
    }

    pub fn get_mut(&mut self, uri: &str) -> Option<&mut ClassDescriptor> {
        self.by_uri.get_mut(uri)
    }

    /// Class URIs in discovery order
    pub fn uris(&self) -> &[String] {
        &self.order
    }

    /// Descriptors in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.order.iter().filter_map(|uri| self.by_uri.get(uri))
    }

    /// Resolve a generated class name to its URI (first discovered wins)
    pub fn uri_for_name(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|c| c.name == name)
            .map(|c| c.uri.as_str())
    }

    /// Resolve a generated class name to its descriptor
    pub fn by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatype_mapping() {
        assert_eq!(Datatype::from_xsd(xsd::STRING), Some(Datatype::Str));
        assert_eq!(Datatype::from_xsd(xsd::INT), Some(Datatype::Int));
        assert_eq!(Datatype::from_xsd(xsd::DOUBLE), Some(Datatype::Float));
        assert_eq!(Datatype::from_xsd(xsd::DATE_TIME), Some(Datatype::DateTime));
        assert_eq!(Datatype::from_xsd(xsd::DECIMAL), None);
    }

    #[test]
    fn table_keeps_discovery_order_and_uri_identity() {
        let mut table = ClassTable::new();
        table.insert(ClassDescriptor::new("Person", "http://a.example/Person"));
        table.insert(ClassDescriptor::new("Person", "http://b.example/Person"));
        table.insert(ClassDescriptor::new("Person", "http://a.example/Person"));

        assert_eq!(table.len(), 2);
        let uris: Vec<&str> = table.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(uris, vec!["http://a.example/Person", "http://b.example/Person"]);
        // Name lookup resolves to the first discovered class.
        assert_eq!(table.uri_for_name("Person"), Some("http://a.example/Person"));
    }

    #[test]
    fn multi_valued_needs_concrete_count() {
        let mut prop = PropertyDescriptor::data("age", Datatype::Int);
        assert!(!prop.is_multi_valued());
        prop.cardinality = Some(1);
        assert!(!prop.is_multi_valued());
        prop.cardinality = Some(3);
        assert!(prop.is_multi_valued());
    }
}
