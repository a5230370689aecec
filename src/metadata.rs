//! Metadata injection pass
//!
//! Every emitted class carries three bookkeeping fields independent of
//! ontology content: `label`, `created`, and `creator`. Their URIs are
//! registered in `property_uris` so instances round-trip them through
//! `rdf()` like any ontology property. Classes that already declare one
//! of the names keep their own definition.

use crate::descriptor::{ClassTable, Datatype, PropertyDescriptor};
use crate::vocab::{dcterms, rdfs};

/// Inject the fixed bookkeeping fields into every class
pub fn inject_metadata(table: &mut ClassTable) {
    let uris: Vec<String> = table.uris().to_vec();
    for uri in uris {
        let Some(class) = table.get_mut(&uri) else {
            continue;
        };
        for (property, property_uri) in bookkeeping_fields() {
            if class.has_property(&property.name) {
                continue;
            }
            class
                .property_uris
                .insert(property.name.clone(), property_uri.to_string());
            class.properties.push(property);
        }
    }
}

fn bookkeeping_fields() -> Vec<(PropertyDescriptor, &'static str)> {
    let mut label = PropertyDescriptor::data("label", Datatype::Str);
    label.required = true;
    label.description = Some("Human-readable label of the instance".to_string());

    let mut created = PropertyDescriptor::data("created", Datatype::DateTime);
    created.required = true;
    created.default_expr = Some("datetime.datetime.now".to_string());
    created.description = Some("Creation timestamp of the instance".to_string());

    let mut creator = PropertyDescriptor::data("creator", Datatype::Str);
    creator.required = true;
    creator.default_expr = Some("getpass.getuser".to_string());
    creator.description = Some("Identity that created the instance".to_string());

    vec![
        (label, rdfs::LABEL.as_str()),
        (created, dcterms::CREATED.as_str()),
        (creator, dcterms::CREATOR.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ClassDescriptor;

    #[test]
    fn every_class_gets_bookkeeping_fields() {
        let mut table = ClassTable::new();
        table.insert(ClassDescriptor::new("Person", "http://example.org/Person"));
        inject_metadata(&mut table);

        let person = table.get("http://example.org/Person").unwrap();
        let label = person.property("label").unwrap();
        assert!(label.required);
        assert_eq!(
            person.property_uris.get("label").map(String::as_str),
            Some("http://www.w3.org/2000/01/rdf-schema#label")
        );
        let created = person.property("created").unwrap();
        assert_eq!(created.default_expr.as_deref(), Some("datetime.datetime.now"));
        let creator = person.property("creator").unwrap();
        assert_eq!(creator.default_expr.as_deref(), Some("getpass.getuser"));
        assert_eq!(
            person.property_uris.get("creator").map(String::as_str),
            Some("http://purl.org/dc/terms/creator")
        );
    }

    #[test]
    fn declared_fields_are_not_overwritten() {
        let mut table = ClassTable::new();
        let mut class = ClassDescriptor::new("Doc", "http://example.org/Doc");
        let mut own_label = PropertyDescriptor::data("label", Datatype::Str);
        own_label.description = Some("Own label".to_string());
        class.properties.push(own_label);
        table.insert(class);

        inject_metadata(&mut table);
        let doc = table.get("http://example.org/Doc").unwrap();
        let label = doc.property("label").unwrap();
        assert_eq!(label.description.as_deref(), Some("Own label"));
        assert!(!label.required);
        // The injected fields still land.
        assert!(doc.has_property("created"));
        assert!(doc.has_property("creator"));
    }
}
