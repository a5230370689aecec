//! Code emission
//!
//! Renders ordered class descriptors as a single Python module: a header
//! with computed `typing` imports, the `RDFEntity` base class carrying
//! the instance namespace and id factory from [`EmitConfig`], one
//! Pydantic class per descriptor, and a `model_rebuild()` trailer that
//! resolves forward references regardless of emission order.

mod python;

use crate::config::EmitConfig;
use crate::descriptor::{ClassTable, Datatype, PropertyKind};

/// Render the full Python module for the given emission order
pub fn emit_module(table: &ClassTable, order: &[String], config: &EmitConfig) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("from __future__ import annotations".to_string());
    lines.push(format!("from typing import {}", typing_imports(table)));
    lines.push("from pydantic import BaseModel, Field".to_string());
    lines.push("import datetime".to_string());
    lines.push("import getpass".to_string());
    lines.push("import uuid".to_string());
    lines.push("from rdflib import Graph, URIRef, Literal".to_string());
    lines.push("from rdflib.namespace import RDF".to_string());
    lines.push(String::new());
    lines.push("# Generated classes".to_string());
    lines.push(String::new());

    base_class(&mut lines, config);

    for uri in order {
        if let Some(class) = table.get(uri) {
            python::class_block(&mut lines, class);
            lines.push(String::new());
        }
    }

    lines.push("# Rebuild models to resolve forward references".to_string());
    for uri in order {
        if let Some(class) = table.get(uri) {
            lines.push(format!("{}.model_rebuild()", class.name));
        }
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Compute the `typing` import list from what the fields actually use
fn typing_imports(table: &ClassTable) -> String {
    let mut needs_list = false;
    let mut needs_union = false;
    let mut needs_any = false;

    for class in table.iter() {
        for property in &class.properties {
            if property.is_multi_valued() {
                needs_list = true;
            }
            match &property.kind {
                PropertyKind::Data { datatype } => {
                    if *datatype == Datatype::Any {
                        needs_any = true;
                    }
                }
                PropertyKind::Object { ranges } => {
                    if ranges.is_empty() {
                        needs_any = true;
                    } else {
                        needs_union = true;
                    }
                    if ranges.values().any(|c| matches!(c, Some(n) if *n > 1)) {
                        needs_list = true;
                    }
                }
            }
        }
    }

    let mut imports = vec!["ClassVar", "Optional"];
    if needs_any {
        imports.push("Any");
    }
    if needs_list {
        imports.push("List");
    }
    if needs_union {
        imports.push("Union");
    }
    imports.sort_unstable();
    imports.join(", ")
}

fn base_class(lines: &mut Vec<String>, config: &EmitConfig) {
    let namespace = &config.instance_namespace;
    let id_factory = &config.id_factory_expr;
    lines.push("# Base class for all RDF entities".to_string());
    lines.push("class RDFEntity(BaseModel):".to_string());
    lines.push(
        "    \"\"\"Base class for all RDF entities with URI and namespace management\"\"\""
            .to_string(),
    );
    lines.push(format!("    _namespace: ClassVar[str] = \"{namespace}\""));
    lines.push("    _uri: str = \"\"".to_string());
    lines.push("    _object_properties: ClassVar[set[str]] = set()".to_string());
    lines.push(String::new());
    lines.push("    model_config = {".to_string());
    lines.push("        'arbitrary_types_allowed': True,".to_string());
    lines.push("        'extra': 'forbid'".to_string());
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push("    def __init__(self, **kwargs):".to_string());
    lines.push("        uri = kwargs.pop('_uri', None)".to_string());
    lines.push("        super().__init__(**kwargs)".to_string());
    lines.push("        if uri is not None:".to_string());
    lines.push("            self._uri = uri".to_string());
    lines.push("        elif not self._uri:".to_string());
    lines.push(format!(
        "            self._uri = f\"{{self._namespace}}{{{id_factory}()}}\""
    ));
    lines.push(String::new());
    lines.push("    @classmethod".to_string());
    lines.push("    def set_namespace(cls, namespace: str):".to_string());
    lines.push("        \"\"\"Set the namespace for generating URIs\"\"\"".to_string());
    lines.push("        cls._namespace = namespace".to_string());
    lines.push(String::new());
    lines.push("    def rdf(self, subject_uri: str | None = None) -> Graph:".to_string());
    lines.push("        \"\"\"Generate RDF triples for this instance\"\"\"".to_string());
    lines.push("        g = Graph()".to_string());
    lines.push("        if subject_uri is None:".to_string());
    lines.push("            subject_uri = self._uri".to_string());
    lines.push("        subject = URIRef(subject_uri)".to_string());
    lines.push("        if hasattr(self, '_class_uri'):".to_string());
    lines.push("            g.add((subject, RDF.type, URIRef(self._class_uri)))".to_string());
    lines.push("        object_props: set[str] = getattr(self, '_object_properties', set())".to_string());
    lines.push("        if hasattr(self, '_property_uris'):".to_string());
    lines.push("            for prop_name, prop_uri in self._property_uris.items():".to_string());
    lines.push("                is_object_prop = prop_name in object_props".to_string());
    lines.push("                prop_value = getattr(self, prop_name, None)".to_string());
    lines.push("                if prop_value is None:".to_string());
    lines.push("                    continue".to_string());
    lines.push("                if isinstance(prop_value, list):".to_string());
    lines.push("                    for item in prop_value:".to_string());
    lines.push("                        if hasattr(item, 'rdf'):".to_string());
    lines.push("                            g += item.rdf()".to_string());
    lines.push("                            g.add((subject, URIRef(prop_uri), URIRef(item._uri)))".to_string());
    lines.push("                        elif is_object_prop and isinstance(item, (str, URIRef)):".to_string());
    lines.push("                            g.add((subject, URIRef(prop_uri), URIRef(str(item))))".to_string());
    lines.push("                        else:".to_string());
    lines.push("                            g.add((subject, URIRef(prop_uri), Literal(item)))".to_string());
    lines.push("                elif hasattr(prop_value, 'rdf'):".to_string());
    lines.push("                    g += prop_value.rdf()".to_string());
    lines.push("                    g.add((subject, URIRef(prop_uri), URIRef(prop_value._uri)))".to_string());
    lines.push("                elif is_object_prop and isinstance(prop_value, (str, URIRef)):".to_string());
    lines.push("                    g.add((subject, URIRef(prop_uri), URIRef(str(prop_value))))".to_string());
    lines.push("                else:".to_string());
    lines.push("                    g.add((subject, URIRef(prop_uri), Literal(prop_value)))".to_string());
    lines.push("        return g".to_string());
    lines.push(String::new());
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassDescriptor, PropertyDescriptor};
    use std::collections::BTreeMap;

    #[test]
    fn typing_imports_track_field_shapes() {
        let mut table = ClassTable::new();
        let mut class = ClassDescriptor::new("Person", "http://example.org/Person");
        class
            .properties
            .push(PropertyDescriptor::data("name", Datatype::Str));
        table.insert(class);
        assert_eq!(typing_imports(&table), "ClassVar, Optional");

        let mut table = ClassTable::new();
        let mut class = ClassDescriptor::new("Project", "http://example.org/Project");
        let mut ranges = BTreeMap::new();
        ranges.insert("Person".to_string(), Some(3));
        class
            .properties
            .push(PropertyDescriptor::object("members", ranges));
        class
            .properties
            .push(PropertyDescriptor::object("misc", BTreeMap::new()));
        table.insert(class);
        assert_eq!(typing_imports(&table), "Any, ClassVar, List, Optional, Union");
    }

    #[test]
    fn module_carries_base_class_and_trailer() {
        let mut table = ClassTable::new();
        table.insert(ClassDescriptor::new("Person", "http://example.org/Person"));
        let order = vec!["http://example.org/Person".to_string()];
        let module = emit_module(&table, &order, &EmitConfig::default());

        assert!(module.starts_with("from __future__ import annotations"));
        assert!(module.contains("class RDFEntity(BaseModel):"));
        assert!(module.contains("_namespace: ClassVar[str] = \"http://example.org/instance/\""));
        assert!(module.contains("f\"{self._namespace}{uuid.uuid4()}\""));
        assert!(module.contains("class Person(RDFEntity):"));
        assert!(module.contains("Person.model_rebuild()"));
    }

    #[test]
    fn id_factory_is_injectable() {
        let mut table = ClassTable::new();
        table.insert(ClassDescriptor::new("Person", "http://example.org/Person"));
        let order = vec!["http://example.org/Person".to_string()];
        let config = EmitConfig {
            instance_namespace: "http://data.example.com/".to_string(),
            id_factory_expr: "make_test_id".to_string(),
        };
        let module = emit_module(&table, &order, &config);
        assert!(module.contains("_namespace: ClassVar[str] = \"http://data.example.com/\""));
        assert!(module.contains("f\"{self._namespace}{make_test_id()}\""));
    }
}
