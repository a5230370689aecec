//! Per-class Python rendering

use crate::descriptor::{ClassDescriptor, PropertyDescriptor, PropertyKind};

/// Append the class definition for one descriptor
pub(super) fn class_block(lines: &mut Vec<String>, class: &ClassDescriptor) {
    if class.parents.is_empty() {
        lines.push(format!("class {}(RDFEntity):", class.name));
    } else {
        let mut parents = class.parents.clone();
        if !parents.iter().any(|p| p == "RDFEntity") {
            parents.push("RDFEntity".to_string());
        }
        lines.push(format!("class {}({}):", class.name, parents.join(", ")));
    }

    if let Some(description) = &class.description {
        lines.push("    \"\"\"".to_string());
        for line in description.lines() {
            lines.push(format!("    {line}"));
        }
        lines.push("    \"\"\"".to_string());
        lines.push(String::new());
    }

    lines.push(format!(
        "    _class_uri: ClassVar[str] = '{}'",
        class.uri
    ));
    if class.property_uris.is_empty() {
        lines.push("    _property_uris: ClassVar[dict] = {}".to_string());
    } else {
        let entries: Vec<String> = class
            .property_uris
            .iter()
            .map(|(name, uri)| format!("'{name}': '{uri}'"))
            .collect();
        lines.push(format!(
            "    _property_uris: ClassVar[dict] = {{{}}}",
            entries.join(", ")
        ));
    }

    let mut object_names: Vec<&str> = class
        .properties
        .iter()
        .filter(|p| p.kind.is_object())
        .map(|p| p.name.as_str())
        .collect();
    object_names.sort_unstable();
    object_names.dedup();
    if object_names.is_empty() {
        lines.push("    _object_properties: ClassVar[set[str]] = set()".to_string());
    } else {
        let entries: Vec<String> = object_names.iter().map(|n| format!("'{n}'")).collect();
        lines.push(format!(
            "    _object_properties: ClassVar[set[str]] = {{{}}}",
            entries.join(", ")
        ));
    }
    lines.push(String::new());

    let mut data_properties: Vec<&PropertyDescriptor> = class
        .properties
        .iter()
        .filter(|p| !p.kind.is_object())
        .collect();
    data_properties.sort_by(|a, b| a.name.cmp(&b.name));
    let mut object_properties: Vec<&PropertyDescriptor> = class
        .properties
        .iter()
        .filter(|p| p.kind.is_object())
        .collect();
    object_properties.sort_by(|a, b| a.name.cmp(&b.name));

    let mut emitted_group = false;
    for (label, group) in [
        ("Data properties", data_properties),
        ("Object properties", object_properties),
    ] {
        if group.is_empty() {
            continue;
        }
        if emitted_group {
            lines.push(String::new());
        }
        lines.push(format!("    # {label}"));
        for property in group {
            lines.push(format!("    {}", field_line(property)));
        }
        emitted_group = true;
    }
    if !emitted_group {
        lines.push("    pass".to_string());
    }
}

/// Render one field declaration: annotation plus Pydantic `Field`
fn field_line(property: &PropertyDescriptor) -> String {
    let annotation = annotation_for(property);
    let default = default_for(property);
    format!("{}: {} = {}", property.name, annotation, default)
}

fn annotation_for(property: &PropertyDescriptor) -> String {
    match &property.kind {
        PropertyKind::Data { datatype } => {
            let scalar = datatype.python_annotation();
            if property.is_multi_valued() {
                format!("List[{scalar}]")
            } else if property.required {
                scalar.to_string()
            } else {
                format!("Optional[{scalar}]")
            }
        }
        PropertyKind::Object { ranges } => {
            if ranges.is_empty() {
                return "Optional[Any]".to_string();
            }
            let mut parts = vec!["str".to_string()];
            for (range, cardinality) in ranges {
                match cardinality {
                    Some(n) if *n > 1 => parts.push(format!("List[{range}]")),
                    _ => parts.push(range.clone()),
                }
            }
            let union = format!("Union[{}]", parts.join(", "));
            if property.required {
                union
            } else {
                format!("Optional[{union}]")
            }
        }
    }
}

fn default_for(property: &PropertyDescriptor) -> String {
    let mut arguments: Vec<String> = Vec::new();
    if let Some(expr) = &property.default_expr {
        arguments.push(format!("default_factory={expr}"));
    } else if property.is_multi_valued() {
        arguments.push("default_factory=list".to_string());
    } else if property.required {
        arguments.push("...".to_string());
    } else {
        arguments.push("default=None".to_string());
    }
    if let Some(description) = &property.description {
        let escaped = description.replace('"', "\\\"").replace('\n', " ");
        arguments.push(format!("description=\"{escaped}\""));
    }
    format!("Field({})", arguments.join(", "))
}
