//! Emission ordering pass
//!
//! Classes are emitted after their ancestors whenever the inheritance
//! graph allows it. Ordering is two-staged: a cycle-safe inheritance
//! depth sorts the classes coarsely (stable, so discovery order breaks
//! ties), then a depth-first visit emits parents before children. A class
//! revisited while still on the visit stack sits on a true cycle and is
//! emitted immediately, which guarantees termination and a total order.
//!
//! Cycles themselves are detected separately over a petgraph mirror of
//! the inheritance edges so the driver can log them.

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::DiGraph;

use crate::descriptor::ClassTable;

/// Total emission order over all class URIs
pub fn topological_order(table: &ClassTable) -> Vec<String> {
    let mut by_depth: Vec<(usize, String)> = table
        .iter()
        .map(|class| {
            let mut visited = HashSet::new();
            (depth_of(table, &class.name, &mut visited), class.uri.clone())
        })
        .collect();
    // Stable: ties keep discovery order.
    by_depth.sort_by_key(|(depth, _)| *depth);

    let mut order = Vec::with_capacity(table.len());
    let mut done: HashSet<String> = HashSet::new();
    let mut on_stack: HashSet<String> = HashSet::new();
    for (_, uri) in by_depth {
        visit(table, &uri, &mut order, &mut done, &mut on_stack);
    }
    order
}

/// Cycle-safe inheritance depth: the longest ancestor chain reachable
/// without revisiting a class already on the current walk.
fn depth_of(table: &ClassTable, name: &str, visited: &mut HashSet<String>) -> usize {
    if !visited.insert(name.to_string()) {
        return 0;
    }
    let Some(class) = table.by_name(name) else {
        return 0;
    };
    class
        .parents
        .iter()
        .map(|parent| depth_of(table, parent, &mut visited.clone()))
        .max()
        .map(|depth| depth + 1)
        .unwrap_or(0)
}

fn visit(
    table: &ClassTable,
    uri: &str,
    order: &mut Vec<String>,
    done: &mut HashSet<String>,
    on_stack: &mut HashSet<String>,
) {
    if done.contains(uri) {
        return;
    }
    if on_stack.contains(uri) {
        // True cycle: emit now instead of recursing again.
        done.insert(uri.to_string());
        order.push(uri.to_string());
        return;
    }
    on_stack.insert(uri.to_string());

    if let Some(class) = table.get(uri) {
        let parents = class.parents.clone();
        for parent in &parents {
            if let Some(parent_uri) = table.uri_for_name(parent) {
                let parent_uri = parent_uri.to_string();
                visit(table, &parent_uri, order, done, on_stack);
            }
        }
    }

    on_stack.remove(uri);
    if !done.contains(uri) {
        done.insert(uri.to_string());
        order.push(uri.to_string());
    }
}

/// Inheritance cycle groups (class names), via SCC decomposition
pub fn inheritance_cycles(table: &ClassTable) -> Vec<Vec<String>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes = HashMap::new();
    for class in table.iter() {
        let node = graph.add_node(class.name.clone());
        nodes.entry(class.uri.clone()).or_insert(node);
    }
    for class in table.iter() {
        let child = nodes[&class.uri];
        for parent in &class.parents {
            if let Some(parent_uri) = table.uri_for_name(parent) {
                if let Some(&parent_node) = nodes.get(parent_uri) {
                    graph.add_edge(child, parent_node, ());
                }
            }
        }
    }

    kosaraju_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            component
                .into_iter()
                .map(|node| graph[node].clone())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ClassDescriptor;

    fn class(name: &str, parents: &[&str]) -> ClassDescriptor {
        let mut descriptor =
            ClassDescriptor::new(name, format!("http://example.org/{name}"));
        descriptor.parents = parents.iter().map(|p| p.to_string()).collect();
        descriptor
    }

    fn names(table: &ClassTable, order: &[String]) -> Vec<String> {
        order
            .iter()
            .filter_map(|uri| table.get(uri).map(|c| c.name.clone()))
            .collect()
    }

    #[test]
    fn parents_precede_children() {
        let mut table = ClassTable::new();
        table.insert(class("Bottom", &["Left", "Right"]));
        table.insert(class("Left", &["Top"]));
        table.insert(class("Right", &["Top"]));
        table.insert(class("Top", &[]));

        let order = topological_order(&table);
        let order = names(&table, &order);
        let position = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(position("Top") < position("Left"));
        assert!(position("Top") < position("Right"));
        assert!(position("Left") < position("Bottom"));
        assert!(position("Right") < position("Bottom"));
    }

    #[test]
    fn cyclic_hierarchy_still_orders_every_class() {
        let mut table = ClassTable::new();
        table.insert(class("A", &["B"]));
        table.insert(class("B", &["A"]));
        table.insert(class("C", &["A"]));

        let order = topological_order(&table);
        assert_eq!(order.len(), 3);
        let mut seen: HashSet<&String> = HashSet::new();
        assert!(order.iter().all(|uri| seen.insert(uri)));
    }

    #[test]
    fn ties_keep_discovery_order() {
        let mut table = ClassTable::new();
        table.insert(class("Zeta", &[]));
        table.insert(class("Alpha", &[]));
        table.insert(class("Mu", &[]));

        let order = topological_order(&table);
        assert_eq!(names(&table, &order), vec!["Zeta", "Alpha", "Mu"]);
    }

    #[test]
    fn scc_reports_only_real_cycles() {
        let mut table = ClassTable::new();
        table.insert(class("A", &["B"]));
        table.insert(class("B", &["A"]));
        table.insert(class("C", &[]));

        let cycles = inheritance_cycles(&table);
        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort();
        assert_eq!(members, vec!["A", "B"]);
    }
}
