use indexmap::IndexMap;

use crate::graph::DependencyGraph;

/// Diagram notation to emit, picked once at the CLI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Dot,
    Mermaid,
}

pub fn render(graph: &DependencyGraph, target: RenderTarget) -> String {
    match target {
        RenderTarget::Dot => to_dot(graph),
        RenderTarget::Mermaid => to_mermaid(graph),
    }
}

/// 1-based node ids, keys first, then dependency-only names in reading
/// order. Names appearing only as dependency values still get a node.
fn node_ids(graph: &DependencyGraph) -> IndexMap<&str, usize> {
    let mut nodes: IndexMap<&str, usize> = IndexMap::new();
    for (name, upstream) in graph.iter() {
        if !nodes.contains_key(name) {
            nodes.insert(name, nodes.len() + 1);
        }
        for dep in upstream {
            if !nodes.contains_key(dep.as_str()) {
                nodes.insert(dep.as_str(), nodes.len() + 1);
            }
        }
    }
    nodes
}

fn to_dot(graph: &DependencyGraph) -> String {
    let nodes = node_ids(graph);
    let mut out = String::from("graph {\n");

    out.push_str("  // nodes\n");
    for (name, id) in &nodes {
        out.push_str(&format!("  node{} [label=\"{}\"]\n", id, name));
    }

    out.push_str("  // links\n");
    for (name, upstream) in graph.iter() {
        for dep in upstream {
            out.push_str(&format!(
                "  node{} -- node{}\n",
                nodes[dep.as_str()],
                nodes[name]
            ));
        }
    }

    out.push_str("}\n");
    out
}

fn to_mermaid(graph: &DependencyGraph) -> String {
    let nodes = node_ids(graph);
    // Always top-bottom, change by hand if needed.
    let mut out = String::from("graph TB\n");

    out.push_str("  %% nodes\n");
    for (name, id) in &nodes {
        out.push_str(&format!("  node{}({})\n", id, name));
    }

    out.push_str("  %% links\n");
    for (name, upstream) in graph.iter() {
        for dep in upstream {
            out.push_str(&format!(
                "  node{} --- node{}\n",
                nodes[dep.as_str()],
                nodes[name]
            ));
        }
    }

    out
}
