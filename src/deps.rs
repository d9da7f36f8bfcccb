use crate::graph::DependencyGraph;
use crate::normalize::{guard_function_from, normalize, split_statements};
use crate::splitter::{SubqueryMap, split_query};

/// Build the dependency graph of a decomposed statement: one key per entry,
/// mapped to the distinct upstream objects referenced by its fragments, in
/// first-seen order. An entry whose fragments reference nothing maps to an
/// empty list, distinguishing "defined, no inputs" from "absent".
pub fn extract_dependencies(subqueries: &SubqueryMap) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (name, body) in subqueries {
        let mut upstream: Vec<String> = vec![];
        for fragment in body.fragments() {
            collect_fragment_references(fragment, &mut upstream);
        }
        graph.insert(name.clone(), upstream);
    }
    graph
}

fn collect_fragment_references(fragment: &str, upstream: &mut Vec<String>) {
    let words: Vec<&str> = fragment.split_whitespace().collect();
    for i in 0..words.len() {
        let reference = match words[i] {
            // An opening paren after `from`/`join` is an inline derived
            // table, not an identifier.
            "from" | "join" => words
                .get(i + 1)
                .filter(|word| !word.starts_with('('))
                .map(|word| (*word).to_owned()),
            "location" => words
                .get(i + 1)
                .filter(|word| word.starts_with('\''))
                .map(|word| word.trim_matches('\'').to_owned()),
            _ => None,
        };
        if let Some(reference) = reference {
            if !upstream.contains(&reference) {
                upstream.push(reference);
            }
        }
    }
}

/// Run the whole pipeline over a (possibly multi-statement) script:
/// statement splitting, normalization, function-clause guarding, subquery
/// decomposition and reference extraction, merged into one graph.
pub fn extract_script_lineage(script: &str) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for statement in split_statements(script) {
        let query = guard_function_from(&normalize(&statement));
        let subqueries = split_query(&query);
        graph.merge(&extract_dependencies(&subqueries));
    }
    graph
}
