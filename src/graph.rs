use anyhow::anyhow;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Mapping from object name to the ordered, duplicate-free list of upstream
/// objects it reads from. Leaf sources (raw tables, storage locations) show
/// up as dependency values without being keys; an object defined with no
/// inputs is a key with an empty list.
///
/// Serializes transparently as `{ "object": ["upstream", ...], ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    objects: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.objects.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.objects
            .iter()
            .map(|(name, upstream)| (name.as_str(), upstream.as_slice()))
    }

    /// Register `name` with its full upstream list, replacing any previous
    /// entry for the same name.
    pub fn insert(&mut self, name: String, upstream: Vec<String>) {
        self.objects.insert(name, upstream);
    }

    /// Add one `name -> upstream` edge, creating the node if needed and
    /// skipping the edge if it is already recorded.
    pub fn add_edge(&mut self, name: &str, upstream: &str) {
        let deps = self.objects.entry(name.to_owned()).or_default();
        if !deps.iter().any(|dep| dep == upstream) {
            deps.push(upstream.to_owned());
        }
    }

    /// Fold another graph into this one: new keys append in their order,
    /// existing keys accumulate the other graph's edges (deduplicated).
    pub fn merge(&mut self, other: &DependencyGraph) {
        for (name, upstream) in &other.objects {
            self.objects.entry(name.clone()).or_default();
            for dep in upstream {
                self.add_edge(name, dep);
            }
        }
    }

    /// Merge `object,upstream` adjacency rows into this graph (the second
    /// column is the depended-upon object). Blank lines are skipped; a row
    /// without exactly two columns is a hard error.
    pub fn merge_csv(&mut self, content: &str) -> anyhow::Result<()> {
        for (line_idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut columns = line.split(',');
            match (columns.next(), columns.next(), columns.next()) {
                (Some(object), Some(upstream), None) => {
                    self.add_edge(object.trim(), upstream.trim());
                }
                _ => {
                    return Err(anyhow!(
                        "Expected an `object,upstream` pair on line {}, got: {}",
                        line_idx + 1,
                        line
                    ));
                }
            }
        }
        Ok(())
    }

    /// Restrict the graph to `root` and everything transitively upstream of
    /// it, each kept node keeping its full recorded dependency list.
    ///
    /// The included set grows monotonically and is bounded by the number of
    /// distinct names, so the scan terminates on cyclic graphs too; a name
    /// that is never a key (a leaf source, or an unknown root) contributes
    /// no entry of its own.
    pub fn lineage(&self, root: &str) -> anyhow::Result<DependencyGraph> {
        if root.trim().is_empty() {
            return Err(anyhow!("Cannot compute the lineage of an empty object name"));
        }

        let mut included: IndexSet<&str> = IndexSet::new();
        included.insert(root);
        for _ in 0..=self.objects.len() {
            let before = included.len();
            for (name, upstream) in &self.objects {
                if included.contains(name.as_str()) {
                    for dep in upstream {
                        included.insert(dep.as_str());
                    }
                }
            }
            if included.len() == before {
                break;
            }
        }

        let mut filtered = DependencyGraph::new();
        for name in included {
            if let Some(upstream) = self.objects.get(name) {
                filtered.objects.insert(name.to_owned(), upstream.clone());
            }
        }
        Ok(filtered)
    }
}

impl From<IndexMap<String, Vec<String>>> for DependencyGraph {
    fn from(objects: IndexMap<String, Vec<String>>) -> Self {
        Self { objects }
    }
}

impl FromIterator<(String, Vec<String>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(entries: &[(&str, &[&str])]) -> DependencyGraph {
        entries
            .iter()
            .map(|(name, upstream)| {
                (
                    (*name).to_owned(),
                    upstream.iter().map(|dep| (*dep).to_owned()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_merge_accumulates_edges_without_duplicates() {
        let mut left = graph(&[("a", &["b"]), ("c", &[])]);
        let right = graph(&[("a", &["b", "d"]), ("e", &["a"])]);
        left.merge(&right);
        assert_eq!(left, graph(&[("a", &["b", "d"]), ("c", &[]), ("e", &["a"])]));
    }

    #[test]
    fn test_merge_csv_rows() {
        let mut g = DependencyGraph::new();
        g.merge_csv("fact_orders,raw_orders\nfact_orders,raw_customers\n\nraw_orders,s3_landing\n")
            .unwrap();
        assert_eq!(
            g.get("fact_orders"),
            Some(["raw_orders".to_owned(), "raw_customers".to_owned()].as_slice())
        );
        assert_eq!(g.get("raw_orders"), Some(["s3_landing".to_owned()].as_slice()));
    }

    #[test]
    fn test_merge_csv_rejects_malformed_rows() {
        let mut g = DependencyGraph::new();
        assert!(g.merge_csv("a,b\nc\n").is_err());
        assert!(g.merge_csv("a,b,c\n").is_err());
    }

    #[test]
    fn test_lineage_survives_cycles() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let closure = g.lineage("a").unwrap();
        assert_eq!(closure, g);
    }

    #[test]
    fn test_lineage_of_unknown_root_is_empty() {
        let g = graph(&[("a", &["b"])]);
        assert!(g.lineage("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_lineage_rejects_empty_root() {
        let g = graph(&[("a", &["b"])]);
        assert!(g.lineage("").is_err());
        assert!(g.lineage("  ").is_err());
    }
}
