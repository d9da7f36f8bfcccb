use indexmap::IndexMap;
use serde::Deserialize;
use sqlineage::graph::DependencyGraph;

#[derive(Deserialize, Debug)]
struct LineageTest {
    root: String,
    graph: IndexMap<String, Vec<String>>,
    lineage: IndexMap<String, Vec<String>>,
}

#[derive(Deserialize, Debug)]
struct LineageTestData {
    tests: Vec<LineageTest>,
}

const LINEAGE_TESTS_FILE: &str = "tests/lineage_tests.toml";

#[test]
fn test_lineage() {
    let lineage_data_file =
        std::fs::read_to_string(LINEAGE_TESTS_FILE).expect("Cannot open lineage test cases");
    let test_data: LineageTestData =
        toml::from_str(&lineage_data_file).expect("Cannot parse test cases defined in toml");

    for test in test_data.tests {
        println!("Testing lineage for root: {}", &test.root);
        let graph: DependencyGraph = test.graph.into();
        let lineage = graph
            .lineage(&test.root)
            .unwrap_or_else(|err| panic!("Could not compute lineage due to: {}", err));
        let expected: DependencyGraph = test.lineage.into();
        assert_eq!(lineage, expected);
    }
}

#[test]
fn test_lineage_closure_is_bounded_by_graph_size() {
    // Termination on a long chain: every node shows up after at most one
    // pass per node, cycles included.
    let mut objects: IndexMap<String, Vec<String>> = IndexMap::new();
    for i in 0..50 {
        objects.insert(format!("n{}", i), vec![format!("n{}", i + 1)]);
    }
    objects.insert("n50".to_owned(), vec!["n0".to_owned()]);
    let graph: DependencyGraph = objects.into();

    let closure = graph.lineage("n0").unwrap();
    assert_eq!(closure.len(), 51);
}
