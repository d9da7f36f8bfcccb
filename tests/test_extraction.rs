use indexmap::IndexMap;
use serde::Deserialize;
use sqlineage::deps::extract_script_lineage;
use sqlineage::graph::DependencyGraph;

#[derive(Deserialize, Debug)]
struct ExtractionTest {
    sql: String,
    graph: IndexMap<String, Vec<String>>,
}

#[derive(Deserialize, Debug)]
struct ExtractionTestData {
    tests: Vec<ExtractionTest>,
}

const EXTRACTION_TESTS_FILE: &str = "tests/extraction_tests.toml";

#[test]
fn test_extraction() {
    let extraction_data_file =
        std::fs::read_to_string(EXTRACTION_TESTS_FILE).expect("Cannot open extraction test cases");
    let test_data: ExtractionTestData =
        toml::from_str(&extraction_data_file).expect("Cannot parse test cases defined in toml");

    for test in test_data.tests {
        println!("Testing extraction for SQL: {}", &test.sql);
        let graph = extract_script_lineage(&test.sql);
        let expected: DependencyGraph = test.graph.into();
        assert_eq!(graph, expected);
    }
}
