use noesis::graph::{
    load_graph, save_graph, Concept, ConceptGraph, ConceptId, ConceptType, GraphError, Relationship,
};

fn sample() -> ConceptGraph {
    let mut graph = ConceptGraph::new();
    graph
        .add_concept(Concept::new("a", "Graph Neural Network", ConceptType::Method).with_description("GNN"))
        .unwrap();
    graph.add_concept(Concept::new("b", "Percolation", ConceptType::Theory)).unwrap();
    graph.add_concept(Concept::new("c", "Porous Media", ConceptType::Material)).unwrap();
    graph
        .add_relationship(Relationship::new("a", "c", "applied_to").with_confidence(0.8))
        .unwrap();
    graph
        .add_relationship(Relationship::new("b", "c", "describes").with_context("flow through pores"))
        .unwrap();
    graph
}

#[test]
fn test_integrity_violations_leave_state_intact() {
    let mut graph = sample();

    let dup = graph.add_concept(Concept::new("a", "Other", ConceptType::Theory));
    assert_eq!(dup, Err(GraphError::DuplicateId(ConceptId::new("a"))));
    assert_eq!(graph.concept(&"a".into()).unwrap().name, "Graph Neural Network");

    let missing = graph.add_relationship(Relationship::new("a", "zzz", "uses"));
    assert!(matches!(missing, Err(GraphError::MissingEndpoint { .. })));

    let self_loop = graph.add_relationship(Relationship::new("a", "a", "uses"));
    assert!(matches!(self_loop, Err(GraphError::SelfLoop(_))));

    let bad_confidence = graph.add_relationship(Relationship::new("a", "b", "uses").with_confidence(1.5));
    assert!(matches!(bad_confidence, Err(GraphError::InvalidConfidence(_))));

    assert_eq!(graph.concept_count(), 3);
    assert_eq!(graph.relationship_count(), 2);
    assert!(!graph.are_adjacent(&"a".into(), &"b".into()));
}

#[test]
fn test_undirected_neighbor_view() {
    let mut graph = sample();
    // Parallel edge in the opposite direction
    graph.add_relationship(Relationship::new("c", "a", "enables")).unwrap();

    assert_eq!(graph.relationship_count(), 3);
    assert_eq!(graph.degree(&"a".into()), 1);
    assert_eq!(graph.degree(&"c".into()), 2);
    assert_eq!(graph.common_neighbors(&"a".into(), &"b".into()), vec![ConceptId::new("c")]);
    assert_eq!(graph.degree(&"unknown".into()), 0);
}

#[test]
fn test_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("graph.json");

    let graph = sample();
    save_graph(&graph, &path).unwrap();
    let (loaded, report) = load_graph(&path).unwrap();

    assert_eq!(report.concepts_added, 3);
    assert_eq!(report.relationships_added, 2);
    assert_eq!(report.concepts_skipped + report.relationships_skipped, 0);
    assert_eq!(loaded.sorted_ids(), graph.sorted_ids());
    assert_eq!(loaded.relationships(), graph.relationships());
    assert_eq!(loaded.concept(&"a".into()).unwrap().description, "GNN");
}

#[test]
fn test_load_skips_malformed_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extracted.json");
    std::fs::write(
        &path,
        r#"{
          "entities": [
            {"name": "Soil Microbiome", "type": "material"},
            {"id": "ml", "name": "Machine Learning", "type": "technique"},
            {"id": "ml", "name": "Duplicate", "type": "method"}
          ],
          "relationships": [
            {"source": "ml", "target": "Soil Microbiome", "type": "applied_to", "confidence": 0.7},
            {"source": "ml", "target": "missing", "type": "uses", "confidence": 0.5},
            {"source": "ml", "target": "ml", "type": "uses", "confidence": 0.5}
          ]
        }"#,
    )
    .unwrap();

    let (graph, report) = load_graph(&path).unwrap();
    assert_eq!(report.concepts_added, 2);
    assert_eq!(report.concepts_skipped, 1);
    assert_eq!(report.relationships_added, 1);
    assert_eq!(report.relationships_skipped, 2);

    // Id defaults to the name; unknown labels map to Unknown
    assert!(graph.contains(&"Soil Microbiome".into()));
    assert_eq!(graph.concept(&"ml".into()).unwrap().concept_type, ConceptType::Unknown);
}
