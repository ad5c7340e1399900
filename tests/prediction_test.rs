use noesis::algo::SimilarityMetric;
use noesis::graph::{Concept, ConceptGraph, ConceptId, ConceptType, Relationship};
use noesis::predict::{LinkPredictor, PredictionOptions};

const TYPES: [ConceptType; 4] = [
    ConceptType::Method,
    ConceptType::Theory,
    ConceptType::Material,
    ConceptType::Phenomenon,
];

/// Deterministic pseudo-random graph (LCG) with mixed degrees and types
fn synthetic_graph(n: usize, edges: usize, seed: u64) -> ConceptGraph {
    let mut graph = ConceptGraph::new();
    for i in 0..n {
        graph
            .add_concept(Concept::new(format!("c{:03}", i), format!("Concept {}", i), TYPES[i % TYPES.len()]))
            .unwrap();
    }

    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    for _ in 0..edges {
        let a = next() % n;
        let b = next() % n;
        if a != b {
            let _ = graph.add_relationship(Relationship::new(format!("c{:03}", a), format!("c{:03}", b), "related_to"));
        }
    }
    graph
}

#[test]
fn test_all_metrics_symmetric_and_bounded() {
    let graph = synthetic_graph(30, 60, 7);
    let predictor = LinkPredictor::new(&graph);
    let ids = graph.sorted_ids();

    for metric in SimilarityMetric::ALL {
        for a in &ids {
            for b in &ids {
                let ab = predictor.score(metric, a, b);
                let ba = predictor.score(metric, b, a);
                assert!((ab - ba).abs() < 1e-12, "{} not symmetric for {} {}", metric, a, b);
                assert!(ab >= 0.0);
                if metric == SimilarityMetric::Jaccard {
                    assert!(ab <= 1.0);
                }
                if metric.requires_common_neighbors() && a != b && graph.common_neighbors(a, b).is_empty() {
                    assert_eq!(ab, 0.0);
                }
            }
        }
    }
}

#[test]
fn test_never_proposes_adjacent_or_self_pairs() {
    let graph = synthetic_graph(40, 90, 11);
    let predictor = LinkPredictor::new(&graph);

    for metric in SimilarityMetric::ALL {
        let options = PredictionOptions {
            method: metric,
            top_n: 500,
            ..Default::default()
        };
        let links = predictor.predict(&options);
        assert!(!links.is_empty());
        for link in &links {
            assert!(link.source_id < link.target_id);
            assert!(!graph.are_adjacent(&link.source_id, &link.target_id));
        }
        for pair in links.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_cross_domain_only() {
    let graph = synthetic_graph(40, 90, 3);
    let options = PredictionOptions {
        method: SimilarityMetric::AdamicAdar,
        top_n: 200,
        cross_domain_only: true,
        ..Default::default()
    };
    let links = LinkPredictor::new(&graph).predict(&options);
    assert!(!links.is_empty());
    assert!(links.iter().all(|l| l.source_type != l.target_type));
}

#[test]
fn test_pruning_matches_exhaustive_enumeration() {
    let graph = synthetic_graph(35, 70, 5);
    let predictor = LinkPredictor::new(&graph);

    let exhaustive = predictor.predict(&PredictionOptions {
        method: SimilarityMetric::ResourceAllocation,
        top_n: 1000,
        min_similarity: 0.0,
        ..Default::default()
    });
    let pruned = predictor.predict(&PredictionOptions {
        method: SimilarityMetric::ResourceAllocation,
        top_n: 1000,
        min_similarity: 1e-9,
        ..Default::default()
    });

    let positive: Vec<_> = exhaustive.into_iter().filter(|l| l.score >= 1e-9).collect();
    assert_eq!(positive, pruned);
}

#[test]
fn test_idempotent_on_unchanged_snapshot() {
    let graph = synthetic_graph(30, 50, 13);
    let options = PredictionOptions {
        method: SimilarityMetric::PreferentialAttachment,
        top_n: 25,
        ..Default::default()
    };

    let first = LinkPredictor::new(&graph).predict(&options);
    let second = LinkPredictor::new(&graph.snapshot()).predict(&options);
    assert_eq!(first, second);
    assert_eq!(first.len(), 25);
}

#[test]
fn test_three_concept_example() {
    let mut graph = ConceptGraph::new();
    graph.add_concept(Concept::new("A", "A", ConceptType::Method)).unwrap();
    graph.add_concept(Concept::new("B", "B", ConceptType::Theory)).unwrap();
    graph.add_concept(Concept::new("C", "C", ConceptType::Material)).unwrap();
    graph.add_relationship(Relationship::new("A", "C", "uses")).unwrap();
    graph.add_relationship(Relationship::new("B", "C", "explains")).unwrap();

    let predictor = LinkPredictor::new(&graph);
    assert_eq!(predictor.score(SimilarityMetric::Jaccard, &"A".into(), &"B".into()), 1.0);

    let links = predictor.predict(&PredictionOptions {
        cross_domain_only: true,
        ..Default::default()
    });
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].pair(), ("A".into(), "B".into()));
    assert_eq!(links[0].common_neighbors, vec![ConceptId::new("C")]);
}

#[test]
fn test_focus_concepts() {
    let graph = synthetic_graph(30, 60, 17);
    let predictor = LinkPredictor::new(&graph);
    let focus: Vec<ConceptId> = vec!["c000".into(), "c001".into(), "does-not-exist".into()];
    let options = PredictionOptions {
        top_n: 8,
        ..Default::default()
    };

    let links = predictor.predict_for_concepts(&focus, 3, &options);
    assert!(links.len() <= 6);
    for link in &links {
        assert!(focus.contains(&link.source_id) || focus.contains(&link.target_id));
        assert!(!graph.are_adjacent(&link.source_id, &link.target_id));
    }
    let mut pairs: Vec<_> = links.iter().map(|l| l.pair()).collect();
    pairs.sort();
    pairs.dedup();
    assert_eq!(pairs.len(), links.len());
}
