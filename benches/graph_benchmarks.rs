use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use noesis::algo::{self, LouvainConfig, SimilarityMetric};
use noesis::analytics::GraphAnalytics;
use noesis::graph::{Concept, ConceptGraph, ConceptType, Relationship};
use noesis::predict::{LinkPredictor, PredictionOptions};

const TYPES: [ConceptType; 6] = [
    ConceptType::Method,
    ConceptType::Material,
    ConceptType::Phenomenon,
    ConceptType::Theory,
    ConceptType::Measurement,
    ConceptType::Application,
];

/// Clustered synthetic graph: dense clusters of 20 concepts plus sparse
/// cross-cluster links
fn synthetic_graph(size: usize) -> ConceptGraph {
    let mut graph = ConceptGraph::new();
    for i in 0..size {
        let _ = graph.add_concept(Concept::new(format!("c{}", i), format!("Concept {}", i), TYPES[i % TYPES.len()]));
    }

    let mut state: u64 = 42;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    for i in 0..size {
        let cluster = i / 20;
        for _ in 0..3 {
            let j = cluster * 20 + next() % 20;
            if j < size && j != i {
                let _ = graph.add_relationship(Relationship::new(format!("c{}", i), format!("c{}", j), "related_to"));
            }
        }
        if next() % 10 == 0 {
            let j = next() % size;
            if j != i {
                let _ = graph.add_relationship(Relationship::new(format!("c{}", i), format!("c{}", j), "cites"));
            }
        }
    }
    graph
}

/// Benchmark exhaustive vs pruned link prediction
fn bench_link_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_prediction");

    for size in [100, 500, 2000].iter() {
        let graph = synthetic_graph(*size);
        let predictor = LinkPredictor::new(&graph);

        for (label, min_similarity) in [("exhaustive", 0.0), ("pruned", 1e-9)] {
            let options = PredictionOptions {
                method: SimilarityMetric::AdamicAdar,
                top_n: 30,
                min_similarity,
                ..Default::default()
            };
            group.bench_with_input(BenchmarkId::new(label, size), size, |b, _| {
                b.iter(|| {
                    let links = predictor.predict(&options);
                    criterion::black_box(links.len());
                });
            });
        }
    }
    group.finish();
}

/// Benchmark Louvain community detection on the dense view
fn bench_louvain(c: &mut Criterion) {
    let mut group = c.benchmark_group("louvain");

    for size in [100, 1000, 5000].iter() {
        let graph = synthetic_graph(*size);
        let view = algo::build_view(&graph);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let result = algo::louvain(&view.view, LouvainConfig::default());
                criterion::black_box(result.modularity);
            });
        });
    }
    group.finish();
}

/// Benchmark the full per-layer analysis
fn bench_graph_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_analysis");
    group.sample_size(10);

    for size in [100, 1000].iter() {
        let graph = synthetic_graph(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let analysis = GraphAnalytics::new(&graph).analyze();
                criterion::black_box(analysis.num_communities);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_link_prediction, bench_louvain, bench_graph_analysis);
criterion_main!(benches);
