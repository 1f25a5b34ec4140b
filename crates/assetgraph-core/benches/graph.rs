use assetgraph_core::definition::AssetDefinition;
use assetgraph_core::graph::{build_graph_data, find_cycle_groups, has_cycles};
use assetgraph_core::key::AssetKey;
use assetgraph_core::live::{
    AssetLatestInfo, LatestRun, LiveAssetNode, MaterializationEvent, RunStatus, build_live_data,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const SIZES: [usize; 3] = [1_000, 10_000, 50_000];

fn key(i: usize) -> AssetKey {
    AssetKey::new(["bench".to_string(), format!("asset_{i}")])
}

/// Layered DAG: each asset depends on up to three assets from earlier layers.
fn layered_definitions(n: usize) -> Vec<AssetDefinition> {
    (0..n)
        .map(|i| {
            let deps = [i / 2, i / 3, i.saturating_sub(7)]
                .into_iter()
                .filter(|&d| d < i)
                .map(key);
            AssetDefinition::new(key(i))
                .with_dependencies(deps)
                .with_op_names([format!("op_{i}")])
        })
        .collect()
}

fn live_feed(n: usize) -> (Vec<LiveAssetNode>, Vec<AssetLatestInfo>) {
    let nodes = (0..n)
        .map(|i| LiveAssetNode {
            asset_key: key(i),
            op_names: vec![format!("op_{i}")],
            asset_materializations: vec![MaterializationEvent {
                timestamp: "1700000000000".to_string(),
                run_id: format!("run_{}", i % 97),
            }],
            ..LiveAssetNode::default()
        })
        .collect();
    let infos = (0..n)
        .map(|i| AssetLatestInfo {
            asset_key: key(i),
            latest_run: Some(LatestRun {
                id: format!("run_{}", i % 89),
                status: if i % 5 == 0 {
                    RunStatus::Failure
                } else {
                    RunStatus::Success
                },
            }),
            ..AssetLatestInfo::default()
        })
        .collect();
    (nodes, infos)
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");

    for n in SIZES {
        let defs = layered_definitions(n);
        let graph = build_graph_data(&defs);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("build", n), &defs, |b, defs| {
            b.iter(|| black_box(build_graph_data(defs)));
        });

        group.bench_with_input(BenchmarkId::new("has_cycles", n), &graph, |b, graph| {
            b.iter(|| black_box(has_cycles(graph)));
        });

        group.bench_with_input(BenchmarkId::new("cycle_groups", n), &graph, |b, graph| {
            b.iter(|| black_box(find_cycle_groups(graph)));
        });
    }

    group.finish();
}

fn bench_live(c: &mut Criterion) {
    let mut group = c.benchmark_group("live");

    for n in SIZES {
        let (nodes, infos) = live_feed(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(
            BenchmarkId::new("build_live_data", n),
            &(nodes, infos),
            |b, (nodes, infos)| b.iter(|| black_box(build_live_data(nodes, infos))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_graph, bench_live);
criterion_main!(benches);
