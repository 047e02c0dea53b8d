use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kd_index::{KdTree, KdTreeBuilder, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;

fn generate_points(n: usize) -> Vec<[f64; 2]> {
    // Fixed the seed for reproducibility
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| [rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)])
        .collect()
}

fn construct_kdtree(coords: &[[f64; 2]]) -> KdTree<f64, 2> {
    let mut builder = KdTreeBuilder::with_capacity(coords.len());
    for coord in coords {
        builder.add_coords(*coord);
    }
    builder.finish().unwrap()
}

fn construct_kdtree_by_insertion(coords: &[[f64; 2]]) -> KdTree<f64, 2> {
    let mut tree = KdTree::new();
    for coord in coords {
        tree.insert(Point::new(*coord)).unwrap();
    }
    tree
}

fn construct_rstar(coords: Vec<[f64; 2]>) -> RTree<[f64; 2]> {
    RTree::bulk_load(coords)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    for size in [10_000, 100_000] {
        let coords = generate_points(size);

        let mut group = c.benchmark_group("construction");
        group.bench_with_input(BenchmarkId::new("kd-index", size), &coords, |b, coords| {
            b.iter(|| construct_kdtree(coords))
        });
        group.bench_with_input(
            BenchmarkId::new("kd-index insertion", size),
            &coords,
            |b, coords| b.iter(|| construct_kdtree_by_insertion(coords)),
        );
        group.bench_with_input(BenchmarkId::new("rstar bulk", size), &coords, |b, coords| {
            b.iter(|| construct_rstar(coords.to_vec()))
        });
        group.finish();

        let kdtree = construct_kdtree(&coords);
        let rstar_tree = construct_rstar(coords.to_vec());
        let query = [0.0, 0.0];

        let mut group = c.benchmark_group("knn");
        for k in [1, 10] {
            group.bench_function(BenchmarkId::new(format!("kd-index k={}", k), size), |b| {
                b.iter(|| kdtree.nearest_neighbors(&Point::new(query), k))
            });
            group.bench_function(BenchmarkId::new(format!("rstar k={}", k), size), |b| {
                b.iter(|| {
                    rstar_tree
                        .nearest_neighbor_iter(&query)
                        .take(k)
                        .collect::<Vec<_>>()
                })
            });
            group.bench_function(
                BenchmarkId::new(format!("brute force k={}", k), size),
                |b| {
                    b.iter(|| {
                        let query = Point::new(query);
                        let mut sorted: Vec<Point<f64, 2>> =
                            coords.iter().map(|c| Point::new(*c)).collect();
                        sorted.sort_by(|a, b| {
                            a.squared_distance(&query)
                                .total_cmp(&b.squared_distance(&query))
                        });
                        sorted.truncate(k);
                        sorted
                    })
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
