//! Shared helpers for tests: reference data and a linear-scan search to check results against.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::point::Point;
use crate::r#type::IndexableNum;

/// Uniformly random points in `[-100, 100)` on every axis, from a fixed seed.
pub(crate) fn random_points<const D: usize>(num_items: usize, seed: u64) -> Vec<Point<f64, D>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_items)
        .map(|_| Point::new(std::array::from_fn(|_| rng.gen_range(-100.0..100.0))))
        .collect()
}

/// Random integer points in `[-range, range)` on every axis; small ranges produce many ties.
pub(crate) fn random_int_points<const D: usize>(
    num_items: usize,
    range: i32,
    seed: u64,
) -> Vec<Point<i32, D>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_items)
        .map(|_| Point::new(std::array::from_fn(|_| rng.gen_range(-range..range))))
        .collect()
}

pub(crate) fn scenario_points() -> Vec<Point<f64, 3>> {
    vec![
        Point::new([0.0, 1.0, 1.0]),
        Point::new([-1.0, -5.0, -2.0]),
        Point::new([2.0, -1.0, 0.0]),
        Point::new([-2.0, 1.0, 1.0]),
        Point::new([4.0, 2.0, 1.0]),
        Point::new([-3.0, -1.0, -1.0]),
    ]
}

/// The `k` points nearest to `query` by sorting all of them.
pub(crate) fn brute_force<N: IndexableNum, const D: usize>(
    points: &[Point<N, D>],
    query: &Point<N, D>,
    k: usize,
) -> Vec<Point<N, D>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        a.squared_distance(query)
            .partial_cmp(&b.squared_distance(query))
            .unwrap()
    });
    sorted.truncate(k);
    sorted
}

/// Squared distances of `points` to `query`, in order.
pub(crate) fn distances<N: IndexableNum, const D: usize>(
    points: &[Point<N, D>],
    query: &Point<N, D>,
) -> Vec<N> {
    points.iter().map(|p| p.squared_distance(query)).collect()
}
