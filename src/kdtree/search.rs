use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use geo_traits::CoordTrait;
use log::trace;
#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::kdtree::index::{KdTree, Side};
use crate::point::Point;
use crate::r#type::IndexableNum;

/// A point returned from a nearest-neighbor search, with its squared distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<N: IndexableNum, const D: usize> {
    /// The stored point
    pub point: Point<N, D>,
    /// Squared Euclidean distance from the query to `point`
    pub squared_distance: N,
}

impl<N: IndexableNum, const D: usize> Neighbor<N, D> {
    /// Euclidean distance from the query to this neighbor.
    pub fn distance(&self) -> f64 {
        self.squared_distance
            .to_f64()
            .map(f64::sqrt)
            .unwrap_or(f64::NAN)
    }
}

impl<N: IndexableNum, const D: usize> KdTree<N, D> {
    /// Find the `k` stored points nearest to `query`, nearest first.
    ///
    /// Returns fewer than `k` points only when the tree holds fewer than `k`. Searching with
    /// `k = 0` or on an empty tree returns an empty list.
    ///
    /// ```
    /// use kd_index::{KdTree, Point};
    ///
    /// let tree = KdTree::from_points(vec![
    ///     Point::new([0., 0.]),
    ///     Point::new([5., 5.]),
    ///     Point::new([1., 1.]),
    /// ])
    /// .unwrap();
    ///
    /// let results = tree.nearest_neighbors(&Point::new([4., 4.]), 2);
    /// assert_eq!(results, vec![Point::new([5., 5.]), Point::new([1., 1.])]);
    /// ```
    pub fn nearest_neighbors(&self, query: &Point<N, D>, k: usize) -> Vec<Point<N, D>> {
        self.nearest_neighbors_with_distance(query, k)
            .into_iter()
            .map(|neighbor| neighbor.point)
            .collect()
    }

    /// The single stored point nearest to `query`, if any.
    pub fn nearest_neighbor(&self, query: &Point<N, D>) -> Option<Point<N, D>> {
        self.nearest_neighbors_with_distance(query, 1)
            .first()
            .map(|neighbor| neighbor.point)
    }

    /// Find the `k` stored points nearest to `query` along with their squared distances,
    /// nearest first.
    ///
    /// The search descends to the leaf closest to the query, then walks back towards the root.
    /// At every node it checks whether the splitting plane of the parent is nearer than the
    /// current k-th best candidate, and if so explores the sibling subtree from its own
    /// closest leaf.
    pub fn nearest_neighbors_with_distance(
        &self,
        query: &Point<N, D>,
        k: usize,
    ) -> Vec<Neighbor<N, D>> {
        let Some(root) = self.root else {
            return vec![];
        };
        if k == 0 {
            return vec![];
        }

        let mut candidates = Candidates::new(k);
        let mut visited: HashSet<usize> = HashSet::new();
        let mut current = self.descend(root, query);

        loop {
            let node = &self.nodes[current];

            if !visited.insert(current) {
                // already folded into the candidates, keep backtracking
                match node.parent {
                    Some(parent) => {
                        current = parent;
                        continue;
                    }
                    None => break,
                }
            }

            candidates.offer(current, node.point.squared_distance(query));

            let Some(parent_id) = node.parent else {
                break;
            };
            let parent = &self.nodes[parent_id];
            let plane_dist = parent.point.squared_split_distance(query, parent.split);

            if candidates.may_contain_closer(plane_dist) {
                let sibling = self
                    .sibling(parent_id, current)
                    .filter(|sibling| !visited.contains(sibling));
                if let Some(sibling) = sibling {
                    current = self.descend(sibling, query);
                    continue;
                }
            }

            current = parent_id;
        }

        trace!(
            "k-NN search for {} neighbors visited {} of {} nodes.",
            k,
            visited.len(),
            self.len()
        );

        candidates
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| Neighbor {
                point: self.nodes[candidate.id].point,
                squared_distance: candidate.dist,
            })
            .collect()
    }

    /// Run independent k-NN searches for every query in parallel.
    #[cfg(feature = "rayon")]
    pub fn par_nearest_neighbors(
        &self,
        queries: &[Point<N, D>],
        k: usize,
    ) -> Vec<Vec<Point<N, D>>> {
        queries
            .par_iter()
            .map(|query| self.nearest_neighbors(query, k))
            .collect()
    }

    /// Follow the descent rule from `from` down to a node without children.
    ///
    /// At each node go to the child on the query's side of the split, or to the other child if
    /// that side is empty.
    pub(crate) fn descend(&self, from: usize, query: &Point<N, D>) -> usize {
        let mut current = from;
        loop {
            let node = &self.nodes[current];
            let (near, far) = match node.side_of(query) {
                Side::Left => (node.left, node.right),
                Side::Right => (node.right, node.left),
            };
            match near.or(far) {
                Some(next) => current = next,
                None => return current,
            }
        }
    }

    /// The other child of `parent`, which `child` is a child of.
    #[inline]
    fn sibling(&self, parent: usize, child: usize) -> Option<usize> {
        let parent = &self.nodes[parent];
        if parent.left == Some(child) {
            parent.right
        } else {
            parent.left
        }
    }
}

impl<N: IndexableNum> KdTree<N, 2> {
    /// Find the `k` stored points nearest to the given coordinate, nearest first.
    pub fn nearest_neighbors_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        k: usize,
    ) -> Vec<Point<N, 2>> {
        self.nearest_neighbors(&Point::from_coord(coord), k)
    }
}

/// A node id and its squared distance for use in the candidate heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate<N: IndexableNum> {
    id: usize,
    dist: N,
}

impl<N: IndexableNum> Eq for Candidate<N> {}

impl<N: IndexableNum> Ord for Candidate<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Stored coordinates are never NaN; a NaN query makes every distance compare equal.
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl<N: IndexableNum> PartialOrd for Candidate<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The best `k` candidates seen so far, kept in a max-heap so the worst is on top.
struct Candidates<N: IndexableNum> {
    k: usize,
    heap: BinaryHeap<Candidate<N>>,
}

impl<N: IndexableNum> Candidates<N> {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    #[inline]
    fn beats_worst(&self, dist: N) -> bool {
        self.heap.peek().is_some_and(|worst| dist < worst.dist)
    }

    /// Keep `id` if there is room or it is closer than the current worst.
    fn offer(&mut self, id: usize, dist: N) {
        if !self.is_full() || self.beats_worst(dist) {
            self.heap.push(Candidate { id, dist });
            if self.heap.len() > self.k {
                self.heap.pop();
            }
        }
    }

    /// Whether a subtree at squared distance `bound` could hold a better candidate.
    #[inline]
    fn may_contain_closer(&self, bound: N) -> bool {
        !self.is_full() || self.beats_worst(bound)
    }

    fn into_sorted_vec(self) -> Vec<Candidate<N>> {
        self.heap.into_sorted_vec()
    }
}
