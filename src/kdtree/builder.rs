use std::cmp;

use log::debug;
use tinyvec::TinyVec;

use crate::error::Result;
use crate::kdtree::index::{KdTree, Side, TreeNode};
use crate::point::Point;
use crate::r#type::IndexableNum;

/// A builder to create a [`KdTree`] from a batch of points.
///
/// ```
/// use kd_index::kdtree::KdTreeBuilder;
///
/// let mut builder = KdTreeBuilder::<f64, 2>::with_capacity(3);
/// builder.add_coords([0., 0.]);
/// builder.add_coords([1., 1.]);
/// builder.add_coords([2., 2.]);
/// let tree = builder.finish().unwrap();
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct KdTreeBuilder<N: IndexableNum, const D: usize> {
    points: Vec<Point<N, D>>,
}

impl<N: IndexableNum, const D: usize> KdTreeBuilder<N, D> {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new builder with room for `num_items` points.
    pub fn with_capacity(num_items: usize) -> Self {
        assert!(D > 0, "Points must have at least one dimension.");
        Self {
            points: Vec::with_capacity(num_items),
        }
    }

    /// Start from an owned batch of points without copying them.
    pub(crate) fn from_points(points: Vec<Point<N, D>>) -> Self {
        assert!(D > 0, "Points must have at least one dimension.");
        Self { points }
    }

    /// Add a point to the index, returning its insertion position.
    pub fn add(&mut self, point: Point<N, D>) -> usize {
        let index = self.points.len();
        self.points.push(point);
        index
    }

    /// Add a point given by its coordinates.
    pub fn add_coords(&mut self, coords: [N; D]) -> usize {
        self.add(Point::new(coords))
    }

    /// Add a point given by a slice of coordinates, which must have length `D`.
    pub fn add_slice(&mut self, coords: &[N]) -> Result<usize> {
        let point = Point::try_from(coords)?;
        Ok(self.add(point))
    }

    /// The number of points added so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points were added.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume this builder, partitioning the points into a [`KdTree`].
    ///
    /// Fails without building anything if any coordinate is NaN.
    pub fn finish(self) -> Result<KdTree<N, D>> {
        for point in self.points.iter() {
            point.validate()?;
        }

        let num_items = self.points.len();
        let tree = build(self.points);
        debug!(
            "Built k-d tree of {} points in {} dimensions, depth {}.",
            num_items,
            D,
            tree.depth()
        );
        Ok(tree)
    }
}

impl<N: IndexableNum, const D: usize> Default for KdTreeBuilder<N, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// A range of the point buffer still waiting to become a subtree.
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    start: usize,
    end: usize,
    level: usize,
    parent: Option<(usize, Side)>,
}

/// Build the tree by median-partitioning `[start, end)` ranges of `points`.
///
/// Ranges are processed off an explicit stack rather than by recursion. Node ids are assigned
/// in creation order, so the root is always node 0.
fn build<N: IndexableNum, const D: usize>(mut points: Vec<Point<N, D>>) -> KdTree<N, D> {
    let num_items = points.len();
    let mut nodes: Vec<TreeNode<N, D>> = Vec::with_capacity(num_items);

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[Pending; 32]> = TinyVec::new();
    if num_items > 0 {
        stack.push(Pending {
            start: 0,
            end: num_items,
            level: 0,
            parent: None,
        });
    }

    while let Some(Pending {
        start,
        end,
        level,
        parent,
    }) = stack.pop()
    {
        let axis = level % D;
        let mid = start + (end - start) / 2;

        // points before mid are <= and points after are >= on this axis
        select(&mut points, mid, start, end - 1, axis);

        let id = nodes.len();
        nodes.push(TreeNode::new(points[mid], axis, parent.map(|(p, _)| p)));
        if let Some((parent_id, side)) = parent {
            nodes[parent_id].set_child(side, id);
        }

        // Note: these are pushed in backwards order to what gets popped
        if mid + 1 < end {
            stack.push(Pending {
                start: mid + 1,
                end,
                level: level + 1,
                parent: Some((id, Side::Right)),
            });
        }
        if start < mid {
            stack.push(Pending {
                start,
                end: mid,
                level: level + 1,
                parent: Some((id, Side::Left)),
            });
        }
    }

    KdTree::from_nodes(nodes)
}

/// Custom Floyd-Rivest selection algorithm: reorder `points[left..=right]` so that items
/// `[left..k-1]` are not greater than the k-th item on `axis` and items `[k+1..=right]` are not
/// smaller.
fn select<N: IndexableNum, const D: usize>(
    points: &mut [Point<N, D>],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(points, k, new_left, new_right, axis);
        }

        let t = points[k].coordinate(axis);
        let mut i = left;
        let mut j = right;

        points.swap(left, k);
        if points[right].coordinate(axis) > t {
            points.swap(left, right);
        }

        while i < j {
            points.swap(i, j);
            i += 1;
            j -= 1;
            while points[i].coordinate(axis) < t {
                i += 1;
            }
            while points[j].coordinate(axis) > t {
                j -= 1;
            }
        }

        if points[left].coordinate(axis) == t {
            points.swap(left, j);
        } else {
            j += 1;
            points.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}
