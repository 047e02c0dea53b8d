use std::fmt;

use log::trace;
use tinyvec::TinyVec;

use crate::error::Result;
use crate::kdtree::builder::KdTreeBuilder;
use crate::point::Point;
use crate::r#type::IndexableNum;

/// Which child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A node stored in the tree arena.
///
/// Links are indices into [`KdTree::nodes`]. `parent` is only ever followed upwards during
/// search; the arena owns every node.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode<N: IndexableNum, const D: usize> {
    pub(crate) point: Point<N, D>,
    pub(crate) split: usize,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    pub(crate) parent: Option<usize>,
}

impl<N: IndexableNum, const D: usize> TreeNode<N, D> {
    pub(crate) fn new(point: Point<N, D>, split: usize, parent: Option<usize>) -> Self {
        Self {
            point,
            split,
            left: None,
            right: None,
            parent,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, id: usize) {
        match side {
            Side::Left => self.left = Some(id),
            Side::Right => self.right = Some(id),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The side a point belongs to: left if strictly less on this node's split axis.
    #[inline]
    pub(crate) fn side_of(&self, point: &Point<N, D>) -> Side {
        if point.coordinate(self.split) < self.point.coordinate(self.split) {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// A k-d tree over points of type `Point<N, D>`.
///
/// Create one with [`KdTreeBuilder`], [`KdTree::from_points`], or start empty with
/// [`KdTree::new`] and [`insert`][KdTree::insert] points one at a time.
#[derive(Debug, Clone)]
pub struct KdTree<N: IndexableNum, const D: usize> {
    pub(crate) nodes: Vec<TreeNode<N, D>>,
    pub(crate) root: Option<usize>,
}

impl<N: IndexableNum, const D: usize> KdTree<N, D> {
    /// Create an empty tree.
    pub fn new() -> Self {
        assert!(D > 0, "Points must have at least one dimension.");
        Self {
            nodes: vec![],
            root: None,
        }
    }

    pub(crate) fn from_nodes(nodes: Vec<TreeNode<N, D>>) -> Self {
        let root = if nodes.is_empty() { None } else { Some(0) };
        Self { nodes, root }
    }

    /// Build a tree from a batch of points.
    ///
    /// Fails if any coordinate is NaN, in which case no tree is built.
    pub fn from_points(points: Vec<Point<N, D>>) -> Result<Self> {
        KdTreeBuilder::from_points(points).finish()
    }

    /// Build a tree from rows of coordinates, each of which must have length `D`.
    pub fn try_from_slices<S: AsRef<[N]>>(rows: &[S]) -> Result<Self> {
        let mut builder = KdTreeBuilder::with_capacity(rows.len());
        for row in rows {
            builder.add_slice(row.as_ref())?;
        }
        builder.finish()
    }

    /// The number of points stored in this tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether this tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of levels of the tree, 0 when empty.
    pub fn depth(&self) -> usize {
        self.levels().len()
    }

    /// Iterate over the stored points in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Point<N, D>> + '_ {
        self.nodes.iter().map(|node| &node.point)
    }

    /// A copy of every stored point, in storage order.
    pub fn points(&self) -> Vec<Point<N, D>> {
        self.iter().copied().collect()
    }

    /// Whether a point equal to `point` is stored in this tree.
    ///
    /// Both subtrees of a node are searched when `point` ties with the node on its split axis,
    /// since batch construction may place equal coordinates on either side.
    pub fn contains(&self, point: &Point<N, D>) -> bool {
        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[usize; 33]> = TinyVec::new();
        stack.extend(self.root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.point == *point {
                return true;
            }

            let value = point.coordinate(node.split);
            let split_value = node.point.coordinate(node.split);
            if value.approx_eq(split_value) {
                stack.extend(node.left);
                stack.extend(node.right);
            } else {
                stack.extend(node.child(node.side_of(point)));
            }
        }

        false
    }

    /// Insert a single point without rebalancing.
    ///
    /// Returns `Ok(false)` and leaves the tree untouched if an equal point is already stored.
    /// Otherwise the point descends like a query and is attached where the path ends; the new
    /// node's split axis follows the axis of the node it is attached to.
    ///
    /// ```
    /// use kd_index::{KdTree, Point};
    ///
    /// let mut tree = KdTree::new();
    /// assert!(tree.insert(Point::new([1, 2])).unwrap());
    /// assert!(tree.insert(Point::new([3, 0])).unwrap());
    /// assert!(!tree.insert(Point::new([1, 2])).unwrap());
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, point: Point<N, D>) -> Result<bool> {
        point.validate()?;

        let Some(mut current) = self.root else {
            self.nodes.push(TreeNode::new(point, 0, None));
            self.root = Some(0);
            trace!("Inserted {} as root.", point);
            return Ok(true);
        };

        if self.contains(&point) {
            trace!("Skipped duplicate {}.", point);
            return Ok(false);
        }

        loop {
            let node = &self.nodes[current];
            let side = node.side_of(&point);
            match node.child(side) {
                Some(child) => current = child,
                None => {
                    let split = (node.split + 1) % D;
                    let id = self.nodes.len();
                    self.nodes.push(TreeNode::new(point, split, Some(current)));
                    self.nodes[current].set_child(side, id);
                    trace!("Inserted {} under node {} on axis {}.", point, current, split);
                    return Ok(true);
                }
            }
        }
    }

    /// The node ids of each level, top down.
    pub(crate) fn levels(&self) -> Vec<Vec<usize>> {
        let mut levels = vec![];
        let mut level: Vec<usize> = self.root.into_iter().collect();
        while !level.is_empty() {
            let next = level
                .iter()
                .flat_map(|&id| {
                    let node = &self.nodes[id];
                    node.left.into_iter().chain(node.right)
                })
                .collect();
            levels.push(level);
            level = next;
        }
        levels
    }
}

impl<N: IndexableNum, const D: usize> Default for KdTree<N, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Level-order dump: the points of a level joined by `", "`, one level per line.
impl<N: IndexableNum, const D: usize> fmt::Display for KdTree<N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, level) in self.levels().iter().enumerate() {
            if depth > 0 {
                writeln!(f)?;
            }
            for (i, id) in level.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.nodes[*id].point)?;
            }
        }
        Ok(())
    }
}
