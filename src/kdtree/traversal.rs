//! Utilities to traverse the KdTree structure.

use tinyvec::TinyVec;

use crate::kdtree::KdTree;
use crate::point::Point;
use crate::r#type::IndexableNum;

/// A read-only view of one node in a [`KdTree`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a, N: IndexableNum, const D: usize> {
    /// The tree that this node is a reference onto
    tree: &'a KdTree<N, D>,

    /// Position of this node in the tree's node storage
    id: usize,
}

impl<'a, N: IndexableNum, const D: usize> Node<'a, N, D> {
    pub(crate) fn from_root(tree: &'a KdTree<N, D>) -> Option<Self> {
        tree.root.map(|id| Self { tree, id })
    }

    #[inline]
    fn with_id(&self, id: usize) -> Self {
        Self {
            tree: self.tree,
            id,
        }
    }

    /// The point stored at this node.
    pub fn point(&self) -> &'a Point<N, D> {
        &self.tree.nodes[self.id].point
    }

    /// The axis this node splits its children over.
    pub fn split_axis(&self) -> usize {
        self.tree.nodes[self.id].split
    }

    /// The child holding points that are smaller on [`Node::split_axis`].
    pub fn left_child(&self) -> Option<Self> {
        self.tree.nodes[self.id].left.map(|id| self.with_id(id))
    }

    /// The child holding points that are greater or equal on [`Node::split_axis`].
    pub fn right_child(&self) -> Option<Self> {
        self.tree.nodes[self.id].right.map(|id| self.with_id(id))
    }

    /// The parent of this node, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.tree.nodes[self.id].parent.map(|id| self.with_id(id))
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.tree.nodes[self.id].is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// All points in the subtree rooted at this node, including its own.
    pub fn subtree_points(&self) -> Vec<&'a Point<N, D>> {
        let mut result = vec![];

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[usize; 33]> = TinyVec::new();
        stack.push(self.id);
        while let Some(id) = stack.pop() {
            let node = &self.tree.nodes[id];
            result.push(&node.point);
            stack.extend(node.left);
            stack.extend(node.right);
        }

        result
    }
}

impl<N: IndexableNum, const D: usize> PartialEq for Node<'_, N, D> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<N: IndexableNum, const D: usize> KdTree<N, D> {
    /// Access the root node of the tree for manual traversal, `None` when empty.
    pub fn root(&self) -> Option<Node<'_, N, D>> {
        Node::from_root(self)
    }
}
