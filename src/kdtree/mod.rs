//! A pointer-free k-d tree supporting batch construction, insertion and exact k-nearest-neighbor
//! search.

#![warn(missing_docs)]

mod builder;
mod index;
mod search;
mod traversal;

pub use builder::KdTreeBuilder;
pub use index::KdTree;
pub use search::Neighbor;
pub use traversal::Node;
