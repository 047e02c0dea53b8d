#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod point;
mod r#type;

pub use error::{KdIndexError, Result};
pub use kdtree::{KdTree, KdTreeBuilder, Neighbor};
pub use point::Point;
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
