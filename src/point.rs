//! A fixed-dimension point and the distance primitives used by the k-d tree.

use std::fmt;
use std::ops::Index;

use geo_traits::{CoordTrait, Dimensions};

use crate::error::{KdIndexError, Result};
use crate::r#type::IndexableNum;

/// An immutable point with `D` coordinates of type `N`.
///
/// ```
/// use kd_index::Point;
///
/// let a = Point::new([0.0, 0.0]);
/// let b = Point::new([3.0, 4.0]);
/// assert_eq!(a.squared_distance(&b), 25.0);
/// assert_eq!(a.distance(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Point<N: IndexableNum, const D: usize> {
    coords: [N; D],
}

impl<N: IndexableNum, const D: usize> Point<N, D> {
    /// The number of coordinates of this point type.
    pub const DIMENSION: usize = D;

    /// Create a new point from its coordinates.
    pub const fn new(coords: [N; D]) -> Self {
        Self { coords }
    }

    /// The number of coordinates of this point type.
    pub const fn dimension() -> usize {
        D
    }

    /// The underlying coordinates.
    pub fn coords(&self) -> &[N; D] {
        &self.coords
    }

    /// The coordinate on `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`.
    #[inline]
    pub fn coordinate(&self, axis: usize) -> N {
        assert!(
            axis < D,
            "Axis {} exceeds point dimension {}.",
            axis,
            D
        );
        self.coords[axis]
    }

    /// The coordinate on `axis`, or `None` if `axis >= D`.
    #[inline]
    pub fn get(&self, axis: usize) -> Option<N> {
        self.coords.get(axis).copied()
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// This is monotonic with [`Point::distance`] and is what the tree compares against.
    ///
    /// # Overflow
    ///
    /// The sum is computed in `N`. For integer coordinates it saturates at `N::max_value()`
    /// instead of overflowing, so every distance past that bound compares equal. Pick a
    /// coordinate type wide enough for `D * delta^2` when those points must be ranked.
    #[inline]
    pub fn squared_distance(&self, other: &Self) -> N {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .fold(N::zero(), |acc, (a, b)| {
                acc.saturating_sum(a.abs_delta(*b).saturating_square())
            })
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        to_f64(self.squared_distance(other)).sqrt()
    }

    /// Squared distance between `other` and the hyperplane through this point that is
    /// orthogonal to `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`. Integer results saturate like [`Point::squared_distance`].
    #[inline]
    pub fn squared_split_distance(&self, other: &Self, axis: usize) -> N {
        self.coordinate(axis)
            .abs_delta(other.coordinate(axis))
            .saturating_square()
    }

    /// Distance between `other` and the hyperplane through this point that is orthogonal to
    /// `axis`.
    pub fn split_distance(&self, other: &Self, axis: usize) -> f64 {
        to_f64(self.squared_split_distance(other, axis)).sqrt()
    }

    /// Check that every coordinate can be ordered, returning the first axis that can't.
    pub(crate) fn validate(&self) -> Result<()> {
        match self.coords.iter().position(|c| c.is_unordered()) {
            Some(axis) => Err(KdIndexError::InvalidCoordinate { axis }),
            None => Ok(()),
        }
    }
}

impl<N: IndexableNum> Point<N, 2> {
    /// Create a 2D point from any [`CoordTrait`] implementation.
    pub fn from_coord(coord: &impl CoordTrait<T = N>) -> Self {
        Self::new([coord.x(), coord.y()])
    }
}

#[inline]
fn to_f64<N: IndexableNum>(value: N) -> f64 {
    // All sealed implementors are primitives that always convert.
    value.to_f64().unwrap_or(f64::NAN)
}

impl<N: IndexableNum, const D: usize> PartialEq for Point<N, D> {
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.approx_eq(*b))
    }
}

impl<N: IndexableNum, const D: usize> Index<usize> for Point<N, D> {
    type Output = N;

    fn index(&self, axis: usize) -> &Self::Output {
        assert!(
            axis < D,
            "Axis {} exceeds point dimension {}.",
            axis,
            D
        );
        &self.coords[axis]
    }
}

impl<N: IndexableNum, const D: usize> From<[N; D]> for Point<N, D> {
    fn from(coords: [N; D]) -> Self {
        Self::new(coords)
    }
}

impl<N: IndexableNum, const D: usize> TryFrom<&[N]> for Point<N, D> {
    type Error = KdIndexError;

    fn try_from(value: &[N]) -> Result<Self> {
        let coords: [N; D] = value
            .try_into()
            .map_err(|_| KdIndexError::DimensionMismatch {
                expected: D,
                actual: value.len(),
            })?;
        Ok(Self::new(coords))
    }
}

impl<N: IndexableNum, const D: usize> fmt::Display for Point<N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

impl<N: IndexableNum> CoordTrait for Point<N, 2> {
    type T = N;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.coords[0]
    }

    fn y(&self) -> Self::T {
        self.coords[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        self.coordinate(n)
    }
}

impl<N: IndexableNum> CoordTrait for Point<N, 3> {
    type T = N;

    fn dim(&self) -> Dimensions {
        Dimensions::Xyz
    }

    fn x(&self) -> Self::T {
        self.coords[0]
    }

    fn y(&self) -> Self::T {
        self.coords[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        self.coordinate(n)
    }
}
