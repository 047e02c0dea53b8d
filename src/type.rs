use std::fmt::{Debug, Display};

use num_traits::{Bounded, Num, NumCast, ToPrimitive};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Every implementor is
/// either a primitive integer, which compares exactly, or a primitive float, which compares
/// within a small relative tolerance (see [`IndexableNum::approx_eq`]).
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + ToPrimitive
    + PartialOrd
    + Copy
    + Debug
    + Display
    + Send
    + Sync
    + Bounded
{
    /// Equality used when comparing points.
    ///
    /// Integers compare exactly. Floats compare with a tolerance of 5 ULP scaled by the
    /// magnitude of `self + other`.
    fn approx_eq(self, other: Self) -> bool;

    /// Returns `true` if this value cannot be ordered (NaN).
    fn is_unordered(self) -> bool;

    /// The absolute difference `|self - other|`, without underflowing unsigned types.
    ///
    /// Integers saturate at [`Bounded::max_value`] when the difference does not fit.
    #[inline]
    fn abs_delta(self, other: Self) -> Self {
        if self > other {
            self - other
        } else {
            other - self
        }
    }

    /// `self * self`. Integers saturate at [`Bounded::max_value`].
    fn saturating_square(self) -> Self;

    /// `self + other` for non-negative values. Integers saturate at [`Bounded::max_value`].
    fn saturating_sum(self, other: Self) -> Self;
}

/// Number of units in the last place allowed between two equal floats.
const FLOAT_EQ_ULPS: u8 = 5;

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(
            impl IndexableNum for $t {
                #[inline]
                fn approx_eq(self, other: Self) -> bool {
                    self == other
                }

                #[inline]
                fn is_unordered(self) -> bool {
                    false
                }

                #[inline]
                fn abs_delta(self, other: Self) -> Self {
                    let delta = if self > other {
                        self.checked_sub(other)
                    } else {
                        other.checked_sub(self)
                    };
                    delta.unwrap_or(<$t as Bounded>::max_value())
                }

                #[inline]
                fn saturating_square(self) -> Self {
                    self.checked_mul(self)
                        .unwrap_or(<$t as Bounded>::max_value())
                }

                #[inline]
                fn saturating_sum(self, other: Self) -> Self {
                    self.checked_add(other)
                        .unwrap_or(<$t as Bounded>::max_value())
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl IndexableNum for $t {
                #[inline]
                fn approx_eq(self, other: Self) -> bool {
                    (other - self).abs()
                        <= <$t>::EPSILON * (other + self).abs() * FLOAT_EQ_ULPS as $t
                }

                #[inline]
                fn is_unordered(self) -> bool {
                    self.is_nan()
                }

                #[inline]
                fn saturating_square(self) -> Self {
                    self * self
                }

                #[inline]
                fn saturating_sum(self, other: Self) -> Self {
                    self + other
                }
            }
        )*
    };
}

impl_integer!(i8, u8, i16, u16, i32, u32, i64, u64);
impl_float!(f32, f64);

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
