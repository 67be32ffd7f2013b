use std::{
    fmt::Debug,
    iter::{Product, Sum},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use rand::RngCore;

/// A prime field element as seen by the vector engines.
///
/// Engines only need the ring operations (owned and borrowed right hand
/// sides), folding via `Sum`/`Product`, and the two identities. Everything
/// else here exists for tests and for the concrete fields themselves.
pub trait Field:
    Copy
    + Debug
    + Default
    + PartialEq
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + Sum
    + Product
    + for<'a> Sum<&'a Self>
    + for<'a> Product<&'a Self>
{
    /// Human readable name, used in test and bench labels.
    const NAME: &'static str;

    const ZERO: Self;

    const ONE: Self;

    #[inline(always)]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline(always)]
    fn one() -> Self {
        Self::ONE
    }

    #[inline(always)]
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Sample an element. Not guaranteed uniform; tests and benches only.
    fn random_unsafe(rng: impl RngCore) -> Self;

    /// Embed an integer, reduced modulo the characteristic.
    fn from_u64(v: u64) -> Self;

    #[inline(always)]
    fn square(&self) -> Self {
        *self * self
    }

    /// Square-and-multiply exponentiation.
    fn pow(&self, mut exp: u64) -> Self {
        let mut base = *self;
        let mut acc = Self::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                acc *= base;
            }
            base = base.square();
            exp >>= 1;
        }
        acc
    }

    /// Multiplicative inverse, `None` for zero.
    fn inv(&self) -> Option<Self>;
}
