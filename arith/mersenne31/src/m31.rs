use std::{
    iter::{Product, Sum},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use arith::{field_common, Field};
use rand::RngCore;

/// 2^31 - 1
pub const M31_MOD: u32 = (1 << 31) - 1;

/// Canonical element of GF(2^31 - 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct M31 {
    pub v: u32,
}

impl M31 {
    /// Fold a value below `2 * M31_MOD` into range.
    #[inline(always)]
    const fn canonical(v: u32) -> Self {
        M31 {
            v: if v >= M31_MOD { v - M31_MOD } else { v },
        }
    }

    /// `2^31 = 1 (mod p)`: fold the bits above 31 back onto the low ones.
    #[inline(always)]
    const fn fold(x: u64) -> u64 {
        (x & M31_MOD as u64) + (x >> 31)
    }
}

field_common!(M31);

impl Field for M31 {
    const NAME: &'static str = "Mersenne 31";

    const ZERO: Self = M31 { v: 0 };

    const ONE: Self = M31 { v: 1 };

    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.v == 0
    }

    fn random_unsafe(mut rng: impl RngCore) -> Self {
        Self::from_u64(rng.next_u64())
    }

    #[inline(always)]
    fn from_u64(v: u64) -> Self {
        // two folds leave less than 2 * M31_MOD
        Self::canonical(Self::fold(Self::fold(v)) as u32)
    }

    fn inv(&self) -> Option<Self> {
        (!self.is_zero()).then(|| self.pow(M31_MOD as u64 - 2))
    }
}

impl From<u32> for M31 {
    #[inline(always)]
    fn from(x: u32) -> Self {
        Self::from_u64(x as u64)
    }
}

impl Neg for M31 {
    type Output = M31;

    #[inline(always)]
    fn neg(self) -> M31 {
        Self::canonical(M31_MOD - self.v)
    }
}

#[inline(always)]
fn add_internal(a: &M31, b: &M31) -> M31 {
    M31::canonical(a.v + b.v)
}

#[inline(always)]
fn sub_internal(a: &M31, b: &M31) -> M31 {
    M31::canonical(a.v + M31_MOD - b.v)
}

#[inline(always)]
fn mul_internal(a: &M31, b: &M31) -> M31 {
    // a product below 2^62 folds to below 2^32
    M31::canonical(M31::fold(a.v as u64 * b.v as u64) as u32)
}
