use std::{
    iter::{Product, Sum},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use arith::{field_common, Field};
use rand::RngCore;

/// 2^64 - 2^32 + 1
pub const GOLDILOCKS_MOD: u64 = 0xFFFF_FFFF_0000_0001;

/// 2^64 mod p, i.e. 2^32 - 1
pub const EPSILON: u64 = 0xFFFF_FFFF;

/// Canonical element of the Goldilocks field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Goldilocks {
    pub v: u64,
}

impl Goldilocks {
    /// Any `u64` is below `2p`, so one conditional subtraction suffices.
    #[inline(always)]
    const fn canonical(v: u64) -> Self {
        Goldilocks {
            v: if v >= GOLDILOCKS_MOD {
                v - GOLDILOCKS_MOD
            } else {
                v
            },
        }
    }

    /// Reduce a 128-bit value with `2^64 = EPSILON` and `2^96 = -1`.
    #[inline(always)]
    fn reduce128(x: u128) -> Self {
        let lo = x as u64;
        let hi = (x >> 64) as u64;
        let (hi_hi, hi_lo) = (hi >> 32, hi & EPSILON);

        // hi_hi * 2^96 = -hi_hi
        let (mut t, borrow) = lo.overflowing_sub(hi_hi);
        if borrow {
            t = t.wrapping_sub(EPSILON);
        }
        // hi_lo * 2^64 = hi_lo * EPSILON
        let (t, carry) = t.overflowing_add(hi_lo * EPSILON);
        Self::canonical(if carry { t.wrapping_add(EPSILON) } else { t })
    }
}

field_common!(Goldilocks);

impl Field for Goldilocks {
    const NAME: &'static str = "Goldilocks";

    const ZERO: Self = Goldilocks { v: 0 };

    const ONE: Self = Goldilocks { v: 1 };

    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.v == 0
    }

    fn random_unsafe(mut rng: impl RngCore) -> Self {
        Self::from_u64(rng.next_u64())
    }

    #[inline(always)]
    fn from_u64(v: u64) -> Self {
        Self::canonical(v)
    }

    fn inv(&self) -> Option<Self> {
        (!self.is_zero()).then(|| self.pow(GOLDILOCKS_MOD - 2))
    }
}

impl Neg for Goldilocks {
    type Output = Goldilocks;

    #[inline(always)]
    fn neg(self) -> Goldilocks {
        Self::canonical(GOLDILOCKS_MOD - self.v)
    }
}

#[inline(always)]
fn add_internal(a: &Goldilocks, b: &Goldilocks) -> Goldilocks {
    // a wrapped sum dropped 2^64 = EPSILON
    let (sum, wrapped) = a.v.overflowing_add(b.v);
    Goldilocks::canonical(if wrapped { sum + EPSILON } else { sum })
}

#[inline(always)]
fn sub_internal(a: &Goldilocks, b: &Goldilocks) -> Goldilocks {
    let (diff, borrowed) = a.v.overflowing_sub(b.v);
    Goldilocks {
        v: if borrowed {
            diff.wrapping_sub(EPSILON)
        } else {
            diff
        },
    }
}

#[inline(always)]
fn mul_internal(a: &Goldilocks, b: &Goldilocks) -> Goldilocks {
    Goldilocks::reduce128(a.v as u128 * b.v as u128)
}
