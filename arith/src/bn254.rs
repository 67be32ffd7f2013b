use halo2curves::ff::Field as _;
use rand::RngCore;

use crate::Field;

pub use halo2curves::bn256::Fr as BN254Fr;

impl Field for BN254Fr {
    const NAME: &'static str = "bn254 scalar field";

    const ZERO: Self = BN254Fr::zero();

    const ONE: Self = BN254Fr::one();

    fn random_unsafe(rng: impl RngCore) -> Self {
        <BN254Fr as halo2curves::ff::Field>::random(rng)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        BN254Fr::from(v)
    }

    #[inline]
    fn square(&self) -> Self {
        halo2curves::ff::Field::square(self)
    }

    fn inv(&self) -> Option<Self> {
        self.invert().into()
    }
}
