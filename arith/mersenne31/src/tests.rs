use arith::{random_field_tests, Field};

use crate::{M31, M31_MOD};

#[test]
fn test_m31_field() {
    random_field_tests::<M31>("M31".to_string());
}

#[test]
fn test_m31_reduction_edges() {
    assert_eq!(M31::from(M31_MOD), M31::zero());
    assert_eq!(M31::from(u32::MAX), M31::from(1));
    assert_eq!(M31::from_u64(u64::MAX), M31::from_u64(u64::MAX % M31_MOD as u64));

    let minus_one = -M31::one();
    assert_eq!(minus_one.v, M31_MOD - 1);
    assert_eq!(minus_one * minus_one, M31::one());
}

#[test]
fn test_m31_small_arithmetic() {
    let a = M31::from(4);
    let b = M31::from(40);
    assert_eq!(a + b, M31::from(44));
    assert_eq!(a - b, M31 { v: M31_MOD - 36 });
    assert_eq!(a * b, M31::from(160));
}
