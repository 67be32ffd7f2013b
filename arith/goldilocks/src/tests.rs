use arith::{random_field_tests, Field};

use crate::{Goldilocks, GOLDILOCKS_MOD};

#[test]
fn test_goldilocks_field() {
    random_field_tests::<Goldilocks>("Goldilocks".to_string());
}

#[test]
fn test_goldilocks_matches_u128_reference() {
    let p = GOLDILOCKS_MOD as u128;
    let samples = [
        0u64,
        1,
        2,
        0xffffffff,
        0x1_0000_0000,
        GOLDILOCKS_MOD - 1,
        GOLDILOCKS_MOD - 2,
        0x7FFFFFFF80000001,
        0xdead_beef_cafe_f00d % GOLDILOCKS_MOD,
    ];
    for &x in samples.iter() {
        for &y in samples.iter() {
            let (a, b) = (Goldilocks::from_u64(x), Goldilocks::from_u64(y));
            assert_eq!((a + b).v as u128, (x as u128 + y as u128) % p);
            assert_eq!((a - b).v as u128, (x as u128 + p - y as u128) % p);
            assert_eq!((a * b).v as u128, (x as u128 * y as u128) % p);
        }
    }
}
