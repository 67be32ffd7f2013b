//! Generic property checks shared by the concrete field crates.

use ark_std::{end_timer, start_timer, test_rng};
use rand::RngCore;

use crate::Field;

pub fn random_field_tests<F: Field>(type_name: String) {
    let mut rng = test_rng();

    random_multiplication_tests::<F, _>(&mut rng, type_name.clone());
    random_addition_tests::<F, _>(&mut rng, type_name.clone());
    random_subtraction_tests::<F, _>(&mut rng, type_name.clone());
    random_inversion_tests::<F, _>(&mut rng, type_name);

    assert!(F::zero().is_zero());
    assert!((-F::zero()).is_zero());

    // small integers embed consistently with addition
    let seven = F::from_u64(7);
    let sum: F = (0..7).map(|_| F::one()).sum();
    assert_eq!(seven, sum);

    let mut a = F::random_unsafe(&mut rng);
    a *= F::zero();
    assert!(a.is_zero());
}

fn random_multiplication_tests<F: Field, R: RngCore>(mut rng: R, type_name: String) {
    let start = start_timer!(|| format!("multiplication {}", type_name));
    for _ in 0..1000 {
        let a = F::random_unsafe(&mut rng);
        let b = F::random_unsafe(&mut rng);
        let c = F::random_unsafe(&mut rng);

        let mut t0 = a; // (a * b) * c
        t0 *= &b;
        t0 *= &c;

        let mut t1 = a; // (a * c) * b
        t1 *= &c;
        t1 *= &b;

        assert_eq!(t0, t1);
        assert_eq!(a.square(), a * a);
        assert_eq!(a.pow(3), a * a * a);
        assert_eq!(a * (b + c), a * b + a * c);
    }
    end_timer!(start);
}

fn random_addition_tests<F: Field, R: RngCore>(mut rng: R, type_name: String) {
    let start = start_timer!(|| format!("addition {}", type_name));
    for _ in 0..1000 {
        let a = F::random_unsafe(&mut rng);
        let b = F::random_unsafe(&mut rng);
        let c = F::random_unsafe(&mut rng);

        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!(a + b, b + a);
        assert_eq!(F::from_u64(2) * a, a + a);
        assert_eq!(a + F::zero(), a);
    }
    end_timer!(start);
}

fn random_subtraction_tests<F: Field, R: RngCore>(mut rng: R, type_name: String) {
    let start = start_timer!(|| format!("subtraction {}", type_name));
    for _ in 0..1000 {
        let a = F::random_unsafe(&mut rng);
        let b = F::random_unsafe(&mut rng);

        assert_eq!(a - b + b, a);
        assert_eq!(a - b, -(b - a));
        assert!((a - a).is_zero());
    }
    end_timer!(start);
}

pub fn random_inversion_tests<F: Field, R: RngCore>(mut rng: R, type_name: String) {
    assert!(F::zero().inv().is_none());

    let start = start_timer!(|| format!("inversion {}", type_name));
    for _ in 0..100 {
        let a = F::random_unsafe(&mut rng);
        if a.is_zero() {
            continue;
        }
        let a_inv = a.inv().unwrap();
        assert_eq!(a * a_inv, F::one());
    }
    end_timer!(start);
}
