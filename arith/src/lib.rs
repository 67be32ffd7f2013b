mod field;
pub use field::*;

mod macros;

mod bn254;
pub use bn254::BN254Fr;

mod field_tests;
pub use field_tests::*;
