mod goldilocks;
pub use goldilocks::{Goldilocks, EPSILON, GOLDILOCKS_MOD};

#[cfg(test)]
mod tests;
