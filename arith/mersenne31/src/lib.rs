mod m31;
pub use m31::{M31, M31_MOD};

#[cfg(test)]
mod tests;
