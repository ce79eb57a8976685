pub mod random;

pub use random::RandomSource;
