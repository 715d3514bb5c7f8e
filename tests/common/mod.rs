// Shared test fixtures and helpers

pub mod helpers;

#[allow(unused_imports)]
pub use helpers::*;
