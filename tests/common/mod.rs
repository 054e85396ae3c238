#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from boatdet for tests
pub use boatdet::{Rectangle, Verdict};
