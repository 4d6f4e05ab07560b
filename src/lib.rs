//! Memory pressure monitor and working-set cleaner.
//!
//! The engine samples host memory, classifies pressure, trims working sets on
//! request or when a threshold is crossed, and keeps a bounded JSON history of
//! what each clean freed.

pub mod engine;
pub mod frontend;
pub mod logging;
pub mod shared;

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
