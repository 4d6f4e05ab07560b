pub mod errors;
pub mod history;
pub mod policy;
pub mod preferences;
pub mod reclaim;
pub mod sampler;
pub mod service;

pub use errors::*;
pub use service::{MemoryService, StatusReport, TickReport};

#[cfg(test)]
mod service_test;
