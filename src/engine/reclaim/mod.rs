mod engine;
mod reclaimer;
mod result;

pub use engine::ReclaimEngine;
pub use reclaimer::{Reclaimer, WorkingSetTrimmer, ensure_supported_platform};
pub use result::CleanResult;
