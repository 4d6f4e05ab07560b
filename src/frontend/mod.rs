pub mod context;
pub mod render;
pub mod watch;

pub use context::{ContextError, FrontendContext};
pub use watch::{WatchEvent, WatchOptions, run_watch};
