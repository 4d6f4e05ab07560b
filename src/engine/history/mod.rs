mod entry;
mod file;
mod log;

pub use entry::CleanLogEntry;
pub use file::HistoryFile;
pub use log::{CleanHistory, MAX_ENTRIES};

#[cfg(test)]
mod file_test;
