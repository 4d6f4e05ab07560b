pub mod config;
pub mod json_file;
pub mod rounding;
pub mod time;
