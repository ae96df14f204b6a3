//! Shared utilities

pub mod config;
pub mod fs;
pub mod os;
pub mod process;

pub use config::Config;
