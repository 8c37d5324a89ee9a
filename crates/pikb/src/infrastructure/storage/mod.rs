//! File storage: the TOML configuration with model presets, and macro files.

pub mod config;
pub mod macro_file;
