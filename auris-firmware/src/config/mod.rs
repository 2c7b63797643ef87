//! Configuration loading
//!
//! The configuration is the auris.toml embedded at build time, parsed with
//! the auris-core parser.

pub mod loader;

pub use loader::load_config;
