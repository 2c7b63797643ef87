//! Configuration types
//!
//! Board-agnostic configuration structures and the parser for the
//! embedded `auris.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
