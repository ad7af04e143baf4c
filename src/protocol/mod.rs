//! MRI protocol handling.
//!
//! The maze runner interface is a line-based stdin/stdout protocol in the
//! spirit of UCI. This module holds the command parser and the `row,col`
//! cell notation used in commands and responses.

pub mod notation;
pub mod parser;

pub use notation::{format_cell, parse_cell, NotationError};
pub use parser::{parse_command, Command, GoParams, GridSpec, PositionSpec};
