//! Mazerunner engine library.
//!
//! Exposes the maze representation, move generation, the adversarial search
//! and the protocol modules for use by integration tests and the binaries.

pub mod engine;
pub mod eval;
pub mod game;
pub mod grid;
pub mod movegen;
pub mod protocol;
pub mod search;
pub mod selfplay;
