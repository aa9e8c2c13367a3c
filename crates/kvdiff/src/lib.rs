//! kvdiff CLI library
//!
//! The binary in `main.rs` is a thin shell over this crate: [`cli`] holds
//! argument parsing, error rendering and exit-code mapping, [`commands`]
//! holds the comparison pipelines dispatched from the parsed arguments.

pub mod cli;
pub mod commands;
