//! Grove Tools - command-line utilities for grove
//!
//! The `grove` binary parses a file or a bundled sample snippet and prints
//! the syntax tree one node per line.

pub mod cli;
pub mod demo;

pub use demo::{ToolError, run_parse};
