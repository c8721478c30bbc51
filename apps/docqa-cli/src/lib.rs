//! Command-line front end: argument parsing and the interactive question loop.

pub mod cli;
pub mod repl;
