//! Command implementations for the qtype CLI.

pub mod train;
