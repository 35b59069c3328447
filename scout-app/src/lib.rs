//! Wiring behind the `scout` binary.
pub mod cli;
pub mod pipeline;
