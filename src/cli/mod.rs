//! Command-line interface for examforge.
//!
//! Provides commands for generating quality-gated exam questions and for
//! inspecting recently used topics.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands};
