//! Summer program CLI library.
//!
//! This crate provides the `camp` command-line interface over the core
//! components and the SQLite store.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, ProgramConfig};
