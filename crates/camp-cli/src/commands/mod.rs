//! CLI subcommand implementations.

pub mod check;
pub mod classes;
pub mod people;
pub mod rooms;
pub mod schedule;
pub mod shifts;
pub mod status;
pub mod util;
