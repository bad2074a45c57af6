//! Shared utilities for CLI commands.

use std::io::Write;

use anyhow::{Context, Result};
use camp_core::ProgramDay;
use camp_db::Database;
use serde::Serialize;

use crate::Config;

/// Opens the configured database, creating its parent directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    let parent = config
        .database_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Parses a program day argument (`1` or `2`).
pub fn parse_day(s: &str) -> Result<ProgramDay, String> {
    let value: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid day: {s} (expected 1 or 2)"))?;
    ProgramDay::new(value).map_err(|err| err.to_string())
}

/// Writes a value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).context("failed to encode JSON")?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_accepts_only_program_days() {
        assert_eq!(parse_day("1").unwrap(), ProgramDay::ONE);
        assert_eq!(parse_day(" 2 ").unwrap(), ProgramDay::TWO);
        assert!(parse_day("3").is_err());
        assert!(parse_day("two").unwrap_err().contains("invalid day"));
    }

    #[test]
    fn open_database_creates_parent_directories() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("nested/dir/camp.db"),
            ..Config::default()
        };
        open_database(&config).unwrap();
        assert!(config.database_path.exists());
    }
}
