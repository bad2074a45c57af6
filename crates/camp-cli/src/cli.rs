//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::check::CheckArgs;
use crate::commands::classes::ClassesAction;
use crate::commands::people::PeopleAction;
use crate::commands::rooms::RoomsAction;
use crate::commands::schedule::ScheduleAction;
use crate::commands::shifts::ShiftsAction;

/// Summer program administration.
///
/// Assigns rooms, books mentor shifts, maintains the two-day schedule and
/// records each student's class choices.
#[derive(Debug, Parser)]
#[command(name = "camp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize rooms, shifts and the schedule.
    Status,

    /// Verify that rooms and people agree on who sleeps where.
    Check(CheckArgs),

    /// Register and look up students and mentors.
    #[command(subcommand)]
    People(PeopleAction),

    /// Manage rooms and room assignments.
    #[command(subcommand)]
    Rooms(RoomsAction),

    /// Book and cancel mentor shifts.
    #[command(subcommand)]
    Shifts(ShiftsAction),

    /// View and edit the program schedule.
    #[command(subcommand)]
    Schedule(ScheduleAction),

    /// Pick classes for students.
    #[command(subcommand)]
    Classes(ClassesAction),
}
