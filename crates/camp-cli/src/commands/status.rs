//! Status command for a one-screen summary of the program.

use std::io::Write;

use anyhow::Result;
use camp_core::{
    AssignmentLedger, Collection, DocumentStore, PersonKind, ProgramDay, Roster, ScheduleCatalog,
    ShiftStatus,
};
use serde_json::json;

use super::util::open_database;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let calendar = config.calendar();

    writeln!(writer, "Summer program status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(
        writer,
        "Program: day 1 {}, day 2 {}",
        calendar.date_of(ProgramDay::ONE),
        calendar.date_of(ProgramDay::TWO)
    )?;

    let rooms = AssignmentLedger::new(&mut db).list_rooms()?;
    let beds: u64 = rooms.iter().map(|room| u64::from(room.capacity)).sum();
    let taken: usize = rooms.iter().map(|room| room.occupants.len()).sum();
    let full = rooms.iter().filter(|room| room.is_full()).count();
    writeln!(
        writer,
        "Rooms: {} ({taken}/{beds} beds taken, {full} full)",
        rooms.len()
    )?;

    let people = Roster::new(&mut db).list(None)?;
    let students = people
        .iter()
        .filter(|p| p.kind == PersonKind::Student)
        .count();
    let unhoused = people.iter().filter(|p| p.room.is_none()).count();
    writeln!(
        writer,
        "People: {students} students, {} mentors, {unhoused} without a room",
        people.len() - students
    )?;

    let live = db
        .query_eq(Collection::Shifts, "status", &json!(ShiftStatus::Scheduled))?
        .len();
    let cancelled = db
        .query_eq(Collection::Shifts, "status", &json!(ShiftStatus::Cancelled))?
        .len();
    writeln!(writer, "Shifts: {live} scheduled, {cancelled} cancelled")?;

    let catalog = ScheduleCatalog::new(&mut db, calendar);
    let day_one = catalog.list_by_day(ProgramDay::ONE)?.len();
    let day_two = catalog.list_by_day(ProgramDay::TWO)?.len();
    writeln!(writer, "Schedule: {day_one} items on day 1, {day_two} on day 2")?;

    Ok(())
}
