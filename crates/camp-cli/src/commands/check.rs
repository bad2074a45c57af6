//! Check command for verifying room assignments.
//!
//! Exits non-zero when the rooms and people collections disagree, so it can
//! gate scripts that bulk-edit the database.

use std::io::Write;

use anyhow::{Result, bail};
use camp_core::{AssignmentLedger, Violation};
use clap::Args;

use super::util::{open_database, write_json};
use crate::Config;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Output violations as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &CheckArgs, config: &Config) -> Result<()> {
    let violations = AssignmentLedger::new(open_database(config)?).audit()?;

    if args.json {
        write_json(writer, &violations)?;
    } else if violations.is_empty() {
        writeln!(writer, "Room assignments are consistent.")?;
    } else {
        for violation in &violations {
            writeln!(writer, "{}", describe(violation))?;
        }
    }

    if !violations.is_empty() {
        bail!("found {} room assignment violation(s)", violations.len());
    }
    Ok(())
}

fn describe(violation: &Violation) -> String {
    match violation {
        Violation::OverCapacity {
            room_id,
            occupied,
            capacity,
        } => format!("room {room_id} holds {occupied} people but has {capacity} beds"),
        Violation::DanglingReference { person_id, room_id } => {
            format!("{person_id} points at room {room_id}, which does not list them")
        }
        Violation::UnreferencedOccupant { room_id, person_id } => {
            format!("room {room_id} lists {person_id}, who points elsewhere")
        }
        Violation::DuplicateOccupant { person_id, rooms } => {
            let rooms: Vec<_> = rooms.iter().map(ToString::to_string).collect();
            format!("{person_id} is listed more than once: {}", rooms.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use camp_core::{PersonId, RoomId};
    use insta::assert_snapshot;

    #[test]
    fn clean_database_passes() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("camp.db"),
            ..Config::default()
        };
        let mut output = Vec::new();
        run(&mut output, &CheckArgs { json: false }, &config).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Room assignments are consistent.");
    }

    #[test]
    fn violations_are_described() {
        let room = RoomId::new("r-1").unwrap();
        let person = PersonId::new("p-1").unwrap();
        let lines: Vec<_> = [
            Violation::OverCapacity {
                room_id: room.clone(),
                occupied: 3,
                capacity: 2,
            },
            Violation::DanglingReference {
                person_id: person.clone(),
                room_id: room.clone(),
            },
            Violation::DuplicateOccupant {
                person_id: person,
                rooms: vec![room, RoomId::new("r-2").unwrap()],
            },
        ]
        .iter()
        .map(describe)
        .collect();
        assert_snapshot!(lines.join("\n"), @r"
        room r-1 holds 3 people but has 2 beds
        p-1 points at room r-1, which does not list them
        p-1 is listed more than once: r-1, r-2
        ");
    }
}
