//! Room commands: create, list and delete rooms, and move people between them.

use std::io::Write;

use anyhow::Result;
use camp_core::{
    AssignOutcome, AssignmentLedger, NewRoom, PersonId, Room, RoomId, Roster, retry,
};
use clap::Subcommand;

use super::util::{open_database, write_json};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum RoomsAction {
    /// Add a room.
    Create {
        /// Residence building name.
        #[arg(long)]
        building: String,
        /// Room number within the building.
        #[arg(long)]
        number: String,
        /// Room type, e.g. `single` or `double`.
        #[arg(long = "type", default_value = "double")]
        room_type: String,
        /// Number of beds.
        #[arg(long)]
        capacity: u32,
    },
    /// List rooms with their occupancy.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show a room and its occupants.
    Show {
        room_id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete an empty room.
    Delete { room_id: String },
    /// Put a person in a room, moving them out of their current one.
    Assign { person_id: String, room_id: String },
    /// Take a person out of their room.
    Unassign { person_id: String },
}

pub fn run<W: Write>(writer: &mut W, action: &RoomsAction, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    match action {
        RoomsAction::Create {
            building,
            number,
            room_type,
            capacity,
        } => {
            let room = AssignmentLedger::new(&mut db).create_room(&NewRoom {
                building: building.clone(),
                number: number.clone(),
                room_type: room_type.clone(),
                capacity: *capacity,
            })?;
            writeln!(
                writer,
                "Created room {} {} ({} beds) as {}",
                room.building, room.number, room.capacity, room.id
            )?;
        }
        RoomsAction::List { json } => {
            let rooms = AssignmentLedger::new(&mut db).list_rooms()?;
            if *json {
                return write_json(writer, &rooms);
            }
            write!(writer, "{}", format_rooms(&rooms))?;
        }
        RoomsAction::Show { room_id, json } => {
            let room = AssignmentLedger::new(&mut db).room(&RoomId::new(room_id.as_str())?)?;
            if *json {
                return write_json(writer, &room);
            }
            write!(writer, "{}", format_rooms(std::slice::from_ref(&room)))?;
        }
        RoomsAction::Delete { room_id } => {
            let room_id = RoomId::new(room_id.as_str())?;
            let mut ledger = AssignmentLedger::new(&mut db);
            retry(&config.retry, || ledger.delete_room(&room_id))?;
            writeln!(writer, "Deleted room {room_id}")?;
        }
        RoomsAction::Assign { person_id, room_id } => {
            let person_id = PersonId::new(person_id.as_str())?;
            let room_id = RoomId::new(room_id.as_str())?;
            let kind = Roster::new(&mut db).get(&person_id)?.kind;
            let mut ledger = AssignmentLedger::new(&mut db);
            let assignment = retry(&config.retry, || ledger.assign(&person_id, kind, &room_id))?;
            let occupancy = assignment.room.occupancy();
            let summary = match assignment.outcome {
                AssignOutcome::Assigned => format!("Assigned {person_id} to {room_id}"),
                AssignOutcome::Moved { from } => {
                    format!("Moved {person_id} from {from} to {room_id}")
                }
                AssignOutcome::Unchanged => format!("{person_id} is already in {room_id}"),
            };
            writeln!(
                writer,
                "{summary} ({}/{} beds taken)",
                occupancy.occupied, occupancy.capacity
            )?;
        }
        RoomsAction::Unassign { person_id } => {
            let person_id = PersonId::new(person_id.as_str())?;
            let mut ledger = AssignmentLedger::new(&mut db);
            let room_id = retry(&config.retry, || ledger.unassign(&person_id))?;
            writeln!(writer, "Removed {person_id} from {room_id}")?;
        }
    }
    Ok(())
}

/// Format rooms for human-readable output.
pub fn format_rooms(rooms: &[Room]) -> String {
    use std::fmt::Write as _;

    let mut output = String::new();
    if rooms.is_empty() {
        output.push_str("No rooms.\n");
        return output;
    }
    for room in rooms {
        let occupancy = room.occupancy();
        let full = if occupancy.is_full() { " full" } else { "" };
        let _ = writeln!(
            output,
            "{} {} ({}) {}/{}{full} [{}]",
            room.building,
            room.number,
            room.room_type,
            occupancy.occupied,
            occupancy.capacity,
            room.id
        );
        for occupant in &room.occupants {
            let _ = writeln!(output, "  - {} ({})", occupant.person_id, occupant.kind);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use camp_core::{PersonKind, PersonRef};
    use insta::assert_snapshot;

    fn config(temp: &tempfile::TempDir) -> Config {
        Config {
            database_path: temp.path().join("camp.db"),
            ..Config::default()
        }
    }

    fn room(id: &str, number: &str, capacity: u32, occupants: &[(&str, PersonKind)]) -> Room {
        Room {
            id: RoomId::new(id).unwrap(),
            building: "North".to_string(),
            number: number.to_string(),
            room_type: "double".to_string(),
            capacity,
            occupants: occupants
                .iter()
                .map(|(person, kind)| PersonRef {
                    person_id: PersonId::new(*person).unwrap(),
                    kind: *kind,
                })
                .collect(),
        }
    }

    #[test]
    fn format_rooms_marks_full_rooms() {
        let rooms = vec![
            room(
                "r-1",
                "101",
                2,
                &[("p-1", PersonKind::Student), ("p-2", PersonKind::Student)],
            ),
            room("r-2", "102", 1, &[]),
        ];
        assert_snapshot!(format_rooms(&rooms), @r"
        North 101 (double) 2/2 full [r-1]
          - p-1 (student)
          - p-2 (student)
        North 102 (double) 0/1 [r-2]
        ");
    }

    #[test]
    fn assign_and_move_through_the_command() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(&temp);

        let mut db = open_database(&config).unwrap();
        let person = Roster::new(&mut db)
            .register(PersonKind::Mentor, "Rae")
            .unwrap();
        let mut ledger = AssignmentLedger::new(&mut db);
        let new_room = |number: &str| NewRoom {
            building: "South".to_string(),
            number: number.to_string(),
            room_type: "single".to_string(),
            capacity: 1,
        };
        let first = ledger.create_room(&new_room("1")).unwrap().id;
        let second = ledger.create_room(&new_room("2")).unwrap().id;
        drop(db);

        let mut output = Vec::new();
        for room_id in [&first, &second, &second] {
            let action = RoomsAction::Assign {
                person_id: person.to_string(),
                room_id: room_id.to_string(),
            };
            run(&mut output, &action, &config).unwrap();
        }
        let output = String::from_utf8(output)
            .unwrap()
            .replace(person.as_str(), "[PERSON]")
            .replace(first.as_str(), "[FIRST]")
            .replace(second.as_str(), "[SECOND]");
        assert_snapshot!(output, @r"
        Assigned [PERSON] to [FIRST] (1/1 beds taken)
        Moved [PERSON] from [FIRST] to [SECOND] (1/1 beds taken)
        [PERSON] is already in [SECOND] (1/1 beds taken)
        ");

        let mut output = Vec::new();
        let action = RoomsAction::Delete {
            room_id: second.to_string(),
        };
        let err = run(&mut output, &action, &config).unwrap_err();
        assert!(err.to_string().contains("still has 1 occupant"));
    }
}
